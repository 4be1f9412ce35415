//! Post-publish learning: realized metrics feed keyword, hook, and content
//! statistics, then nudge the scoring weights.

use crate::learning::state::{HookRecord, LearningState, OptimalLength, StructurePattern};
use crate::scoring::ScoringWeights;
use crate::store::{self, Document, JsonFileStore, StateStore};
use crate::types::VideoMetrics;

use chrono::Utc;

use std::path::PathBuf;

/// Opening words that mark a hook as action-led.
const ACTION_VERBS: [&str; 6] = ["discover", "learn", "watch", "see", "find", "get"];

/// Terms whose presence marks a script as carrying a call to action.
const CALL_TO_ACTION_TERMS: [&str; 5] = ["comment", "like", "subscribe", "share", "follow"];

/// Views at which the view component of the performance score saturates.
const VIEW_SATURATION: f64 = 10_000.0;

/// Engagement percentage at which the engagement component saturates.
const ENGAGEMENT_SATURATION: f64 = 5.0;

/// Canonical [0, 1] fitness signal derived from realized metrics: view,
/// engagement, and retention components weighted 0.5 / 0.3 / 0.2, each
/// saturating at its threshold.
pub fn performance_score(metrics: &VideoMetrics) -> f64 {
    let view_score = (metrics.views as f64 / VIEW_SATURATION).min(1.0);
    let engagement_score = (metrics.engagement_rate / ENGAGEMENT_SATURATION).min(1.0);
    let retention_score = (metrics.retention_rate / 100.0).min(1.0);

    (0.5 * view_score + 0.3 * engagement_score + 0.2 * retention_score).clamp(0.0, 1.0)
}

/// Closes the feedback loop from realized video performance back into the
/// scoring weights, while accumulating reusable content-pattern knowledge
/// (keyword statistics, successful hooks, per-channel structure insights).
pub struct LearningEngine {
    store: Box<dyn StateStore>,
    state: LearningState,
    weights: ScoringWeights,
}

impl LearningEngine {
    /// Build an engine over an injected store. Missing documents fall back
    /// to an empty learning state and default weights.
    pub fn new(store: Box<dyn StateStore>) -> Self {
        let state = store::load_or_default(store.as_ref(), Document::LearningState);
        let weights = ScoringWeights::load(store.as_ref());
        Self {
            store,
            state,
            weights,
        }
    }

    /// Convenience constructor over a [`JsonFileStore`] rooted at a content
    /// directory.
    pub fn open(content_root: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(JsonFileStore::new(content_root)))
    }

    /// Accumulated learning state.
    pub fn state(&self) -> &LearningState {
        &self.state
    }

    /// Current scoring weights as last adjusted by this engine.
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Fold one published video's realized performance into the learning
    /// state and scoring weights, then persist both documents.
    ///
    /// Passing `None` for `metrics` (analytics not yet available) is a
    /// logged no-op, not an error.
    pub fn analyze_performance_and_learn(
        &mut self,
        video_id: &str,
        topic_keywords: &[String],
        hook: &str,
        script: &str,
        channel: &str,
        metrics: Option<&VideoMetrics>,
    ) {
        let Some(metrics) = metrics else {
            tracing::warn!(video_id, "no metrics available, skipping learning update");
            return;
        };

        let score = performance_score(metrics);

        self.update_keyword_stats(topic_keywords, score);
        self.record_hook(hook, metrics, score);
        self.update_content_insights(script, channel, score);
        self.weights.nudge_for_outcome(metrics);

        self.state.last_updated = Some(Utc::now());
        store::save_logged(self.store.as_ref(), Document::LearningState, &self.state);
        store::save_logged(self.store.as_ref(), Document::Weights, &self.weights);

        tracing::info!(video_id, channel, score, "learning update complete");
    }

    /// Clear all accumulated learning state and persist the empty document.
    pub fn reset(&mut self) {
        self.state = LearningState {
            last_updated: Some(Utc::now()),
            ..LearningState::default()
        };
        store::save_logged(self.store.as_ref(), Document::LearningState, &self.state);
        tracing::info!("learning state reset");
    }

    // -- statistics updates -------------------------------------------------

    fn update_keyword_stats(&mut self, keywords: &[String], score: f64) {
        for keyword in keywords {
            let stats = self
                .state
                .keyword_performance
                .entry(keyword.clone())
                .or_default();
            stats.total_videos += 1;
            stats.total_performance += score;
            stats.avg_performance = stats.total_performance / stats.total_videos as f64;
            stats.best_performance = stats.best_performance.max(score);
            stats.recent_trend.push(score);
        }
    }

    fn record_hook(&mut self, hook: &str, metrics: &VideoMetrics, score: f64) {
        let words: Vec<&str> = hook.split_whitespace().collect();
        let starts_with_action = words
            .first()
            .map(|first| ACTION_VERBS.contains(&first.to_lowercase().as_str()))
            .unwrap_or(false);

        self.state.successful_hooks.insert(HookRecord {
            text: hook.to_owned(),
            performance: score,
            length_words: words.len(),
            has_question: hook.contains('?'),
            has_numbers: hook.chars().any(|c| c.is_ascii_digit()),
            starts_with_action,
            views: metrics.views,
            engagement_rate: metrics.engagement_rate,
            timestamp: Utc::now(),
        });
    }

    fn update_content_insights(&mut self, script: &str, channel: &str, score: f64) {
        let insights = self
            .state
            .content_insights
            .entry(channel.to_owned())
            .or_default();

        let word_count = script.split_whitespace().count();
        if score > insights.optimal_length.performance {
            insights.optimal_length = OptimalLength {
                word_count,
                performance: score,
            };
        }

        // Period splits include empty trailing segments; the stored sentence
        // counts have always been computed that way.
        let sentences: Vec<&str> = script.split('.').collect();
        let total_words: usize = sentences
            .iter()
            .map(|sentence| sentence.split_whitespace().count())
            .sum();
        let script_lower = script.to_lowercase();

        insights.successful_structures.insert(StructurePattern {
            sentence_count: sentences.len(),
            avg_sentence_length: total_words as f64 / sentences.len() as f64,
            has_call_to_action: CALL_TO_ACTION_TERMS
                .iter()
                .any(|term| script_lower.contains(term)),
            performance: score,
        });
    }
}

impl std::fmt::Debug for LearningEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearningEngine")
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}
