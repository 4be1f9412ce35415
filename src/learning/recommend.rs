//! Read-only recommendation queries over accumulated learning state.

use crate::learning::engine::LearningEngine;
use crate::learning::state::{ChannelInsights, HookRecord, KeywordStats};

use chrono::{DateTime, Utc};
use serde::Serialize;

use std::collections::BTreeMap;

/// Hook texts returned per recommendation query.
const HOOK_RECOMMENDATION_LIMIT: usize = 5;

/// Hooks considered when no keyword-relevant hook exists.
const HOOK_FALLBACK_POOL: usize = 10;

/// Content-structure guidance for one channel, derived from its
/// best-performing scripts.
#[derive(Debug, Clone, Serialize)]
pub struct ContentRecommendations {
    /// Word count of the best-performing script, when one has been seen.
    pub optimal_word_count: Option<usize>,
    /// Fingerprint of the best-performing structure, when one exists.
    pub recommended_structure: Option<StructureRecommendation>,
}

/// The shape of the channel's best-performing script.
#[derive(Debug, Clone, Serialize)]
pub struct StructureRecommendation {
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub include_call_to_action: bool,
}

/// One keyword's aggregate standing in the performance report.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordInsight {
    pub keyword: String,
    pub avg_performance: f64,
}

/// Aggregate hook statistics in the performance report. Rates are
/// percentages over the retained top hooks.
#[derive(Debug, Clone, Serialize)]
pub struct HookInsights {
    pub optimal_length_words: f64,
    pub question_hooks_success_rate: f64,
    pub hooks_with_numbers_success_rate: f64,
    pub top_hooks: Vec<String>,
}

/// Aggregated view of keyword, hook, and content effectiveness.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub report_period: String,
    pub generated_at: DateTime<Utc>,
    pub keyword_insights: Vec<KeywordInsight>,
    pub hook_insights: Option<HookInsights>,
    pub content_insights: BTreeMap<String, ChannelInsights>,
}

impl LearningEngine {
    /// Keywords ranked by average performance, preferring ones lexically
    /// matching the niche's words and backfilling with top general
    /// performers until `count` is reached.
    pub fn keyword_recommendations(&self, niche: &str, count: usize) -> Vec<String> {
        let keyword_performance = &self.state().keyword_performance;
        if keyword_performance.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(&String, &KeywordStats)> = keyword_performance.iter().collect();
        ranked.sort_by(|a, b| b.1.avg_performance.total_cmp(&a.1.avg_performance));

        let niche_lower = niche.to_lowercase();
        let niche_words: Vec<&str> = niche_lower.split_whitespace().collect();

        // Scan twice as many keywords as requested so niche matches further
        // down the ranking can still make the cut.
        let mut recommendations = Vec::new();
        let mut backfill = Vec::new();
        for (keyword, _) in ranked.into_iter().take(count * 2) {
            let keyword_lower = keyword.to_lowercase();
            if niche_words.iter().any(|word| keyword_lower.contains(word)) {
                recommendations.push(keyword.clone());
            } else {
                backfill.push(keyword.clone());
            }
        }

        recommendations.extend(backfill);
        recommendations.truncate(count);
        recommendations
    }

    /// Up to five historical hook texts containing any of the given
    /// keywords (case-insensitive), falling back to the global top ten
    /// performers when none match.
    pub fn hook_recommendations(&self, topic_keywords: &[String]) -> Vec<String> {
        let hooks = &self.state().successful_hooks;
        if hooks.is_empty() {
            return Vec::new();
        }

        let keywords_lower: Vec<String> = topic_keywords
            .iter()
            .map(|keyword| keyword.to_lowercase())
            .collect();

        let mut relevant: Vec<&HookRecord> = hooks
            .iter()
            .filter(|hook| {
                let text = hook.text.to_lowercase();
                keywords_lower.iter().any(|keyword| text.contains(keyword))
            })
            .collect();

        if relevant.is_empty() {
            relevant = hooks.iter().take(HOOK_FALLBACK_POOL).collect();
        }

        relevant
            .into_iter()
            .take(HOOK_RECOMMENDATION_LIMIT)
            .map(|hook| hook.text.clone())
            .collect()
    }

    /// The channel's best known word count and best-performing structure.
    /// `None` when the channel has no history at all.
    pub fn content_recommendations(&self, channel: &str) -> Option<ContentRecommendations> {
        let insights = self.state().content_insights.get(channel)?;

        let optimal_word_count = (insights.optimal_length.word_count > 0)
            .then_some(insights.optimal_length.word_count);

        let recommended_structure =
            insights
                .successful_structures
                .first()
                .map(|best| StructureRecommendation {
                    sentence_count: best.sentence_count,
                    avg_sentence_length: round_to(best.avg_sentence_length, 1),
                    include_call_to_action: best.has_call_to_action,
                });

        Some(ContentRecommendations {
            optimal_word_count,
            recommended_structure,
        })
    }

    /// Aggregate the top-ten keywords by average performance and the
    /// structural statistics of the retained hooks.
    pub fn performance_report(&self, days_back: u32) -> PerformanceReport {
        let state = self.state();

        let mut ranked: Vec<(&String, &KeywordStats)> = state.keyword_performance.iter().collect();
        ranked.sort_by(|a, b| b.1.avg_performance.total_cmp(&a.1.avg_performance));
        let keyword_insights = ranked
            .into_iter()
            .take(10)
            .map(|(keyword, stats)| KeywordInsight {
                keyword: keyword.clone(),
                avg_performance: round_to(stats.avg_performance, 3),
            })
            .collect();

        let hooks = &state.successful_hooks;
        let hook_insights = (!hooks.is_empty()).then(|| {
            let total = hooks.len() as f64;
            let total_length: usize = hooks.iter().map(|hook| hook.length_words).sum();
            let with_question = hooks.iter().filter(|hook| hook.has_question).count() as f64;
            let with_numbers = hooks.iter().filter(|hook| hook.has_numbers).count() as f64;

            HookInsights {
                optimal_length_words: round_to(total_length as f64 / total, 1),
                question_hooks_success_rate: round_to(with_question / total * 100.0, 1),
                hooks_with_numbers_success_rate: round_to(with_numbers / total * 100.0, 1),
                top_hooks: hooks
                    .iter()
                    .take(5)
                    .map(|hook| hook.text.clone())
                    .collect(),
            }
        });

        PerformanceReport {
            report_period: format!("Last {days_back} days"),
            generated_at: Utc::now(),
            keyword_insights,
            hook_insights,
            content_insights: state.content_insights.clone(),
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PerformanceCategory, VideoMetrics};

    fn setup() -> (tempfile::TempDir, LearningEngine) {
        let dir = tempfile::tempdir().unwrap();
        let engine = LearningEngine::open(dir.path());
        (dir, engine)
    }

    fn metrics(views: u64) -> VideoMetrics {
        VideoMetrics {
            views,
            engagement_rate: 2.0,
            retention_rate: 50.0,
            performance_category: PerformanceCategory::Average,
        }
    }

    fn learn(engine: &mut LearningEngine, keywords: &[&str], hook: &str, views: u64) {
        let keywords: Vec<String> = keywords.iter().map(|k| (*k).to_owned()).collect();
        engine.analyze_performance_and_learn(
            "vid",
            &keywords,
            hook,
            "A script about things. Subscribe now.",
            "tech",
            Some(&metrics(views)),
        );
    }

    #[test]
    fn test_keyword_recommendations_empty_without_history() {
        let (_dir, engine) = setup();

        assert!(engine.keyword_recommendations("ai", 5).is_empty());
    }

    #[test]
    fn test_keyword_recommendations_rank_by_average_performance() {
        let (_dir, mut engine) = setup();
        learn(&mut engine, &["strong"], "Hook", 9_000);
        learn(&mut engine, &["weak"], "Hook", 100);
        learn(&mut engine, &["middle"], "Hook", 4_000);

        let recommendations = engine.keyword_recommendations("unrelated", 3);
        assert_eq!(recommendations, vec!["strong", "middle", "weak"]);
    }

    #[test]
    fn test_keyword_recommendations_prefer_niche_matches() {
        let (_dir, mut engine) = setup();
        learn(&mut engine, &["gadgets"], "Hook", 9_000);
        learn(&mut engine, &["pasta"], "Hook", 8_000);
        learn(&mut engine, &["cooking-hacks"], "Hook", 1_000);

        let recommendations = engine.keyword_recommendations("cooking", 2);
        // The lexical match outranks better general performers; the top
        // general performer backfills the remaining slot.
        assert_eq!(recommendations, vec!["cooking-hacks", "gadgets"]);
    }

    #[test]
    fn test_hook_recommendations_match_keywords_case_insensitively() {
        let (_dir, mut engine) = setup();
        learn(&mut engine, &["ai"], "Watch this Robot cook dinner", 5_000);
        learn(&mut engine, &["ai"], "A quiet day in the lab", 4_000);

        let matches =
            engine.hook_recommendations(&["robot".to_owned()]);
        assert_eq!(matches, vec!["Watch this Robot cook dinner"]);
    }

    #[test]
    fn test_hook_recommendations_fall_back_to_top_performers() {
        let (_dir, mut engine) = setup();
        learn(&mut engine, &["ai"], "First hook", 6_000);
        learn(&mut engine, &["ai"], "Second hook", 3_000);

        let fallback = engine.hook_recommendations(&["quantum".to_owned()]);
        assert_eq!(fallback.len(), 2);
        // Highest performer first.
        assert_eq!(fallback[0], "First hook");
    }

    #[test]
    fn test_hook_recommendations_cap_at_five() {
        let (_dir, mut engine) = setup();
        for index in 0..8u64 {
            learn(
                &mut engine,
                &["ai"],
                &format!("Robot hook {index}"),
                1_000 + index * 100,
            );
        }

        let matches = engine.hook_recommendations(&["robot".to_owned()]);
        assert_eq!(matches.len(), 5);
    }

    #[test]
    fn test_content_recommendations_signal_missing_channels() {
        let (_dir, mut engine) = setup();
        learn(&mut engine, &["ai"], "Hook", 5_000);

        assert!(engine.content_recommendations("cooking").is_none());

        let tech = engine.content_recommendations("tech").unwrap();
        assert!(tech.optimal_word_count.is_some());
        let structure = tech.recommended_structure.unwrap();
        assert!(structure.include_call_to_action);
        assert!(structure.sentence_count > 0);
    }

    #[test]
    fn test_performance_report_aggregates_hooks_and_keywords() {
        let (_dir, mut engine) = setup();
        learn(&mut engine, &["ai"], "Is this the future?", 9_000);
        learn(&mut engine, &["robot"], "Top 3 robot fails", 2_000);

        let report = engine.performance_report(30);

        assert_eq!(report.report_period, "Last 30 days");
        assert_eq!(report.keyword_insights.len(), 2);
        assert_eq!(report.keyword_insights[0].keyword, "ai");

        let hooks = report.hook_insights.unwrap();
        // One of two hooks asks a question; one carries digits.
        assert_eq!(hooks.question_hooks_success_rate, 50.0);
        assert_eq!(hooks.hooks_with_numbers_success_rate, 50.0);
        assert_eq!(hooks.optimal_length_words, 4.0);
        assert_eq!(hooks.top_hooks.len(), 2);

        assert!(report.content_insights.contains_key("tech"));
    }

    #[test]
    fn test_performance_report_on_empty_state() {
        let (_dir, engine) = setup();

        let report = engine.performance_report(7);

        assert!(report.keyword_insights.is_empty());
        assert!(report.hook_insights.is_none());
        assert!(report.content_insights.is_empty());
    }
}
