//! Composite candidate scoring, ranking, and deduplication.
//!
//! `TopicScorer` turns a batch of raw topic candidates into a deduplicated,
//! performance-informed ranking for one channel. Five sub-scores (recency,
//! cross-source corroboration, novelty, historical performance, keyword
//! frequency) are combined as a weighted sum under the current
//! [`ScoringWeights`], which the learning engine re-tunes after every
//! published video.

use crate::scoring::history::{UsageHistory, UsageRecord};
use crate::scoring::weights::ScoringWeights;
use crate::store::{self, Document, JsonFileStore, StateStore};
use crate::types::{TopicCandidate, UsageMetrics};

use chrono::{DateTime, Duration, Utc};

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Keyword-overlap ratio above which two candidates are near-duplicates.
const DUPLICATE_OVERLAP_RATIO: f64 = 0.7;

/// Days of channel history consulted by the novelty sub-score.
const NOVELTY_WINDOW_DAYS: i64 = 14;

/// Most recent history entries consulted by the performance sub-score.
const PERFORMANCE_LOOKBACK: usize = 50;

/// Shared keywords required before two topics count as covering the same
/// subject.
const MIN_SHARED_KEYWORDS: usize = 2;

/// Scores, ranks, and deduplicates topic candidates for one channel, and
/// records which topics were actually used.
///
/// Weights and history are loaded once at construction; call
/// [`reload`](Self::reload) to pick up documents rewritten out-of-band by
/// the learning engine.
pub struct TopicScorer {
    store: Box<dyn StateStore>,
    weights: ScoringWeights,
    history: UsageHistory,
}

impl TopicScorer {
    /// Build a scorer over an injected store. Missing documents fall back
    /// to defaults without error.
    pub fn new(store: Box<dyn StateStore>) -> Self {
        let weights = ScoringWeights::load(store.as_ref());
        let history = store::load_or_default(store.as_ref(), Document::UsageHistory);
        Self {
            store,
            weights,
            history,
        }
    }

    /// Convenience constructor over a [`JsonFileStore`] rooted at a content
    /// directory.
    pub fn open(content_root: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(JsonFileStore::new(content_root)))
    }

    /// Re-read weights and history from the store, picking up out-of-band
    /// updates (the learning engine rewrites both documents).
    pub fn reload(&mut self) {
        self.weights = ScoringWeights::load(self.store.as_ref());
        self.history = store::load_or_default(self.store.as_ref(), Document::UsageHistory);
    }

    /// Current scoring weights.
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Usage history backing the novelty and performance sub-scores.
    pub fn history(&self) -> &UsageHistory {
        &self.history
    }

    /// Score every candidate, rank descending, and drop near-duplicates.
    ///
    /// An empty batch is returned unchanged. Each candidate's `score` is
    /// set to the weighted sum of its five sub-scores, clamped to [0, 1];
    /// ties keep their original relative order. Usage history is not
    /// touched — that is [`mark_topic_used`](Self::mark_topic_used).
    pub fn score_and_rank(
        &self,
        mut candidates: Vec<TopicCandidate>,
        channel: &str,
    ) -> Vec<TopicCandidate> {
        if candidates.is_empty() {
            return candidates;
        }

        let keyword_sets: Vec<HashSet<&str>> = candidates.iter().map(keyword_set).collect();

        let mut keyword_counts: HashMap<&str, usize> = HashMap::new();
        let mut total_keywords = 0usize;
        for candidate in &candidates {
            for keyword in &candidate.keywords {
                *keyword_counts.entry(keyword.as_str()).or_insert(0) += 1;
                total_keywords += 1;
            }
        }

        let scores: Vec<f64> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let composite = score_recency(candidate.created_at)
                    * self.weights.recency_weight
                    + score_cross_source(index, &keyword_sets) * self.weights.cross_source_weight
                    + self.score_novelty(&keyword_sets[index], channel)
                        * self.weights.novelty_weight
                    + self.score_performance(&keyword_sets[index], channel)
                        * self.weights.performance_weight
                    + score_keyword_frequency(&candidate.keywords, &keyword_counts, total_keywords)
                        * self.weights.keyword_frequency_weight;
                composite.clamp(0.0, 1.0)
            })
            .collect();

        for (candidate, score) in candidates.iter_mut().zip(&scores) {
            candidate.score = *score;
        }

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let scored = candidates.len();
        let deduplicated = deduplicate(candidates);
        tracing::debug!(
            channel,
            scored,
            kept = deduplicated.len(),
            "scored and ranked topic batch"
        );
        deduplicated
    }

    /// Record that a topic went to production for a channel and persist the
    /// history document.
    ///
    /// Save failures are logged, not raised; the in-memory history stays
    /// current for the rest of this process.
    pub fn mark_topic_used(
        &mut self,
        topic_id: &str,
        keywords: Vec<String>,
        channel: &str,
        performance: Option<UsageMetrics>,
    ) {
        self.history.record(
            channel,
            UsageRecord {
                topic_id: topic_id.to_owned(),
                keywords,
                used_at: Utc::now(),
                performance,
            },
        );
        store::save_logged(self.store.as_ref(), Document::UsageHistory, &self.history);
        tracing::debug!(topic_id, channel, "marked topic used");
    }

    // -- history-backed sub-scores ------------------------------------------

    /// Penalty for topics too similar to what the channel covered in the
    /// last 14 days. The first historical entry sharing at least two
    /// keywords decides the score; three or more shared keywords is the
    /// stronger conflict.
    fn score_novelty(&self, keywords: &HashSet<&str>, channel: &str) -> f64 {
        let cutoff = Utc::now() - Duration::days(NOVELTY_WINDOW_DAYS);
        for record in self.history.channel(channel) {
            if record.used_at <= cutoff {
                continue;
            }
            let shared = shared_keywords(keywords, &record.keywords);
            if shared >= 3 {
                return 0.2;
            }
            if shared >= MIN_SHARED_KEYWORDS {
                return 0.5;
            }
        }
        1.0
    }

    /// Expected performance of similar topics, averaged over the most
    /// recent 50 history entries that carry realized metrics and share at
    /// least two keywords. Neutral 0.5 when the channel has no usable
    /// comparison, so new channels are neither penalized nor rewarded.
    fn score_performance(&self, keywords: &HashSet<&str>, channel: &str) -> f64 {
        let mut similar = Vec::new();
        for record in self
            .history
            .channel(channel)
            .rev()
            .take(PERFORMANCE_LOOKBACK)
        {
            let Some(performance) = &record.performance else {
                continue;
            };
            if shared_keywords(keywords, &record.keywords) < MIN_SHARED_KEYWORDS {
                continue;
            }
            let views_score = (performance.views as f64 / 1000.0).min(1.0);
            similar.push(0.7 * performance.retention_ratio() + 0.3 * views_score);
        }

        if similar.is_empty() {
            return 0.5;
        }
        similar.iter().sum::<f64>() / similar.len() as f64
    }
}

impl std::fmt::Debug for TopicScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicScorer")
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Batch-local sub-scores
// ---------------------------------------------------------------------------

fn keyword_set(candidate: &TopicCandidate) -> HashSet<&str> {
    candidate.keywords.iter().map(String::as_str).collect()
}

/// Number of a historical record's distinct keywords present in the
/// candidate's set.
fn shared_keywords(candidate_keywords: &HashSet<&str>, record_keywords: &[String]) -> usize {
    let record_set: HashSet<&str> = record_keywords.iter().map(String::as_str).collect();
    record_set
        .iter()
        .filter(|keyword| candidate_keywords.contains(*keyword))
        .count()
}

/// Step function of candidate age: fresh content outranks stale content.
fn score_recency(created_at: DateTime<Utc>) -> f64 {
    let age_hours = (Utc::now() - created_at).num_seconds() as f64 / 3600.0;
    if age_hours <= 24.0 {
        1.0
    } else if age_hours <= 72.0 {
        0.8
    } else if age_hours <= 120.0 {
        0.5
    } else {
        0.2
    }
}

/// Reward for topics independently corroborated by other candidates in the
/// same batch (two or more shared keywords counts as corroboration).
fn score_cross_source(index: usize, keyword_sets: &[HashSet<&str>]) -> f64 {
    let own = &keyword_sets[index];
    let corroborating = keyword_sets
        .iter()
        .enumerate()
        .filter(|(other_index, _)| *other_index != index)
        .filter(|(_, other)| own.intersection(other).count() >= MIN_SHARED_KEYWORDS)
        .count();

    match corroborating {
        count if count >= 3 => 1.0,
        2 => 0.8,
        1 => 0.6,
        _ => 0.3,
    }
}

/// Rewards keywords in the batch-frequency sweet spot: common enough to
/// matter, rare enough to differentiate. The candidate's score is the mean
/// over its own keywords.
fn score_keyword_frequency(
    keywords: &[String],
    keyword_counts: &HashMap<&str, usize>,
    total_keywords: usize,
) -> f64 {
    if total_keywords == 0 || keywords.is_empty() {
        return 0.5;
    }

    let sum: f64 = keywords
        .iter()
        .map(|keyword| {
            let count = keyword_counts.get(keyword.as_str()).copied().unwrap_or(0);
            let frequency = count as f64 / total_keywords as f64;
            if (0.02..=0.08).contains(&frequency) {
                1.0
            } else if (0.01..=0.15).contains(&frequency) {
                0.7
            } else {
                0.4
            }
        })
        .sum();

    sum / keywords.len() as f64
}

/// Greedy near-duplicate removal over a ranked candidate list.
///
/// Walks highest score first, keeping a candidate only when its keyword
/// overlap ratio (|intersection| / max set size) against every kept
/// candidate stays at or below [`DUPLICATE_OVERLAP_RATIO`], so the
/// highest-scoring member of each near-duplicate cluster survives.
/// Candidates without keywords never compare as duplicates.
fn deduplicate(ranked: Vec<TopicCandidate>) -> Vec<TopicCandidate> {
    let keyword_sets: Vec<HashSet<&str>> = ranked.iter().map(keyword_set).collect();
    let mut keep = vec![false; ranked.len()];
    let mut kept_indices: Vec<usize> = Vec::new();

    for (index, set) in keyword_sets.iter().enumerate() {
        let duplicate = kept_indices.iter().any(|&kept_index| {
            let kept_set = &keyword_sets[kept_index];
            let larger = set.len().max(kept_set.len());
            if larger == 0 {
                return false;
            }
            let overlap = set.intersection(kept_set).count();
            overlap as f64 / larger as f64 > DUPLICATE_OVERLAP_RATIO
        });

        if !duplicate {
            keep[index] = true;
            kept_indices.push(index);
        }
    }

    let mut keep_flags = keep.into_iter();
    ranked
        .into_iter()
        .filter(|_| keep_flags.next().unwrap_or(false))
        .collect()
}
