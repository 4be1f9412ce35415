//! Accumulated learning state persisted to the learning document.

use crate::bounded::{FifoWindow, Ranked, RankedList};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// Trailing performance values retained per keyword.
pub const KEYWORD_TREND_CAP: usize = 10;

/// Hooks retained globally, ranked by performance.
pub const HOOK_CAP: usize = 50;

/// Script structures retained per channel, ranked by performance.
pub const STRUCTURE_CAP: usize = 20;

/// Running performance statistics for one keyword.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordStats {
    pub total_videos: u64,
    pub total_performance: f64,
    pub avg_performance: f64,
    pub best_performance: f64,
    pub recent_trend: FifoWindow<f64, KEYWORD_TREND_CAP>,
}

/// A hook whose realized performance has been observed, with the structural
/// features used for pattern analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookRecord {
    pub text: String,
    pub performance: f64,
    pub length_words: usize,
    pub has_question: bool,
    pub has_numbers: bool,
    pub starts_with_action: bool,
    pub views: u64,
    pub engagement_rate: f64,
    pub timestamp: DateTime<Utc>,
}

impl Ranked for HookRecord {
    fn rank(&self) -> f64 {
        self.performance
    }
}

/// Structural fingerprint of one published script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructurePattern {
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub has_call_to_action: bool,
    pub performance: f64,
}

impl Ranked for StructurePattern {
    fn rank(&self) -> f64 {
        self.performance
    }
}

/// Word count of the best-performing script seen so far for a channel.
/// Replaced only by a strictly better performance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimalLength {
    pub word_count: usize,
    pub performance: f64,
}

/// Per-channel content insights.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelInsights {
    pub optimal_length: OptimalLength,
    pub successful_structures: RankedList<StructurePattern, STRUCTURE_CAP>,
}

/// The whole learning document, rewritten wholesale after every update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningState {
    pub keyword_performance: BTreeMap<String, KeywordStats>,
    /// Reserved by the document format; not populated yet.
    pub topic_patterns: BTreeMap<String, serde_json::Value>,
    pub successful_hooks: RankedList<HookRecord, HOOK_CAP>,
    pub content_insights: BTreeMap<String, ChannelInsights>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_deserializes_to_defaults() {
        let state: LearningState = serde_json::from_str("{}").unwrap();

        assert!(state.keyword_performance.is_empty());
        assert!(state.successful_hooks.is_empty());
        assert!(state.content_insights.is_empty());
        assert!(state.last_updated.is_none());
    }

    #[test]
    fn test_document_round_trips_through_json() {
        let mut state = LearningState::default();
        state
            .keyword_performance
            .entry("ai".to_owned())
            .or_default()
            .total_videos = 3;
        state.successful_hooks.insert(HookRecord {
            text: "Watch this robot cook".to_owned(),
            performance: 0.7,
            length_words: 4,
            has_question: false,
            has_numbers: false,
            starts_with_action: true,
            views: 4000,
            engagement_rate: 2.5,
            timestamp: Utc::now(),
        });
        state.last_updated = Some(Utc::now());

        let json = serde_json::to_string(&state).unwrap();
        let restored: LearningState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.keyword_performance["ai"].total_videos, 3);
        assert_eq!(restored.successful_hooks.len(), 1);
        assert!(restored.last_updated.is_some());
    }
}
