//! Composite-score weighting and the post-publish nudge policy.

use crate::store::{self, Document, StateStore};
use crate::types::{PerformanceCategory, VideoMetrics};

use serde::{Deserialize, Serialize};

/// Uniform boost applied to every weight after a viral or high performer.
const REINFORCE_BOOST: f64 = 1.02;

/// Boost/damp pair applied when a low performer had poor retention.
const NOVELTY_BOOST: f64 = 1.05;
const PERFORMANCE_DAMP: f64 = 0.95;

/// Boost/damp pair applied when a low performer had poor engagement.
const CROSS_SOURCE_BOOST: f64 = 1.03;
const RECENCY_DAMP: f64 = 0.98;

/// Retention percentage below which a low performer is blamed on content
/// quality rather than topic choice.
const LOW_RETENTION_THRESHOLD: f64 = 30.0;

/// Engagement percentage below which a low performer is blamed on topic
/// relevance.
const LOW_ENGAGEMENT_THRESHOLD: f64 = 1.0;

/// Multiplicative factor weights for the five topic sub-scores.
///
/// Invariant: every weight is strictly positive, and after every
/// [`nudge_for_outcome`](Self::nudge_for_outcome) the five sum to 1.0
/// within floating tolerance. The historical defaults sum to 1.1 until the
/// first nudge renormalizes them; the composite score clamp absorbs the
/// difference. All multipliers sit in [0.95, 1.05], so the weights evolve
/// as small steps on the probability simplex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub recency_weight: f64,
    pub cross_source_weight: f64,
    pub novelty_weight: f64,
    pub performance_weight: f64,
    pub keyword_frequency_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            recency_weight: 0.3,
            cross_source_weight: 0.2,
            novelty_weight: 0.25,
            performance_weight: 0.25,
            keyword_frequency_weight: 0.1,
        }
    }
}

impl ScoringWeights {
    /// Load weights from the store, falling back to defaults when the
    /// document is missing, corrupt, or holds degenerate values.
    pub fn load(store: &dyn StateStore) -> Self {
        let weights: Self = store::load_or_default(store, Document::Weights);
        if !weights.is_valid() {
            tracing::warn!(
                "weights document holds non-positive or non-finite values, using defaults"
            );
            return Self::default();
        }
        weights
    }

    /// Sum of all five weights.
    pub fn total(&self) -> f64 {
        self.recency_weight
            + self.cross_source_weight
            + self.novelty_weight
            + self.performance_weight
            + self.keyword_frequency_weight
    }

    /// Whether every weight is finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        [
            self.recency_weight,
            self.cross_source_weight,
            self.novelty_weight,
            self.performance_weight,
            self.keyword_frequency_weight,
        ]
        .iter()
        .all(|weight| weight.is_finite() && *weight > 0.0)
    }

    /// Rescale so the weights sum to exactly 1.0.
    ///
    /// A degenerate total can only come from a hand-edited document; reset
    /// to defaults in that case rather than dividing into garbage.
    pub fn normalize(&mut self) {
        let total = self.total();
        if !total.is_finite() || total <= 0.0 {
            tracing::warn!(total, "degenerate weight total, resetting to defaults");
            *self = Self::default();
            return;
        }
        self.recency_weight /= total;
        self.cross_source_weight /= total;
        self.novelty_weight /= total;
        self.performance_weight /= total;
        self.keyword_frequency_weight /= total;
    }

    /// Fold one published video's realized performance into the weights.
    ///
    /// Viral and high performers reinforce the current strategy with a
    /// uniform boost (relative shares are unchanged once renormalized).
    /// Low performers shift reliance toward novelty when retention was poor
    /// and toward cross-source corroboration when engagement was poor; both
    /// shifts may apply to the same video. Exactly one renormalization
    /// happens at the end.
    pub fn nudge_for_outcome(&mut self, metrics: &VideoMetrics) {
        match metrics.performance_category {
            PerformanceCategory::Viral | PerformanceCategory::High => {
                self.recency_weight *= REINFORCE_BOOST;
                self.cross_source_weight *= REINFORCE_BOOST;
                self.novelty_weight *= REINFORCE_BOOST;
                self.performance_weight *= REINFORCE_BOOST;
                self.keyword_frequency_weight *= REINFORCE_BOOST;
            }
            PerformanceCategory::Low => {
                if metrics.retention_rate < LOW_RETENTION_THRESHOLD {
                    self.novelty_weight *= NOVELTY_BOOST;
                    self.performance_weight *= PERFORMANCE_DAMP;
                }
                if metrics.engagement_rate < LOW_ENGAGEMENT_THRESHOLD {
                    self.cross_source_weight *= CROSS_SOURCE_BOOST;
                    self.recency_weight *= RECENCY_DAMP;
                }
            }
            PerformanceCategory::Good | PerformanceCategory::Average => {}
        }

        self.normalize();

        tracing::debug!(
            category = %metrics.performance_category,
            recency = self.recency_weight,
            cross_source = self.cross_source_weight,
            novelty = self.novelty_weight,
            performance = self.performance_weight,
            keyword_frequency = self.keyword_frequency_weight,
            "weights adjusted from performance"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn metrics(
        views: u64,
        engagement_rate: f64,
        retention_rate: f64,
        category: PerformanceCategory,
    ) -> VideoMetrics {
        VideoMetrics {
            views,
            engagement_rate,
            retention_rate,
            performance_category: category,
        }
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let defaults = ScoringWeights::default();

        assert_eq!(defaults.recency_weight, 0.3);
        assert_eq!(defaults.cross_source_weight, 0.2);
        assert_eq!(defaults.novelty_weight, 0.25);
        assert_eq!(defaults.performance_weight, 0.25);
        assert_eq!(defaults.keyword_frequency_weight, 0.1);
        // The historical defaults sum to 1.1; only nudges renormalize.
        assert!((defaults.total() - 1.1).abs() < TOLERANCE);
    }

    #[test]
    fn test_normalize_restores_unit_sum() {
        let mut weights = ScoringWeights::default();
        weights.novelty_weight *= 3.0;
        weights.normalize();

        assert!((weights.total() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_viral_boost_preserves_relative_weights() {
        let mut weights = ScoringWeights::default();
        weights.nudge_for_outcome(&metrics(20_000, 4.0, 70.0, PerformanceCategory::Viral));

        // A uniform boost cancels out under renormalization, so the
        // relative shares stay at the defaults'.
        assert!((weights.recency_weight - 0.3 / 1.1).abs() < TOLERANCE);
        assert!((weights.novelty_weight - 0.25 / 1.1).abs() < TOLERANCE);
        assert!((weights.total() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_low_performer_fires_both_adjustments() {
        let mut weights = ScoringWeights::default();
        weights.nudge_for_outcome(&metrics(50, 0.5, 20.0, PerformanceCategory::Low));

        // Pre-normalization: recency 0.294, cross_source 0.206, novelty
        // 0.2625, performance 0.2375, keyword_frequency 0.1; total 1.1.
        assert!((weights.recency_weight - 0.294 / 1.1).abs() < TOLERANCE);
        assert!((weights.cross_source_weight - 0.206 / 1.1).abs() < TOLERANCE);
        assert!((weights.novelty_weight - 0.2625 / 1.1).abs() < TOLERANCE);
        assert!((weights.performance_weight - 0.2375 / 1.1).abs() < TOLERANCE);
        assert!((weights.keyword_frequency_weight - 0.1 / 1.1).abs() < TOLERANCE);
        assert!((weights.total() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_low_performer_with_good_retention_only_shifts_relevance() {
        let mut weights = ScoringWeights::default();
        weights.nudge_for_outcome(&metrics(50, 0.5, 60.0, PerformanceCategory::Low));

        // Only the engagement branch fires: cross_source 0.206, recency
        // 0.294, others untouched; pre-normalization total stays 1.1.
        assert!((weights.novelty_weight - 0.25 / 1.1).abs() < TOLERANCE);
        assert!((weights.performance_weight - 0.25 / 1.1).abs() < TOLERANCE);
        assert!((weights.cross_source_weight - 0.206 / 1.1).abs() < TOLERANCE);
        assert!((weights.recency_weight - 0.294 / 1.1).abs() < TOLERANCE);
        assert!((weights.total() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_average_performer_only_renormalizes() {
        let mut weights = ScoringWeights::default();
        weights.nudge_for_outcome(&metrics(500, 2.0, 50.0, PerformanceCategory::Average));

        // No conditional branch fires, but every call ends in the single
        // renormalization.
        assert!((weights.recency_weight - 0.3 / 1.1).abs() < TOLERANCE);
        assert!((weights.performance_weight - 0.25 / 1.1).abs() < TOLERANCE);
        assert!((weights.total() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_degenerate_document_values_are_rejected() {
        let zeroed = ScoringWeights {
            recency_weight: 0.0,
            ..ScoringWeights::default()
        };
        assert!(!zeroed.is_valid());

        let negative = ScoringWeights {
            novelty_weight: -0.1,
            ..ScoringWeights::default()
        };
        assert!(!negative.is_valid());

        let non_finite = ScoringWeights {
            performance_weight: f64::NAN,
            ..ScoringWeights::default()
        };
        assert!(!non_finite.is_valid());
    }

    #[test]
    fn test_partial_weights_document_merges_over_defaults() {
        let weights: ScoringWeights =
            serde_json::from_str(r#"{"novelty_weight": 0.4}"#).unwrap();

        assert_eq!(weights.novelty_weight, 0.4);
        assert_eq!(weights.recency_weight, 0.3);
        assert_eq!(weights.keyword_frequency_weight, 0.1);
    }
}
