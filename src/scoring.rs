//! Topic candidate scoring, ranking, and usage tracking.
//!
//! Converts a batch of externally-gathered candidates into a deduplicated,
//! performance-informed ranking for one channel. The weights driving the
//! composite score are re-tuned by the learning engine after every
//! published video, closing the selection feedback loop.

mod history;
mod scorer;
mod weights;

pub use history::{UsageHistory, UsageRecord, CHANNEL_HISTORY_CAP};
pub use scorer::TopicScorer;
pub use weights::ScoringWeights;
