//! Adaptive learning from realized video performance.
//!
//! Consumes post-publish metrics, derives a normalized performance score,
//! accumulates keyword/hook/content statistics, and nudges the scoring
//! weights toward configurations correlated with success. State lives in a
//! single JSON document rewritten after every update.

mod engine;
mod recommend;
mod state;

pub use engine::{performance_score, LearningEngine};
pub use recommend::{
    ContentRecommendations, HookInsights, KeywordInsight, PerformanceReport,
    StructureRecommendation,
};
pub use state::{
    ChannelInsights, HookRecord, KeywordStats, LearningState, OptimalLength, StructurePattern,
    HOOK_CAP, KEYWORD_TREND_CAP, STRUCTURE_CAP,
};
