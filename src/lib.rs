//! Topic scoring and adaptive-learning core for the clipbot short-form
//! video pipeline.
//!
//! The pipeline around this crate gathers trending topic candidates,
//! generates scripts, synthesizes narration, renders, and publishes — all
//! external collaborators. This crate owns the two stages with real
//! decision logic:
//!
//! - [`scoring::TopicScorer`] ranks and deduplicates candidate topics for a
//!   channel using five weighted sub-scores informed by per-channel usage
//!   history.
//! - [`learning::LearningEngine`] folds realized video performance back
//!   into keyword/hook/content statistics and nudges the scoring weights,
//!   closing the loop.
//!
//! State persists as three JSON documents under a content directory (see
//! [`store`]). Both components are synchronous, single-process state
//! mutators; run one pipeline worker per channel or serialize access
//! externally.

pub mod bounded;
pub mod learning;
pub mod scoring;
pub mod store;
pub mod types;

pub use learning::LearningEngine;
pub use scoring::{ScoringWeights, TopicScorer};
pub use store::{JsonFileStore, StateStore, StoreError};
pub use types::{PerformanceCategory, TopicCandidate, TopicSource, UsageMetrics, VideoMetrics};
