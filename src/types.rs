//! Data types shared by the scoring and learning systems.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Topic candidates (upstream gatherer contract)
// ---------------------------------------------------------------------------

/// Where a topic candidate was gathered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicSource {
    Trending,
    Feed,
    Community,
    Manual,
}

impl std::fmt::Display for TopicSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trending => write!(f, "trending"),
            Self::Feed => write!(f, "feed"),
            Self::Community => write!(f, "community"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A proposed video subject produced by an external gatherer.
///
/// The scorer assigns `score`; every other field is owned by the gatherer
/// and treated as read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicCandidate {
    pub id: String,
    pub source: TopicSource,
    pub title: String,
    pub angle: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub score: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub used: bool,
}

// ---------------------------------------------------------------------------
// Performance metrics (downstream analytics contract)
// ---------------------------------------------------------------------------

/// Post-publish performance bucket, derived upstream from view thresholds
/// (10000 / 5000 / 1000 / 100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceCategory {
    Viral,
    High,
    Good,
    #[default]
    Average,
    Low,
}

impl PerformanceCategory {
    /// Parse from a string, defaulting to Average.
    pub fn from_str_lossy(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "viral" => Self::Viral,
            "high" => Self::High,
            "good" => Self::Good,
            "low" => Self::Low,
            _ => Self::Average,
        }
    }
}

impl std::fmt::Display for PerformanceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Viral => write!(f, "viral"),
            Self::High => write!(f, "high"),
            Self::Good => write!(f, "good"),
            Self::Average => write!(f, "average"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Metrics the analytics collaborator reports for one published video.
///
/// All fields default so a partial payload deserializes cleanly instead of
/// silently mapping missing keys to ad hoc fallbacks at each use site.
/// `engagement_rate` and `retention_rate` are percentages.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VideoMetrics {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub engagement_rate: f64,
    #[serde(default)]
    pub retention_rate: f64,
    #[serde(default)]
    pub performance_category: PerformanceCategory,
}

/// Realized metrics stored against a used topic, consumed by the
/// performance sub-score when similar candidates come up again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageMetrics {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub avg_view_duration_sec: f64,
    #[serde(default = "default_total_duration")]
    pub total_duration_sec: f64,
}

impl UsageMetrics {
    /// Fraction of the video the average viewer watched, clamped to [0, 1].
    ///
    /// A zero or negative total duration yields 0.0 rather than dividing.
    pub fn retention_ratio(&self) -> f64 {
        if self.total_duration_sec <= 0.0 {
            return 0.0;
        }
        (self.avg_view_duration_sec / self.total_duration_sec).clamp(0.0, 1.0)
    }
}

fn default_total_duration() -> f64 {
    1.0
}
