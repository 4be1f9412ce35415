//! Per-channel topic usage history.

use crate::bounded::FifoWindow;
use crate::types::UsageMetrics;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// Usage records retained per channel. Eviction is oldest-first and
/// independent of how the topic performed.
pub const CHANNEL_HISTORY_CAP: usize = 100;

/// One topic the pipeline actually produced a video for.
///
/// `performance` starts out `None` and is filled in when the topic is
/// re-marked after analytics arrive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub topic_id: String,
    pub keywords: Vec<String>,
    pub used_at: DateTime<Utc>,
    #[serde(default)]
    pub performance: Option<UsageMetrics>,
}

/// Every channel's usage history, keyed by channel name.
///
/// Serialized as the `used_topics.json` document: a map from channel to an
/// array of records, oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageHistory {
    channels: BTreeMap<String, FifoWindow<UsageRecord, CHANNEL_HISTORY_CAP>>,
}

impl UsageHistory {
    /// Records for one channel, oldest first. Empty for unknown channels.
    pub fn channel(&self, channel: &str) -> impl DoubleEndedIterator<Item = &UsageRecord> {
        self.channels
            .get(channel)
            .into_iter()
            .flat_map(|window| window.iter())
    }

    /// Number of retained records for one channel.
    pub fn channel_len(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, |window| window.len())
    }

    /// Append a record to a channel's history, evicting the oldest past the
    /// cap.
    pub fn record(&mut self, channel: &str, record: UsageRecord) {
        self.channels
            .entry(channel.to_owned())
            .or_default()
            .push(record);
    }
}
