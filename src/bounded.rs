//! Fixed-capacity collections with a defined eviction policy.
//!
//! The persisted documents cap several sequences: per-channel usage history,
//! per-keyword trend windows, and the ranked hook/structure lists. Each cap
//! and its eviction order is enforced here, once, rather than re-implemented
//! at every call site. Deserializing an over-cap document re-applies the
//! policy so the invariant holds from the moment of load.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// FifoWindow
// ---------------------------------------------------------------------------

/// Sequence holding at most `CAP` items in insertion order.
///
/// Pushing at capacity evicts the oldest item regardless of its value.
/// Serialized as a plain JSON array, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct FifoWindow<T, const CAP: usize> {
    items: VecDeque<T>,
}

impl<T, const CAP: usize> FifoWindow<T, CAP> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Append an item, evicting the oldest if the window is full.
    pub fn push(&mut self, item: T) {
        if self.items.len() == CAP {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Items oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T, const CAP: usize> Default for FifoWindow<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const CAP: usize> From<VecDeque<T>> for FifoWindow<T, CAP> {
    /// Keeps the most recent `CAP` items (the tail of the sequence).
    fn from(mut items: VecDeque<T>) -> Self {
        while items.len() > CAP {
            items.pop_front();
        }
        Self { items }
    }
}

impl<T: Serialize, const CAP: usize> Serialize for FifoWindow<T, CAP> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

impl<'de, T: Deserialize<'de>, const CAP: usize> Deserialize<'de> for FifoWindow<T, CAP> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from(VecDeque::<T>::deserialize(deserializer)?))
    }
}

// ---------------------------------------------------------------------------
// RankedList
// ---------------------------------------------------------------------------

/// Ordering key for [`RankedList`] entries.
pub trait Ranked {
    fn rank(&self) -> f64;
}

/// Sequence sorted descending by rank, holding at most `CAP` items.
///
/// Inserting at capacity evicts the lowest-ranked item. Ties keep insertion
/// order (the sort is stable). Serialized as a plain JSON array, highest
/// rank first.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedList<T, const CAP: usize> {
    items: Vec<T>,
}

impl<T: Ranked, const CAP: usize> RankedList<T, CAP> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Insert an item at its rank position, then truncate to `CAP`.
    pub fn insert(&mut self, item: T) {
        self.items.push(item);
        self.items.sort_by(|a, b| b.rank().total_cmp(&a.rank()));
        self.items.truncate(CAP);
    }

    /// Items highest rank first.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The highest-ranked item.
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Ranked, const CAP: usize> Default for RankedList<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ranked, const CAP: usize> From<Vec<T>> for RankedList<T, CAP> {
    /// Re-sorts and keeps the top `CAP` items.
    fn from(mut items: Vec<T>) -> Self {
        items.sort_by(|a, b| b.rank().total_cmp(&a.rank()));
        items.truncate(CAP);
        Self { items }
    }
}

impl<T: Serialize, const CAP: usize> Serialize for RankedList<T, CAP> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

impl<'de, T: Deserialize<'de> + Ranked, const CAP: usize> Deserialize<'de>
    for RankedList<T, CAP>
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from(Vec::<T>::deserialize(deserializer)?))
    }
}
