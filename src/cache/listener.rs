//! Eviction Listener Module
//!
//! Observer interface for automatic removals, plus a bounded eviction log.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

// == Eviction Reason ==
/// Why an entry left the cache without being explicitly removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionReason {
    /// Evicted to make room for a new entry
    Lru,
    /// Its time-to-live elapsed
    Expired,
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionReason::Lru => f.write_str("lru"),
            EvictionReason::Expired => f.write_str("expired"),
        }
    }
}

// == Eviction Listener ==
/// Receives a notification for every automatic removal.
///
/// Called synchronously while the cache is locked. Implementations must not
/// call back into the cache.
pub trait EvictionListener: Send + Sync {
    /// `size` is the byte size the entry occupied.
    fn on_evict(&self, key: &str, size: usize, reason: EvictionReason);
}

impl<F> EvictionListener for F
where
    F: Fn(&str, usize, EvictionReason) + Send + Sync,
{
    fn on_evict(&self, key: &str, size: usize, reason: EvictionReason) {
        self(key, size, reason)
    }
}

// == Eviction Log ==
/// One automatic removal as recorded by [`EvictionLog`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvictionRecord {
    pub key: String,
    pub size: usize,
    pub reason: EvictionReason,
    pub evicted_at: DateTime<Utc>,
}

/// Listener that keeps the most recent evictions, newest first.
#[derive(Debug)]
pub struct EvictionLog {
    records: Mutex<VecDeque<EvictionRecord>>,
    limit: usize,
}

impl EvictionLog {
    /// Creates a log retaining at most `limit` records.
    pub fn new(limit: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            limit,
        }
    }

    /// Returns the retained records, newest first.
    pub fn recent(&self) -> Vec<EvictionRecord> {
        self.records.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl EvictionListener for EvictionLog {
    fn on_evict(&self, key: &str, size: usize, reason: EvictionReason) {
        info!(key, size, %reason, "Cache entry evicted");

        if self.limit == 0 {
            return;
        }

        let mut records = self.records.lock();
        records.push_front(EvictionRecord {
            key: key.to_string(),
            size,
            reason,
            evicted_at: Utc::now(),
        });
        records.truncate(self.limit);
    }
}
