//! Cache Statistics Module
//!
//! Tracks hits, misses, and automatic removals.

use serde::Serialize;

// == Cache Stats ==
/// Cache performance counters plus a snapshot of current usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of `get` calls that returned a payload
    pub hits: u64,
    /// Number of `get` calls that returned nothing (absent or expired)
    pub misses: u64,
    /// Number of entries removed by LRU eviction
    pub evictions: u64,
    /// Number of entries removed by TTL expiry
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Sum of payload sizes of the entries currently held
    pub used_bytes: usize,
    /// Current byte budget
    pub capacity_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Reset ==
    /// Zeroes every counter. Usage fields are refreshed by the store on snapshot.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
