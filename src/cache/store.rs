//! Cache Store Module
//!
//! Main cache engine: byte-budgeted entry table with LRU eviction and
//! per-entry TTL expiry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::cache::{
    CacheEntry, CacheStats, EvictionListener, EvictionReason, ExpiryScheduler, LazyExpiry,
    LruTracker, Payload,
};
use crate::error::AdmissionError;

// == Resize Policy ==
/// What `set_capacity` does when the new budget is below current usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResizePolicy {
    /// Keep the over-budget entries until the next `add` needs room.
    #[default]
    Lazy,
    /// Evict least recently used entries immediately until usage fits.
    Eager,
}

// == Entry Snapshot ==
/// Read-only view of one entry, for usage displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySnapshot {
    pub key: String,
    pub size: usize,
    pub ttl_ms: u64,
    pub ttl_remaining_ms: u64,
    pub created_at: DateTime<Utc>,
}

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
///
/// The store is a plain `&mut self` state machine. Share it behind a lock
/// (see [`shared_store`](crate::tasks::shared_store)) so that every mutation,
/// including timer-driven expiry, is applied atomically.
pub struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
    lru: LruTracker,
    stats: CacheStats,
    capacity_bytes: usize,
    /// Running total of entry sizes
    used_bytes: usize,
    default_ttl: Duration,
    resize_policy: ResizePolicy,
    next_generation: u64,
    scheduler: Box<dyn ExpiryScheduler>,
    listener: Option<Arc<dyn EvictionListener>>,
}

impl<V: Payload> CacheStore<V> {
    // == Constructor ==
    /// Creates a store whose entries expire lazily, when next looked up.
    ///
    /// # Arguments
    /// * `capacity_bytes` - Byte budget shared by all entries
    /// * `default_ttl` - TTL substituted when `add` gets none or zero
    pub fn new(capacity_bytes: usize, default_ttl: Duration) -> Self {
        Self::with_scheduler(capacity_bytes, default_ttl, Box::new(LazyExpiry))
    }

    /// Creates a store that hands every new entry to `scheduler`.
    pub fn with_scheduler(
        capacity_bytes: usize,
        default_ttl: Duration,
        scheduler: Box<dyn ExpiryScheduler>,
    ) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            capacity_bytes,
            used_bytes: 0,
            default_ttl,
            resize_policy: ResizePolicy::default(),
            next_generation: 0,
            scheduler,
            listener: None,
        }
    }

    pub fn with_resize_policy(mut self, policy: ResizePolicy) -> Self {
        self.resize_policy = policy;
        self
    }

    /// Installs the listener notified of every LRU eviction and TTL expiry.
    pub fn set_listener(&mut self, listener: Arc<dyn EvictionListener>) {
        self.listener = Some(listener);
    }

    // == Add ==
    /// Inserts `value` under `key` as the most recently used entry.
    ///
    /// An existing entry under the same key is discarded first, together with
    /// its pending expiry. Least recently used entries are evicted until the
    /// new one fits; those evictions stand even if the insert is rejected.
    ///
    /// An item larger than the whole budget is refused before any eviction,
    /// so usage left above a lazily shrunk budget stays there until an add
    /// that fits.
    ///
    /// Returns the keys evicted to make room.
    pub fn add(
        &mut self,
        key: String,
        value: V,
        ttl: Option<Duration>,
    ) -> Result<Vec<String>, AdmissionError> {
        if self.detach(&key).is_some() {
            debug!(key = %key, "Replacing existing entry");
        }

        let size = value.size();
        if size > self.capacity_bytes {
            return Err(AdmissionError::TooLarge {
                size,
                capacity: self.capacity_bytes,
            });
        }

        let mut evicted = Vec::new();
        while self.used_bytes + size > self.capacity_bytes {
            match self.evict_oldest() {
                Some(evicted_key) => evicted.push(evicted_key),
                None => break,
            }
        }

        if self.used_bytes + size > self.capacity_bytes {
            return Err(AdmissionError::InsufficientSpace {
                size,
                available: self.capacity_bytes.saturating_sub(self.used_bytes),
            });
        }

        let ttl = match ttl {
            Some(ttl) if !ttl.is_zero() => ttl,
            _ => self.default_ttl,
        };

        self.next_generation += 1;
        let mut entry = CacheEntry::new(value, ttl, self.next_generation);
        entry.expiry = self
            .scheduler
            .schedule(&key, entry.generation, entry.deadline());

        debug!(key = %key, size, ttl_ms = ttl.as_millis() as u64, "Entry added");

        self.used_bytes += size;
        self.lru.touch(&key);
        self.entries.insert(key, entry);

        Ok(evicted)
    }

    // == Get ==
    /// Looks up a fresh entry and marks it most recently used.
    ///
    /// An expired entry found here is removed and reported to the listener
    /// as an expiry. Both that case and an absent key count as a miss.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            if let Some(entry) = self.detach(key) {
                self.stats.record_expiration();
                self.notify(key, entry.size, EvictionReason::Expired);
            }
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key).map(|entry| &entry.value)
    }

    // == Remove ==
    /// Removes an entry. Removing an absent key is a no-op.
    ///
    /// Never notifies the listener and never touches the counters.
    /// Returns whether an entry was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.detach(key).is_some()
    }

    // == Set Capacity ==
    /// Changes the byte budget.
    ///
    /// Under [`ResizePolicy::Lazy`] nothing is evicted here and usage may stay
    /// above the budget until the next `add`. Under [`ResizePolicy::Eager`]
    /// least recently used entries are evicted until usage fits.
    ///
    /// Returns the keys evicted by this call.
    pub fn set_capacity(&mut self, capacity_bytes: usize) -> Vec<String> {
        debug!(
            old = self.capacity_bytes,
            new = capacity_bytes,
            "Cache capacity changed"
        );
        self.capacity_bytes = capacity_bytes;

        let mut evicted = Vec::new();
        if self.resize_policy == ResizePolicy::Eager {
            while self.used_bytes > self.capacity_bytes {
                match self.evict_oldest() {
                    Some(key) => evicted.push(key),
                    None => break,
                }
            }
        }
        evicted
    }

    // == Clear ==
    /// Removes every entry and resets all counters. Capacity is kept.
    pub fn clear(&mut self) {
        for (_, mut entry) in self.entries.drain() {
            entry.cancel_expiry();
        }
        self.lru.clear();
        self.used_bytes = 0;
        self.stats.reset();
    }

    // == Scheduled Expiry ==
    /// Fires the expiry scheduled for `key` at insertion `generation`.
    ///
    /// Does nothing if the entry has since been removed or replaced.
    /// Returns whether an entry was expired.
    pub fn expire_scheduled(&mut self, key: &str, generation: u64) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if entry.generation == generation => {
                if let Some(handle) = entry.expiry.take() {
                    handle.disarm();
                }
            }
            _ => return false,
        }

        let Some(entry) = self.detach(key) else {
            return false;
        };
        self.stats.record_expiration();
        self.notify(key, entry.size, EvictionReason::Expired);
        true
    }

    // == Stats ==
    /// Returns the counters together with current usage.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats.used_bytes = self.used_bytes;
        stats.capacity_bytes = self.capacity_bytes;
        stats
    }

    // == Entries ==
    /// Snapshots every held entry, least recently used first.
    ///
    /// Entries past their TTL that have not been collected yet are included
    /// with zero time remaining.
    pub fn entries(&self) -> Vec<EntrySnapshot> {
        self.lru
            .iter()
            .filter_map(|key| {
                self.entries.get(key).map(|entry| EntrySnapshot {
                    key: key.to_string(),
                    size: entry.size,
                    ttl_ms: entry.ttl.as_millis() as u64,
                    ttl_remaining_ms: entry.ttl_remaining().as_millis() as u64,
                    created_at: entry.created_at,
                })
            })
            .collect()
    }

    /// Checks whether `key` is held, without touching recency or counters.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Internals ==
    /// Unlinks an entry from the table, the recency order and the byte total,
    /// cancelling its expiry.
    fn detach(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let mut entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.used_bytes -= entry.size;
        entry.cancel_expiry();
        Some(entry)
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let key = self.lru.pop_oldest()?;
        let size = self.detach(&key).map_or(0, |entry| entry.size);
        self.stats.record_eviction();
        debug!(key = %key, size, used = self.used_bytes, "Evicted least recently used entry");
        self.notify(&key, size, EvictionReason::Lru);
        Some(key)
    }

    fn notify(&self, key: &str, size: usize, reason: EvictionReason) {
        if let Some(listener) = &self.listener {
            listener.on_evict(key, size, reason);
        }
    }
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.len())
            .field("used_bytes", &self.used_bytes)
            .field("capacity_bytes", &self.capacity_bytes)
            .field("default_ttl", &self.default_ttl)
            .field("resize_policy", &self.resize_policy)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
