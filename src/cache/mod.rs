//! Cache Module
//!
//! Byte-budgeted in-memory cache with per-entry TTL expiry and LRU eviction.

mod entry;
mod expiry;
mod listener;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, Payload};
pub use expiry::{ExpiryHandle, ExpiryScheduler, LazyExpiry};
pub use listener::{EvictionListener, EvictionLog, EvictionReason, EvictionRecord};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{CacheStore, EntrySnapshot, ResizePolicy};

// == Public Constants ==
/// Default byte budget (1 MiB)
pub const DEFAULT_CAPACITY_BYTES: usize = 1024 * 1024;

/// TTL substituted when none or a non-positive one is given (60 s)
pub const DEFAULT_TTL_MS: u64 = 60_000;

/// Smallest budget accepted from API callers (10 KiB)
pub const MIN_CAPACITY_BYTES: usize = 10 * 1024;

/// Largest budget accepted from API callers (40 MiB)
pub const MAX_CAPACITY_BYTES: usize = 40 * 1024 * 1024;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
