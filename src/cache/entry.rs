//! Cache Entry Module
//!
//! Defines individual cache entries and the `Payload` size contract.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::cache::ExpiryHandle;

// == Payload ==
/// A value the cache can hold.
///
/// The engine treats payloads as opaque; the byte size is the only property
/// it ever inspects.
pub trait Payload {
    /// Size of the payload in bytes, charged against the cache budget.
    fn size(&self) -> usize;
}

impl Payload for String {
    fn size(&self) -> usize {
        self.len()
    }
}

impl Payload for Vec<u8> {
    fn size(&self) -> usize {
        self.len()
    }
}

impl Payload for Box<[u8]> {
    fn size(&self) -> usize {
        self.len()
    }
}

// == Cache Entry ==
/// Represents a single cache entry with its payload and expiry metadata.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored payload
    pub value: V,
    /// Payload size in bytes, captured at insertion
    pub size: usize,
    /// Time-to-live, fixed at insertion
    pub ttl: Duration,
    /// Monotonic insertion instant; never revised by access
    pub inserted_at: Instant,
    /// Wall-clock insertion time, for display only
    pub created_at: DateTime<Utc>,
    /// Insertion number, distinguishes a replaced entry from its successor
    pub(crate) generation: u64,
    /// Pending expiry for this entry, if one was scheduled
    pub(crate) expiry: Option<ExpiryHandle>,
}

impl<V: Payload> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: V, ttl: Duration, generation: u64) -> Self {
        Self {
            size: value.size(),
            value,
            ttl,
            inserted_at: Instant::now(),
            created_at: Utc::now(),
            generation,
            expiry: None,
        }
    }
}

impl<V> CacheEntry<V> {
    // == Deadline ==
    /// Instant at which the entry becomes stale.
    pub fn deadline(&self) -> Instant {
        self.inserted_at + self.ttl
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once its age is greater than or equal to its TTL,
    /// so it is already stale at the exact deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.deadline().saturating_duration_since(Instant::now())
    }

    /// Cancels the pending expiry, if any.
    pub(crate) fn cancel_expiry(&mut self) {
        if let Some(handle) = self.expiry.take() {
            handle.cancel();
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_sizes() {
        assert_eq!("hello".to_string().size(), 5);
        assert_eq!(vec![0u8; 42].size(), 42);
        assert_eq!(vec![1u8, 2, 3].into_boxed_slice().size(), 3);
        assert_eq!(String::new().size(), 0);
    }

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("test_value".to_string(), Duration::from_secs(60), 7);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.size, 10);
        assert_eq!(entry.generation, 7);
        assert!(entry.expiry.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("test".to_string(), Duration::from_millis(100), 1);

        let just_before = entry.inserted_at + Duration::from_millis(99);
        let at_deadline = entry.inserted_at + Duration::from_millis(100);

        assert!(!entry.is_expired_at(just_before));
        assert!(entry.is_expired_at(at_deadline), "Entry should be expired at boundary");
        assert_eq!(entry.deadline(), at_deadline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining_counts_down() {
        let entry = CacheEntry::new("v".to_string(), Duration::from_millis(100), 1);
        assert_eq!(entry.ttl_remaining(), Duration::from_millis(100));

        tokio::time::advance(Duration::from_millis(40)).await;
        assert_eq!(entry.ttl_remaining(), Duration::from_millis(60));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
        assert!(entry.is_expired());
    }
}
