//! Expiry Scheduling Module
//!
//! The seam between the cache engine and whatever fires TTL expiries.

use tokio::task::AbortHandle;
use tokio::time::Instant;

// == Expiry Handle ==
/// Cancellable handle to one pending expiry.
///
/// Dropping the handle cancels the expiry, so an entry that leaves the cache
/// through any path takes its timer with it.
#[derive(Debug)]
pub struct ExpiryHandle {
    task: Option<AbortHandle>,
}

impl ExpiryHandle {
    /// Wraps the abort handle of a spawned expiry task.
    pub fn new(task: AbortHandle) -> Self {
        Self { task: Some(task) }
    }

    /// Cancels the pending expiry.
    pub fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Releases the handle without cancelling.
    ///
    /// Used by the expiry task itself once it has fired.
    pub fn disarm(mut self) {
        self.task = None;
    }
}

impl Drop for ExpiryHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// == Expiry Scheduler ==
/// Schedules the fire-once expiry of a cache entry.
///
/// When the deadline passes, the implementation must call
/// [`CacheStore::expire_scheduled`](crate::cache::CacheStore::expire_scheduled)
/// with the same key and generation. Returning `None` means nothing was
/// scheduled; the entry then only expires when it is next looked up.
pub trait ExpiryScheduler: Send + Sync {
    fn schedule(&self, key: &str, generation: u64, deadline: Instant) -> Option<ExpiryHandle>;
}

/// Scheduler that never schedules anything. Entries expire lazily on `get`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LazyExpiry;

impl ExpiryScheduler for LazyExpiry {
    fn schedule(&self, _key: &str, _generation: u64, _deadline: Instant) -> Option<ExpiryHandle> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_dropping_handle_aborts_task() {
        let task = tokio::spawn(tokio::time::sleep(Duration::from_secs(3600)));
        let handle = ExpiryHandle::new(task.abort_handle());

        drop(handle);

        let result = task.await;
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_aborts_task() {
        let task = tokio::spawn(tokio::time::sleep(Duration::from_secs(3600)));
        ExpiryHandle::new(task.abort_handle()).cancel();

        assert!(task.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_disarm_leaves_task_running() {
        let task = tokio::spawn(async { 7 });
        ExpiryHandle::new(task.abort_handle()).disarm();

        assert_eq!(task.await.unwrap(), 7);
    }

    #[test]
    fn test_lazy_expiry_schedules_nothing() {
        assert!(LazyExpiry.schedule("key", 1, Instant::now()).is_none());
    }
}
