//! TTL Expiry Task
//!
//! Fires each entry's expiry from its own tokio task, sleeping until the
//! entry's deadline and then removing it under the store's write lock.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{
    CacheStore, EvictionListener, ExpiryHandle, ExpiryScheduler, Payload, ResizePolicy,
};

/// Cache store shared between request handlers and expiry tasks.
pub type SharedStore<V> = Arc<RwLock<CacheStore<V>>>;

// == Tokio Expiry ==
/// Scheduler spawning one cancellable tokio task per entry.
///
/// Holds only a weak reference to the store, so pending timers never keep a
/// dropped cache alive.
pub struct TokioExpiry<V> {
    store: Weak<RwLock<CacheStore<V>>>,
}

impl<V> TokioExpiry<V> {
    pub fn new(store: Weak<RwLock<CacheStore<V>>>) -> Self {
        Self { store }
    }
}

impl<V> ExpiryScheduler for TokioExpiry<V>
where
    V: Payload + Send + Sync + 'static,
{
    fn schedule(&self, key: &str, generation: u64, deadline: Instant) -> Option<ExpiryHandle> {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!(key, "No tokio runtime available, entry will only expire on access");
                return None;
            }
        };

        let store = self.store.clone();
        let key = key.to_string();

        let task = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;

            let Some(store) = store.upgrade() else {
                return;
            };
            let mut cache = store.write().await;
            if !cache.expire_scheduled(&key, generation) {
                debug!(key = %key, generation, "Expiry fired for an entry that is gone");
            }
        });

        Some(ExpiryHandle::new(task.abort_handle()))
    }
}

// == Shared Store ==
/// Builds a shared cache store whose entries expire on their own timers.
///
/// Timers are spawned on the runtime current at `add` time.
///
/// # Arguments
/// * `capacity_bytes` - Byte budget shared by all entries
/// * `default_ttl` - TTL substituted when `add` gets none or zero
/// * `resize_policy` - Behavior of `set_capacity` when shrinking below usage
/// * `listener` - Optional observer of evictions and expiries
pub fn shared_store<V>(
    capacity_bytes: usize,
    default_ttl: Duration,
    resize_policy: ResizePolicy,
    listener: Option<Arc<dyn EvictionListener>>,
) -> SharedStore<V>
where
    V: Payload + Send + Sync + 'static,
{
    Arc::new_cyclic(|weak| {
        let scheduler = TokioExpiry::new(weak.clone());
        let mut store =
            CacheStore::with_scheduler(capacity_bytes, default_ttl, Box::new(scheduler))
                .with_resize_policy(resize_policy);
        if let Some(listener) = listener {
            store.set_listener(listener);
        }
        RwLock::new(store)
    })
}
