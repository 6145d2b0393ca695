//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::EvictionLog;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    CapacityRequest, DeleteResponse, EntriesResponse, EvictionsResponse, GetResponse,
    HealthResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::tasks::{shared_store, SharedStore};

/// Application state shared across all handlers.
///
/// Holds the cache store behind a lock shared with its expiry tasks, and the
/// eviction log registered as the store's listener.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedStore<String>,
    pub evictions: Arc<EvictionLog>,
}

impl AppState {
    /// Creates a new AppState from a store and the log listening to it.
    pub fn new(cache: SharedStore<String>, evictions: Arc<EvictionLog>) -> Self {
        Self { cache, evictions }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The store's entries expire on their own timers and every automatic
    /// removal is recorded in the eviction log.
    pub fn from_config(config: &Config) -> Self {
        let evictions = Arc::new(EvictionLog::new(config.eviction_log_size));
        let cache = shared_store(
            config.capacity_bytes,
            config.default_ttl(),
            config.resize_policy,
            Some(evictions.clone()),
        );
        Self::new(cache, evictions)
    }
}

/// Handler for PUT /set
///
/// Stores a value under a key with optional TTL, evicting as needed.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    let size = req.value.len();

    let mut cache = state.cache.write().await;
    let evicted = cache.add(req.key.clone(), req.value, ttl)?;

    Ok(Json(SetResponse::new(req.key, size, evicted)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: a lookup updates recency and counters
    let mut cache = state.cache.write().await;
    let value = cache
        .get(&key)
        .cloned()
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
///
/// Idempotent: deleting an absent key still succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let removed = state.cache.write().await.remove(&key);
    Json(DeleteResponse::new(key, removed))
}

/// Handler for GET /entries
pub async fn entries_handler(State(state): State<AppState>) -> Json<EntriesResponse> {
    let cache = state.cache.read().await;

    Json(EntriesResponse {
        entries: cache.entries(),
        used_bytes: cache.used_bytes(),
        capacity_bytes: cache.capacity_bytes(),
    })
}

/// Handler for PUT /capacity
pub async fn capacity_handler(
    State(state): State<AppState>,
    Json(req): Json<CapacityRequest>,
) -> Result<Json<StatsResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    let evicted = cache.set_capacity(req.capacity_bytes);
    debug!(
        capacity_bytes = req.capacity_bytes,
        evicted = evicted.len(),
        "Capacity updated"
    );

    Ok(Json(cache.stats().into()))
}

/// Handler for POST /clear
///
/// Drops every entry, resets counters and forgets recorded evictions.
pub async fn clear_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let mut cache = state.cache.write().await;
    cache.clear();
    state.evictions.clear();

    Json(cache.stats().into())
}

/// Handler for GET /evictions
pub async fn evictions_handler(State(state): State<AppState>) -> Json<EvictionsResponse> {
    Json(EvictionsResponse {
        evictions: state.evictions.recent(),
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(cache.stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state(capacity_bytes: usize) -> AppState {
        AppState::from_config(&Config {
            capacity_bytes,
            ..Config::default()
        })
    }

    fn set_request(key: &str, value: &str) -> SetRequest {
        SetRequest {
            key: key.to_string(),
            value: value.to_string(),
            ttl_ms: None,
        }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state(1024);

        let result = set_handler(State(state.clone()), Json(set_request("k", "v"))).await;
        assert!(result.is_ok());

        let response = get_handler(State(state), Path("k".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, "v");
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state(1024);

        let result = get_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_too_large() {
        let state = test_state(4);

        let result = set_handler(State(state), Json(set_request("k", "too long"))).await;
        assert!(matches!(result, Err(CacheError::TooLarge(_))));
    }

    #[tokio::test]
    async fn test_set_reports_evictions_and_logs_them() {
        let state = test_state(10);

        let _ = set_handler(State(state.clone()), Json(set_request("a", "123456")))
            .await
            .unwrap();
        let response = set_handler(State(state.clone()), Json(set_request("b", "123456")))
            .await
            .unwrap();

        assert_eq!(response.evicted, vec!["a".to_string()]);
        let log = evictions_handler(State(state)).await;
        assert_eq!(log.evictions.len(), 1);
        assert_eq!(log.evictions[0].key, "a");
        assert_eq!(log.evictions[0].size, 6);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let state = test_state(1024);
        let _ = set_handler(State(state.clone()), Json(set_request("k", "v")))
            .await
            .unwrap();

        let first = delete_handler(State(state.clone()), Path("k".to_string())).await;
        let second = delete_handler(State(state.clone()), Path("k".to_string())).await;

        assert!(first.removed);
        assert!(!second.removed);
        assert!(state.evictions.is_empty());
    }

    #[tokio::test]
    async fn test_clear_handler_resets_stats() {
        let state = test_state(1024);
        let _ = set_handler(State(state.clone()), Json(set_request("k", "v")))
            .await
            .unwrap();
        let _ = get_handler(State(state.clone()), Path("k".to_string())).await;
        let _ = get_handler(State(state.clone()), Path("x".to_string())).await;

        let stats = clear_handler(State(state.clone())).await;
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.total_entries, 0);

        let entries = entries_handler(State(state)).await;
        assert!(entries.entries.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_handler_validates_bounds() {
        let state = test_state(1024);

        let result = capacity_handler(
            State(state.clone()),
            Json(CapacityRequest { capacity_bytes: 1 }),
        )
        .await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));

        let stats = capacity_handler(
            State(state),
            Json(CapacityRequest {
                capacity_bytes: 20 * 1024,
            }),
        )
        .await
        .unwrap();
        assert_eq!(stats.capacity_bytes, 20 * 1024);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state(1024);

        let result = set_handler(State(state), Json(set_request("", "value"))).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }
}
