//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, EntrySnapshot, EvictionRecord};

/// Response body for GET /get/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: String,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for PUT /set
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// Bytes charged to the budget
    pub size: usize,
    /// Keys evicted to make room, oldest first
    pub evicted: Vec<String>,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, size: usize, evicted: Vec<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
            size,
            evicted,
        }
    }
}

/// Response body for DELETE /del/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
    /// Whether an entry was actually removed
    pub removed: bool,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>, removed: bool) -> Self {
        let key = key.into();
        let message = if removed {
            format!("Key '{}' deleted successfully", key)
        } else {
            format!("Key '{}' was not cached", key)
        };
        Self {
            message,
            key,
            removed,
        }
    }
}

/// Response body for GET /stats, PUT /capacity and POST /clear
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    pub used_bytes: usize,
    pub capacity_bytes: usize,
    /// hits / (hits + misses), 0 when there were no lookups
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            used_bytes: stats.used_bytes,
            capacity_bytes: stats.capacity_bytes,
        }
    }
}

/// Response body for GET /entries
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    /// Entries from least to most recently used
    pub entries: Vec<EntrySnapshot>,
    pub used_bytes: usize,
    pub capacity_bytes: usize,
}

/// Response body for GET /evictions
#[derive(Debug, Clone, Serialize)]
pub struct EvictionsResponse {
    /// Most recent first
    pub evictions: Vec<EvictionRecord>,
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
