//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{ResizePolicy, DEFAULT_CAPACITY_BYTES, DEFAULT_TTL_MS};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget of the cache
    pub capacity_bytes: usize,
    /// TTL in milliseconds for entries added without a positive TTL
    pub default_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Number of recent evictions kept for `/evictions`
    pub eviction_log_size: usize,
    /// What happens to over-budget entries when capacity shrinks
    pub resize_policy: ResizePolicy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CAPACITY_BYTES` - Cache byte budget (default: 1048576)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 60000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `EVICTION_LOG_SIZE` - Recent evictions kept (default: 5)
    /// - `EAGER_RESIZE` - `true`/`1` to evict immediately on shrink (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity_bytes: parse_var("CAPACITY_BYTES").unwrap_or(defaults.capacity_bytes),
            default_ttl_ms: parse_var("DEFAULT_TTL_MS")
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.default_ttl_ms),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            eviction_log_size: parse_var("EVICTION_LOG_SIZE")
                .unwrap_or(defaults.eviction_log_size),
            resize_policy: match env::var("EAGER_RESIZE").as_deref() {
                Ok("true") | Ok("1") => ResizePolicy::Eager,
                _ => ResizePolicy::Lazy,
            },
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
            default_ttl_ms: DEFAULT_TTL_MS,
            server_port: 3000,
            eviction_log_size: 5,
            resize_policy: ResizePolicy::Lazy,
        }
    }
}
