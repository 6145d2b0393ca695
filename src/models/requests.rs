//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;

use crate::cache::{MAX_CAPACITY_BYTES, MAX_KEY_LENGTH, MIN_CAPACITY_BYTES};

/// Request body for PUT /set
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store; its byte length is charged to the budget
/// - `ttl_ms`: Optional TTL in milliseconds; missing or non-positive means default
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub ttl_ms: Option<i64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }

    /// Positive TTL requested by the caller, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms
            .filter(|ms| *ms > 0)
            .map(|ms| Duration::from_millis(ms as u64))
    }
}

/// Request body for PUT /capacity
#[derive(Debug, Clone, Deserialize)]
pub struct CapacityRequest {
    pub capacity_bytes: usize,
}

impl CapacityRequest {
    pub fn validate(&self) -> Option<String> {
        if !(MIN_CAPACITY_BYTES..=MAX_CAPACITY_BYTES).contains(&self.capacity_bytes) {
            return Some(format!(
                "Capacity must be between {} and {} bytes",
                MIN_CAPACITY_BYTES, MAX_CAPACITY_BYTES
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": "hello"}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, "hello");
        assert!(req.ttl_ms.is_none());
        assert!(req.ttl().is_none());
    }

    #[test]
    fn test_set_request_ttl() {
        let json = r#"{"key": "test", "value": "hello", "ttl_ms": 1500}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_non_positive_ttl_means_default() {
        for ttl_ms in [0, -1, -60_000] {
            let req = SetRequest {
                key: "k".to_string(),
                value: "v".to_string(),
                ttl_ms: Some(ttl_ms),
            };
            assert!(req.ttl().is_none());
        }
    }

    #[test]
    fn test_validate_key() {
        let mut req = SetRequest {
            key: "".to_string(),
            value: "test".to_string(),
            ttl_ms: None,
        };
        assert!(req.validate().is_some());

        req.key = "x".repeat(MAX_KEY_LENGTH + 1);
        assert!(req.validate().is_some());

        req.key = "valid_key".to_string();
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_capacity_bounds() {
        let ok = CapacityRequest { capacity_bytes: MIN_CAPACITY_BYTES };
        assert!(ok.validate().is_none());

        let ok = CapacityRequest { capacity_bytes: MAX_CAPACITY_BYTES };
        assert!(ok.validate().is_none());

        let small = CapacityRequest { capacity_bytes: MIN_CAPACITY_BYTES - 1 };
        assert!(small.validate().is_some());

        let big = CapacityRequest { capacity_bytes: MAX_CAPACITY_BYTES + 1 };
        assert!(big.validate().is_some());
    }
}
