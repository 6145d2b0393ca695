//! Error types for the cache
//!
//! `AdmissionError` is what the engine reports when `add` is refused;
//! `CacheError` is the unified error of the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Admission Error ==
/// Why `CacheStore::add` refused an entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The item alone is bigger than the whole budget. Nothing was evicted.
    #[error("item of {size} bytes exceeds cache capacity of {capacity} bytes")]
    TooLarge { size: usize, capacity: usize },

    /// The item did not fit even after evicting everything evictable.
    /// Evictions already performed are kept.
    #[error("not enough space for {size} bytes after eviction ({available} bytes free)")]
    InsufficientSpace { size: usize, available: usize },
}

// == Cache Error Enum ==
/// Unified error type for the cache server.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache, or found expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Item is larger than the cache capacity
    #[error("Item too large: {0}")]
    TooLarge(String),

    /// Eviction could not free enough room
    #[error("Insufficient space: {0}")]
    InsufficientSpace(String),
}

impl From<AdmissionError> for CacheError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::TooLarge { .. } => CacheError::TooLarge(err.to_string()),
            AdmissionError::InsufficientSpace { .. } => {
                CacheError::InsufficientSpace(err.to_string())
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::InsufficientSpace(_) => StatusCode::INSUFFICIENT_STORAGE,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_error_conversion() {
        let err: CacheError = AdmissionError::TooLarge {
            size: 20,
            capacity: 10,
        }
        .into();
        assert!(matches!(err, CacheError::TooLarge(ref msg) if msg.contains("20 bytes")));

        let err: CacheError = AdmissionError::InsufficientSpace {
            size: 5,
            available: 2,
        }
        .into();
        assert!(matches!(err, CacheError::InsufficientSpace(_)));
    }

    #[test]
    fn test_error_status_codes() {
        let test_cases = vec![
            (CacheError::NotFound("key".to_string()), StatusCode::NOT_FOUND),
            (CacheError::InvalidRequest("bad".to_string()), StatusCode::BAD_REQUEST),
            (CacheError::TooLarge("big".to_string()), StatusCode::PAYLOAD_TOO_LARGE),
            (
                CacheError::InsufficientSpace("full".to_string()),
                StatusCode::INSUFFICIENT_STORAGE,
            ),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.into_response().status(), expected_status);
        }
    }
}
