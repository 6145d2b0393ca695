//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CapacityRequest, SetRequest};
pub use responses::{
    DeleteResponse, EntriesResponse, ErrorResponse, EvictionsResponse, GetResponse,
    HealthResponse, SetResponse, StatsResponse,
};
