//! Mini Cache - A byte-budgeted in-memory cache
//!
//! Entries expire after a per-entry TTL and the least recently used ones are
//! evicted when a new entry would exceed the byte budget.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, EvictionListener, EvictionReason, Payload};
pub use config::Config;
pub use error::AdmissionError;
pub use tasks::shared_store;
