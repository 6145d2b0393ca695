//! Background Tasks Module
//!
//! Contains the tasks that run alongside the cache during server operation.
//!
//! # Tasks
//! - TTL expiry: one fire-once timer per cache entry

mod expiry;

pub use expiry::{shared_store, SharedStore, TokioExpiry};
