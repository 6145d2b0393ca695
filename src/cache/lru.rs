//! LRU Tracker Module
//!
//! Keeps the global recency order used for eviction.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = least recently used (next eviction candidate)
/// - Back = most recently used
#[derive(Debug, Default)]
pub struct LruTracker {
    order: VecDeque<String>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Marks a key as most recently used, moving it to the back.
    pub fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Removes a key from the tracker. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used key.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    /// Iterates keys from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }
}
