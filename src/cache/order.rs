//! Insertion Order Module
//!
//! Tracks the order in which keys were first inserted, backing the store's
//! eviction policy: when the store overflows, the earliest-inserted key is
//! removed. Reads do not reorder keys; overwrites keep a key's original
//! slot, matching the insertion-order map the key space was designed around.

use std::collections::VecDeque;

// == Insertion Order ==
/// Tracks first-insertion order for eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = earliest inserted
/// - Back = latest inserted
#[derive(Debug, Default)]
pub struct InsertionOrder {
    /// Keys in first-insertion order
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record ==
    /// Records a newly inserted key at the back of the queue.
    ///
    /// Callers must only record a key on its first insertion; overwrites
    /// keep the original slot and are not re-recorded.
    pub fn record(&mut self, key: String) {
        self.order.push_back(key);
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Evict Oldest ==
    /// Returns and removes the earliest-inserted key.
    ///
    /// Returns None if the tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the earliest-inserted key without removing it.
    #[allow(dead_code)]
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    // == Clear ==
    /// Removes all tracked keys.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    #[allow(dead_code)]
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
