//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with payload and metadata.
///
/// Entries are owned exclusively by the store. After creation the only
/// mutation is the hit-counter increment on read.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload; opaque to the cache
    pub data: Arc<Value>,
    /// Creation instant
    created_at: Instant,
    /// Time-to-live for this entry
    ttl: Duration,
    /// Number of times this entry has been read
    hits: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with the given TTL.
    pub fn new(data: Arc<Value>, ttl: Duration) -> Self {
        Self {
            data,
            created_at: Instant::now(),
            ttl,
            hits: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is stale strictly after its age exceeds
    /// the TTL (`age > ttl`), so an entry read exactly at the TTL boundary
    /// is still fresh.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    // == Record Hit ==
    /// Increments the hit counter for this entry.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Returns the number of reads this entry has served.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    // == Time To Live ==
    /// Returns the remaining TTL, saturating at zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.created_at.elapsed())
    }

    /// Returns the age of the entry.
    #[allow(dead_code)]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    fn entry(ttl: Duration) -> CacheEntry {
        CacheEntry::new(Arc::new(json!({"name": "test"})), ttl)
    }

    #[test]
    fn test_entry_creation() {
        let entry = entry(Duration::from_secs(60));

        assert_eq!(*entry.data, json!({"name": "test"}));
        assert_eq!(entry.hits(), 0);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = entry(Duration::from_millis(30));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(60));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_entry_record_hit() {
        let mut entry = entry(Duration::from_secs(60));

        entry.record_hit();
        entry.record_hit();

        assert_eq!(entry.hits(), 2);
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = entry(Duration::from_secs(10));

        let remaining = entry.ttl_remaining();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let entry = entry(Duration::from_millis(10));

        sleep(Duration::from_millis(40));

        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }
}
