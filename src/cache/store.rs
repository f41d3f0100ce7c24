//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with insertion-order eviction
//! and TTL expiration. Entries track per-read hit counters, but eviction is
//! deliberately first-in-first-out: when the store overflows, the
//! earliest-inserted entry goes, regardless of how often it was read.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, InsertionOrder};

// == Cache Store ==
/// Bounded key-value store with FIFO eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// First-insertion order, used for eviction
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Default TTL for entries stored without an explicit TTL
    default_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given capacity and default TTL.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, the value is replaced, the TTL restarts,
    /// and the key keeps its original insertion slot. If the key is new and
    /// the store is at capacity, the earliest-inserted entry is evicted
    /// first, so the size bound holds at all times.
    pub fn set(&mut self, key: String, value: Arc<Value>, ttl: Option<Duration>) {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.order.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!("evicted earliest-inserted entry {}", evicted);
            }
        }

        let effective_ttl = ttl.unwrap_or(self.default_ttl);
        self.entries
            .insert(key.clone(), CacheEntry::new(value, effective_ttl));

        if !is_overwrite {
            self.order.record(key);
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if present and fresh, incrementing the entry's hit
    /// counter. An expired entry is removed as a side effect and reported
    /// as absent.
    pub fn get(&mut self, key: &str) -> Option<Arc<Value>> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.order.remove(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            debug!("dropped expired entry {} on read", key);
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.record_hit();
        self.stats.record_hit();
        Some(Arc::clone(&entry.data))
    }

    // == Has ==
    /// Checks whether a fresh entry exists for the key.
    ///
    /// Applies the same freshness rule as `get`, including removal of an
    /// expired entry, but does not touch hit counters.
    pub fn has(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };

        if expired {
            self.entries.remove(key);
            self.order.remove(key);
            self.stats.record_expiration();
            return false;
        }

        true
    }

    // == Delete ==
    /// Removes an entry by key, returning whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Empties the store. Running counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    // == Keys ==
    /// Returns a snapshot of all currently held keys.
    ///
    /// Pattern invalidation scans this list; freshness is not checked here
    /// since matching keys are deleted anyway.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    // == Stats ==
    /// Returns a snapshot of cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.size = self.entries.len();
        stats.total_hits = self.entries.values().map(CacheEntry::hits).sum();
        stats
    }

    // == Sweep Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed. This is the janitor's entry
    /// point; correctness never depends on it because `get` and `has` apply
    /// the same freshness rule lazily.
    pub fn sweep_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.order.remove(&key);
            self.stats.record_expiration();
        }

        count
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
