//! Cache Module
//!
//! Provides the bounded in-memory store with TTL expiration and
//! insertion-order eviction.

mod entry;
mod order;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::CacheStore;
