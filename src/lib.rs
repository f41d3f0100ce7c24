//! Clinic Cache - in-process read cache for the clinic operations platform
//!
//! Provides TTL expiration, bounded insertion-order eviction, request
//! coalescing, and entity-aware invalidation behind a narrow
//! get/set/invalidate surface. Callers supply asynchronous fetchers for
//! misses; the cache never inspects their payloads.

pub mod cache;
pub mod coalesce;
pub mod config;
pub mod error;
pub mod events;
pub mod invalidate;
pub mod keys;
pub mod service;

mod state;
mod tasks;

pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use events::MutationEvent;
pub use keys::AppointmentFilter;
pub use service::CacheService;
