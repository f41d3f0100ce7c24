//! Shared cache state.
//!
//! The store and the in-flight fetch registry live behind one mutex so the
//! coalescer's check-then-register sequence is a single critical section:
//! two callers can never both observe "no fresh entry, no in-flight fetch"
//! for the same key. No lock is held across an await; every critical
//! section is synchronous, so a std mutex is sufficient.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use serde_json::Value;

use crate::cache::CacheStore;
use crate::error::Result;

/// Settled outcome of a coalesced fetch, clonable to every waiter.
pub(crate) type FetchOutcome = Result<Arc<Value>>;

/// A pending fetch that later callers can join instead of starting their own.
pub(crate) type InFlightFetch = Shared<BoxFuture<'static, FetchOutcome>>;

// == Cache State ==
/// Store plus in-flight registry under a single lock.
pub(crate) struct CacheState {
    pub store: CacheStore,
    pub in_flight: HashMap<String, InFlightFetch>,
}

impl CacheState {
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            store: CacheStore::new(max_entries, default_ttl),
            in_flight: HashMap::new(),
        }
    }
}

/// Shared handle to the cache state.
pub(crate) type SharedState = Arc<Mutex<CacheState>>;

/// Locks the state, recovering from poisoning.
///
/// A panicking fetcher runs on its own task and touches the state only in
/// short, infallible sections, so a poisoned lock still holds consistent
/// data.
pub(crate) fn lock(state: &SharedState) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
