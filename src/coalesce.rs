//! Request Coalescing Module
//!
//! Wraps the store with at-most-one-in-flight-fetch-per-key semantics.
//! Every caller that misses the store while a fetch for the same key is
//! pending joins that fetch's shared future and observes the same outcome,
//! success or failure.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{CacheError, Result};
use crate::state::{self, FetchOutcome, InFlightFetch, SharedState};

// == Coalescer ==
/// Coalesces concurrent fetches for the same key into one upstream call.
#[derive(Clone)]
pub struct Coalescer {
    state: SharedState,
}

impl Coalescer {
    // == Constructor ==
    pub(crate) fn new(state: SharedState) -> Self {
        Self { state }
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, fetching it at most once per
    /// cold window.
    ///
    /// The decision happens inside one critical section: a fresh store
    /// entry returns immediately without suspension; a pending fetch for
    /// the key is joined; otherwise a new fetch is registered *before* any
    /// suspension point, which closes the race where two callers both
    /// observe "nothing in flight" and each start a fetch.
    ///
    /// On success the value is written to the store with the given TTL and
    /// handed to every waiter. On failure nothing is cached, the same error
    /// reaches every waiter, and the very next call is free to retry.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetcher: F,
    ) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        let pending = {
            let mut state = state::lock(&self.state);

            if let Some(value) = state.store.get(key) {
                trace!("coalescer hit for {}", key);
                return Ok(value);
            }

            if let Some(pending) = state.in_flight.get(key) {
                trace!("joining in-flight fetch for {}", key);
                pending.clone()
            } else {
                debug!("starting fetch for {}", key);
                let pending = self.spawn_fetch(key.to_string(), ttl, fetcher());
                state.in_flight.insert(key.to_string(), pending.clone());
                pending
            }
        };

        pending.await
    }

    // == Spawn Fetch ==
    /// Runs the fetcher on its own task so it settles and populates the
    /// store even if every waiter abandons its wait. The registration is
    /// removed synchronously with settlement, in the same critical section
    /// as the store write.
    fn spawn_fetch<Fut>(&self, key: String, ttl: Option<Duration>, fetch: Fut) -> InFlightFetch
    where
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            let settled = AssertUnwindSafe(fetch).catch_unwind().await;

            let outcome: FetchOutcome = match settled {
                Ok(Ok(value)) => Ok(Arc::new(value)),
                Ok(Err(err)) => {
                    debug!("fetch for {} failed: {:#}", task_key, err);
                    Err(CacheError::upstream(err))
                }
                Err(_) => Err(CacheError::FetchAborted(format!(
                    "fetcher for {} panicked",
                    task_key
                ))),
            };

            let mut state = state::lock(&state);
            state.in_flight.remove(&task_key);
            if let Ok(value) = &outcome {
                state.store.set(task_key, Arc::clone(value), ttl);
            }
            outcome
        });

        handle
            .map(move |joined| match joined {
                Ok(outcome) => outcome,
                Err(err) => Err(CacheError::FetchAborted(err.to_string())),
            })
            .boxed()
            .shared()
    }

    /// Number of fetches currently in flight, for diagnostics.
    pub fn in_flight_len(&self) -> usize {
        state::lock(&self.state).in_flight.len()
    }
}
