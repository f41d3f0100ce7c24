//! Cache Service Module
//!
//! Explicitly constructed wiring for the whole cache layer: store,
//! coalescer, invalidation router, mutation event bus, and TTL sweep task.
//! There is no process-wide singleton; collaborators receive a service
//! instance (or clones of its handles) by dependency injection, and tests
//! create isolated instances freely.
//!
//! The store and in-flight registry are local to one process. Multiple
//! deployed instances of the application do not share a cache, so an
//! invalidation performed on one instance has no effect on another.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::CacheStats;
use crate::coalesce::Coalescer;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::events::{spawn_invalidation_task, MutationEvent};
use crate::invalidate::InvalidationRouter;
use crate::keys::{self, AppointmentFilter};
use crate::state::{self, CacheState, SharedState};
use crate::tasks::spawn_sweep_task;

// == Cache Service ==
/// The in-process cache fronting expensive read operations.
///
/// # Lifecycle
/// `new` builds the store and spawns the sweep and invalidation tasks;
/// `shutdown` (also run on drop) aborts them so no background work
/// lingers after disposal.
pub struct CacheService {
    state: SharedState,
    coalescer: Coalescer,
    router: InvalidationRouter,
    mutations: UnboundedSender<MutationEvent>,
    sweep_handle: JoinHandle<()>,
    bus_handle: JoinHandle<()>,
}

impl CacheService {
    // == Constructor ==
    /// Creates a cache service and starts its background tasks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: CacheConfig) -> Self {
        let state: SharedState = Arc::new(Mutex::new(CacheState::new(
            config.max_entries,
            config.default_ttl,
        )));

        let coalescer = Coalescer::new(Arc::clone(&state));
        let router = InvalidationRouter::new(Arc::clone(&state));

        let sweep_handle = spawn_sweep_task(Arc::clone(&state), config.sweep_interval);
        let (mutations, events) = mpsc::unbounded_channel();
        let bus_handle = spawn_invalidation_task(router.clone(), events);

        info!(
            "Cache service initialized: max_entries={}, default_ttl={:?}, sweep_interval={:?}",
            config.max_entries, config.default_ttl, config.sweep_interval
        );

        Self {
            state,
            coalescer,
            router,
            mutations,
            sweep_handle,
            bus_handle,
        }
    }

    // == Shutdown ==
    /// Stops the background tasks. Idempotent; also run on drop.
    pub fn shutdown(&self) {
        self.sweep_handle.abort();
        self.bus_handle.abort();
    }

    // == Direct Store Access ==
    /// Returns the cached value for a key, if present and fresh.
    pub fn get(&self, key: &str) -> Option<Arc<Value>> {
        state::lock(&self.state).store.get(key)
    }

    /// Stores a value under a key with an optional TTL.
    pub fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        state::lock(&self.state)
            .store
            .set(key.to_string(), Arc::new(value), ttl);
    }

    /// Checks whether a fresh entry exists for a key.
    pub fn has(&self, key: &str) -> bool {
        state::lock(&self.state).store.has(key)
    }

    /// Removes an entry, returning whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        state::lock(&self.state).store.delete(key)
    }

    /// Empties the store.
    pub fn clear(&self) {
        state::lock(&self.state).store.clear();
    }

    /// Returns the current number of entries.
    pub fn size(&self) -> usize {
        state::lock(&self.state).store.len()
    }

    /// Returns a snapshot of cache statistics.
    pub fn stats(&self) -> CacheStats {
        state::lock(&self.state).store.stats()
    }

    // == Coalesced Reads ==
    /// Returns the cached value for `key`, invoking `fetcher` at most once
    /// per cold window when it is absent. See [`Coalescer::get_or_fetch`].
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
        self.coalescer.get_or_fetch(key, ttl, fetcher).await
    }

    // == Invalidation ==
    /// Deletes a single key.
    pub fn invalidate(&self, key: &str) -> bool {
        self.router.invalidate(key)
    }

    /// Deletes every key matching a `*`-glob pattern.
    pub fn invalidate_by_pattern(&self, pattern: &str) -> usize {
        self.router.invalidate_by_pattern(pattern)
    }

    /// Invalidates everything derived from a patient's data.
    pub fn invalidate_patient(&self, id: &str) -> usize {
        self.router.invalidate_patient(id)
    }

    /// Invalidates everything derived from a doctor's data.
    pub fn invalidate_doctor(&self, id: &str) -> usize {
        self.router.invalidate_doctor(id)
    }

    /// Invalidates everything derived from a user's data.
    pub fn invalidate_user(&self, id: &str) -> usize {
        self.router.invalidate_user(id)
    }

    // == Mutation Events ==
    /// Publishes a mutation event to the invalidation bus.
    pub fn publish(&self, event: MutationEvent) {
        // The receiver lives as long as the service; a send can only fail
        // after shutdown, when dropping the event is the right outcome.
        let _ = self.mutations.send(event);
    }

    /// Returns a sender handle write-path collaborators can hold on to.
    pub fn mutation_sender(&self) -> UnboundedSender<MutationEvent> {
        self.mutations.clone()
    }

    // == Entity Read Wrappers ==
    /// Cached lookup of a user record.
    pub async fn user<F, Fut>(&self, id: &str, fetcher: F) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.get_or_fetch(&keys::user(id), None, fetcher).await
    }

    /// Cached lookup of a patient record.
    pub async fn patient<F, Fut>(&self, id: &str, fetcher: F) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.get_or_fetch(&keys::patient(id), None, fetcher).await
    }

    /// Cached lookup of a doctor record.
    pub async fn doctor<F, Fut>(&self, id: &str, fetcher: F) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.get_or_fetch(&keys::doctor(id), None, fetcher).await
    }

    /// Cached filtered appointment list query.
    pub async fn appointments<F, Fut>(
        &self,
        filter: &AppointmentFilter,
        fetcher: F,
    ) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.get_or_fetch(&keys::appointments(filter), None, fetcher)
            .await
    }

    /// Cached lookup of a patient's therapy sessions.
    pub async fn sessions<F, Fut>(&self, patient_id: &str, fetcher: F) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.get_or_fetch(&keys::sessions(patient_id), None, fetcher)
            .await
    }

    /// Cached lookup of a patient's conversations.
    pub async fn conversations<F, Fut>(&self, patient_id: &str, fetcher: F) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.get_or_fetch(&keys::conversations(patient_id), None, fetcher)
            .await
    }

    /// Cached lookup of a patient's insurance claims.
    pub async fn insurance_claims<F, Fut>(&self, patient_id: &str, fetcher: F) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.get_or_fetch(&keys::insurance_claims(patient_id), None, fetcher)
            .await
    }

    /// Cached lookup of the center-wide settings record.
    pub async fn center_settings<F, Fut>(&self, fetcher: F) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.get_or_fetch(&keys::center_settings(), None, fetcher)
            .await
    }

    /// Cached lookup of the message template set.
    pub async fn message_templates<F, Fut>(&self, fetcher: F) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.get_or_fetch(&keys::message_templates(), None, fetcher)
            .await
    }

    /// Cached time-bucketed analytics aggregate.
    pub async fn analytics<F, Fut>(&self, period: &str, fetcher: F) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.get_or_fetch(&keys::analytics(period), None, fetcher)
            .await
    }

    /// Cached lookup of a user's notification feed.
    pub async fn notifications<F, Fut>(&self, user_id: &str, fetcher: F) -> Result<Arc<Value>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.get_or_fetch(&keys::notifications(user_id), None, fetcher)
            .await
    }
}

impl Drop for CacheService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
