//! Error types for the cache layer
//!
//! The cache raises no domain errors of its own; the only failures it
//! surfaces are the ones produced by caller-supplied fetchers, delivered
//! unchanged to every waiter of a coalesced fetch.

use std::sync::Arc;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for coalesced fetches.
///
/// Cloneable so that a single fetch outcome can be handed to every caller
/// that joined the in-flight request.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The caller-supplied fetcher failed. The underlying error is shared
    /// between all waiters and is never cached.
    #[error("fetch failed: {0}")]
    Fetch(Arc<anyhow::Error>),

    /// The fetch task settled without producing an outcome (it panicked or
    /// was aborted during shutdown).
    #[error("fetch aborted: {0}")]
    FetchAborted(String),
}

impl CacheError {
    /// Wraps a fetcher failure for fan-out to every waiter.
    pub fn upstream(err: anyhow::Error) -> Self {
        Self::Fetch(Arc::new(err))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
