//! TTL Sweep Task
//!
//! Background janitor that periodically removes expired cache entries.
//! Correctness never depends on it because reads apply the same freshness
//! rule lazily; the sweep bounds growth from entries that are written once
//! and never read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::state::{self, SharedState};

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task sleeps for the configured interval between sweeps. The lock is
/// taken only for the duration of one sweep. The returned handle is aborted
/// during shutdown to release the timer deterministically.
pub(crate) fn spawn_sweep_task(state: SharedState, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting TTL sweep task with interval {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut guard = state::lock(&state);
                guard.store.sweep_expired()
            };

            if removed > 0 {
                info!("TTL sweep removed {} expired entries", removed);
            } else {
                debug!("TTL sweep found no expired entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CacheState;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn seeded_state(ttl: Duration) -> SharedState {
        let state = Arc::new(Mutex::new(CacheState::new(100, Duration::from_secs(300))));
        state.lock().unwrap().store.set(
            "appointments:p1:d1".to_string(),
            Arc::new(json!([])),
            Some(ttl),
        );
        state
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let state = seeded_state(Duration::from_millis(20));

        let handle = spawn_sweep_task(Arc::clone(&state), Duration::from_millis(25));

        tokio::time::sleep(Duration::from_millis(80)).await;

        // Removed by the sweep, without any read touching the key
        assert_eq!(state::lock(&state).store.len(), 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_preserves_fresh_entries() {
        let state = seeded_state(Duration::from_secs(3600));

        let handle = spawn_sweep_task(Arc::clone(&state), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(70)).await;

        assert_eq!(state::lock(&state).store.len(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let state = Arc::new(Mutex::new(CacheState::new(100, Duration::from_secs(300))));

        let handle = spawn_sweep_task(state, Duration::from_millis(10));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
