//! Mutation Event Module
//!
//! Write-path code publishes a `MutationEvent` whenever underlying data
//! changes; a background task applies the matching invalidation plan. This
//! keeps invalidation fan-out in one declarative table instead of scattered
//! across call sites.

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::invalidate::InvalidationRouter;

// == Mutation Event ==
/// A data mutation the cache must react to.
///
/// Ids are plain strings, matching the key space in `keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationEvent {
    /// A patient record (or anything derived from it) changed.
    Patient { id: String },
    /// A doctor record changed.
    Doctor { id: String },
    /// A user account changed.
    User { id: String },
    /// An appointment was created, moved, or cancelled. Scope the fan-out
    /// with whichever ids the write path knows.
    Appointment {
        patient_id: Option<String>,
        doctor_id: Option<String>,
    },
    /// A therapy session changed for a patient.
    Session { patient_id: String },
    /// A conversation changed for a patient.
    Conversation { patient_id: String },
    /// An insurance claim changed for a patient.
    InsuranceClaim { patient_id: String },
    /// A user's notification feed changed.
    Notification { user_id: String },
    /// The center-wide settings record changed.
    CenterSettings,
    /// The message template set changed.
    MessageTemplates,
    /// Analytics inputs changed outside appointments/sessions.
    Analytics,
}

// == Invalidation Task ==
/// Spawns the background task that drains mutation events and applies their
/// invalidation plans.
///
/// The task ends when every sender is dropped; the returned handle can also
/// be aborted during shutdown.
pub(crate) fn spawn_invalidation_task(
    router: InvalidationRouter,
    mut events: UnboundedReceiver<MutationEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting mutation invalidation task");

        while let Some(event) = events.recv().await {
            let removed = router.apply(&event);
            if removed > 0 {
                debug!("event {:?} removed {} cached keys", event, removed);
            }
        }

        info!("Mutation invalidation task stopped");
    })
}
