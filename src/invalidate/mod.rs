//! Invalidation Module
//!
//! Exact-key and wildcard-pattern invalidation, with per-entity fan-out
//! generated from a declarative plan table instead of ad hoc per-call-site
//! wiring. The same table serves both the direct helpers and the mutation
//! event bus, so a schema change is reflected in one place.

mod pattern;

pub use pattern::glob_match;

use tracing::debug;

use crate::events::MutationEvent;
use crate::keys;
use crate::state::{self, SharedState};

// == Invalidation Action ==
/// One step of an entity's invalidation fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Delete a single key.
    Exact(String),
    /// Delete every key matching a `*`-glob.
    Pattern(String),
}

// == Invalidation Plan ==
/// The entity-relationship table: which keys a mutation makes stale.
///
/// Patient data feeds the patient's own record, the per-patient
/// collections, and any appointment list filtered by that patient (those
/// keys begin with the patient id). Doctors and users can appear at any
/// position of a composite key, so their plans use containment patterns.
/// Appointments and sessions additionally feed the analytics aggregates.
pub fn invalidation_plan(event: &MutationEvent) -> Vec<Action> {
    use Action::{Exact, Pattern};

    match event {
        MutationEvent::Patient { id } => vec![
            Exact(keys::patient(id)),
            Exact(keys::sessions(id)),
            Exact(keys::conversations(id)),
            Exact(keys::insurance_claims(id)),
            Pattern(format!("appointments:{id}*")),
        ],
        MutationEvent::Doctor { id } => vec![
            Exact(keys::doctor(id)),
            Pattern(format!("appointments:*{id}*")),
            Pattern(format!("sessions:*{id}*")),
        ],
        MutationEvent::User { id } => vec![
            Exact(keys::user(id)),
            Pattern(format!("appointments:*{id}*")),
            Pattern(format!("sessions:*{id}*")),
            Pattern(format!("conversations:*{id}*")),
        ],
        MutationEvent::Appointment {
            patient_id,
            doctor_id,
        } => {
            let mut actions = match (patient_id, doctor_id) {
                (Some(pid), _) => vec![Pattern(format!("appointments:{pid}*"))],
                (None, Some(did)) => vec![Pattern(format!("appointments:*{did}*"))],
                (None, None) => vec![Pattern("appointments:*".to_string())],
            };
            actions.push(Pattern("analytics:*".to_string()));
            actions
        }
        MutationEvent::Session { patient_id } => vec![
            Exact(keys::sessions(patient_id)),
            Pattern("analytics:*".to_string()),
        ],
        MutationEvent::Conversation { patient_id } => {
            vec![Exact(keys::conversations(patient_id))]
        }
        MutationEvent::InsuranceClaim { patient_id } => {
            vec![Exact(keys::insurance_claims(patient_id))]
        }
        MutationEvent::Notification { user_id } => {
            vec![Exact(keys::notifications(user_id))]
        }
        MutationEvent::CenterSettings => vec![Exact(keys::center_settings())],
        MutationEvent::MessageTemplates => vec![Exact(keys::message_templates())],
        MutationEvent::Analytics => vec![Pattern("analytics:*".to_string())],
    }
}

// == Invalidation Router ==
/// Applies exact and pattern invalidations against the store.
#[derive(Clone)]
pub struct InvalidationRouter {
    state: SharedState,
}

impl InvalidationRouter {
    // == Constructor ==
    pub(crate) fn new(state: SharedState) -> Self {
        Self { state }
    }

    // == Invalidate ==
    /// Deletes a single key, returning whether it was present.
    pub fn invalidate(&self, key: &str) -> bool {
        state::lock(&self.state).store.delete(key)
    }

    // == Invalidate By Pattern ==
    /// Deletes every key matching the `*`-glob.
    ///
    /// Returns the number of keys removed. Every held key is tested; the
    /// key space is bounded by the store capacity, so the linear scan is
    /// acceptable.
    pub fn invalidate_by_pattern(&self, pattern: &str) -> usize {
        let mut state = state::lock(&self.state);

        let matches: Vec<String> = state
            .store
            .keys()
            .into_iter()
            .filter(|key| glob_match(pattern, key))
            .collect();

        for key in &matches {
            state.store.delete(key);
        }

        if !matches.is_empty() {
            debug!("pattern {} invalidated {} keys", pattern, matches.len());
        }
        matches.len()
    }

    // == Apply ==
    /// Applies the invalidation plan for a mutation event.
    ///
    /// Returns the number of keys removed.
    pub fn apply(&self, event: &MutationEvent) -> usize {
        let mut removed = 0;
        for action in invalidation_plan(event) {
            removed += match action {
                Action::Exact(key) => usize::from(self.invalidate(&key)),
                Action::Pattern(pattern) => self.invalidate_by_pattern(&pattern),
            };
        }
        debug!("mutation {:?} invalidated {} keys", event, removed);
        removed
    }

    // == Per-Entity Helpers ==
    /// Invalidates everything derived from a patient's data.
    pub fn invalidate_patient(&self, id: &str) -> usize {
        self.apply(&MutationEvent::Patient { id: id.to_string() })
    }

    /// Invalidates everything derived from a doctor's data.
    pub fn invalidate_doctor(&self, id: &str) -> usize {
        self.apply(&MutationEvent::Doctor { id: id.to_string() })
    }

    /// Invalidates everything derived from a user's data.
    pub fn invalidate_user(&self, id: &str) -> usize {
        self.apply(&MutationEvent::User { id: id.to_string() })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CacheState;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn router_with_keys(keys: &[&str]) -> InvalidationRouter {
        let state = Arc::new(Mutex::new(CacheState::new(100, Duration::from_secs(300))));
        {
            let mut guard = state.lock().unwrap();
            for key in keys {
                guard.store.set(key.to_string(), Arc::new(json!(1)), None);
            }
        }
        InvalidationRouter::new(state)
    }

    fn remaining(router: &InvalidationRouter) -> Vec<String> {
        let mut keys = state::lock(&router.state).store.keys();
        keys.sort();
        keys
    }

    #[test]
    fn test_invalidate_exact() {
        let router = router_with_keys(&["patient:p1", "patient:p2"]);

        assert!(router.invalidate("patient:p1"));
        assert!(!router.invalidate("patient:p1"));
        assert_eq!(remaining(&router), vec!["patient:p2".to_string()]);
    }

    #[test]
    fn test_invalidate_by_pattern() {
        let router = router_with_keys(&[
            "appointments:p1:d1",
            "appointments:p1:",
            "appointments:p2:d1",
        ]);

        let removed = router.invalidate_by_pattern("appointments:p1:*");

        assert_eq!(removed, 2);
        assert_eq!(remaining(&router), vec!["appointments:p2:d1".to_string()]);
    }

    #[test]
    fn test_patient_plan_fan_out() {
        let router = router_with_keys(&[
            "patient:p1",
            "sessions:p1",
            "conversations:p1",
            "insurance_claims:p1",
            "appointments:p1",
            "appointments:p1:d1",
            "appointments:p2:d1",
            "doctor:d1",
        ]);

        let removed = router.invalidate_patient("p1");

        assert_eq!(removed, 6);
        assert_eq!(
            remaining(&router),
            vec!["appointments:p2:d1".to_string(), "doctor:d1".to_string()]
        );
    }

    #[test]
    fn test_doctor_plan_fan_out() {
        let router = router_with_keys(&[
            "doctor:d1",
            "appointments:p1:d1",
            "sessions:d1",
            "patient:p1",
        ]);

        let removed = router.invalidate_doctor("d1");

        assert_eq!(removed, 3);
        assert_eq!(remaining(&router), vec!["patient:p1".to_string()]);
    }

    #[test]
    fn test_user_plan_fan_out() {
        let router = router_with_keys(&[
            "user:u1",
            "appointments:u1:d1",
            "sessions:u1",
            "conversations:u1",
            "notifications:u1",
        ]);

        let removed = router.invalidate_user("u1");

        // Notifications are not part of the user plan
        assert_eq!(removed, 4);
        assert_eq!(remaining(&router), vec!["notifications:u1".to_string()]);
    }

    #[test]
    fn test_appointment_plan_prefers_patient_scope() {
        let plan = invalidation_plan(&MutationEvent::Appointment {
            patient_id: Some("p1".to_string()),
            doctor_id: Some("d1".to_string()),
        });

        assert_eq!(
            plan,
            vec![
                Action::Pattern("appointments:p1*".to_string()),
                Action::Pattern("analytics:*".to_string()),
            ]
        );
    }

    #[test]
    fn test_appointment_plan_unscoped() {
        let plan = invalidation_plan(&MutationEvent::Appointment {
            patient_id: None,
            doctor_id: None,
        });

        assert_eq!(
            plan,
            vec![
                Action::Pattern("appointments:*".to_string()),
                Action::Pattern("analytics:*".to_string()),
            ]
        );
    }

    #[test]
    fn test_singleton_plans() {
        assert_eq!(
            invalidation_plan(&MutationEvent::CenterSettings),
            vec![Action::Exact("center_settings".to_string())]
        );
        assert_eq!(
            invalidation_plan(&MutationEvent::MessageTemplates),
            vec![Action::Exact("message_templates".to_string())]
        );
    }
}
