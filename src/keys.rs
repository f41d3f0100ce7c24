//! Key Builder Module
//!
//! Deterministic string-key construction per logical entity or query shape.
//! The same logical request always produces the same key, which is what the
//! invalidation patterns in `invalidate` rely on.

// == Appointment Filter ==
/// Filter fields for appointment list queries.
///
/// The key joins only the *defined* fields, in the fixed order patient,
/// doctor, date, omitting undefined fields entirely. Two different filter
/// combinations that omit the same fields therefore collapse to the same
/// key; that collapse is intentional and callers depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub date: Option<String>,
}

impl AppointmentFilter {
    /// Restricts the query to one patient.
    #[must_use]
    pub fn patient(mut self, id: impl Into<String>) -> Self {
        self.patient_id = Some(id.into());
        self
    }

    /// Restricts the query to one doctor.
    #[must_use]
    pub fn doctor(mut self, id: impl Into<String>) -> Self {
        self.doctor_id = Some(id.into());
        self
    }

    /// Restricts the query to one calendar date (caller-formatted).
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

// == Single-Entity Keys ==
/// Key for a single user lookup.
pub fn user(id: &str) -> String {
    format!("user:{id}")
}

/// Key for a single patient lookup.
pub fn patient(id: &str) -> String {
    format!("patient:{id}")
}

/// Key for a single doctor lookup.
pub fn doctor(id: &str) -> String {
    format!("doctor:{id}")
}

// == Collection Keys ==
/// Key for a filtered appointment list query.
pub fn appointments(filter: &AppointmentFilter) -> String {
    let parts: Vec<&str> = [
        filter.patient_id.as_deref(),
        filter.doctor_id.as_deref(),
        filter.date.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();

    format!("appointments:{}", parts.join(":"))
}

/// Key for a patient's therapy sessions.
pub fn sessions(patient_id: &str) -> String {
    format!("sessions:{patient_id}")
}

/// Key for a patient's message conversations.
pub fn conversations(patient_id: &str) -> String {
    format!("conversations:{patient_id}")
}

/// Key for a patient's insurance claims.
pub fn insurance_claims(patient_id: &str) -> String {
    format!("insurance_claims:{patient_id}")
}

// == Singleton Keys ==
/// Key for the center-wide settings record.
pub fn center_settings() -> String {
    "center_settings".to_string()
}

/// Key for the message template set.
pub fn message_templates() -> String {
    "message_templates".to_string()
}

// == Bucketed Keys ==
/// Key for a time-bucketed analytics aggregate.
pub fn analytics(period: &str) -> String {
    format!("analytics:{period}")
}

/// Key for a user's notification feed.
pub fn notifications(user_id: &str) -> String {
    format!("notifications:{user_id}")
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_entity_keys() {
        assert_eq!(user("u1"), "user:u1");
        assert_eq!(patient("p1"), "patient:p1");
        assert_eq!(doctor("d1"), "doctor:d1");
    }

    #[test]
    fn test_per_patient_collection_keys() {
        assert_eq!(sessions("p1"), "sessions:p1");
        assert_eq!(conversations("p1"), "conversations:p1");
        assert_eq!(insurance_claims("p1"), "insurance_claims:p1");
    }

    #[test]
    fn test_singleton_keys() {
        assert_eq!(center_settings(), "center_settings");
        assert_eq!(message_templates(), "message_templates");
    }

    #[test]
    fn test_bucketed_keys() {
        assert_eq!(analytics("2025-08"), "analytics:2025-08");
        assert_eq!(notifications("u1"), "notifications:u1");
    }

    #[test]
    fn test_appointments_all_fields() {
        let filter = AppointmentFilter::default()
            .patient("p1")
            .doctor("d1")
            .date("2025-08-28");
        assert_eq!(appointments(&filter), "appointments:p1:d1:2025-08-28");
    }

    #[test]
    fn test_appointments_omits_undefined_fields() {
        let filter = AppointmentFilter::default().patient("p1").date("2025-08-28");
        // No placeholder for the missing doctor field
        assert_eq!(appointments(&filter), "appointments:p1:2025-08-28");
    }

    #[test]
    fn test_appointments_empty_filter() {
        assert_eq!(appointments(&AppointmentFilter::default()), "appointments:");
    }

    #[test]
    fn test_appointments_collapse_is_intentional() {
        // A patient-only and a doctor-only filter with the same id collapse
        // to the same key. Callers rely on this exact behavior.
        let by_patient = AppointmentFilter::default().patient("x1");
        let by_doctor = AppointmentFilter::default().doctor("x1");
        assert_eq!(appointments(&by_patient), appointments(&by_doctor));
    }

    #[test]
    fn test_keys_are_deterministic() {
        let filter = AppointmentFilter::default().patient("p1").doctor("d1");
        assert_eq!(appointments(&filter), appointments(&filter.clone()));
        assert_eq!(patient("p1"), patient("p1"));
    }
}
