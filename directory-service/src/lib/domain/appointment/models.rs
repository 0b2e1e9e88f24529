use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::account::models::AccountId;

/// A booked consultation between a patient account and a doctor profile.
///
/// A doctor holds at most one appointment per instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: AppointmentId,
    pub doctor_id: AccountId,
    pub patient_id: AccountId,
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppointmentId(pub Uuid);

impl AppointmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AppointmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleAppointmentCommand {
    pub doctor_id: AccountId,
    pub patient_id: AccountId,
    pub scheduled_at: DateTime<Utc>,
}

impl ScheduleAppointmentCommand {
    /// True when `account` is one of the two parties.
    pub fn involves(&self, account: &AccountId) -> bool {
        self.doctor_id == *account || self.patient_id == *account
    }
}

/// Appointment joined with the display names of both parties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentSummary {
    pub appointment: Appointment,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
    pub patient_username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_involves_either_party_only() {
        let command = ScheduleAppointmentCommand {
            doctor_id: AccountId::new(),
            patient_id: AccountId::new(),
            scheduled_at: Utc::now(),
        };

        assert!(command.involves(&command.doctor_id));
        assert!(command.involves(&command.patient_id));
        assert!(!command.involves(&AccountId::new()));
    }
}
