use chrono::DateTime;
use chrono::Utc;
use thiserror::Error;

use crate::account::errors::AccountError;
use crate::doctor::errors::DoctorError;

/// Top-level error for appointment operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppointmentError {
    #[error("Doctor not found: {0}")]
    DoctorNotFound(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Patient account is not activated: {0}")]
    PatientNotActivated(String),

    #[error("A doctor cannot book an appointment with their own account")]
    SelfBooking,

    #[error("Appointment time {0} is not in the future")]
    NotInFuture(DateTime<Utc>),

    #[error("Doctor {doctor_id} is already booked at {scheduled_at}")]
    SlotTaken {
        doctor_id: String,
        scheduled_at: DateTime<Utc>,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Store operation timed out: {0}")]
    Timeout(String),
}

// Party lookups only surface store failures here; absence is handled by the caller.
impl From<AccountError> for AppointmentError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Timeout(reason) => AppointmentError::Timeout(reason),
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}

impl From<DoctorError> for AppointmentError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::Timeout(reason) => AppointmentError::Timeout(reason),
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}
