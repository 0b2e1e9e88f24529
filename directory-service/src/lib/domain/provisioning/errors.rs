use std::fmt;

use thiserror::Error;

use crate::account::errors::AccountError;
use crate::doctor::errors::DoctorError;

/// Error for notification delivery
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Failed to build notification: {0}")]
    Build(String),

    #[error("Notification transport failed: {0}")]
    Transport(String),

    #[error("Notification rejected with status {status}: {reason}")]
    Rejected { status: u16, reason: String },
}

/// A compensating action that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationFailure {
    pub step: &'static str,
    pub subject: String,
    pub reason: String,
}

impl fmt::Display for CompensationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.step, self.subject, self.reason)
    }
}

/// Error for a provisioning attempt
#[derive(Debug, Clone, Error)]
pub enum ProvisioningError {
    #[error("Account creation failed: {0}")]
    Account(#[from] AccountError),

    #[error("Profile creation failed: {0}")]
    Profile(#[from] DoctorError),

    #[error("Welcome notification failed: {0}")]
    Notification(#[from] NotificationError),

    /// Rollback itself failed; records may be orphaned and need manual cleanup.
    #[error("Rollback incomplete after '{cause}': {}", format_failures(.failures))]
    ConsistencyRisk {
        cause: Box<ProvisioningError>,
        failures: Vec<CompensationFailure>,
    },
}

fn format_failures(failures: &[CompensationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
