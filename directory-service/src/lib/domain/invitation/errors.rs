use thiserror::Error;

/// Error for invitation activation and maintenance
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvitationError {
    /// Never issued, already consumed, or swept after expiry.
    #[error("Invitation not found")]
    NotFound,

    #[error("Invitation has expired")]
    Expired,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Store operation timed out: {0}")]
    Timeout(String),
}
