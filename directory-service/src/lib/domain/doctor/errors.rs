use thiserror::Error;

/// Error for profile attribute validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileFieldError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} too long: maximum {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("age must be between {min} and {max}, got {actual}")]
    AgeOutOfRange { min: i32, max: i32, actual: i32 },
}

/// Error for availability window validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Unknown day of week: {0}")]
    InvalidDay(String),

    #[error("Invalid time of day (expected HH:MM or HH:MM:SS): {0}")]
    InvalidTime(String),

    #[error("Window must start before it ends ({starts_at} >= {ends_at})")]
    EmptyWindow { starts_at: String, ends_at: String },
}

/// Error for directory search criteria
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("A time filter requires a day filter")]
    TimeWithoutDay,

    #[error(transparent)]
    Availability(#[from] AvailabilityError),
}

/// Top-level error for all doctor profile operations
#[derive(Debug, Clone, Error)]
pub enum DoctorError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ProfileFieldError),

    #[error("Invalid availability: {0}")]
    InvalidAvailability(#[from] AvailabilityError),

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    #[error("Doctor not found: {0}")]
    NotFound(String),

    #[error("Doctor profile already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Store operation timed out: {0}")]
    Timeout(String),
}
