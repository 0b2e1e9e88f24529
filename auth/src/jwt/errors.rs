use thiserror::Error;

/// Error type for JWT operations.
///
/// Variants keep the cause apart for logging. Callers facing the network
/// should collapse them into a single rejection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token issuer is not trusted")]
    InvalidIssuer,

    #[error("Token is expired")]
    TokenExpired,
}
