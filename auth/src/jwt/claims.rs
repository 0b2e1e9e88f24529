use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Session token claims.
///
/// A bearer token asserts a subject, the issuer that minted it and a hard
/// expiry. All four registered claims are mandatory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account identifier)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a subject, valid for `ttl` from now.
    ///
    /// # Arguments
    /// * `subject` - Account identifier
    /// * `issuer` - Name of the issuing service
    /// * `ttl` - Lifetime of the token
    ///
    /// # Returns
    /// Claims with sub, iss, iat and exp set
    pub fn for_subject(subject: impl ToString, issuer: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.to_string(),
            iss: issuer.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}
