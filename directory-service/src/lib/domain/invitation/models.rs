use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::account::models::AccountId;

/// Single-use activation invitation owned by a pending account.
///
/// Only the SHA-256 hex digest of the token is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub account_id: AccountId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl Invitation {
    /// Build an invitation that expires `ttl` after `issued_at`.
    ///
    /// The absolute expiry is stored, never the relative duration.
    pub fn new(
        account_id: AccountId,
        token_hash: String,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            account_id,
            token_hash,
            expires_at: issued_at + ttl,
        }
    }

    /// Whether the invitation is no longer usable at `now`.
    ///
    /// Expiry is exclusive: a token presented exactly at `expires_at` is expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Plaintext activation token as presented by the invitee.
#[derive(Clone, PartialEq, Eq)]
pub struct ActivationToken(String);

impl ActivationToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ActivationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActivationToken(<redacted>)")
    }
}
