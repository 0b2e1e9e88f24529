use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::account::models::AccountId;
use crate::invitation::errors::InvitationError;
use crate::invitation::models::ActivationToken;
use crate::invitation::models::Invitation;

/// Port for invitation domain service operations.
#[async_trait]
pub trait InvitationServicePort: Send + Sync + 'static {
    /// Consume an activation token and activate its account.
    ///
    /// # Returns
    /// Identifier of the activated account
    ///
    /// # Errors
    /// * `NotFound` - No invitation matches the token (including already used)
    /// * `Expired` - The invitation exists but its expiry has passed
    /// * `DatabaseError` - Database operation failed
    async fn activate(&self, token: &ActivationToken) -> Result<AccountId, InvitationError>;

    /// Delete pending accounts whose invitation has expired.
    ///
    /// # Returns
    /// Number of accounts removed
    async fn purge_expired(&self) -> Result<u64, InvitationError>;
}

/// Persistence operations for invitations.
///
/// Invitations are created together with their account, see
/// `AccountRepository::create_with_invitation`.
#[async_trait]
pub trait InvitationRepository: Send + Sync + 'static {
    /// Retrieve invitation by token hash, expired or not.
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Invitation>, InvitationError>;

    /// Atomically delete an invitation still unexpired at `now` and activate
    /// its account.
    ///
    /// # Returns
    /// Account that was activated, or None when no unexpired invitation
    /// matched (e.g. a concurrent activation consumed it first)
    async fn consume(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountId>, InvitationError>;

    /// Delete every pending account whose invitation expired at or before `now`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, InvitationError>;
}
