use async_trait::async_trait;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::Session;
use crate::invitation::models::Invitation;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Retrieve account by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Database operation failed
    /// * `Timeout` - Store did not answer in time
    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError>;

    /// Verify a username-or-email and password pair and issue a session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identity or wrong password
    /// * `NotActivated` - Credentials are right but the invitation was never consumed
    /// * `TokenSigning` - Session token could not be signed
    async fn authenticate(&self, identifier: &str, password: &str)
        -> Result<Session, AccountError>;

    /// Active generic accounts, i.e. those owning no doctor profile.
    ///
    /// # Returns
    /// Accounts ordered by username
    async fn list_patients(&self) -> Result<Vec<Account>, AccountError>;
}

/// Persistence operations for account aggregate.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new pending account together with its invitation.
    ///
    /// Both rows are written in one transaction: either both exist afterwards
    /// or neither does.
    ///
    /// # Errors
    /// * `DuplicateIdentity` - Username or email is already registered
    /// * `DatabaseError` - Database operation failed
    /// * `Timeout` - Store did not answer in time
    async fn create_with_invitation(
        &self,
        account: Account,
        invitation: Invitation,
    ) -> Result<Account, AccountError>;

    /// Retrieve account by identifier.
    ///
    /// # Returns
    /// Optional account entity (None if not found)
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve account whose username or email equals `identifier`.
    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, AccountError>;

    /// Active accounts without a doctor profile, ordered by username.
    async fn list_patients(&self) -> Result<Vec<Account>, AccountError>;

    /// Remove account if present. Invitation and profile rows cascade.
    ///
    /// Deleting an absent account is not an error, so compensations can be retried.
    async fn delete(&self, id: &AccountId) -> Result<(), AccountError>;
}
