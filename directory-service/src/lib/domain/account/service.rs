use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::Session;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;
use crate::domain::blocking::offload;

/// Domain service implementation for account operations.
pub struct AccountService<AR>
where
    AR: AccountRepository,
{
    repository: Arc<AR>,
    authenticator: Arc<Authenticator>,
}

impl<AR> AccountService<AR>
where
    AR: AccountRepository,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `authenticator` - Password verification and session signing
    pub fn new(repository: Arc<AR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }
}

#[async_trait]
impl<AR> AccountServicePort for AccountService<AR>
where
    AR: AccountRepository,
{
    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }

    async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Session, AccountError> {
        let account = self
            .repository
            .find_by_username_or_email(identifier.trim())
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();
        let stored_hash = account.password_hash.clone();
        let subject = account.id.to_string();
        let result = offload(move || authenticator.authenticate(&password, &stored_hash, &subject))
            .await
            .map_err(|e| AccountError::Hashing(e.to_string()))?
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => AccountError::InvalidCredentials,
                AuthenticationError::JwtError(err) => AccountError::TokenSigning(err.to_string()),
            })?;

        // Checked after the password so a pending account is only revealed to its owner.
        if !account.is_active {
            return Err(AccountError::NotActivated);
        }

        tracing::info!(account_id = %account.id, "Session issued");

        Ok(Session {
            account,
            access_token: result.access_token,
            expires_at: result.expires_at,
        })
    }
    async fn list_patients(&self) -> Result<Vec<Account>, AccountError> {
        self.repository.list_patients().await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::account::models::EmailAddress;
    use crate::account::models::Username;
    use crate::invitation::models::Invitation;

    mock! {
        pub TestAccountRepository {}

        #[async_trait]
        impl AccountRepository for TestAccountRepository {
            async fn create_with_invitation(&self, account: Account, invitation: Invitation) -> Result<Account, AccountError>;
            async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;
            async fn find_by_username_or_email(&self, identifier: &str) -> Result<Option<Account>, AccountError>;
            async fn list_patients(&self) -> Result<Vec<Account>, AccountError>;
            async fn delete(&self, id: &AccountId) -> Result<(), AccountError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(
            b"test-secret-key-for-jwt-signing-at-least-32-bytes",
            "directory-service",
            Duration::hours(1),
        ))
    }

    fn account(authenticator: &Authenticator, is_active: bool) -> Account {
        Account {
            id: AccountId::new(),
            username: Username::new("drgrey".to_string()).unwrap(),
            email: EmailAddress::new("grey@example.com".to_string()).unwrap(),
            password_hash: authenticator.hash_password("s3cret").unwrap(),
            is_active,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_active_account_by_email() {
        let authenticator = authenticator();
        let stored = account(&authenticator, true);
        let account_id = stored.id;

        let mut repository = MockTestAccountRepository::new();
        repository
            .expect_find_by_username_or_email()
            .withf(|identifier| identifier == "grey@example.com")
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let service = AccountService::new(Arc::new(repository), authenticator.clone());

        let session = service
            .authenticate(" grey@example.com ", "s3cret")
            .await
            .unwrap();

        assert_eq!(session.account.id, account_id);
        let verified = authenticator.validate_token(&session.access_token).unwrap();
        assert_eq!(verified.subject, account_id.to_string());
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let authenticator = authenticator();
        let stored = account(&authenticator, true);

        let mut repository = MockTestAccountRepository::new();
        repository
            .expect_find_by_username_or_email()
            .returning(move |_| Ok(Some(stored.clone())));

        let service = AccountService::new(Arc::new(repository), authenticator);

        let result = service.authenticate("drgrey", "wrong").await;
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_identity() {
        let mut repository = MockTestAccountRepository::new();
        repository
            .expect_find_by_username_or_email()
            .returning(|_| Ok(None));

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service.authenticate("nobody", "s3cret").await;
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_pending_account() {
        let authenticator = authenticator();
        let stored = account(&authenticator, false);

        let mut repository = MockTestAccountRepository::new();
        repository
            .expect_find_by_username_or_email()
            .returning(move |_| Ok(Some(stored.clone())));

        let service = AccountService::new(Arc::new(repository), authenticator);

        let result = service.authenticate("drgrey", "s3cret").await;
        assert!(matches!(result, Err(AccountError::NotActivated)));
    }

    #[tokio::test]
    async fn test_get_account_not_found() {
        let mut repository = MockTestAccountRepository::new();
        repository.expect_find_by_id().times(1).returning(|_| Ok(None));

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service.get_account(&AccountId::new()).await;
        assert!(matches!(result, Err(AccountError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_patients_delegates_to_store() {
        let authenticator = authenticator();
        let patient = account(&authenticator, true);
        let expected = vec![patient.clone()];

        let mut repository = MockTestAccountRepository::new();
        repository
            .expect_list_patients()
            .times(1)
            .returning(move || Ok(vec![patient.clone()]));

        let service = AccountService::new(Arc::new(repository), authenticator);

        assert_eq!(service.list_patients().await.unwrap(), expected);
    }
}
