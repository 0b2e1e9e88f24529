use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use super::bounded;
use super::StoreFailure;
use crate::account::errors::AccountError;
use crate::account::errors::IdentityConflict;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::EmailAddress;
use crate::account::models::Username;
use crate::account::ports::AccountRepository;
use crate::invitation::models::Invitation;

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, is_active, created_at";

pub struct PostgresAccountRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    fn row_to_account(row: &PgRow) -> Result<Account, AccountError> {
        let id: Uuid = row.try_get("id").map_err(StoreFailure::from)?;
        let username: String = row.try_get("username").map_err(StoreFailure::from)?;
        let email: String = row.try_get("email").map_err(StoreFailure::from)?;

        // A stored row that no longer passes input validation is a store defect.
        let username = Username::new(username).map_err(|e| corrupt_row(id, e))?;
        let email = EmailAddress::new(email).map_err(|e| corrupt_row(id, e))?;

        Ok(Account {
            id: AccountId(id),
            username,
            email,
            password_hash: row.try_get("password_hash").map_err(StoreFailure::from)?,
            is_active: row.try_get("is_active").map_err(StoreFailure::from)?,
            created_at: row.try_get("created_at").map_err(StoreFailure::from)?,
        })
    }

    async fn insert_with_invitation(
        &self,
        account: &Account,
        invitation: &Invitation,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id.0)
        .bind(account.username.as_str())
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(account.is_active)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_invitations (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&invitation.token_hash)
        .bind(invitation.account_id.0)
        .bind(invitation.expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    /// Concurrent registrations race at the unique constraints; name the loser's conflict.
    fn conflict_or_failure(err: sqlx::Error, account: &Account) -> AccountError {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                match db_err.constraint() {
                    Some("users_username_key") => {
                        return AccountError::DuplicateIdentity(IdentityConflict::Username(
                            account.username.as_str().to_string(),
                        ))
                    }
                    Some("users_email_key") => {
                        return AccountError::DuplicateIdentity(IdentityConflict::Email(
                            account.email.as_str().to_string(),
                        ))
                    }
                    _ => {}
                }
            }
        }
        StoreFailure::Database(err).into()
    }
}

fn corrupt_row(id: Uuid, cause: impl fmt::Display) -> AccountError {
    AccountError::DatabaseError(format!("stored account {} is invalid: {}", id, cause))
}

impl From<StoreFailure> for AccountError {
    fn from(failure: StoreFailure) -> Self {
        match failure {
            StoreFailure::TimedOut(limit) => {
                AccountError::Timeout(format!("no answer within {:?}", limit))
            }
            StoreFailure::Database(err) => AccountError::DatabaseError(err.to_string()),
        }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create_with_invitation(
        &self,
        account: Account,
        invitation: Invitation,
    ) -> Result<Account, AccountError> {
        bounded(
            self.query_timeout,
            self.insert_with_invitation(&account, &invitation),
        )
        .await
        .map_err(|failure| match failure {
            StoreFailure::Database(err) => Self::conflict_or_failure(err, &account),
            timed_out => timed_out.into(),
        })?;

        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", ACCOUNT_COLUMNS);
        let row = bounded(
            self.query_timeout,
            sqlx::query(&query).bind(id.0).fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, AccountError> {
        let query = format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $1 LIMIT 1",
            ACCOUNT_COLUMNS
        );
        let row = bounded(
            self.query_timeout,
            sqlx::query(&query).bind(identifier).fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn list_patients(&self) -> Result<Vec<Account>, AccountError> {
        let query = format!(
            "SELECT {} FROM users u \
             WHERE u.is_active \
               AND NOT EXISTS (SELECT 1 FROM doctors d WHERE d.id = u.id) \
             ORDER BY u.username",
            ACCOUNT_COLUMNS
        );
        let rows = bounded(
            self.query_timeout,
            sqlx::query(&query).fetch_all(&self.pool),
        )
        .await?;

        rows.iter().map(Self::row_to_account).collect()
    }

    async fn delete(&self, id: &AccountId) -> Result<(), AccountError> {
        let result = bounded(
            self.query_timeout,
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id.0)
                .execute(&self.pool),
        )
        .await?;

        tracing::debug!(
            account_id = %id,
            deleted = result.rows_affected(),
            "Account deleted"
        );
        Ok(())
    }
}
