use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use super::bounded;
use super::StoreFailure;
use crate::account::models::AccountId;
use crate::invitation::errors::InvitationError;
use crate::invitation::models::Invitation;
use crate::invitation::ports::InvitationRepository;

pub struct PostgresInvitationRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresInvitationRepository {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn consume_in_transaction(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // The conditional delete is the single point where concurrent activations serialize.
        let consumed = sqlx::query(
            r#"
            DELETE FROM user_invitations
            WHERE token_hash = $1 AND expires_at > $2
            RETURNING user_id
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = consumed else {
            return Ok(None);
        };
        let user_id: Uuid = row.try_get("user_id")?;

        sqlx::query("UPDATE users SET is_active = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(user_id))
    }
}

impl From<StoreFailure> for InvitationError {
    fn from(failure: StoreFailure) -> Self {
        match failure {
            StoreFailure::TimedOut(limit) => {
                InvitationError::Timeout(format!("no answer within {:?}", limit))
            }
            StoreFailure::Database(err) => InvitationError::DatabaseError(err.to_string()),
        }
    }
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Invitation>, InvitationError> {
        let row = bounded(
            self.query_timeout,
            sqlx::query(
                r#"
                SELECT token_hash, user_id, expires_at
                FROM user_invitations
                WHERE token_hash = $1
                "#,
            )
            .bind(token_hash)
            .fetch_optional(&self.pool),
        )
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Invitation {
            account_id: AccountId(row.try_get("user_id").map_err(StoreFailure::from)?),
            token_hash: row.try_get("token_hash").map_err(StoreFailure::from)?,
            expires_at: row.try_get("expires_at").map_err(StoreFailure::from)?,
        }))
    }

    async fn consume(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountId>, InvitationError> {
        let consumed = bounded(
            self.query_timeout,
            self.consume_in_transaction(token_hash, now),
        )
        .await?;
        Ok(consumed.map(AccountId))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, InvitationError> {
        let result = bounded(
            self.query_timeout,
            sqlx::query(
                r#"
                DELETE FROM users u
                USING user_invitations i
                WHERE i.user_id = u.id
                  AND NOT u.is_active
                  AND i.expires_at <= $1
                "#,
            )
            .bind(now)
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }
}
