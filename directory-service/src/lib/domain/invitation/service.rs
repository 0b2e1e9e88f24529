use std::sync::Arc;

use async_trait::async_trait;
use auth::InvitationTokens;
use chrono::Utc;

use crate::account::models::AccountId;
use crate::invitation::errors::InvitationError;
use crate::invitation::models::ActivationToken;
use crate::invitation::ports::InvitationRepository;
use crate::invitation::ports::InvitationServicePort;

/// Domain service implementation for invitation activation.
pub struct InvitationService<IR>
where
    IR: InvitationRepository,
{
    repository: Arc<IR>,
    tokens: InvitationTokens,
}

impl<IR> InvitationService<IR>
where
    IR: InvitationRepository,
{
    pub fn new(repository: Arc<IR>) -> Self {
        Self {
            repository,
            tokens: InvitationTokens::new(),
        }
    }
}

#[async_trait]
impl<IR> InvitationServicePort for InvitationService<IR>
where
    IR: InvitationRepository,
{
    async fn activate(&self, token: &ActivationToken) -> Result<AccountId, InvitationError> {
        let token_hash = self.tokens.hash(token.as_str());

        let invitation = self
            .repository
            .find_by_token_hash(&token_hash)
            .await?
            .ok_or(InvitationError::NotFound)?;

        let now = Utc::now();
        if invitation.is_expired_at(now) {
            tracing::info!(
                account_id = %invitation.account_id,
                expires_at = %invitation.expires_at,
                "Rejected expired invitation"
            );
            return Err(InvitationError::Expired);
        }

        // A concurrent activation may have consumed the row since the lookup.
        let account_id = self
            .repository
            .consume(&token_hash, now)
            .await?
            .ok_or(InvitationError::NotFound)?;

        tracing::info!(account_id = %account_id, "Account activated");

        Ok(account_id)
    }

    async fn purge_expired(&self) -> Result<u64, InvitationError> {
        let purged = self.repository.purge_expired(Utc::now()).await?;
        if purged > 0 {
            tracing::info!(purged, "Removed pending accounts with expired invitations");
        }
        Ok(purged)
    }
}
