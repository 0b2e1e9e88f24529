use std::fmt;
use std::sync::Arc;

use auth::Authenticator;
use auth::BasicCredentials;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::ports::AccountServicePort;
use crate::doctor::models::Doctor;

/// Credentials presented in an `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl Credential {
    /// Parse an `Authorization` header value.
    ///
    /// The scheme name is case-insensitive.
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown scheme, empty token, or undecodable basic pair
    pub fn parse(header: &str) -> Result<Self, GatewayError> {
        let (scheme, value) = header
            .trim()
            .split_once(' ')
            .ok_or_else(|| GatewayError::Unauthorized("malformed authorization header".into()))?;
        let value = value.trim();

        if scheme.eq_ignore_ascii_case("bearer") {
            if value.is_empty() {
                return Err(GatewayError::Unauthorized("empty bearer token".into()));
            }
            return Ok(Credential::Bearer {
                token: value.to_string(),
            });
        }

        if scheme.eq_ignore_ascii_case("basic") {
            let decoded = STANDARD
                .decode(value)
                .map_err(|_| GatewayError::Unauthorized("basic credentials not base64".into()))?;
            let decoded = String::from_utf8(decoded)
                .map_err(|_| GatewayError::Unauthorized("basic credentials not utf-8".into()))?;
            let (username, password) = decoded
                .split_once(':')
                .ok_or_else(|| GatewayError::Unauthorized("basic credentials lack ':'".into()))?;
            return Ok(Credential::Basic {
                username: username.to_string(),
                password: password.to_string(),
            });
        }

        Err(GatewayError::Unauthorized(format!(
            "unsupported authorization scheme '{}'",
            scheme
        )))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credential::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Verified identity attached to a request for its lifetime.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub account: Account,
    /// Set on profile-scoped routes when the caller addresses their own profile.
    pub profile: Option<Doctor>,
}

/// Who a credential turned out to belong to.
#[derive(Debug, Clone)]
pub enum Principal {
    /// Holder of the static operational credentials.
    Operator { username: String },
    Account(ResolvedIdentity),
}

/// Gateway rejection.
///
/// The `Unauthorized` reason is for logs only; callers always see the same response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Identity lookup failed: {0}")]
    Internal(String),
}

/// Classifies credentials and resolves them into a `Principal`.
pub struct AuthGateway {
    operator: BasicCredentials,
    authenticator: Arc<Authenticator>,
    accounts: Arc<dyn AccountServicePort>,
}

impl AuthGateway {
    pub fn new(
        operator: BasicCredentials,
        authenticator: Arc<Authenticator>,
        accounts: Arc<dyn AccountServicePort>,
    ) -> Self {
        Self {
            operator,
            authenticator,
            accounts,
        }
    }

    /// Verify `credential` and resolve who presented it.
    ///
    /// Basic credentials are checked against the configured pair without any
    /// account lookup. Bearer tokens must carry a valid signature, issuer and
    /// expiry, and name an existing, activated account.
    ///
    /// # Errors
    /// * `Unauthorized` - Any credential defect, indistinguishable to callers
    /// * `Internal` - The account store failed
    pub async fn authenticate(&self, credential: Credential) -> Result<Principal, GatewayError> {
        match credential {
            Credential::Basic { username, password } => {
                if self.operator.verify(&username, &password) {
                    Ok(Principal::Operator { username })
                } else {
                    Err(GatewayError::Unauthorized(
                        "operator credentials mismatch".into(),
                    ))
                }
            }
            Credential::Bearer { token } => self
                .resolve_bearer(&token)
                .await
                .map(Principal::Account),
        }
    }

    async fn resolve_bearer(&self, token: &str) -> Result<ResolvedIdentity, GatewayError> {
        let verified = self
            .authenticator
            .validate_token(token)
            .map_err(|e| GatewayError::Unauthorized(format!("token rejected: {}", e)))?;

        let account_id = AccountId::from_string(&verified.subject)
            .map_err(|_| GatewayError::Unauthorized("token subject is not an account id".into()))?;

        match self.accounts.get_account(&account_id).await {
            Ok(account) if account.is_active => Ok(ResolvedIdentity {
                account,
                profile: None,
            }),
            Ok(_) => Err(GatewayError::Unauthorized(format!(
                "account {} is not activated",
                account_id
            ))),
            Err(AccountError::NotFound(_)) => Err(GatewayError::Unauthorized(format!(
                "account {} no longer exists",
                account_id
            ))),
            Err(e) => Err(GatewayError::Internal(e.to_string())),
        }
    }
}
