use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::EmailError;
use crate::account::errors::PasswordError;
use crate::account::errors::UsernameError;
use crate::account::models::EmailAddress;
use crate::account::models::Password;
use crate::account::models::Username;
use crate::inbound::http::router::AppState;
use crate::provisioning::models::RegisterUserCommand;

/// Register a generic user account and send its activation link.
///
/// The saga runs on its own task so a client disconnect cannot interrupt
/// a rollback midway.
pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    let command = body.try_into_command()?;
    let provisioning = state.provisioning.clone();

    let account = tokio::spawn(async move { provisioning.register_user(command).await })
        .await
        .map_err(ApiError::internal)??;

    Ok(ApiSuccess::new(StatusCode::CREATED, (&account).into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Error)]
pub(super) enum ParseAccountRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordError),
}

impl RegisterUserRequest {
    pub(super) fn try_into_command(self) -> Result<RegisterUserCommand, ParseAccountRequestError> {
        let username = Username::new(self.username)?;
        let email = EmailAddress::new(self.email)?;
        let password = Password::new(self.password)?;
        Ok(RegisterUserCommand::new(username, email, password))
    }
}

impl From<ParseAccountRequestError> for ApiError {
    fn from(err: ParseAccountRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
