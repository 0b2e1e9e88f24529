use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Exchange a username or email plus password for a bearer token.
pub async fn issue_token(
    State(state): State<AppState>,
    Json(body): Json<IssueTokenRequest>,
) -> Result<ApiSuccess<IssueTokenResponseData>, ApiError> {
    let session = state
        .accounts
        .authenticate(&body.identifier, &body.password)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        IssueTokenResponseData {
            account: (&session.account).into(),
            token: session.access_token,
            expires_at: session.expires_at,
        },
    ))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct IssueTokenRequest {
    /// Username or email address.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueTokenResponseData {
    pub account: AccountData,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
