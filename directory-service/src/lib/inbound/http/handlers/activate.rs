use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::invitation::models::ActivationToken;

pub async fn activate(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<ApiSuccess<ActivationResponseData>, ApiError> {
    let account_id = state
        .invitations
        .activate(&ActivationToken::new(token))
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ActivationResponseData {
            id: account_id.to_string(),
            is_active: true,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationResponseData {
    pub id: String,
    pub is_active: bool,
}
