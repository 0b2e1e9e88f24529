use axum::extract::State;
use axum::http::StatusCode;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn list_patients(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<AccountData>>, ApiError> {
    let patients = state.accounts.list_patients().await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        patients.iter().map(Into::into).collect(),
    ))
}
