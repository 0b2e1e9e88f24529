use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::AppointmentSummaryData;
use crate::inbound::http::gateway::ResolvedIdentity;
use crate::inbound::http::router::AppState;

/// Appointments the caller takes part in, as doctor or as patient.
pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(identity): Extension<ResolvedIdentity>,
) -> Result<ApiSuccess<Vec<AppointmentSummaryData>>, ApiError> {
    let appointments = state.appointments.list_for(&identity.account.id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        appointments.iter().map(Into::into).collect(),
    ))
}
