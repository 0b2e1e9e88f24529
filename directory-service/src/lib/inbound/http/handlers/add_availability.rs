use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::DoctorData;
use crate::doctor::errors::AvailabilityError;
use crate::doctor::errors::DoctorError;
use crate::doctor::models::parse_day;
use crate::doctor::models::parse_time_of_day;
use crate::doctor::models::AvailabilityWindow;
use crate::inbound::http::gateway::ResolvedIdentity;
use crate::inbound::http::middleware::DoctorContext;
use crate::inbound::http::router::AppState;

/// Add a weekly window to the caller's own profile.
pub async fn add_availability(
    State(state): State<AppState>,
    Extension(identity): Extension<ResolvedIdentity>,
    Extension(DoctorContext(doctor)): Extension<DoctorContext>,
    Json(body): Json<AddAvailabilityRequest>,
) -> Result<ApiSuccess<DoctorData>, ApiError> {
    if identity.profile.is_none() {
        return Err(ApiError::unauthorized(format!(
            "account {} does not own profile {}",
            identity.account.id, doctor.id
        )));
    }

    let window = body
        .try_into_window()
        .map_err(|e| ApiError::from(DoctorError::from(e)))?;

    let updated = state.doctors.add_availability(&doctor.id, window).await?;

    tracing::info!(
        doctor_id = %updated.id,
        day = %window.day,
        "Availability window added"
    );

    Ok(ApiSuccess::new(StatusCode::CREATED, (&updated).into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddAvailabilityRequest {
    #[serde(alias = "available_day")]
    pub day: String,
    #[serde(alias = "starts_from")]
    pub starts_at: String,
    pub ends_at: String,
}

impl AddAvailabilityRequest {
    fn try_into_window(self) -> Result<AvailabilityWindow, AvailabilityError> {
        AvailabilityWindow::new(
            parse_day(&self.day)?,
            parse_time_of_day(&self.starts_at)?,
            parse_time_of_day(&self.ends_at)?,
        )
    }
}
