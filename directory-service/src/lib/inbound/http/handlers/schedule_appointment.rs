use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::AppointmentData;
use crate::account::errors::AccountIdError;
use crate::account::models::AccountId;
use crate::appointment::models::ScheduleAppointmentCommand;
use crate::inbound::http::gateway::ResolvedIdentity;
use crate::inbound::http::router::AppState;

/// Book an appointment; the caller must be the patient or the doctor.
pub async fn schedule_appointment(
    State(state): State<AppState>,
    Extension(identity): Extension<ResolvedIdentity>,
    Json(body): Json<ScheduleAppointmentRequest>,
) -> Result<ApiSuccess<AppointmentData>, ApiError> {
    let command = body.try_into_command()?;
    if !command.involves(&identity.account.id) {
        return Err(ApiError::unauthorized(format!(
            "account {} is not a party to the booking",
            identity.account.id
        )));
    }

    let appointment = state.appointments.schedule(command).await?;

    Ok(ApiSuccess::new(StatusCode::CREATED, (&appointment).into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleAppointmentRequest {
    pub doctor_id: String,
    pub patient_id: String,
    #[serde(alias = "appointment_time")]
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Error)]
pub(super) enum ParseAppointmentRequestError {
    #[error("Invalid doctor_id: {0}")]
    DoctorId(AccountIdError),

    #[error("Invalid patient_id: {0}")]
    PatientId(AccountIdError),
}

impl ScheduleAppointmentRequest {
    pub(super) fn try_into_command(
        self,
    ) -> Result<ScheduleAppointmentCommand, ParseAppointmentRequestError> {
        Ok(ScheduleAppointmentCommand {
            doctor_id: AccountId::from_string(&self.doctor_id)
                .map_err(ParseAppointmentRequestError::DoctorId)?,
            patient_id: AccountId::from_string(&self.patient_id)
                .map_err(ParseAppointmentRequestError::PatientId)?,
            scheduled_at: self.scheduled_at,
        })
    }
}

impl From<ParseAppointmentRequestError> for ApiError {
    fn from(err: ParseAppointmentRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
