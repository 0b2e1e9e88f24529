use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::appointment::errors::AppointmentError;
use crate::appointment::models::Appointment;
use crate::appointment::models::AppointmentSummary;
use crate::doctor::errors::DoctorError;
use crate::doctor::models::AvailabilityWindow;
use crate::doctor::models::Doctor;
use crate::inbound::http::gateway::GatewayError;
use crate::invitation::errors::InvitationError;
use crate::provisioning::errors::ProvisioningError;

pub mod activate;
pub mod add_availability;
pub mod get_doctor;
pub mod get_user;
pub mod health;
pub mod issue_token;
pub mod list_appointments;
pub mod list_patients;
pub mod register_doctor;
pub mod register_user;
pub mod schedule_appointment;
pub mod search_doctors;

const INTERNAL_MESSAGE: &str = "Internal server error";
const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Gone(String),
}

impl ApiError {
    /// Log the full cause and hand the caller only the opaque message.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "Request failed with internal error");
        ApiError::InternalServerError(INTERNAL_MESSAGE.to_string())
    }

    /// Log why and answer with the uniform rejection.
    pub fn unauthorized(reason: impl std::fmt::Display) -> Self {
        tracing::warn!(reason = %reason, "Request rejected as unauthorized");
        ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Gone(msg) => (StatusCode::GONE, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidAccountId(_)
            | AccountError::InvalidUsername(_)
            | AccountError::InvalidEmail(_)
            | AccountError::InvalidPassword(_) => ApiError::UnprocessableEntity(err.to_string()),
            AccountError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AccountError::DuplicateIdentity(_) => ApiError::Conflict(err.to_string()),
            AccountError::InvalidCredentials | AccountError::NotActivated => {
                ApiError::unauthorized(err)
            }
            AccountError::Hashing(_)
            | AccountError::TokenSigning(_)
            | AccountError::DatabaseError(_)
            | AccountError::Timeout(_) => ApiError::internal(err),
        }
    }
}

impl From<InvitationError> for ApiError {
    fn from(err: InvitationError) -> Self {
        match err {
            InvitationError::NotFound => ApiError::NotFound(err.to_string()),
            InvitationError::Expired => ApiError::Gone(err.to_string()),
            InvitationError::DatabaseError(_) | InvitationError::Timeout(_) => {
                ApiError::internal(err)
            }
        }
    }
}

impl From<DoctorError> for ApiError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::InvalidProfile(_)
            | DoctorError::InvalidAvailability(_)
            | DoctorError::InvalidFilter(_) => ApiError::UnprocessableEntity(err.to_string()),
            DoctorError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DoctorError::AlreadyExists(_) => ApiError::Conflict(err.to_string()),
            DoctorError::DatabaseError(_) | DoctorError::Timeout(_) => ApiError::internal(err),
        }
    }
}

impl From<AppointmentError> for ApiError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::DoctorNotFound(_) | AppointmentError::PatientNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            AppointmentError::PatientNotActivated(_)
            | AppointmentError::SelfBooking
            | AppointmentError::NotInFuture(_) => ApiError::UnprocessableEntity(err.to_string()),
            AppointmentError::SlotTaken { .. } => ApiError::Conflict(err.to_string()),
            AppointmentError::DatabaseError(_) | AppointmentError::Timeout(_) => {
                ApiError::internal(err)
            }
        }
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::Account(inner) => inner.into(),
            ProvisioningError::Profile(inner) => inner.into(),
            ProvisioningError::Notification(_) => ApiError::internal(err),
            ProvisioningError::ConsistencyRisk { .. } => {
                tracing::error!(
                    error = %err,
                    "Provisioning left records behind; manual reconciliation required"
                );
                ApiError::InternalServerError(INTERNAL_MESSAGE.to_string())
            }
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthorized(reason) => ApiError::unauthorized(reason),
            GatewayError::Internal(_) => ApiError::internal(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Public view of an account: no password hash, no token material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountData {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username.as_str().to_string(),
            email: account.email.as_str().to_string(),
            is_active: account.is_active,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityData {
    pub day: String,
    pub starts_at: String,
    pub ends_at: String,
}

impl From<&AvailabilityWindow> for AvailabilityData {
    fn from(window: &AvailabilityWindow) -> Self {
        Self {
            day: window.day.to_string(),
            starts_at: window.starts_at.format("%H:%M:%S").to_string(),
            ends_at: window.ends_at.format("%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorData {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub gender: String,
    pub marital_status: String,
    pub designation: String,
    pub qualification: String,
    pub blood_group: String,
    pub address: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub postal_code: String,
    pub specialization: String,
    pub license_number: String,
    /// Always present; empty when the doctor has no windows.
    pub availability: Vec<AvailabilityData>,
    pub created_at: DateTime<Utc>,
}

impl From<&Doctor> for DoctorData {
    fn from(doctor: &Doctor) -> Self {
        let profile = &doctor.profile;
        Self {
            id: doctor.id.to_string(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            age: profile.age,
            gender: profile.gender.clone(),
            marital_status: profile.marital_status.clone(),
            designation: profile.designation.clone(),
            qualification: profile.qualification.clone(),
            blood_group: profile.blood_group.clone(),
            address: profile.address.clone(),
            country: profile.country.clone(),
            state: profile.state.clone(),
            city: profile.city.clone(),
            postal_code: profile.postal_code.clone(),
            specialization: profile.specialization.clone(),
            license_number: profile.license_number.clone(),
            availability: doctor.availability.iter().map(Into::into).collect(),
            created_at: doctor.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentData {
    pub id: String,
    pub doctor_id: String,
    pub patient_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<&Appointment> for AppointmentData {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id.to_string(),
            doctor_id: appointment.doctor_id.to_string(),
            patient_id: appointment.patient_id.to_string(),
            scheduled_at: appointment.scheduled_at,
            created_at: appointment.created_at,
        }
    }
}

/// Listed appointment with the display names of both parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentSummaryData {
    #[serde(flatten)]
    pub appointment: AppointmentData,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
    pub patient_username: String,
}

impl From<&AppointmentSummary> for AppointmentSummaryData {
    fn from(summary: &AppointmentSummary) -> Self {
        Self {
            appointment: (&summary.appointment).into(),
            doctor_first_name: summary.doctor_first_name.clone(),
            doctor_last_name: summary.doctor_last_name.clone(),
            patient_username: summary.patient_username.clone(),
        }
    }
}
