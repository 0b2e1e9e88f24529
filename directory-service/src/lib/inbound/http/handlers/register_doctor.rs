use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::register_user::RegisterUserRequest;
use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use super::DoctorData;
use crate::doctor::models::DoctorProfile;
use crate::inbound::http::router::AppState;
use crate::provisioning::models::RegisterDoctorCommand;

/// Register an account with a doctor profile in one provisioning attempt.
pub async fn register_doctor(
    State(state): State<AppState>,
    Json(body): Json<RegisterDoctorRequest>,
) -> Result<ApiSuccess<RegisterDoctorResponseData>, ApiError> {
    let command = RegisterDoctorCommand {
        account: body.account.try_into_command()?,
        profile: body.profile.into(),
    };
    let provisioning = state.provisioning.clone();

    let provisioned = tokio::spawn(async move { provisioning.register_doctor(command).await })
        .await
        .map_err(ApiError::internal)??;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        RegisterDoctorResponseData {
            account: (&provisioned.account).into(),
            doctor: (&provisioned.doctor).into(),
        },
    ))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterDoctorRequest {
    #[serde(flatten)]
    pub account: RegisterUserRequest,
    #[serde(flatten)]
    pub profile: DoctorProfileRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DoctorProfileRequest {
    #[serde(alias = "firstname")]
    pub first_name: String,
    #[serde(alias = "lastname")]
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
}

impl From<DoctorProfileRequest> for DoctorProfile {
    fn from(request: DoctorProfileRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            age: request.age,
            gender: request.gender,
            marital_status: request.marital_status,
            designation: request.designation,
            qualification: request.qualification,
            blood_group: request.blood_group,
            address: request.address,
            country: request.country,
            state: request.state,
            city: request.city,
            postal_code: request.postal_code,
            specialization: request.specialization,
            license_number: request.license_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterDoctorResponseData {
    pub account: AccountData,
    pub doctor: DoctorData,
}
