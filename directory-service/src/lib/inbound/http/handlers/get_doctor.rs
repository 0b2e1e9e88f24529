use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;
use super::DoctorData;
use crate::inbound::http::middleware::DoctorContext;

pub async fn get_doctor(
    Extension(DoctorContext(doctor)): Extension<DoctorContext>,
) -> ApiSuccess<DoctorData> {
    ApiSuccess::new(StatusCode::OK, (&doctor).into())
}
