use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::DoctorData;
use crate::doctor::errors::DoctorError;
use crate::doctor::errors::FilterError;
use crate::doctor::models::DoctorAttribute;
use crate::doctor::models::DoctorFilter;
use crate::inbound::http::router::AppState;

/// Directory search. Every parameter is optional; none means everyone.
pub async fn search_doctors(
    State(state): State<AppState>,
    Query(params): Query<SearchDoctorsParams>,
) -> Result<ApiSuccess<Vec<DoctorData>>, ApiError> {
    let filter = params
        .try_into_filter()
        .map_err(|e| ApiError::from(DoctorError::from(e)))?;

    let doctors = state.doctors.search(&filter).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        doctors.iter().map(DoctorData::from).collect(),
    ))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchDoctorsParams {
    pub specialization: Option<String>,
    pub designation: Option<String>,
    pub qualification: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    /// Day of week, e.g. `Mon`.
    pub day: Option<String>,
    /// Time of day, `HH:MM`; only meaningful together with `day`.
    pub time: Option<String>,
}

impl SearchDoctorsParams {
    fn try_into_filter(self) -> Result<DoctorFilter, FilterError> {
        DoctorFilter::new()
            .with_attribute(DoctorAttribute::Specialization, self.specialization.as_deref())
            .with_attribute(DoctorAttribute::Designation, self.designation.as_deref())
            .with_attribute(DoctorAttribute::Qualification, self.qualification.as_deref())
            .with_attribute(DoctorAttribute::Country, self.country.as_deref())
            .with_attribute(DoctorAttribute::State, self.state.as_deref())
            .with_attribute(DoctorAttribute::City, self.city.as_deref())
            .with_availability(self.day.as_deref(), self.time.as_deref())
    }
}
