use std::sync::Arc;

use async_trait::async_trait;

use crate::account::models::AccountId;
use crate::doctor::errors::DoctorError;
use crate::doctor::models::AvailabilityWindow;
use crate::doctor::models::Doctor;
use crate::doctor::models::DoctorFilter;
use crate::doctor::ports::DoctorRepository;
use crate::doctor::ports::DoctorServicePort;

/// Domain service implementation for the doctor directory.
pub struct DoctorService<DR>
where
    DR: DoctorRepository,
{
    repository: Arc<DR>,
}

impl<DR> DoctorService<DR>
where
    DR: DoctorRepository,
{
    pub fn new(repository: Arc<DR>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<DR> DoctorServicePort for DoctorService<DR>
where
    DR: DoctorRepository,
{
    async fn get_doctor(&self, id: &AccountId) -> Result<Doctor, DoctorError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(DoctorError::NotFound(id.to_string()))
    }

    async fn search(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DoctorError> {
        let doctors = self.repository.filter(filter).await?;
        tracing::debug!(matches = doctors.len(), ?filter, "Directory search");
        Ok(doctors)
    }

    async fn add_availability(
        &self,
        id: &AccountId,
        window: AvailabilityWindow,
    ) -> Result<Doctor, DoctorError> {
        self.repository.add_availability(id, window).await?;

        tracing::info!(
            doctor_id = %id,
            day = %window.day,
            starts_at = %window.starts_at,
            ends_at = %window.ends_at,
            "Availability added"
        );

        self.get_doctor(id).await
    }
}
