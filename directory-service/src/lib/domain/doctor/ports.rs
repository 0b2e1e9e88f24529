use async_trait::async_trait;

use crate::account::models::AccountId;
use crate::doctor::errors::DoctorError;
use crate::doctor::models::AvailabilityWindow;
use crate::doctor::models::Doctor;
use crate::doctor::models::DoctorFilter;

/// Port for doctor directory operations.
#[async_trait]
pub trait DoctorServicePort: Send + Sync + 'static {
    /// Retrieve doctor profile by owning account.
    ///
    /// # Errors
    /// * `NotFound` - No profile for this account
    /// * `DatabaseError` - Database operation failed
    async fn get_doctor(&self, id: &AccountId) -> Result<Doctor, DoctorError>;

    /// Directory search.
    ///
    /// # Returns
    /// Matching doctors ordered by account identifier, each with its full
    /// availability list
    async fn search(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DoctorError>;

    /// Add an availability window to an existing profile.
    ///
    /// # Returns
    /// Profile including the new window
    ///
    /// # Errors
    /// * `NotFound` - No profile for this account
    async fn add_availability(
        &self,
        id: &AccountId,
        window: AvailabilityWindow,
    ) -> Result<Doctor, DoctorError>;
}

/// Persistence operations for doctor profiles.
#[async_trait]
pub trait DoctorRepository: Send + Sync + 'static {
    /// Persist a new profile.
    ///
    /// # Errors
    /// * `AlreadyExists` - The account already owns a profile
    /// * `NotFound` - The owning account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, doctor: Doctor) -> Result<Doctor, DoctorError>;

    /// Retrieve profile with its availability.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Doctor>, DoctorError>;

    /// Remove profile if present, together with its availability.
    async fn delete(&self, id: &AccountId) -> Result<(), DoctorError>;

    /// Profiles matching every criterion in `filter`, ordered by account id.
    async fn filter(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DoctorError>;

    /// Append a window to a profile.
    ///
    /// # Errors
    /// * `NotFound` - No profile for this account
    async fn add_availability(
        &self,
        id: &AccountId,
        window: AvailabilityWindow,
    ) -> Result<(), DoctorError>;
}
