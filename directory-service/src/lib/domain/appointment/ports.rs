use async_trait::async_trait;

use crate::account::models::AccountId;
use crate::appointment::errors::AppointmentError;
use crate::appointment::models::Appointment;
use crate::appointment::models::AppointmentSummary;
use crate::appointment::models::ScheduleAppointmentCommand;

/// Port for appointment booking.
#[async_trait]
pub trait AppointmentServicePort: Send + Sync + 'static {
    /// Book a future slot with an existing doctor for an active patient.
    ///
    /// # Errors
    /// * `NotInFuture` - Requested time has already passed
    /// * `SelfBooking` - Patient and doctor are the same account
    /// * `DoctorNotFound` - No profile for `doctor_id`
    /// * `PatientNotFound` - No account for `patient_id`
    /// * `PatientNotActivated` - Patient never consumed their invitation
    /// * `SlotTaken` - Doctor already booked at that instant
    async fn schedule(
        &self,
        command: ScheduleAppointmentCommand,
    ) -> Result<Appointment, AppointmentError>;

    /// Appointments where `account` is the doctor or the patient, soonest first.
    async fn list_for(
        &self,
        account: &AccountId,
    ) -> Result<Vec<AppointmentSummary>, AppointmentError>;
}

/// Persistence operations for appointments.
#[async_trait]
pub trait AppointmentRepository: Send + Sync + 'static {
    /// # Errors
    /// * `SlotTaken` - Doctor already booked at that instant
    /// * `DoctorNotFound` / `PatientNotFound` - A party vanished before the insert
    async fn create(&self, appointment: Appointment) -> Result<Appointment, AppointmentError>;

    /// Appointments involving `account`, ordered by time then id.
    async fn list_involving(
        &self,
        account: &AccountId,
    ) -> Result<Vec<AppointmentSummary>, AppointmentError>;
}
