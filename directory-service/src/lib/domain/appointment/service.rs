use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::account::models::AccountId;
use crate::account::ports::AccountRepository;
use crate::appointment::errors::AppointmentError;
use crate::appointment::models::Appointment;
use crate::appointment::models::AppointmentId;
use crate::appointment::models::AppointmentSummary;
use crate::appointment::models::ScheduleAppointmentCommand;
use crate::appointment::ports::AppointmentRepository;
use crate::appointment::ports::AppointmentServicePort;
use crate::doctor::ports::DoctorRepository;

/// Domain service implementation for appointment booking.
pub struct AppointmentService<PR, AR, DR>
where
    PR: AppointmentRepository,
    AR: AccountRepository,
    DR: DoctorRepository,
{
    appointments: Arc<PR>,
    accounts: Arc<AR>,
    doctors: Arc<DR>,
}

impl<PR, AR, DR> AppointmentService<PR, AR, DR>
where
    PR: AppointmentRepository,
    AR: AccountRepository,
    DR: DoctorRepository,
{
    pub fn new(appointments: Arc<PR>, accounts: Arc<AR>, doctors: Arc<DR>) -> Self {
        Self {
            appointments,
            accounts,
            doctors,
        }
    }
}

#[async_trait]
impl<PR, AR, DR> AppointmentServicePort for AppointmentService<PR, AR, DR>
where
    PR: AppointmentRepository,
    AR: AccountRepository,
    DR: DoctorRepository,
{
    async fn schedule(
        &self,
        command: ScheduleAppointmentCommand,
    ) -> Result<Appointment, AppointmentError> {
        let now = Utc::now();
        if command.scheduled_at <= now {
            return Err(AppointmentError::NotInFuture(command.scheduled_at));
        }
        if command.doctor_id == command.patient_id {
            return Err(AppointmentError::SelfBooking);
        }

        self.doctors
            .find_by_id(&command.doctor_id)
            .await?
            .ok_or_else(|| AppointmentError::DoctorNotFound(command.doctor_id.to_string()))?;

        let patient = self
            .accounts
            .find_by_id(&command.patient_id)
            .await?
            .ok_or_else(|| AppointmentError::PatientNotFound(command.patient_id.to_string()))?;
        if !patient.is_active {
            return Err(AppointmentError::PatientNotActivated(patient.id.to_string()));
        }

        let appointment = self
            .appointments
            .create(Appointment {
                id: AppointmentId::new(),
                doctor_id: command.doctor_id,
                patient_id: command.patient_id,
                scheduled_at: command.scheduled_at,
                created_at: now,
            })
            .await?;

        tracing::info!(
            appointment_id = %appointment.id,
            doctor_id = %appointment.doctor_id,
            patient_id = %appointment.patient_id,
            scheduled_at = %appointment.scheduled_at,
            "Appointment scheduled"
        );

        Ok(appointment)
    }

    async fn list_for(
        &self,
        account: &AccountId,
    ) -> Result<Vec<AppointmentSummary>, AppointmentError> {
        self.appointments.list_involving(account).await
    }
}
