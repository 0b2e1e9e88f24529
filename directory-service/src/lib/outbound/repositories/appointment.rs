use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use super::bounded;
use super::StoreFailure;
use crate::account::models::AccountId;
use crate::appointment::errors::AppointmentError;
use crate::appointment::models::Appointment;
use crate::appointment::models::AppointmentId;
use crate::appointment::models::AppointmentSummary;
use crate::appointment::ports::AppointmentRepository;

pub struct PostgresAppointmentRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresAppointmentRepository {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    fn row_to_summary(row: &PgRow) -> Result<AppointmentSummary, sqlx::Error> {
        Ok(AppointmentSummary {
            appointment: Appointment {
                id: AppointmentId(row.try_get("id")?),
                doctor_id: AccountId(row.try_get("doctor_id")?),
                patient_id: AccountId(row.try_get("patient_id")?),
                scheduled_at: row.try_get("scheduled_at")?,
                created_at: row.try_get("created_at")?,
            },
            doctor_first_name: row.try_get("doctor_first_name")?,
            doctor_last_name: row.try_get("doctor_last_name")?,
            patient_username: row.try_get("patient_username")?,
        })
    }

    /// Name the constraint a booking lost against.
    fn constraint_or_failure(err: sqlx::Error, appointment: &Appointment) -> AppointmentError {
        if let Some(db_err) = err.as_database_error() {
            match db_err.constraint() {
                Some("appointments_doctor_slot_key") if db_err.is_unique_violation() => {
                    return AppointmentError::SlotTaken {
                        doctor_id: appointment.doctor_id.to_string(),
                        scheduled_at: appointment.scheduled_at,
                    }
                }
                Some("appointments_doctor_id_fkey") if db_err.is_foreign_key_violation() => {
                    return AppointmentError::DoctorNotFound(appointment.doctor_id.to_string())
                }
                Some("appointments_patient_id_fkey") if db_err.is_foreign_key_violation() => {
                    return AppointmentError::PatientNotFound(appointment.patient_id.to_string())
                }
                _ => {}
            }
        }
        StoreFailure::Database(err).into()
    }
}

impl From<StoreFailure> for AppointmentError {
    fn from(failure: StoreFailure) -> Self {
        match failure {
            StoreFailure::TimedOut(limit) => {
                AppointmentError::Timeout(format!("no answer within {:?}", limit))
            }
            StoreFailure::Database(err) => AppointmentError::DatabaseError(err.to_string()),
        }
    }
}

#[async_trait]
impl AppointmentRepository for PostgresAppointmentRepository {
    async fn create(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        bounded(
            self.query_timeout,
            sqlx::query(
                r#"
                INSERT INTO appointments (id, doctor_id, patient_id, scheduled_at, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(appointment.id.0)
            .bind(appointment.doctor_id.0)
            .bind(appointment.patient_id.0)
            .bind(appointment.scheduled_at)
            .bind(appointment.created_at)
            .execute(&self.pool),
        )
        .await
        .map_err(|failure| match failure {
            StoreFailure::Database(err) => Self::constraint_or_failure(err, &appointment),
            timed_out => timed_out.into(),
        })?;

        Ok(appointment)
    }

    async fn list_involving(
        &self,
        account: &AccountId,
    ) -> Result<Vec<AppointmentSummary>, AppointmentError> {
        let rows = bounded(
            self.query_timeout,
            sqlx::query(
                r#"
                SELECT a.id, a.doctor_id, a.patient_id, a.scheduled_at, a.created_at,
                       d.first_name AS doctor_first_name,
                       d.last_name AS doctor_last_name,
                       p.username AS patient_username
                FROM appointments a
                JOIN doctors d ON d.id = a.doctor_id
                JOIN users p ON p.id = a.patient_id
                WHERE a.doctor_id = $1 OR a.patient_id = $1
                ORDER BY a.scheduled_at, a.id
                "#,
            )
            .bind(account.0)
            .fetch_all(&self.pool),
        )
        .await?;

        rows.iter()
            .map(Self::row_to_summary)
            .collect::<Result<_, _>>()
            .map_err(|err| StoreFailure::from(err).into())
    }
}
