use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Weekday;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::QueryBuilder;
use sqlx::Row;
use uuid::Uuid;

use super::bounded;
use super::StoreFailure;
use crate::account::models::AccountId;
use crate::doctor::errors::DoctorError;
use crate::doctor::models::AvailabilityWindow;
use crate::doctor::models::Doctor;
use crate::doctor::models::DoctorFilter;
use crate::doctor::models::DoctorProfile;
use crate::doctor::ports::DoctorRepository;

const DOCTOR_COLUMNS: &str = "d.id, d.first_name, d.last_name, d.age, d.gender, \
    d.marital_status, d.designation, d.qualification, d.blood_group, d.address, \
    d.country, d.state, d.city, d.postal_code, d.specialization, d.license_number, \
    d.created_at";

pub struct PostgresDoctorRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PostgresDoctorRepository {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Build the directory query for `filter`.
    ///
    /// Only supplied criteria become predicates; values are always bound.
    /// Availability is an `EXISTS` sub-query so matching never trims the
    /// window list loaded afterwards.
    fn search_query(filter: &DoctorFilter) -> QueryBuilder<'_, Postgres> {
        let mut query = QueryBuilder::new("SELECT ");
        query.push(DOCTOR_COLUMNS);
        query.push(" FROM doctors d WHERE TRUE");

        for (attribute, value) in filter.attributes() {
            query
                .push(" AND d.")
                .push(attribute.column())
                .push(" = ")
                .push_bind(value);
        }

        if let Some(availability) = filter.availability() {
            query
                .push(" AND EXISTS (SELECT 1 FROM availability a WHERE a.doctor_id = d.id")
                .push(" AND a.day_of_week = ")
                .push_bind(day_index(availability.day));
            if let Some(at) = availability.at {
                query
                    .push(" AND a.starts_at <= ")
                    .push_bind(at)
                    .push(" AND a.ends_at >= ")
                    .push_bind(at);
            }
            query.push(")");
        }

        query.push(" ORDER BY d.id");
        query
    }

    fn row_to_doctor(row: &PgRow) -> Result<Doctor, sqlx::Error> {
        Ok(Doctor {
            id: AccountId(row.try_get("id")?),
            profile: DoctorProfile {
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                age: row.try_get("age")?,
                gender: row.try_get("gender")?,
                marital_status: row.try_get("marital_status")?,
                designation: row.try_get("designation")?,
                qualification: row.try_get("qualification")?,
                blood_group: row.try_get("blood_group")?,
                address: row.try_get("address")?,
                country: row.try_get("country")?,
                state: row.try_get("state")?,
                city: row.try_get("city")?,
                postal_code: row.try_get("postal_code")?,
                specialization: row.try_get("specialization")?,
                license_number: row.try_get("license_number")?,
            },
            availability: Vec::new(),
            created_at: row.try_get("created_at")?,
        })
    }

    /// Attach every availability window to its doctor, ordered by day then start.
    async fn with_availability(&self, mut doctors: Vec<Doctor>) -> Result<Vec<Doctor>, DoctorError> {
        if doctors.is_empty() {
            return Ok(doctors);
        }

        let ids: Vec<Uuid> = doctors.iter().map(|doctor| doctor.id.0).collect();
        let rows = bounded(
            self.query_timeout,
            sqlx::query(
                r#"
                SELECT doctor_id, day_of_week, starts_at, ends_at
                FROM availability
                WHERE doctor_id = ANY($1)
                ORDER BY doctor_id, day_of_week, starts_at, id
                "#,
            )
            .bind(ids)
            .fetch_all(&self.pool),
        )
        .await?;

        let mut windows: HashMap<Uuid, Vec<AvailabilityWindow>> = HashMap::new();
        for row in &rows {
            let doctor_id: Uuid = row.try_get("doctor_id").map_err(StoreFailure::from)?;
            let index: i16 = row.try_get("day_of_week").map_err(StoreFailure::from)?;
            let day = weekday_from_index(index).ok_or_else(|| {
                DoctorError::DatabaseError(format!("invalid day_of_week {} stored", index))
            })?;

            windows.entry(doctor_id).or_default().push(AvailabilityWindow {
                day,
                starts_at: row.try_get("starts_at").map_err(StoreFailure::from)?,
                ends_at: row.try_get("ends_at").map_err(StoreFailure::from)?,
            });
        }

        for doctor in &mut doctors {
            doctor.availability = windows.remove(&doctor.id.0).unwrap_or_default();
        }
        Ok(doctors)
    }

    fn create_failure(err: sqlx::Error, id: &AccountId) -> DoctorError {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return DoctorError::AlreadyExists(id.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return DoctorError::NotFound(format!("account {}", id));
            }
        }
        StoreFailure::Database(err).into()
    }
}

fn day_index(day: Weekday) -> i16 {
    day.num_days_from_monday() as i16
}

fn weekday_from_index(index: i16) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

impl From<StoreFailure> for DoctorError {
    fn from(failure: StoreFailure) -> Self {
        match failure {
            StoreFailure::TimedOut(limit) => {
                DoctorError::Timeout(format!("no answer within {:?}", limit))
            }
            StoreFailure::Database(err) => DoctorError::DatabaseError(err.to_string()),
        }
    }
}

#[async_trait]
impl DoctorRepository for PostgresDoctorRepository {
    async fn create(&self, doctor: Doctor) -> Result<Doctor, DoctorError> {
        let profile = &doctor.profile;
        bounded(
            self.query_timeout,
            sqlx::query(
                r#"
                INSERT INTO doctors (
                    id, first_name, last_name, age, gender, marital_status, designation,
                    qualification, blood_group, address, country, state, city, postal_code,
                    specialization, license_number, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                "#,
            )
            .bind(doctor.id.0)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(profile.age)
            .bind(&profile.gender)
            .bind(&profile.marital_status)
            .bind(&profile.designation)
            .bind(&profile.qualification)
            .bind(&profile.blood_group)
            .bind(&profile.address)
            .bind(&profile.country)
            .bind(&profile.state)
            .bind(&profile.city)
            .bind(&profile.postal_code)
            .bind(&profile.specialization)
            .bind(&profile.license_number)
            .bind(doctor.created_at)
            .execute(&self.pool),
        )
        .await
        .map_err(|failure| match failure {
            StoreFailure::Database(err) => Self::create_failure(err, &doctor.id),
            timed_out => timed_out.into(),
        })?;

        Ok(doctor)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Doctor>, DoctorError> {
        let query = format!("SELECT {} FROM doctors d WHERE d.id = $1", DOCTOR_COLUMNS);
        let row = bounded(
            self.query_timeout,
            sqlx::query(&query).bind(id.0).fetch_optional(&self.pool),
        )
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let doctor = Self::row_to_doctor(&row).map_err(StoreFailure::from)?;

        Ok(self.with_availability(vec![doctor]).await?.pop())
    }

    async fn delete(&self, id: &AccountId) -> Result<(), DoctorError> {
        bounded(
            self.query_timeout,
            sqlx::query("DELETE FROM doctors WHERE id = $1")
                .bind(id.0)
                .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn filter(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DoctorError> {
        let mut query = Self::search_query(filter);
        let rows = bounded(self.query_timeout, query.build().fetch_all(&self.pool)).await?;

        let doctors = rows
            .iter()
            .map(Self::row_to_doctor)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreFailure::from)?;

        self.with_availability(doctors).await
    }

    async fn add_availability(
        &self,
        id: &AccountId,
        window: AvailabilityWindow,
    ) -> Result<(), DoctorError> {
        bounded(
            self.query_timeout,
            sqlx::query(
                r#"
                INSERT INTO availability (doctor_id, day_of_week, starts_at, ends_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id.0)
            .bind(day_index(window.day))
            .bind(window.starts_at)
            .bind(window.ends_at)
            .execute(&self.pool),
        )
        .await
        .map_err(|failure| match failure {
            StoreFailure::Database(err)
                if err
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_foreign_key_violation()) =>
            {
                DoctorError::NotFound(id.to_string())
            }
            other => other.into(),
        })?;

        Ok(())
    }
}
