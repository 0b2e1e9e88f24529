use std::future::Future;
use std::time::Duration;

pub mod account;
pub mod appointment;
pub mod doctor;
pub mod invitation;

pub use account::PostgresAccountRepository;
pub use appointment::PostgresAppointmentRepository;
pub use doctor::PostgresDoctorRepository;
pub use invitation::PostgresInvitationRepository;

/// Why a bounded store call did not produce a value.
#[derive(Debug)]
pub enum StoreFailure {
    TimedOut(Duration),
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreFailure {
    fn from(err: sqlx::Error) -> Self {
        StoreFailure::Database(err)
    }
}

/// Run a store operation with an upper bound on its duration.
///
/// On timeout the operation future is dropped, which rolls back any open
/// transaction it owns.
pub async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T, StoreFailure>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result.map_err(StoreFailure::Database),
        Err(_) => {
            tracing::warn!(limit_ms = limit.as_millis() as u64, "Store operation timed out");
            Err(StoreFailure::TimedOut(limit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let result = bounded(Duration::from_secs(1), async { Ok::<_, sqlx::Error>(7) }).await;
        assert!(matches!(result, Ok(7)));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, sqlx::Error>(())
        };

        let result = bounded(Duration::from_millis(10), slow).await;
        assert!(matches!(result, Err(StoreFailure::TimedOut(_))));
    }

    #[tokio::test]
    async fn test_bounded_maps_database_errors() {
        let result = bounded(Duration::from_secs(1), async {
            Err::<(), _>(sqlx::Error::RowNotFound)
        })
        .await;
        assert!(matches!(
            result,
            Err(StoreFailure::Database(sqlx::Error::RowNotFound))
        ));
    }
}
