use std::fmt::Display;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::provisioning::errors::CompensationFailure;
use crate::provisioning::errors::ProvisioningError;

struct Compensation {
    step: &'static str,
    subject: String,
    action: BoxFuture<'static, Result<(), String>>,
}

/// Stack of compensating actions for a multi-step workflow.
///
/// Each completed step registers the action that undoes it. `abort` runs the
/// registered actions newest first; `complete` discards them unrun.
pub struct Saga {
    name: &'static str,
    compensations: Vec<Compensation>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            compensations: Vec::new(),
        }
    }

    /// Register the action undoing a step that just succeeded.
    ///
    /// `action` is not polled until `abort`.
    pub fn compensate_with<F, E>(&mut self, step: &'static str, subject: impl Display, action: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display,
    {
        self.compensations.push(Compensation {
            step,
            subject: subject.to_string(),
            action: async move { action.await.map_err(|e| e.to_string()) }.boxed(),
        });
    }

    /// Number of registered, not yet executed compensations.
    pub fn pending(&self) -> usize {
        self.compensations.len()
    }

    /// Roll back every registered step in reverse order.
    ///
    /// # Returns
    /// `cause` unchanged when every compensation succeeded, otherwise
    /// `ConsistencyRisk` wrapping `cause` and each failed compensation.
    /// Later compensations still run after an earlier one fails.
    pub async fn abort(mut self, cause: ProvisioningError) -> ProvisioningError {
        tracing::warn!(
            saga = self.name,
            error = %cause,
            pending = self.compensations.len(),
            "Rolling back"
        );

        let mut failures = Vec::new();
        while let Some(compensation) = self.compensations.pop() {
            match compensation.action.await {
                Ok(()) => tracing::info!(
                    saga = self.name,
                    step = compensation.step,
                    subject = %compensation.subject,
                    "Compensation applied"
                ),
                Err(reason) => {
                    tracing::error!(
                        saga = self.name,
                        step = compensation.step,
                        subject = %compensation.subject,
                        error = %reason,
                        "Compensation failed"
                    );
                    failures.push(CompensationFailure {
                        step: compensation.step,
                        subject: compensation.subject,
                        reason,
                    });
                }
            }
        }

        if failures.is_empty() {
            return cause;
        }

        let error = ProvisioningError::ConsistencyRisk {
            cause: Box::new(cause),
            failures,
        };
        tracing::error!(
            saga = self.name,
            error = %error,
            "Rollback incomplete, manual reconciliation required"
        );
        error
    }

    /// Finish the workflow, dropping all compensations.
    pub fn complete(self) {
        tracing::debug!(
            saga = self.name,
            steps = self.compensations.len(),
            "Saga completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;
    use crate::provisioning::errors::NotificationError;

    fn journal() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn record(
        journal: &Arc<Mutex<Vec<&'static str>>>,
        entry: &'static str,
        outcome: Result<(), &'static str>,
    ) -> impl Future<Output = Result<(), &'static str>> + Send + 'static {
        let journal = Arc::clone(journal);
        async move {
            journal.lock().unwrap().push(entry);
            outcome
        }
    }

    fn cause() -> ProvisioningError {
        NotificationError::Transport("connection refused".to_string()).into()
    }

    #[tokio::test]
    async fn test_abort_runs_compensations_in_reverse() {
        let journal = journal();
        let mut saga = Saga::new("test");
        saga.compensate_with("first", "a", record(&journal, "first", Ok(())));
        saga.compensate_with("second", "b", record(&journal, "second", Ok(())));
        saga.compensate_with("third", "c", record(&journal, "third", Ok(())));
        assert_eq!(saga.pending(), 3);

        let error = saga.abort(cause()).await;

        assert!(matches!(error, ProvisioningError::Notification(_)));
        assert_eq!(*journal.lock().unwrap(), vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_failed_compensation_is_reported_as_consistency_risk() {
        let journal = journal();
        let mut saga = Saga::new("test");
        saga.compensate_with("delete_account", "acc-1", record(&journal, "account", Ok(())));
        saga.compensate_with(
            "delete_profile",
            "acc-1",
            record(&journal, "profile", Err("connection reset")),
        );

        let error = saga.abort(cause()).await;

        // The older compensation still ran after the newer one failed.
        assert_eq!(*journal.lock().unwrap(), vec!["profile", "account"]);
        match error {
            ProvisioningError::ConsistencyRisk { cause, failures } => {
                assert!(matches!(*cause, ProvisioningError::Notification(_)));
                assert_eq!(
                    failures,
                    vec![CompensationFailure {
                        step: "delete_profile",
                        subject: "acc-1".to_string(),
                        reason: "connection reset".to_string(),
                    }]
                );
            }
            other => panic!("expected ConsistencyRisk, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_does_not_run_compensations() {
        let journal = journal();
        let mut saga = Saga::new("test");
        saga.compensate_with("first", "a", record(&journal, "first", Ok(())));

        saga.complete();

        assert!(journal.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_abort_without_steps_returns_cause() {
        let error = Saga::new("test").abort(cause()).await;
        assert!(matches!(error, ProvisioningError::Notification(_)));
    }
}
