use async_trait::async_trait;

use crate::account::models::Account;
use crate::provisioning::errors::NotificationError;
use crate::provisioning::errors::ProvisioningError;
use crate::provisioning::models::NotificationTemplate;
use crate::provisioning::models::ProvisionedDoctor;
use crate::provisioning::models::Recipient;
use crate::provisioning::models::RegisterDoctorCommand;
use crate::provisioning::models::RegisterUserCommand;

/// Port for registration workflows.
#[async_trait]
pub trait ProvisioningServicePort: Send + Sync + 'static {
    /// Create a pending account and send its activation link.
    ///
    /// # Errors
    /// * `Account` - Validation, duplicate identity or storage failure
    /// * `Notification` - Welcome message failed; the account was rolled back
    /// * `ConsistencyRisk` - Rollback failed after an earlier error
    async fn register_user(&self, command: RegisterUserCommand)
        -> Result<Account, ProvisioningError>;

    /// Create a pending account with a doctor profile and send its activation link.
    ///
    /// # Errors
    /// * `Account` - Validation, duplicate identity or storage failure
    /// * `Profile` - Profile insert failed; the account was rolled back
    /// * `Notification` - Welcome message failed; profile and account were rolled back
    /// * `ConsistencyRisk` - Rollback failed after an earlier error
    async fn register_doctor(
        &self,
        command: RegisterDoctorCommand,
    ) -> Result<ProvisionedDoctor, ProvisioningError>;
}

/// Outbound delivery of templated messages.
#[async_trait]
pub trait NotificationSender: Send + Sync + 'static {
    /// Deliver `template` to `recipient` with `variables` substituted.
    ///
    /// # Returns
    /// Status code reported by the delivery channel; any `Ok` counts as delivered
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: &Recipient,
        variables: &serde_json::Value,
    ) -> Result<u16, NotificationError>;
}
