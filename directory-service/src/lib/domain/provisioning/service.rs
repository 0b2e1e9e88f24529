use std::sync::Arc;

use async_trait::async_trait;
use auth::InvitationTokens;
use auth::IssuedToken;
use auth::PasswordHasher;
use chrono::Duration;
use chrono::Utc;
use serde_json::json;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::ports::AccountRepository;
use crate::doctor::errors::DoctorError;
use crate::doctor::models::Doctor;
use crate::doctor::ports::DoctorRepository;
use crate::domain::blocking::offload;
use crate::invitation::models::Invitation;
use crate::provisioning::errors::NotificationError;
use crate::provisioning::errors::ProvisioningError;
use crate::provisioning::models::NotificationTemplate;
use crate::provisioning::models::ProvisionedDoctor;
use crate::provisioning::models::Recipient;
use crate::provisioning::models::RegisterDoctorCommand;
use crate::provisioning::models::RegisterUserCommand;
use crate::provisioning::ports::NotificationSender;
use crate::provisioning::ports::ProvisioningServicePort;
use crate::provisioning::saga::Saga;

/// Tunables for registration.
#[derive(Debug, Clone)]
pub struct ProvisioningSettings {
    /// How long an activation link stays valid.
    pub invitation_ttl: Duration,
    /// Base URL the activation path is appended to.
    pub frontend_url: String,
}

/// Registration workflows run as compensating sagas.
///
/// Steps: create account with invitation, create profile (doctors only),
/// send welcome notification. A failure rolls back every earlier step.
pub struct ProvisioningService<AR, DR, NS>
where
    AR: AccountRepository,
    DR: DoctorRepository,
    NS: NotificationSender,
{
    accounts: Arc<AR>,
    doctors: Arc<DR>,
    notifier: Arc<NS>,
    password_hasher: PasswordHasher,
    tokens: InvitationTokens,
    settings: ProvisioningSettings,
}

impl<AR, DR, NS> ProvisioningService<AR, DR, NS>
where
    AR: AccountRepository,
    DR: DoctorRepository,
    NS: NotificationSender,
{
    pub fn new(
        accounts: Arc<AR>,
        doctors: Arc<DR>,
        notifier: Arc<NS>,
        settings: ProvisioningSettings,
    ) -> Self {
        Self {
            accounts,
            doctors,
            notifier,
            password_hasher: PasswordHasher::new(),
            tokens: InvitationTokens::new(),
            settings,
        }
    }

    async fn create_account(
        &self,
        command: RegisterUserCommand,
    ) -> Result<(Account, IssuedToken), AccountError> {
        let hasher = self.password_hasher;
        let password = command.password.clone();
        let password_hash = offload(move || hasher.hash(password.expose()))
            .await
            .map_err(|e| AccountError::Hashing(e.to_string()))??;
        let issued = self.tokens.issue();
        let now = Utc::now();

        let account = Account {
            id: AccountId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            is_active: false,
            created_at: now,
        };
        let invitation = Invitation::new(
            account.id,
            issued.hash.clone(),
            now,
            self.settings.invitation_ttl,
        );

        let account = self
            .accounts
            .create_with_invitation(account, invitation)
            .await?;

        tracing::info!(account_id = %account.id, username = %account.username, "Pending account created");

        Ok((account, issued))
    }

    fn compensate_account(&self, saga: &mut Saga, id: AccountId) {
        let accounts = Arc::clone(&self.accounts);
        saga.compensate_with("delete_account", id, async move {
            accounts.delete(&id).await
        });
    }

    fn compensate_profile(&self, saga: &mut Saga, id: AccountId) {
        let doctors = Arc::clone(&self.doctors);
        saga.compensate_with("delete_profile", id, async move {
            doctors.delete(&id).await
        });
    }

    fn activation_url(&self, token: &IssuedToken) -> String {
        format!(
            "{}/confirm/{}",
            self.settings.frontend_url.trim_end_matches('/'),
            token.plain
        )
    }

    async fn send_welcome(
        &self,
        template: NotificationTemplate,
        account: &Account,
        token: &IssuedToken,
    ) -> Result<(), NotificationError> {
        let variables = json!({
            "username": account.username.as_str(),
            "activationURL": self.activation_url(token),
        });

        let status = self
            .notifier
            .send(template, &Recipient::from(account), &variables)
            .await?;

        tracing::info!(account_id = %account.id, ?template, status, "Welcome notification sent");
        Ok(())
    }
}

#[async_trait]
impl<AR, DR, NS> ProvisioningServicePort for ProvisioningService<AR, DR, NS>
where
    AR: AccountRepository,
    DR: DoctorRepository,
    NS: NotificationSender,
{
    async fn register_user(
        &self,
        command: RegisterUserCommand,
    ) -> Result<Account, ProvisioningError> {
        let mut saga = Saga::new("register_user");

        // Nothing is persisted when this step fails.
        let (account, token) = self.create_account(command).await?;
        self.compensate_account(&mut saga, account.id);

        if let Err(e) = self
            .send_welcome(NotificationTemplate::UserWelcome, &account, &token)
            .await
        {
            return Err(saga.abort(e.into()).await);
        }

        saga.complete();
        Ok(account)
    }

    async fn register_doctor(
        &self,
        command: RegisterDoctorCommand,
    ) -> Result<ProvisionedDoctor, ProvisioningError> {
        let profile = command.profile.validated().map_err(DoctorError::from)?;

        let mut saga = Saga::new("register_doctor");

        let (account, token) = self.create_account(command.account).await?;
        self.compensate_account(&mut saga, account.id);

        let doctor = match self
            .doctors
            .create(Doctor::new(account.id, profile, account.created_at))
            .await
        {
            Ok(doctor) => doctor,
            Err(e) => return Err(saga.abort(e.into()).await),
        };
        self.compensate_profile(&mut saga, doctor.id);

        if let Err(e) = self
            .send_welcome(NotificationTemplate::DoctorWelcome, &account, &token)
            .await
        {
            return Err(saga.abort(e.into()).await);
        }

        saga.complete();
        tracing::info!(doctor_id = %doctor.id, "Doctor registered");

        Ok(ProvisionedDoctor { account, doctor })
    }
}
