use std::collections::BTreeMap;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::BasicCredentials;
use auth::JwtHandler;
use chrono::DateTime;
use chrono::Utc;
use directory_service::account::errors::AccountError;
use directory_service::account::errors::IdentityConflict;
use directory_service::account::models::Account;
use directory_service::account::models::AccountId;
use directory_service::account::ports::AccountRepository;
use directory_service::account::service::AccountService;
use directory_service::appointment::errors::AppointmentError;
use directory_service::appointment::models::Appointment;
use directory_service::appointment::models::AppointmentSummary;
use directory_service::appointment::ports::AppointmentRepository;
use directory_service::appointment::service::AppointmentService;
use directory_service::doctor::errors::DoctorError;
use directory_service::doctor::models::AvailabilityWindow;
use directory_service::doctor::models::Doctor;
use directory_service::doctor::models::DoctorFilter;
use directory_service::doctor::ports::DoctorRepository;
use directory_service::doctor::service::DoctorService;
use directory_service::inbound::http::gateway::AuthGateway;
use directory_service::inbound::http::router::create_router;
use directory_service::inbound::http::router::AppState;
use directory_service::invitation::errors::InvitationError;
use directory_service::invitation::models::Invitation;
use directory_service::invitation::ports::InvitationRepository;
use directory_service::invitation::service::InvitationService;
use directory_service::provisioning::errors::NotificationError;
use directory_service::provisioning::models::NotificationTemplate;
use directory_service::provisioning::models::Recipient;
use directory_service::provisioning::ports::NotificationSender;
use directory_service::provisioning::service::ProvisioningService;
use directory_service::provisioning::service::ProvisioningSettings;
use serde_json::json;
use serde_json::Value;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const JWT_ISSUER: &str = "directory-service-test";
pub const OPERATOR_USERNAME: &str = "operator";
pub const OPERATOR_PASSWORD: &str = "operator-password";
pub const FRONTEND_URL: &str = "https://frontend.test";
pub const PASSWORD: &str = "pass_word!";

/// Test application that spawns a real server over in-memory adapters
pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let store = Arc::new(MemoryStore::default());
        let mailer = Arc::new(RecordingMailer::default());

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let authenticator = Arc::new(Authenticator::new(
            JWT_SECRET,
            JWT_ISSUER,
            chrono::Duration::hours(1),
        ));

        let account_service = Arc::new(AccountService::new(
            Arc::clone(&store),
            Arc::clone(&authenticator),
        ));
        let provisioning_service = Arc::new(ProvisioningService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&mailer),
            ProvisioningSettings {
                invitation_ttl: chrono::Duration::hours(72),
                frontend_url: format!("{}/", FRONTEND_URL),
            },
        ));
        let gateway = Arc::new(AuthGateway::new(
            BasicCredentials::new(OPERATOR_USERNAME, OPERATOR_PASSWORD),
            authenticator,
            account_service.clone(),
        ));

        let appointment_service = Arc::new(AppointmentService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
        ));

        let state = AppState {
            accounts: account_service,
            appointments: appointment_service,
            invitations: Arc::new(InvitationService::new(Arc::clone(&store))),
            doctors: Arc::new(DoctorService::new(Arc::clone(&store))),
            provisioning: provisioning_service,
            gateway,
        };

        let router = create_router(state);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            store,
            mailer,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(JWT_SECRET, JWT_ISSUER),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    pub async fn register_user(&self, username: &str, email: &str) -> reqwest::Response {
        self.post("/authentication/user")
            .json(&json!({
                "username": username,
                "email": email,
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn register_doctor(&self, body: Value) -> reqwest::Response {
        self.post("/doctors")
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn activate(&self, token: &str) -> reqwest::Response {
        self.put(&format!("/users/activate/{}", token))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn issue_token(&self, identifier: &str, password: &str) -> reqwest::Response {
        self.post("/authentication/token")
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register, activate and log in a generic user; returns (account id, bearer token).
    pub async fn active_user(&self, username: &str) -> (String, String) {
        let response = self
            .register_user(username, &format!("{}@example.com", username))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let token = self.mailer.last_activation_token().expect("no activation mail");
        assert_eq!(self.activate(&token).await.status(), reqwest::StatusCode::OK);

        let response = self.issue_token(username, PASSWORD).await;
        let body: Value = response.json().await.unwrap();
        let bearer = body["data"]["token"].as_str().unwrap().to_string();

        (id, bearer)
    }

    pub async fn schedule(&self, bearer: &str, body: Value) -> reqwest::Response {
        self.post_authenticated("/appointments", bearer)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register, activate and log in a doctor; returns (doctor id, bearer token).
    pub async fn active_doctor(&self, username: &str, specialization: &str) -> (String, String) {
        let response = self
            .register_doctor(doctor_body(username, specialization))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        let id = body["data"]["doctor"]["id"].as_str().unwrap().to_string();

        let token = self.mailer.last_activation_token().expect("no activation mail");
        assert_eq!(self.activate(&token).await.status(), reqwest::StatusCode::OK);

        let response = self.issue_token(username, PASSWORD).await;
        let body: Value = response.json().await.unwrap();
        let bearer = body["data"]["token"].as_str().unwrap().to_string();

        (id, bearer)
    }
}

/// A complete doctor registration body.
pub fn doctor_body(username: &str, specialization: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password": PASSWORD,
        "first_name": "Meredith",
        "last_name": "Grey",
        "age": 41,
        "gender": "female",
        "marital_status": "married",
        "designation": "Attending",
        "qualification": "MD",
        "blood_group": "O+",
        "address": "1 Main St",
        "country": "US",
        "state": "WA",
        "city": "Seattle",
        "postal_code": "98101",
        "specialization": specialization,
        "license_number": format!("WA-{}", username)
    })
}

/// Which store operations should fail on their next calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct Faults {
    pub doctor_create: bool,
    pub account_delete: bool,
}

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<AccountId, Account>,
    invitations: HashMap<String, Invitation>,
    doctors: BTreeMap<AccountId, Doctor>,
    appointments: Vec<Appointment>,
}

impl Tables {
    /// Drop an account with everything that references it.
    fn remove_account(&mut self, id: &AccountId) {
        self.accounts.remove(id);
        self.invitations
            .retain(|_, invitation| invitation.account_id != *id);
        self.remove_doctor(id);
        self.appointments
            .retain(|appointment| appointment.patient_id != *id);
    }

    fn remove_doctor(&mut self, id: &AccountId) {
        self.doctors.remove(id);
        self.appointments
            .retain(|appointment| appointment.doctor_id != *id);
    }
}

/// In-memory stand-in for every repository, with failure injection.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    faults: Mutex<Faults>,
}

impl MemoryStore {
    pub fn inject(&self, faults: Faults) {
        *self.faults.lock().unwrap() = faults;
    }

    fn faults(&self) -> Faults {
        *self.faults.lock().unwrap()
    }

    pub fn account_count(&self) -> usize {
        self.tables.lock().unwrap().accounts.len()
    }

    pub fn doctor_count(&self) -> usize {
        self.tables.lock().unwrap().doctors.len()
    }

    pub fn invitation_count(&self) -> usize {
        self.tables.lock().unwrap().invitations.len()
    }

    pub fn account_by_username(&self, username: &str) -> Option<Account> {
        self.tables
            .lock()
            .unwrap()
            .accounts
            .values()
            .find(|account| account.username.as_str() == username)
            .cloned()
    }

    /// Move every invitation's expiry into the past.
    pub fn expire_invitations(&self) {
        let past = Utc::now() - chrono::Duration::minutes(1);
        for invitation in self.tables.lock().unwrap().invitations.values_mut() {
            invitation.expires_at = past;
        }
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn create_with_invitation(
        &self,
        account: Account,
        invitation: Invitation,
    ) -> Result<Account, AccountError> {
        let mut tables = self.tables.lock().unwrap();

        for existing in tables.accounts.values() {
            if existing.username == account.username {
                return Err(AccountError::DuplicateIdentity(IdentityConflict::Username(
                    account.username.as_str().to_string(),
                )));
            }
            if existing.email == account.email {
                return Err(AccountError::DuplicateIdentity(IdentityConflict::Email(
                    account.email.as_str().to_string(),
                )));
            }
        }

        tables.accounts.insert(account.id, account.clone());
        tables
            .invitations
            .insert(invitation.token_hash.clone(), invitation);
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.tables.lock().unwrap().accounts.get(id).cloned())
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, AccountError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .accounts
            .values()
            .find(|a| a.username.as_str() == identifier || a.email.as_str() == identifier)
            .cloned())
    }

    async fn list_patients(&self) -> Result<Vec<Account>, AccountError> {
        let tables = self.tables.lock().unwrap();
        let mut patients: Vec<Account> = tables
            .accounts
            .values()
            .filter(|account| account.is_active && !tables.doctors.contains_key(&account.id))
            .cloned()
            .collect();
        patients.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()));
        Ok(patients)
    }

    async fn delete(&self, id: &AccountId) -> Result<(), AccountError> {
        if self.faults().account_delete {
            return Err(AccountError::DatabaseError("injected delete failure".to_string()));
        }

        self.tables.lock().unwrap().remove_account(id);
        Ok(())
    }
}

#[async_trait]
impl InvitationRepository for MemoryStore {
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Invitation>, InvitationError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .invitations
            .get(token_hash)
            .cloned())
    }

    async fn consume(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AccountId>, InvitationError> {
        let mut tables = self.tables.lock().unwrap();

        let live = tables
            .invitations
            .get(token_hash)
            .is_some_and(|invitation| !invitation.is_expired_at(now));
        if !live {
            return Ok(None);
        }

        let Some(invitation) = tables.invitations.remove(token_hash) else {
            return Ok(None);
        };
        if let Some(account) = tables.accounts.get_mut(&invitation.account_id) {
            account.is_active = true;
        }
        Ok(Some(invitation.account_id))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, InvitationError> {
        let mut tables = self.tables.lock().unwrap();

        let lapsed: Vec<AccountId> = tables
            .invitations
            .values()
            .filter(|invitation| invitation.is_expired_at(now))
            .map(|invitation| invitation.account_id)
            .filter(|id| tables.accounts.get(id).is_some_and(|a| !a.is_active))
            .collect();

        for id in &lapsed {
            tables.remove_account(id);
        }
        Ok(lapsed.len() as u64)
    }
}

#[async_trait]
impl DoctorRepository for MemoryStore {
    async fn create(&self, doctor: Doctor) -> Result<Doctor, DoctorError> {
        if self.faults().doctor_create {
            return Err(DoctorError::DatabaseError("injected create failure".to_string()));
        }

        let mut tables = self.tables.lock().unwrap();
        if !tables.accounts.contains_key(&doctor.id) {
            return Err(DoctorError::NotFound(format!("account {}", doctor.id)));
        }
        if tables.doctors.contains_key(&doctor.id) {
            return Err(DoctorError::AlreadyExists(doctor.id.to_string()));
        }
        tables.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Doctor>, DoctorError> {
        Ok(self.tables.lock().unwrap().doctors.get(id).cloned())
    }

    async fn delete(&self, id: &AccountId) -> Result<(), DoctorError> {
        self.tables.lock().unwrap().remove_doctor(id);
        Ok(())
    }

    async fn filter(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DoctorError> {
        // BTreeMap iteration is already ordered by id.
        Ok(self
            .tables
            .lock()
            .unwrap()
            .doctors
            .values()
            .filter(|doctor| filter.matches(doctor))
            .cloned()
            .collect())
    }

    async fn add_availability(
        &self,
        id: &AccountId,
        window: AvailabilityWindow,
    ) -> Result<(), DoctorError> {
        let mut tables = self.tables.lock().unwrap();
        let doctor = tables
            .doctors
            .get_mut(id)
            .ok_or_else(|| DoctorError::NotFound(id.to_string()))?;

        doctor.availability.push(window);
        doctor
            .availability
            .sort_by_key(|w| (w.day.num_days_from_monday(), w.starts_at));
        Ok(())
    }
}

#[async_trait]
impl AppointmentRepository for MemoryStore {
    async fn create(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.doctors.contains_key(&appointment.doctor_id) {
            return Err(AppointmentError::DoctorNotFound(
                appointment.doctor_id.to_string(),
            ));
        }
        if !tables.accounts.contains_key(&appointment.patient_id) {
            return Err(AppointmentError::PatientNotFound(
                appointment.patient_id.to_string(),
            ));
        }
        let taken = tables.appointments.iter().any(|booked| {
            booked.doctor_id == appointment.doctor_id
                && booked.scheduled_at == appointment.scheduled_at
        });
        if taken {
            return Err(AppointmentError::SlotTaken {
                doctor_id: appointment.doctor_id.to_string(),
                scheduled_at: appointment.scheduled_at,
            });
        }

        tables.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn list_involving(
        &self,
        account: &AccountId,
    ) -> Result<Vec<AppointmentSummary>, AppointmentError> {
        let tables = self.tables.lock().unwrap();
        let mut summaries: Vec<AppointmentSummary> = tables
            .appointments
            .iter()
            .filter(|a| a.doctor_id == *account || a.patient_id == *account)
            .filter_map(|a| {
                let doctor = tables.doctors.get(&a.doctor_id)?;
                let patient = tables.accounts.get(&a.patient_id)?;
                Some(AppointmentSummary {
                    appointment: a.clone(),
                    doctor_first_name: doctor.profile.first_name.clone(),
                    doctor_last_name: doctor.profile.last_name.clone(),
                    patient_username: patient.username.as_str().to_string(),
                })
            })
            .collect();
        summaries.sort_by_key(|s| (s.appointment.scheduled_at, s.appointment.id));
        Ok(summaries)
    }
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub template: NotificationTemplate,
    pub to: String,
    pub variables: Value,
}

/// Notification sender that records every message, or fails on demand.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    failing: Mutex<bool>,
}

impl RecordingMailer {
    pub fn fail(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Plain token at the end of the most recent activation link.
    pub fn last_activation_token(&self) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let link = sent.last()?.variables["activationURL"].as_str()?.to_string();
        link.rsplit('/').next().map(str::to_string)
    }
}

#[async_trait]
impl NotificationSender for RecordingMailer {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: &Recipient,
        variables: &Value,
    ) -> Result<u16, NotificationError> {
        if *self.failing.lock().unwrap() {
            return Err(NotificationError::Rejected {
                status: 503,
                reason: "mail api unavailable".to_string(),
            });
        }

        self.sent.lock().unwrap().push(SentMail {
            template,
            to: recipient.email.as_str().to_string(),
            variables: variables.clone(),
        });
        Ok(202)
    }
}

/// Log sink shared with a `tracing_subscriber::fmt` subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route every event on this thread into the sink while the guard lives.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
