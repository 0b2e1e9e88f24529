use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::BasicCredentials;
use directory_service::account::service::AccountService;
use directory_service::appointment::service::AppointmentService;
use directory_service::config::Config;
use directory_service::doctor::service::DoctorService;
use directory_service::inbound::http::gateway::AuthGateway;
use directory_service::inbound::http::router::create_router;
use directory_service::inbound::http::router::AppState;
use directory_service::invitation::ports::InvitationServicePort;
use directory_service::invitation::service::InvitationService;
use directory_service::outbound::notifications::HttpMailer;
use directory_service::provisioning::service::ProvisioningService;
use directory_service::provisioning::service::ProvisioningSettings;
use directory_service::repositories::PostgresAccountRepository;
use directory_service::repositories::PostgresAppointmentRepository;
use directory_service::repositories::PostgresDoctorRepository;
use directory_service::repositories::PostgresInvitationRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "directory_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "directory-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        query_timeout_secs = config.database.query_timeout_secs,
        frontend_url = %config.frontend_url,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let query_timeout = config.database.query_timeout();
    let account_repository = Arc::new(PostgresAccountRepository::new(
        pg_pool.clone(),
        query_timeout,
    ));
    let invitation_repository = Arc::new(PostgresInvitationRepository::new(
        pg_pool.clone(),
        query_timeout,
    ));
    let appointment_repository = Arc::new(PostgresAppointmentRepository::new(
        pg_pool.clone(),
        query_timeout,
    ));
    let doctor_repository = Arc::new(PostgresDoctorRepository::new(pg_pool, query_timeout));
    let mailer = Arc::new(HttpMailer::new(&config.mail)?);

    let authenticator = Arc::new(Authenticator::new(
        config.jwt.secret.as_bytes(),
        config.jwt.issuer.clone(),
        chrono::Duration::hours(config.jwt.expiration_hours),
    ));

    let account_service = Arc::new(AccountService::new(
        Arc::clone(&account_repository),
        Arc::clone(&authenticator),
    ));
    let invitation_service = Arc::new(InvitationService::new(invitation_repository));
    let doctor_service = Arc::new(DoctorService::new(Arc::clone(&doctor_repository)));
    let appointment_service = Arc::new(AppointmentService::new(
        appointment_repository,
        Arc::clone(&account_repository),
        Arc::clone(&doctor_repository),
    ));
    let provisioning_service = Arc::new(ProvisioningService::new(
        account_repository,
        doctor_repository,
        mailer,
        ProvisioningSettings {
            invitation_ttl: chrono::Duration::hours(config.invitation.expiration_hours),
            frontend_url: config.frontend_url.clone(),
        },
    ));

    let gateway = Arc::new(AuthGateway::new(
        BasicCredentials::new(
            config.basic_auth.username.clone(),
            config.basic_auth.password.clone(),
        ),
        authenticator,
        account_service.clone(),
    ));

    let sweeper = spawn_invitation_sweeper(
        invitation_service.clone(),
        Duration::from_secs(config.invitation.sweep_interval_secs),
    );

    let state = AppState {
        accounts: account_service,
        appointments: appointment_service,
        invitations: invitation_service,
        doctors: doctor_service,
        provisioning: provisioning_service,
        gateway,
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let result = axum::serve(http_listener, create_router(state)).await;
    sweeper.abort();

    match result {
        Ok(()) => tracing::info!("Server exited successfully"),
        Err(ref e) => tracing::error!(error = %e, "Server error"),
    }

    Ok(result?)
}

/// Periodically remove pending accounts whose invitation lapsed.
fn spawn_invitation_sweeper(
    invitations: Arc<dyn InvitationServicePort>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            if let Err(e) = invitations.purge_expired().await {
                tracing::error!(error = %e, "Invitation sweep failed");
            }
        }
    })
}
