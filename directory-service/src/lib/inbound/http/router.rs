use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::gateway::AuthGateway;
use super::handlers::activate::activate;
use super::handlers::add_availability::add_availability;
use super::handlers::get_doctor::get_doctor;
use super::handlers::get_user::get_user;
use super::handlers::health::health;
use super::handlers::issue_token::issue_token;
use super::handlers::list_appointments::list_appointments;
use super::handlers::list_patients::list_patients;
use super::handlers::register_doctor::register_doctor;
use super::handlers::register_user::register_user;
use super::handlers::schedule_appointment::schedule_appointment;
use super::handlers::search_doctors::search_doctors;
use super::middleware::doctor_context;
use super::middleware::require_basic;
use super::middleware::require_bearer;
use crate::account::ports::AccountServicePort;
use crate::appointment::ports::AppointmentServicePort;
use crate::doctor::ports::DoctorServicePort;
use crate::invitation::ports::InvitationServicePort;
use crate::provisioning::ports::ProvisioningServicePort;

/// Shared handles for every request.
///
/// Services are held behind their ports so any adapter set can back the router.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountServicePort>,
    pub appointments: Arc<dyn AppointmentServicePort>,
    pub invitations: Arc<dyn InvitationServicePort>,
    pub doctors: Arc<dyn DoctorServicePort>,
    pub provisioning: Arc<dyn ProvisioningServicePort>,
    pub gateway: Arc<AuthGateway>,
}

/// Route pattern the request matched, never the concrete path: path
/// segments can carry secrets such as activation tokens.
fn route_template(request: &Request<Body>) -> &str {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or("<unmatched>")
}

pub fn create_router(state: AppState) -> Router {
    let operational_routes = Router::new()
        .route("/health", get(health))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_basic));

    let public_routes = Router::new()
        .route("/authentication/user", post(register_user))
        .route("/authentication/token", post(issue_token))
        .route("/users/activate/:token", put(activate))
        .route("/doctors", post(register_doctor).get(search_doctors));

    let session_routes = Router::new()
        .route("/users/patients", get(list_patients))
        .route("/users/:user_id", get(get_user))
        .route(
            "/appointments",
            post(schedule_appointment).get(list_appointments),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    // Layers run bottom-up: the session is resolved before the profile context.
    let profile_routes = Router::new()
        .route("/doctors/:doctor_id", get(get_doctor))
        .route("/doctors/:doctor_id/availability", post(add_availability))
        .route_layer(middleware::from_fn_with_state(state.clone(), doctor_context))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                route = route_template(request),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                route = route_template(request),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    let v1 = Router::new()
        .merge(operational_routes)
        .merge(public_routes)
        .merge(session_routes)
        .merge(profile_routes);

    Router::new()
        .nest("/v1", v1)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

