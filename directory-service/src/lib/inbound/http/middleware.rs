use axum::extract::Path;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::account::models::AccountId;
use crate::doctor::models::Doctor;
use crate::inbound::http::gateway::Credential;
use crate::inbound::http::gateway::GatewayError;
use crate::inbound::http::gateway::Principal;
use crate::inbound::http::gateway::ResolvedIdentity;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Doctor addressed by the `:doctor_id` path segment of a profile-scoped route.
#[derive(Debug, Clone)]
pub struct DoctorContext(pub Doctor);

/// Admit only the operational basic credentials.
pub async fn require_basic(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match state.gateway.authenticate(credential(&req)?).await? {
        Principal::Operator { username } => {
            tracing::debug!(operator = %username, "Operator authenticated");
            Ok(next.run(req).await)
        }
        Principal::Account(identity) => Err(ApiError::unauthorized(format!(
            "account {} presented a session on an operator route",
            identity.account.id
        ))),
    }
}

/// Admit only bearer sessions of activated accounts and attach a `ResolvedIdentity`.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match state.gateway.authenticate(credential(&req)?).await? {
        Principal::Account(identity) => {
            tracing::debug!(account_id = %identity.account.id, "Session authenticated");
            req.extensions_mut().insert(identity);
            Ok(next.run(req).await)
        }
        Principal::Operator { .. } => Err(ApiError::unauthorized(
            "operator credentials on a session route",
        )),
    }
}

/// Resolve `:doctor_id` into a `DoctorContext`.
///
/// Must run after `require_bearer`. When the caller owns the addressed
/// profile, it is also recorded on their `ResolvedIdentity`.
pub async fn doctor_context(
    State(state): State<AppState>,
    Path(doctor_id): Path<String>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let doctor_id =
        AccountId::from_string(&doctor_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let doctor = state.doctors.get_doctor(&doctor_id).await?;

    if let Some(identity) = req.extensions_mut().get_mut::<ResolvedIdentity>() {
        if identity.account.id == doctor.id {
            identity.profile = Some(doctor.clone());
        }
    }
    req.extensions_mut().insert(DoctorContext(doctor));

    Ok(next.run(req).await)
}

fn credential(req: &Request) -> Result<Credential, GatewayError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| GatewayError::Unauthorized("missing authorization header".into()))?
        .to_str()
        .map_err(|_| GatewayError::Unauthorized("authorization header is not ascii".into()))?;

    Credential::parse(value)
}
