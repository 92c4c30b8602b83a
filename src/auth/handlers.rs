use crate::{
    auth::session::{Session, expired_cookie},
    config::Config,
    error::PortalError,
    graphql::fetcher::RecordFetcher,
    model::user::{LoginRequest, LoginResponse},
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{debug, info, instrument};

const MIN_PIN_LEN: usize = 4;

fn validate_login(req: &LoginRequest) -> Result<(), PortalError> {
    if req.nis.trim().is_empty() {
        return Err(PortalError::InvalidInput("NIS must not be empty".into()));
    }
    if req.pin.trim().is_empty() {
        return Err(PortalError::InvalidInput("PIN must not be empty".into()));
    }
    if req.pin.chars().count() < MIN_PIN_LEN {
        return Err(PortalError::InvalidInput(format!(
            "PIN must be at least {MIN_PIN_LEN} digits"
        )));
    }
    Ok(())
}

/// Login endpoint
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in, auth_user cookie set", body = LoginResponse),
        (status = 400, description = "Empty NIS/PIN or PIN too short", body = Object, example = json!({
            "error": "PIN must be at least 4 digits"
        })),
        (status = 401, description = "Rejected by the school server", body = Object, example = json!({
            "error": "NIS atau PIN salah"
        })),
        (status = 502, description = "School server unavailable")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(payload, fetcher, config), fields(nis = %payload.nis))]
pub async fn login(
    payload: web::Json<LoginRequest>,
    fetcher: web::Data<RecordFetcher>,
    config: web::Data<Config>,
) -> Result<HttpResponse, PortalError> {
    info!("Login request received");

    validate_login(&payload).inspect_err(|e| {
        info!(reason = %e, "Validation failed");
    })?;

    debug!("Asking upstream to verify credentials");
    let outcome = fetcher.login(payload.nis.trim(), &payload.pin).await?;

    let user = match outcome.data {
        Some(user) if outcome.success => user,
        _ => {
            let message = outcome
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Login failed. Please try again.".to_string());
            info!(%message, "Login rejected by upstream");
            return Err(PortalError::LoginRejected(message));
        }
    };

    info!("Login successful");

    Ok(HttpResponse::Ok()
        .cookie(user.cookie(config.cookie_secure))
        .json(LoginResponse {
            message: outcome
                .message
                .unwrap_or_else(|| "Login successful".to_string()),
            user,
        }))
}

/// Logout endpoint
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "auth_user cookie cleared", body = Object, example = json!({
            "message": "Logged out"
        }))
    ),
    tag = "Auth"
)]
pub async fn logout(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok()
        .cookie(expired_cookie(config.cookie_secure))
        .json(json!({ "message": "Logged out" }))
}

/// Current session
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, body = Session),
        (status = 401, description = "Missing or malformed auth_user cookie")
    ),
    tag = "Auth"
)]
pub async fn me(session: Session) -> impl Responder {
    HttpResponse::Ok().json(session)
}
