use crate::auth::session::read_session;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
};
use serde_json::json;

/// Guards protected scopes: no usable `auth_user` cookie, no access.
///
/// A malformed cookie is treated exactly like a missing one.
pub async fn session_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let session = match read_session(req.request()) {
        Ok(session) => session,
        Err(e) => {
            let resp = HttpResponse::Unauthorized().json(json!({
                "error": "Not logged in",
                "details": e.to_string(),
            }));
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    tracing::debug!(nis = %session.nis, path = req.path(), "Session accepted");
    req.extensions_mut().insert(session);

    next.call(req).await
}
