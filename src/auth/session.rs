use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::error::PortalError;

pub const SESSION_COOKIE: &str = "auth_user";
pub const SESSION_MAX_AGE_DAYS: i64 = 7;

/// Who the portal fetches records for. Carried in the `auth_user` cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Session {
    #[schema(example = "0012345678")]
    pub nis: String,
    #[schema(example = "Ani Lestari")]
    #[serde(default)]
    pub nama: String,
}

impl Session {
    /// Cookie value: URL-encoded JSON, readable by the browser client.
    pub fn encode(&self) -> String {
        let raw = json!({ "nis": self.nis, "nama": self.nama }).to_string();
        urlencoding::encode(&raw).into_owned()
    }

    /// Accepts the cookie value percent-encoded or already decoded.
    pub fn decode(raw: &str) -> Result<Self, PortalError> {
        let session: Session = match serde_json::from_str(raw) {
            Ok(session) => session,
            Err(_) => {
                let decoded = urlencoding::decode(raw)
                    .map_err(|e| PortalError::ParseFailed(e.to_string()))?;
                serde_json::from_str(&decoded)
                    .map_err(|e| PortalError::ParseFailed(e.to_string()))?
            }
        };

        if session.nis.trim().is_empty() {
            return Err(PortalError::ParseFailed("empty nis".to_string()));
        }
        Ok(session)
    }

    pub fn cookie(&self, secure: bool) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, self.encode())
            .path("/")
            .http_only(false)
            .secure(secure)
            .same_site(SameSite::Strict)
            .max_age(Duration::days(SESSION_MAX_AGE_DAYS))
            .finish()
    }
}

/// Cookie that makes the browser forget the session.
pub fn expired_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(false)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(0))
        .finish()
}

/// Reads the session cookie. A malformed cookie is logged and reported as
/// `ParseFailed`, which callers treat as "not logged in".
pub fn read_session(req: &HttpRequest) -> Result<Session, PortalError> {
    let cookie = req.cookie(SESSION_COOKIE).ok_or(PortalError::Unauthorized)?;
    if cookie.value().is_empty() {
        return Err(PortalError::Unauthorized);
    }

    Session::decode(cookie.value()).inspect_err(|e| {
        tracing::warn!(error = %e, path = req.path(), "Failed to parse auth cookie");
    })
}

impl FromRequest for Session {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by the session middleware on protected scopes
        if let Some(session) = req.extensions().get::<Session>() {
            return ready(Ok(session.clone()));
        }
        ready(read_session(req).map_err(Into::into))
    }
}
