use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Everything that can end a portal request early.
///
/// None of these are retried; each one is terminal for the request that hit it.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum PortalError {
    /// Upstream answered with a non-success status, could not be reached,
    /// or sent a body we could not read.
    #[display(fmt = "{}", _0)]
    FetchFailed(String),
    /// Upstream answered with a populated `errors` array.
    #[display(fmt = "{}", _0)]
    QueryFailed(String),
    /// The session cookie is present but unreadable.
    #[display(fmt = "Invalid session cookie: {}", _0)]
    ParseFailed(String),
    #[display(fmt = "Not logged in")]
    Unauthorized,
    #[display(fmt = "{}", _0)]
    InvalidInput(String),
    /// Upstream login answered `success: false`.
    #[display(fmt = "{}", _0)]
    LoginRejected(String),
}

impl std::error::Error for PortalError {}

impl PortalError {
    pub fn http_status(status: u16) -> Self {
        PortalError::FetchFailed(format!("HTTP error! status: {status}"))
    }
}

impl ResponseError for PortalError {
    fn status_code(&self) -> StatusCode {
        match self {
            PortalError::FetchFailed(_) | PortalError::QueryFailed(_) => StatusCode::BAD_GATEWAY,
            PortalError::ParseFailed(_)
            | PortalError::Unauthorized
            | PortalError::LoginRejected(_) => StatusCode::UNAUTHORIZED,
            PortalError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
