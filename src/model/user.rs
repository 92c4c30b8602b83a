use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::session::Session;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "0012345678")]
    pub nis: String,
    #[schema(example = "1234")]
    pub pin: String,
}

/// Payload of the upstream `login` query.
#[derive(Debug, Default, Deserialize)]
pub struct LoginOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Session>,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "Login successful")]
    pub message: String,
    pub user: Session,
}
