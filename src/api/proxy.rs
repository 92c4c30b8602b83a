use actix_web::{HttpResponse, http::StatusCode, web};
use serde_json::{Value, json};
use tracing::{error, instrument};

use crate::graphql::fetcher::RecordFetcher;

fn proxy_failed() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({ "error": "GraphQL request failed" }))
}

/// GraphQL pass-through
///
/// Forwards the body unchanged and answers with the upstream status and JSON.
#[utoipa::path(
    post,
    path = "/graphql",
    request_body = Object,
    responses(
        (status = 200, description = "Upstream GraphQL response, status passed through", body = Object),
        (status = 500, description = "Upstream unreachable or not JSON", body = Object, example = json!({
            "error": "GraphQL request failed"
        }))
    ),
    tag = "GraphQL"
)]
#[instrument(name = "graphql_proxy", skip_all)]
pub async fn forward(body: web::Json<Value>, fetcher: web::Data<RecordFetcher>) -> HttpResponse {
    let response = match fetcher.upstream().post(body.into_inner()).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "GraphQL proxy could not reach upstream");
            return proxy_failed();
        }
    };

    let payload: Value = match serde_json::from_str(&response.body) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error = %e, status = response.status, "GraphQL proxy got a non-JSON body");
            return proxy_failed();
        }
    };

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    HttpResponse::build(status).json(payload)
}
