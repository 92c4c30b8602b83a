use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;

use crate::error::PortalError;

/// Raw upstream answer; status and body are kept for the pass-through proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport seam for the GraphQL API, swapped for a stub in tests.
pub trait Upstream: Send + Sync {
    fn post(&self, body: Value) -> BoxFuture<'_, Result<UpstreamResponse, PortalError>>;
}

pub struct HttpUpstream {
    client: reqwest::Client,
    url: String,
}

impl HttpUpstream {
    /// `base` is the API root; requests go to `{base}/graphql`.
    pub fn new(base: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/graphql", base.trim_end_matches('/')),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Upstream for HttpUpstream {
    fn post(&self, body: Value) -> BoxFuture<'_, Result<UpstreamResponse, PortalError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.url)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, url = %self.url, "Upstream request failed");
                    PortalError::FetchFailed(format!("Failed to reach the school server: {e}"))
                })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                tracing::error!(error = %e, status, "Failed to read upstream body");
                PortalError::FetchFailed(format!("Failed to read the school server response: {e}"))
            })?;

            Ok(UpstreamResponse { status, body })
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphqlErrorItem {
    #[serde(default)]
    pub message: Option<String>,
}

/// `{data}` / `{errors}` envelope of a GraphQL response.
#[derive(Debug, Deserialize)]
pub struct GraphqlEnvelope {
    #[serde(default)]
    pub data: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorItem>>,
}

impl GraphqlEnvelope {
    /// First error message, if the errors array is populated.
    pub fn first_error(&self) -> Option<String> {
        let errors = self.errors.as_ref().filter(|e| !e.is_empty())?;
        Some(
            errors[0]
                .message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "GraphQL error".to_string()),
        )
    }
}
