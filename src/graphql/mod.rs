pub mod client;
pub mod fetcher;
pub mod queries;

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use futures::future::{BoxFuture, FutureExt, ready};
    use serde_json::Value;

    use super::client::{Upstream, UpstreamResponse};
    use crate::error::PortalError;

    /// Canned upstream: answers every request with the same response and
    /// records what was sent.
    pub struct StubUpstream {
        response: Result<UpstreamResponse, PortalError>,
        seen: Mutex<Vec<Value>>,
    }

    impl StubUpstream {
        pub fn status(status: u16, body: &str) -> Self {
            Self {
                response: Ok(UpstreamResponse {
                    status,
                    body: body.to_string(),
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn ok(body: Value) -> Self {
            Self::status(200, &body.to_string())
        }

        pub fn unreachable() -> Self {
            Self {
                response: Err(PortalError::FetchFailed("connection refused".into())),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        pub fn last_body(&self) -> Option<Value> {
            self.seen.lock().unwrap().last().cloned()
        }
    }

    impl Upstream for StubUpstream {
        fn post(&self, body: Value) -> BoxFuture<'_, Result<UpstreamResponse, PortalError>> {
            self.seen.lock().unwrap().push(body);
            ready(self.response.clone()).boxed()
        }
    }
}
