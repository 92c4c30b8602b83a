use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::auth::session::Session;
use crate::error::PortalError;
use crate::graphql::client::{GraphqlEnvelope, Upstream};
use crate::graphql::queries;
use crate::model::attendance::AttendanceRecord;
use crate::model::finance::LaporanKeuangan;
use crate::model::grade::GradeRecord;
use crate::model::user::LoginOutcome;

/// Issues the per-page queries for the logged-in student.
///
/// One upstream request per call; no retry, no de-duplication.
#[derive(Clone)]
pub struct RecordFetcher {
    upstream: Arc<dyn Upstream>,
}

impl RecordFetcher {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }

    pub fn upstream(&self) -> &dyn Upstream {
        self.upstream.as_ref()
    }

    #[instrument(name = "fetch_attendance", skip(self, session), fields(nis = %session.nis))]
    pub async fn attendance(
        &self,
        session: &Session,
    ) -> Result<Vec<AttendanceRecord>, PortalError> {
        let records: Vec<AttendanceRecord> = self
            .run(
                queries::ATTENDANCE,
                queries::ATTENDANCE_ROOT,
                json!({ "nis": session.nis }),
            )
            .await?;
        info!(count = records.len(), "Attendance fetched");
        Ok(records)
    }

    #[instrument(name = "fetch_grades", skip(self, session), fields(nis = %session.nis))]
    pub async fn grades(&self, session: &Session) -> Result<Vec<GradeRecord>, PortalError> {
        let records: Vec<GradeRecord> = self
            .run(queries::GRADES, queries::GRADES_ROOT, json!({ "nis": session.nis }))
            .await?;
        info!(count = records.len(), "Grades fetched");
        Ok(records)
    }

    #[instrument(name = "fetch_finance", skip(self, session), fields(nis = %session.nis))]
    pub async fn finance(&self, session: &Session) -> Result<LaporanKeuangan, PortalError> {
        let laporan: LaporanKeuangan = self
            .run(queries::FINANCE, queries::FINANCE_ROOT, json!({ "nis": session.nis }))
            .await?;
        info!(count = laporan.besar_jtt_list.len(), "Finance report fetched");
        Ok(laporan)
    }

    #[instrument(name = "upstream_login", skip(self, pin))]
    pub async fn login(&self, nis: &str, pin: &str) -> Result<LoginOutcome, PortalError> {
        self.run(queries::LOGIN, queries::LOGIN_ROOT, json!({ "nis": nis, "pin": pin }))
            .await
    }

    /// Runs one query and decodes `data.<root>`. A missing or null root
    /// decodes as the empty default.
    async fn run<T>(&self, document: &str, root: &str, variables: Value) -> Result<T, PortalError>
    where
        T: DeserializeOwned + Default,
    {
        let response = self
            .upstream
            .post(json!({ "query": document, "variables": variables }))
            .await?;

        if !response.is_success() {
            warn!(status = response.status, root, "Upstream returned non-success status");
            return Err(PortalError::http_status(response.status));
        }

        let envelope: GraphqlEnvelope = serde_json::from_str(&response.body).map_err(|e| {
            warn!(error = %e, root, "Upstream body is not a GraphQL response");
            PortalError::FetchFailed("Unexpected response from the school server".to_string())
        })?;

        if let Some(message) = envelope.first_error() {
            warn!(%message, root, "Upstream query failed");
            return Err(PortalError::QueryFailed(message));
        }

        match envelope.data.and_then(|mut data| data.remove(root)) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => serde_json::from_value(value).map_err(|e| {
                warn!(error = %e, root, "Upstream payload has an unexpected shape");
                PortalError::FetchFailed("Unexpected response from the school server".to_string())
            }),
        }
    }
}
