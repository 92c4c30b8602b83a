pub mod attendance;
pub mod finance;
pub mod grades;
pub mod proxy;

use actix_web::{HttpResponse, HttpResponseBuilder};
use chrono::FixedOffset;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::PortalError;
use crate::model::grade::{PELAJARAN, SEMESTER};
use crate::viewmodel::filter::{FilterCriteria, Filterable, parse_timestamp};
use crate::viewmodel::format::format_long_date;
use crate::viewmodel::state::{FetchTicket, PageState};

/// Criteria actually applied, echoed so the client can show a reset button.
#[derive(Debug, Serialize, ToSchema)]
pub struct AppliedFilters {
    #[schema(example = "matematika")]
    pub q: String,
    #[schema(example = "2024-01-01")]
    pub start: Option<String>,
    pub end: Option<String>,
    pub semester: Option<String>,
    pub pelajaran: Option<String>,
    pub active: bool,
}

impl From<&FilterCriteria> for AppliedFilters {
    fn from(criteria: &FilterCriteria) -> Self {
        let range = criteria.range();
        Self {
            q: criteria.query().to_string(),
            start: range.start.map(|d| d.format("%Y-%m-%d").to_string()),
            end: range.end.map(|d| d.format("%Y-%m-%d").to_string()),
            semester: criteria.category(SEMESTER).map(str::to_string),
            pelajaran: criteria.category(PELAJARAN).map(str::to_string),
            active: !criteria.is_empty(),
        }
    }
}

/// Lands a fetch result, then narrows the state to the requested criteria
/// and page. Stats are read from `records()`, the table from `current_page()`.
pub(crate) fn settle<R: Filterable>(
    state: &mut PageState<R>,
    ticket: FetchTicket,
    result: Result<Vec<R>, PortalError>,
    criteria: FilterCriteria,
    page: Option<i64>,
) {
    state.apply(ticket, result);
    if criteria.is_empty() {
        state.clear_filters();
    } else {
        state.set_criteria(criteria);
    }
    state.go_to_page(page.unwrap_or(1));
    tracing::debug!(
        records = state.records().len(),
        page = state.page(),
        "Page view settled"
    );
}

/// Page views still carry a body on failure; only the status changes.
pub(crate) fn page_status(error: Option<&str>) -> HttpResponseBuilder {
    match error {
        Some(_) => HttpResponse::BadGateway(),
        None => HttpResponse::Ok(),
    }
}

/// Long Indonesian date, or the raw value when it doesn't parse.
pub(crate) fn date_label(raw: &str, offset: FixedOffset) -> String {
    parse_timestamp(raw, offset)
        .map(|at| format_long_date(at.date()))
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use actix_web::body::MessageBody;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::test::{TestRequest, read_body_json};
    use actix_web::{App, Error, web};
    use serde_json::Value;

    use crate::auth::session::{SESSION_COOKIE, Session};
    use crate::config::Config;
    use crate::graphql::fetcher::RecordFetcher;
    use crate::graphql::testing::StubUpstream;
    use crate::routes;

    pub fn test_config() -> Config {
        Config::from_lookup(|key| match key {
            "GRAPHQL_ENDPOINT" => Some("http://upstream.test".to_string()),
            _ => None,
        })
        .expect("test config")
    }

    /// The full route table over a stubbed upstream.
    pub fn app(
        stub: Arc<StubUpstream>,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = Error,
            InitError = (),
        >,
    > {
        let config = test_config();
        App::new()
            .app_data(web::Data::new(RecordFetcher::new(stub)))
            .app_data(web::Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, config))
    }

    pub fn student() -> Session {
        Session {
            nis: "0012345".to_string(),
            nama: "Ani Lestari".to_string(),
        }
    }

    pub fn logged_in(req: TestRequest) -> TestRequest {
        req.cookie(Cookie::new(SESSION_COOKIE, student().encode()))
    }

    pub async fn body_json<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
        read_body_json(resp).await
    }
}
