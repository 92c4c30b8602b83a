use actix_web::{HttpResponse, web};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::{AppliedFilters, date_label, page_status, settle};
use crate::auth::session::Session;
use crate::config::Config;
use crate::error::PortalError;
use crate::graphql::fetcher::RecordFetcher;
use crate::model::attendance::{AttendanceRecord, StatusHadir};
use crate::viewmodel::aggregate::{AttendanceStats, attendance_stats};
use crate::viewmodel::filter::{DateRange, FilterCriteria, parse_date_param};
use crate::viewmodel::paginate::Pagination;
use crate::viewmodel::state::PageState;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Search subject, teacher or material
    #[schema(example = "matematika")]
    pub q: Option<String>,
    /// From date, inclusive
    #[schema(example = "2024-01-01")]
    pub start: Option<String>,
    /// Until date, inclusive through end of day
    #[schema(example = "2024-01-31")]
    pub end: Option<String>,
    /// Page number, 1-based; out of range values are clamped
    #[schema(example = 1)]
    pub page: Option<i64>,
}

impl AttendanceQuery {
    fn criteria(&self, offset: FixedOffset) -> Result<FilterCriteria, PortalError> {
        let range = DateRange::new(
            parse_date_param("start", self.start.as_deref())?,
            parse_date_param("end", self.end.as_deref())?,
        );
        Ok(FilterCriteria::new(offset)
            .with_query(self.q.as_deref().unwrap_or_default())
            .with_range(range))
    }
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceRow {
    #[schema(example = "9812")]
    pub replid: String,
    #[schema(example = "2024-01-10")]
    pub tanggal: String,
    #[schema(example = "Rabu, 10 Januari 2024")]
    pub tanggal_label: String,
    #[schema(example = "07:30 - 09:00")]
    pub jam: String,
    pub pelajaran: String,
    pub kelas: String,
    pub guru: String,
    pub materi: String,
    pub status: StatusHadir,
    /// Null when the school sent a code outside the known set
    pub status_code: Option<i64>,
}

impl AttendanceRow {
    fn from_record(record: &AttendanceRecord, offset: FixedOffset) -> Self {
        Self {
            replid: record.replid.clone(),
            tanggal: record.tanggal.clone(),
            tanggal_label: date_label(&record.tanggal, offset),
            jam: record.jam.clone(),
            pelajaran: record.pelajaran.nama.clone(),
            kelas: record.kelas.kelas.clone(),
            guru: record.gurupelajaran.clone(),
            materi: record.materi.clone(),
            status: record.status(),
            status_code: record.status().code(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AttendancePage {
    pub data: Vec<AttendanceRow>,
    /// Counted over every fetched record, not just the filtered ones
    pub stats: AttendanceStats,
    pub pagination: Pagination,
    pub filters: AppliedFilters,
    /// Set when the school server could not be read; `data` is empty then
    pub error: Option<String>,
}

/// Attendance page
#[utoipa::path(
    get,
    path = "/api/absensi",
    params(AttendanceQuery),
    responses(
        (status = 200, body = AttendancePage),
        (status = 400, description = "Malformed date filter"),
        (status = 401, description = "Not logged in"),
        (status = 502, description = "School server failed; body still a page view", body = AttendancePage)
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    session: Session,
    fetcher: web::Data<RecordFetcher>,
    config: web::Data<Config>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse, PortalError> {
    let offset = config.utc_offset;
    let criteria = query.criteria(offset)?;

    let mut state = PageState::new(criteria.cleared());
    let ticket = state.begin_fetch();
    let result = fetcher.attendance(&session).await;
    settle(&mut state, ticket, result, criteria, query.page);

    let page = state.current_page();
    let body = AttendancePage {
        data: page
            .items
            .iter()
            .map(|r| AttendanceRow::from_record(r, offset))
            .collect(),
        stats: attendance_stats(state.records()),
        pagination: page.pagination,
        filters: AppliedFilters::from(state.criteria()),
        error: state.error().map(str::to_string),
    };

    Ok(page_status(state.error()).json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{app, body_json, logged_in};
    use crate::graphql::testing::StubUpstream;
    use actix_web::test;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn upstream_rows(n: usize) -> Value {
        let rows: Vec<Value> = (0..n)
            .map(|i| {
                let code = [0, 0, 2, 3][i % 4];
                json!({
                    "replid": i.to_string(),
                    "tanggal": format!("2024-01-{:02}T08:00:00", (i % 28) + 1),
                    "jam": "07:30",
                    "gurupelajaran": if i % 2 == 0 { "Bu Sari" } else { "Pak Andi" },
                    "materi": "Bab 1",
                    "statushadir": code,
                    "kelas": { "kelas": "XI RPL 1" },
                    "pelajaran": { "nama": if i % 2 == 0 { "Matematika" } else { "Fisika" } }
                })
            })
            .collect();
        json!({ "data": { "presensiPelajaranByNis": rows } })
    }

    #[actix_web::test]
    async fn filters_paginates_and_counts() {
        let stub = Arc::new(StubUpstream::ok(upstream_rows(24)));
        let app = test::init_service(app(stub.clone())).await;

        let req = logged_in(test::TestRequest::get().uri("/api/absensi?q=matematika&page=2"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body = body_json(resp).await;
        assert_eq!(body["pagination"]["total_items"], 12);
        assert_eq!(body["pagination"]["page"], 2);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["stats"]["total"], 24);
        assert_eq!(body["stats"]["hadir"], 12);
        assert_eq!(body["stats"]["izin"], 6);
        assert_eq!(body["stats"]["alpha"], 6);
        assert_eq!(body["filters"]["q"], "matematika");
        assert_eq!(body["data"][0]["status"], "Hadir");
        assert_eq!(stub.calls(), 1);
    }

    #[actix_web::test]
    async fn date_range_is_inclusive_by_day() {
        let stub = Arc::new(StubUpstream::ok(json!({
            "data": { "presensiPelajaranByNis": [
                { "replid": "a", "tanggal": "2024-01-10T08:00", "statushadir": 0 },
                { "replid": "b", "tanggal": "2024-01-10T23:30", "statushadir": 1 },
                { "replid": "c", "tanggal": "2024-01-11T00:00", "statushadir": 0 },
                { "replid": "d", "tanggal": "rusak", "statushadir": 0 }
            ] }
        })));
        let app = test::init_service(app(stub)).await;

        let req = logged_in(
            test::TestRequest::get().uri("/api/absensi?start=2024-01-10&end=2024-01-10"),
        )
        .to_request();
        let body = body_json(test::call_service(&app, req).await).await;

        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["replid"].as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(body["data"][0]["tanggal_label"], "Rabu, 10 Januari 2024");
    }

    #[actix_web::test]
    async fn numeric_and_garbage_dates_do_not_fail_the_page() {
        let stub = Arc::new(StubUpstream::ok(json!({
            "data": { "presensiPelajaranByNis": [
                { "replid": "millis", "tanggal": 1704870000000_i64, "statushadir": 0 },
                { "replid": "offset", "tanggal": "2024-01-10T08:00+07:00", "statushadir": 0 },
                { "replid": "object", "tanggal": { "bad": true }, "statushadir": 1 },
                { "replid": "text", "tanggal": "kemarin", "statushadir": 1 }
            ] }
        })));
        let app = test::init_service(app(stub)).await;

        let req = logged_in(test::TestRequest::get().uri("/api/absensi")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body = body_json(resp).await;
        assert_eq!(body["stats"]["total"], 4);
        assert_eq!(body["data"][0]["tanggal"], "1704870000000");
        assert_eq!(body["data"][0]["tanggal_label"], "Rabu, 10 Januari 2024");
        assert_eq!(body["data"][2]["tanggal"], "");

        let req = logged_in(
            test::TestRequest::get().uri("/api/absensi?start=2024-01-10&end=2024-01-10"),
        )
        .to_request();
        let body = body_json(test::call_service(&app, req).await).await;
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["replid"].as_str())
            .collect();
        assert_eq!(ids, vec!["millis", "offset"]);
    }

    #[actix_web::test]
    async fn upstream_500_yields_empty_view_with_error() {
        let stub = Arc::new(StubUpstream::status(500, "Internal Server Error"));
        let app = test::init_service(app(stub)).await;

        let req = logged_in(test::TestRequest::get().uri("/api/absensi")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 502);

        let body = body_json(resp).await;
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["error"], "HTTP error! status: 500");
        assert_eq!(body["pagination"]["no_data"], true);
        assert_eq!(body["stats"]["total"], 0);
    }

    #[actix_web::test]
    async fn bad_date_is_rejected_before_fetching() {
        let stub = Arc::new(StubUpstream::ok(upstream_rows(1)));
        let app = test::init_service(app(stub.clone())).await;

        let req = logged_in(test::TestRequest::get().uri("/api/absensi?start=10-01-2024"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        assert_eq!(stub.calls(), 0);
    }

    #[actix_web::test]
    async fn malformed_page_number_is_a_json_400() {
        let stub = Arc::new(StubUpstream::ok(upstream_rows(1)));
        let app = test::init_service(app(stub.clone())).await;

        let req = logged_in(test::TestRequest::get().uri("/api/absensi?page=abc")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let body = body_json(resp).await;
        assert!(body["error"].as_str().is_some_and(|m| m.contains("Query deserialize")));
        assert_eq!(stub.calls(), 0);
    }

    #[actix_web::test]
    async fn missing_cookie_is_401() {
        let stub = Arc::new(StubUpstream::ok(upstream_rows(1)));
        let app = test::init_service(app(stub.clone())).await;

        let req = test::TestRequest::get().uri("/api/absensi").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        assert_eq!(stub.calls(), 0);
    }
}
