use actix_web::{HttpResponse, web};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::{AppliedFilters, page_status, settle};
use crate::auth::session::Session;
use crate::config::Config;
use crate::error::PortalError;
use crate::graphql::fetcher::RecordFetcher;
use crate::model::grade::{
    Grade, GradeRecord, PELAJARAN, SEMESTER, semester_options, subject_options,
};
use crate::viewmodel::aggregate::{GradeStats, grade_stats};
use crate::viewmodel::filter::FilterCriteria;
use crate::viewmodel::paginate::Pagination;
use crate::viewmodel::state::PageState;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct GradeQuery {
    /// Search subject name, subject code or letter grade
    #[schema(example = "fisika")]
    pub q: Option<String>,
    /// Exact semester, as offered in `options.semesters`
    #[schema(example = "1")]
    pub semester: Option<String>,
    /// Exact subject name, as offered in `options.pelajaran`
    #[schema(example = "Matematika")]
    pub pelajaran: Option<String>,
    #[schema(example = 1)]
    pub page: Option<i64>,
}

impl GradeQuery {
    fn criteria(&self, offset: FixedOffset) -> FilterCriteria {
        FilterCriteria::new(offset)
            .with_query(self.q.as_deref().unwrap_or_default())
            .with_category(SEMESTER, self.semester.as_deref().unwrap_or_default())
            .with_category(PELAJARAN, self.pelajaran.as_deref().unwrap_or_default())
    }
}

#[derive(Serialize, ToSchema)]
pub struct GradeRow {
    pub replid: String,
    #[schema(example = "Matematika")]
    pub pelajaran: String,
    #[schema(example = "MTK")]
    pub kode: String,
    #[schema(example = 86.5)]
    pub nilai: f64,
    #[schema(example = "A")]
    pub grade: String,
    /// Letter the badge color is chosen from
    pub grade_class: Grade,
    #[schema(example = "1")]
    pub semester: String,
    /// "-" when the teacher left no comment
    pub komentar: String,
}

impl From<&GradeRecord> for GradeRow {
    fn from(record: &GradeRecord) -> Self {
        let komentar = match record.komentar.trim() {
            "" => "-".to_string(),
            text => text.to_string(),
        };
        Self {
            replid: record.replid.clone(),
            pelajaran: record.pelajaran.nama.clone(),
            kode: record.pelajaran.kode.clone(),
            nilai: record.nilai_au,
            grade: record.grade.clone(),
            grade_class: record.grade_class(),
            semester: record.semester.semester.clone(),
            komentar,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct GradeOptions {
    pub semesters: Vec<String>,
    pub pelajaran: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct GradePage {
    pub data: Vec<GradeRow>,
    pub stats: GradeStats,
    pub options: GradeOptions,
    pub pagination: Pagination,
    pub filters: AppliedFilters,
    pub error: Option<String>,
}

/// Grades page
#[utoipa::path(
    get,
    path = "/api/nilai",
    params(GradeQuery),
    responses(
        (status = 200, body = GradePage),
        (status = 401, description = "Not logged in"),
        (status = 502, description = "School server failed; body still a page view", body = GradePage)
    ),
    tag = "Grades"
)]
pub async fn list_grades(
    session: Session,
    fetcher: web::Data<RecordFetcher>,
    config: web::Data<Config>,
    query: web::Query<GradeQuery>,
) -> Result<HttpResponse, PortalError> {
    let criteria = query.criteria(config.utc_offset);

    let mut state = PageState::new(criteria.cleared());
    let ticket = state.begin_fetch();
    let result = fetcher.grades(&session).await;
    settle(&mut state, ticket, result, criteria, query.page);

    let page = state.current_page();
    let body = GradePage {
        data: page.items.iter().map(|r| GradeRow::from(*r)).collect(),
        stats: grade_stats(state.records()),
        options: GradeOptions {
            semesters: semester_options(state.records()),
            pelajaran: subject_options(state.records()),
        },
        pagination: page.pagination,
        filters: AppliedFilters::from(state.criteria()),
        error: state.error().map(str::to_string),
    };

    Ok(page_status(state.error()).json(body))
}
