use crate::api::AppliedFilters;
use crate::api::attendance::{AttendancePage, AttendanceQuery, AttendanceRow};
use crate::api::finance::{FinancePage, FinanceQuery, LedgerRow};
use crate::api::grades::{GradeOptions, GradePage, GradeQuery, GradeRow};
use crate::auth::session::Session;
use crate::model::attendance::StatusHadir;
use crate::model::grade::Grade;
use crate::model::user::{LoginRequest, LoginResponse};
use crate::viewmodel::aggregate::{
    AttendanceStats, FinanceTotalLabels, FinanceTotals, GradeBucket, GradeStats,
};
use crate::viewmodel::paginate::Pagination;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Portal Siswa API",
        version = "1.0.0",
        description = r#"
## Student Portal

Read-only views over a school's records for the logged-in student, served
from the school's GraphQL server.

### 🔹 Pages
- **Absensi**: lesson attendance with status counts and a date range filter
- **Nilai**: final grades with average, best, worst and per-letter distribution
- **Keuangan**: billing items paired with their journal entry and receipt

Every page takes `q` (free text) and `page` (10 rows per page, clamped).

### 🔐 Session
Log in through `/auth/login`. The `auth_user` cookie it sets is what every
`/api` route reads; a missing or unreadable cookie answers 401.

### ⚠️ Upstream failures
A page whose fetch failed still answers with its full shape, an empty
`data`, zeroed stats and `error` set, under status 502.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,

        crate::api::attendance::list_attendance,
        crate::api::grades::list_grades,
        crate::api::finance::finance_report,

        crate::api::proxy::forward
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            Session,
            AppliedFilters,
            Pagination,
            AttendanceQuery,
            AttendanceRow,
            AttendancePage,
            AttendanceStats,
            StatusHadir,
            GradeQuery,
            GradeRow,
            GradeOptions,
            GradePage,
            GradeStats,
            GradeBucket,
            Grade,
            FinanceQuery,
            LedgerRow,
            FinancePage,
            FinanceTotals,
            FinanceTotalLabels
        )
    ),
    tags(
        (name = "Auth", description = "Session login, logout and lookup"),
        (name = "Attendance", description = "Lesson attendance page"),
        (name = "Grades", description = "Final grades page"),
        (name = "Finance", description = "Billing and payment page"),
        (name = "GraphQL", description = "Raw pass-through to the school server"),
    )
)]
pub struct ApiDoc;
