use actix_web::{HttpResponse, web};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::{AppliedFilters, date_label, page_status, settle};
use crate::auth::session::Session;
use crate::config::Config;
use crate::error::PortalError;
use crate::graphql::fetcher::RecordFetcher;
use crate::model::finance::LedgerPair;
use crate::viewmodel::aggregate::{FinanceTotalLabels, FinanceTotals, finance_totals};
use crate::viewmodel::filter::{DateRange, FilterCriteria, parse_date_param};
use crate::viewmodel::format::format_rupiah;
use crate::viewmodel::paginate::Pagination;
use crate::viewmodel::state::PageState;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct FinanceQuery {
    /// Search transaction text or billing note
    #[schema(example = "spp")]
    pub q: Option<String>,
    /// Journal date from, inclusive
    #[schema(example = "2024-01-01")]
    pub start: Option<String>,
    /// Journal date until, inclusive
    #[schema(example = "2024-06-30")]
    pub end: Option<String>,
    #[schema(example = 1)]
    pub page: Option<i64>,
}

impl FinanceQuery {
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

/// One billing item with its journal entry and receipt, when linked.
#[derive(Serialize, ToSchema)]
pub struct LedgerRow {
    pub replid: String,
    /// Journal text; empty when the item has no journal entry
    #[schema(example = "Pembayaran SPP Januari")]
    pub transaksi: String,
    pub tanggal: String,
    pub tanggal_label: String,
    pub keterangan: String,
    pub besar: f64,
    pub cicilan: f64,
    pub lunas: f64,
    pub sisa: f64,
    #[schema(example = "Rp1.500.000")]
    pub besar_label: String,
    pub cicilan_label: String,
    pub sisa_label: String,
    pub petugas: Option<String>,
}

impl LedgerRow {
    fn from_pair(pair: &LedgerPair, offset: FixedOffset) -> Self {
        let tanggal = pair.tanggal().to_string();
        Self {
            replid: pair.tagihan.replid.clone(),
            transaksi: pair.transaksi().to_string(),
            tanggal_label: if tanggal.is_empty() {
                String::new()
            } else {
                date_label(&tanggal, offset)
            },
            tanggal,
            keterangan: pair.tagihan.keterangan.clone(),
            besar: pair.tagihan.besar,
            cicilan: pair.tagihan.cicilan,
            lunas: pair.tagihan.lunas,
            sisa: pair.sisa(),
            besar_label: format_rupiah(pair.tagihan.besar),
            cicilan_label: format_rupiah(pair.tagihan.cicilan),
            sisa_label: format_rupiah(pair.sisa()),
            petugas: pair
                .penerimaan
                .as_ref()
                .map(|p| p.petugas.clone())
                .filter(|p| !p.is_empty()),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct FinancePage {
    pub data: Vec<LedgerRow>,
    pub totals: FinanceTotals,
    pub total_labels: FinanceTotalLabels,
    pub pagination: Pagination,
    pub filters: AppliedFilters,
    pub error: Option<String>,
}

/// Finance page
#[utoipa::path(
    get,
    path = "/api/keuangan",
    params(FinanceQuery),
    responses(
        (status = 200, body = FinancePage),
        (status = 400, description = "Malformed date filter"),
        (status = 401, description = "Not logged in"),
        (status = 502, description = "School server failed; body still a page view", body = FinancePage)
    ),
    tag = "Finance"
)]
pub async fn finance_report(
    session: Session,
    fetcher: web::Data<RecordFetcher>,
    config: web::Data<Config>,
    query: web::Query<FinanceQuery>,
) -> Result<HttpResponse, PortalError> {
    let offset = config.utc_offset;
    let criteria = query.criteria(offset)?;

    let mut state = PageState::new(criteria.cleared());
    let ticket = state.begin_fetch();
    let report = fetcher.finance(&session).await;

    let totals = report.as_ref().map(finance_totals).unwrap_or_default();
    let pairs = report.map(|laporan| laporan.ledger_pairs());
    settle(&mut state, ticket, pairs, criteria, query.page);

    let page = state.current_page();
    let body = FinancePage {
        data: page
            .items
            .iter()
            .map(|pair| LedgerRow::from_pair(pair, offset))
            .collect(),
        total_labels: totals.labels(),
        totals,
        pagination: page.pagination,
        filters: AppliedFilters::from(state.criteria()),
        error: state.error().map(str::to_string),
    };

    Ok(page_status(state.error()).json(body))
}
