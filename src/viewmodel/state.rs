use tracing::debug;

use crate::error::PortalError;
use crate::viewmodel::filter::{self, FilterCriteria, Filterable};
use crate::viewmodel::paginate::{self, PAGE_SIZE, PageSlice};

/// Proof that a fetch was started. Only the newest ticket may land its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// View-model state of one record page: the fetched list, the last error,
/// the active criteria and the current page number.
///
/// Handlers build one per request, so the generation check only guards
/// fetches started on the same instance; it is not cross-request protection.
#[derive(Debug, Clone)]
pub struct PageState<R> {
    records: Vec<R>,
    error: Option<String>,
    criteria: FilterCriteria,
    page: usize,
    generation: u64,
}

impl<R: Filterable> PageState<R> {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            records: Vec::new(),
            error: None,
            criteria,
            page: 1,
            generation: 0,
        }
    }

    /// Starts a fetch and supersedes every ticket handed out before.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Lands a fetch result. Returns false, leaving state untouched, when the
    /// ticket was superseded.
    ///
    /// Success replaces the whole list; failure empties it and keeps the
    /// message.
    pub fn apply(&mut self, ticket: FetchTicket, result: Result<Vec<R>, PortalError>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "Discarding superseded fetch result"
            );
            return false;
        }

        match result {
            Ok(records) => {
                self.records = records;
                self.error = None;
            }
            Err(e) => {
                self.records.clear();
                self.error = Some(e.to_string());
            }
        }
        self.page = self.clamped(self.page as i64);
        true
    }

    /// Any change of criteria sends the view back to page 1.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if criteria != self.criteria {
            self.criteria = criteria;
            self.page = 1;
        }
    }

    pub fn clear_filters(&mut self) {
        self.criteria = self.criteria.cleared();
        self.page = 1;
    }

    pub fn go_to_page(&mut self, requested: i64) {
        self.page = self.clamped(requested);
    }

    fn clamped(&self, requested: i64) -> usize {
        let pages = paginate::total_pages(self.filtered().len(), PAGE_SIZE);
        paginate::clamp_page(requested, pages)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn filtered(&self) -> Vec<&R> {
        filter::apply(&self.records, &self.criteria)
    }

    pub fn current_page(&self) -> PageSlice<&R> {
        paginate::paginate(&self.filtered(), PAGE_SIZE, self.page as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(u32, String);

    impl Filterable for Item {
        fn search_text(&self) -> Vec<&str> {
            vec![self.1.as_str()]
        }
    }

    fn criteria() -> FilterCriteria {
        FilterCriteria::new(FixedOffset::east_opt(7 * 3600).unwrap())
    }

    fn items(n: u32) -> Vec<Item> {
        (1..=n)
            .map(|i| Item(i, if i % 2 == 0 { "genap".into() } else { "ganjil".into() }))
            .collect()
    }

    fn loaded(n: u32) -> PageState<Item> {
        let mut state = PageState::new(criteria());
        let ticket = state.begin_fetch();
        assert!(state.apply(ticket, Ok(items(n))));
        state
    }

    #[test]
    fn superseded_fetch_is_discarded() {
        let mut state: PageState<Item> = PageState::new(criteria());
        let stale = state.begin_fetch();
        let fresh = state.begin_fetch();

        assert!(state.apply(fresh, Ok(items(3))));
        assert!(!state.apply(stale, Ok(items(30))));
        assert_eq!(state.records().len(), 3);
    }

    #[test]
    fn failure_clears_records_and_keeps_message() {
        let mut state = loaded(5);
        let ticket = state.begin_fetch();
        state.apply(ticket, Err(PortalError::http_status(500)));

        assert!(state.records().is_empty());
        assert_eq!(state.error(), Some("HTTP error! status: 500"));
        assert!(state.current_page().pagination.no_data);
    }

    #[test]
    fn success_after_failure_clears_the_error() {
        let mut state: PageState<Item> = PageState::new(criteria());
        let ticket = state.begin_fetch();
        state.apply(ticket, Err(PortalError::QueryFailed("nope".into())));
        let ticket = state.begin_fetch();
        state.apply(ticket, Ok(items(2)));
        assert_eq!(state.error(), None);
    }

    #[test]
    fn changing_criteria_resets_to_first_page() {
        let mut state = loaded(35);
        state.go_to_page(3);
        assert_eq!(state.page(), 3);

        state.set_criteria(criteria().with_query("genap"));
        assert_eq!(state.page(), 1);
        assert_eq!(state.filtered().len(), 17);

        state.go_to_page(2);
        state.set_criteria(criteria().with_query("genap"));
        assert_eq!(state.page(), 2, "same criteria keeps the page");
    }

    #[test]
    fn clearing_filters_restores_everything_on_page_one() {
        let mut state = loaded(25);
        state.set_criteria(criteria().with_query("ganjil"));
        state.go_to_page(2);

        state.clear_filters();
        assert!(state.criteria().is_empty());
        assert_eq!(state.page(), 1);
        let all: Vec<u32> = state.filtered().iter().map(|i| i.0).collect();
        assert_eq!(all, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn page_requests_are_clamped_to_filtered_pages() {
        let mut state = loaded(12);
        state.go_to_page(0);
        assert_eq!(state.page(), 1);
        state.go_to_page(50);
        assert_eq!(state.page(), 2);

        let page = state.current_page();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total_pages, 2);
    }
}
