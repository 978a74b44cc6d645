//! Search session state machine
//!
//! The controller owns the current term, page, result set and status, and is
//! the only place they change. Every fetch is split into two steps: `begin_*`
//! validates the request, moves the session to `Loading` and hands out a
//! [`PageRequest`] ticket carrying a sequence number; `complete` applies the
//! outcome of that fetch only if no newer request has been issued since.
//! Responses that lose this race are dropped, so the session always reflects
//! the most recently requested term and page.

use crate::catalog::{CatalogClient, CatalogError, MovieSummary, PageResponse, page_count};

/// Message shown when the catalog could not be reached.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error, please try again.";

/// Where the session is in its request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No search has been issued yet
    #[default]
    Idle,
    /// A fetch has been issued and not yet applied
    Loading,
    /// The latest fetch succeeded
    Ready,
    /// The latest fetch failed; see the error message
    Failed,
}

/// A fetch the session is waiting for.
///
/// Returned by [`SearchController::begin_search`] and
/// [`SearchController::begin_change_page`]; hand it back together with the
/// fetch outcome to [`SearchController::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    seq: u64,
    term: String,
    page: u32,
}

impl PageRequest {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}

/// Snapshot of the current search, read by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    term: String,
    page: u32,
    total_results: u32,
    results: Vec<MovieSummary>,
    status: SessionStatus,
    error_message: Option<String>,
    /// Sequence number of the most recently issued request
    seq: u64,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self {
            term: String::new(),
            page: 1,
            total_results: 0,
            results: Vec::new(),
            status: SessionStatus::Idle,
            error_message: None,
            seq: 0,
        }
    }
}

impl SearchSession {
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The current 1-based page number
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_results(&self) -> u32 {
        self.total_results
    }

    /// Items of the current page only, never an accumulation across pages
    pub fn results(&self) -> &[MovieSummary] {
        &self.results
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Number of pages available for the current term
    pub fn page_count(&self) -> u32 {
        page_count(self.total_results)
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1 && self.page <= self.page_count()
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.page_count()
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }
}

/// Drives the search session.
#[derive(Debug, Default)]
pub struct SearchController {
    session: SearchSession,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Starts a new search for `term`, always on page 1.
    ///
    /// Returns `None` and leaves the session untouched when the trimmed term
    /// is empty. Otherwise the previous results and total are cleared right
    /// away so they can never be shown under the new term.
    pub fn begin_search(&mut self, term: &str) -> Option<PageRequest> {
        let term = term.trim();
        if term.is_empty() {
            tracing::debug!("ignoring empty search term");
            return None;
        }

        self.session.term = term.to_string();
        self.session.page = 1;
        self.session.total_results = 0;

        Some(self.issue())
    }

    /// Moves to another page of the current term.
    ///
    /// Returns `None` and leaves the session untouched unless
    /// `1 <= page <= page_count()`, with the bound taken from the session's
    /// current total. While a new search is pending that total is 0, so page
    /// changes are refused until the new term's first page has arrived.
    pub fn begin_change_page(&mut self, page: u32) -> Option<PageRequest> {
        let last_page = self.session.page_count();
        if page < 1 || page > last_page {
            tracing::debug!(page, last_page, "ignoring out of range page change");
            return None;
        }

        self.session.page = page;

        Some(self.issue())
    }

    /// Applies the outcome of a fetch started by a `begin_*` call.
    ///
    /// Returns `false` without touching the session when a newer request has
    /// been issued since `request` was handed out.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        result: Result<PageResponse, CatalogError>,
    ) -> bool {
        if request.seq != self.session.seq {
            tracing::debug!(
                stale_seq = request.seq,
                current_seq = self.session.seq,
                term = %request.term,
                page = request.page,
                "discarding superseded catalog response"
            );
            return false;
        }

        match result {
            Ok(response) => {
                tracing::debug!(
                    term = %self.session.term,
                    page = self.session.page,
                    items = response.items.len(),
                    total_results = response.total_results,
                    "search page ready"
                );
                self.session.results = response.items;
                self.session.total_results = response.total_results;
                self.session.error_message = None;
                self.session.status = SessionStatus::Ready;
            }
            Err(CatalogError::NoResults(message)) => {
                tracing::debug!(term = %self.session.term, %message, "catalog returned no results");
                self.fail(message);
            }
            Err(CatalogError::Network(cause)) => {
                tracing::warn!(term = %self.session.term, %cause, "catalog request failed");
                self.fail(NETWORK_ERROR_MESSAGE.to_string());
            }
        }

        true
    }

    /// Runs a complete search against `client`.
    ///
    /// Returns whether the session changed, i.e. whether the term was
    /// accepted.
    pub fn search<C>(&mut self, client: &C, term: &str) -> bool
    where
        C: CatalogClient + ?Sized,
    {
        let Some(request) = self.begin_search(term) else {
            return false;
        };
        let result = client.fetch_page(request.term(), request.page());
        self.complete(&request, result)
    }

    /// Fetches `page` of the current term from `client`.
    ///
    /// Returns whether the page change was accepted.
    pub fn change_page<C>(&mut self, client: &C, page: u32) -> bool
    where
        C: CatalogClient + ?Sized,
    {
        let Some(request) = self.begin_change_page(page) else {
            return false;
        };
        let result = client.fetch_page(request.term(), request.page());
        self.complete(&request, result)
    }

    pub fn next_page<C>(&mut self, client: &C) -> bool
    where
        C: CatalogClient + ?Sized,
    {
        self.change_page(client, self.session.page.saturating_add(1))
    }

    pub fn previous_page<C>(&mut self, client: &C) -> bool
    where
        C: CatalogClient + ?Sized,
    {
        self.change_page(client, self.session.page.saturating_sub(1))
    }

    /// Enters `Loading` for the session's current term and page.
    fn issue(&mut self) -> PageRequest {
        self.session.seq += 1;
        self.session.results.clear();
        self.session.error_message = None;
        self.session.status = SessionStatus::Loading;

        tracing::debug!(
            seq = self.session.seq,
            term = %self.session.term,
            page = self.session.page,
            "issuing catalog request"
        );

        PageRequest {
            seq: self.session.seq,
            term: self.session.term.clone(),
            page: self.session.page,
        }
    }

    fn fail(&mut self, message: String) {
        self.session.results.clear();
        self.session.total_results = 0;
        self.session.error_message = Some(message);
        self.session.status = SessionStatus::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MediaType, PAGE_SIZE};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Catalog serving generated pages for known terms
    #[derive(Default)]
    struct FakeCatalog {
        totals: HashMap<String, u32>,
        network_down: bool,
        calls: RefCell<Vec<(String, u32)>>,
    }

    impl FakeCatalog {
        fn with_term(mut self, term: &str, total: u32) -> Self {
            self.totals.insert(term.to_string(), total);
            self
        }
    }

    fn item(term: &str, page: u32, index: u32) -> MovieSummary {
        MovieSummary {
            id: format!("{}-{}-{}", term, page, index),
            title: format!("{} part {}", term, index),
            year: "2001".to_string(),
            poster_url: "N/A".to_string(),
            media_type: Some(MediaType::Movie),
        }
    }

    fn page_of(term: &str, page: u32, total: u32) -> PageResponse {
        let start = (page - 1) * PAGE_SIZE;
        let count = total.saturating_sub(start).min(PAGE_SIZE);
        PageResponse {
            items: (0..count).map(|i| item(term, page, i)).collect(),
            total_results: total,
        }
    }

    impl CatalogClient for FakeCatalog {
        fn fetch_page(&self, term: &str, page: u32) -> Result<PageResponse, CatalogError> {
            self.calls.borrow_mut().push((term.to_string(), page));
            if self.network_down {
                return Err(CatalogError::Network("connection reset".to_string()));
            }
            match self.totals.get(term) {
                Some(&total) => Ok(page_of(term, page, total)),
                None => Err(CatalogError::NoResults("Movie not found!".to_string())),
            }
        }
    }

    fn all_from(results: &[MovieSummary], term: &str, page: u32) -> bool {
        let prefix = format!("{}-{}-", term, page);
        results.iter().all(|m| m.id.starts_with(&prefix))
    }

    #[test]
    fn test_new_session_is_idle() {
        let controller = SearchController::new();
        let session = controller.session();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.page(), 1);
        assert_eq!(session.total_results(), 0);
        assert!(session.results().is_empty());
        assert_eq!(session.error_message(), None);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let catalog = FakeCatalog::default().with_term("batman", 34);
        let mut controller = SearchController::new();
        controller.search(&catalog, "batman");
        let before = controller.session().clone();

        assert!(!controller.search(&catalog, "   "));
        assert_eq!(controller.session(), &before);
        assert_eq!(catalog.calls.borrow().len(), 1);
    }

    #[test]
    fn test_search_success() {
        let catalog = FakeCatalog::default().with_term("batman", 34);
        let mut controller = SearchController::new();

        assert!(controller.search(&catalog, "  batman "));

        let session = controller.session();
        assert_eq!(session.status(), SessionStatus::Ready);
        assert_eq!(session.term(), "batman");
        assert_eq!(session.page(), 1);
        assert_eq!(session.total_results(), 34);
        assert_eq!(session.results().len(), 10);
        assert_eq!(session.error_message(), None);
        assert_eq!(catalog.calls.borrow().as_slice(), &[("batman".to_string(), 1)]);
    }

    #[test]
    fn test_search_not_found() {
        let catalog = FakeCatalog::default();
        let mut controller = SearchController::new();

        controller.search(&catalog, "zzzqqqnomovie");

        let session = controller.session();
        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.error_message(), Some("Movie not found!"));
        assert!(session.results().is_empty());
        assert_eq!(session.total_results(), 0);
    }

    #[test]
    fn test_search_network_failure() {
        let catalog = FakeCatalog {
            network_down: true,
            ..FakeCatalog::default()
        };
        let mut controller = SearchController::new();

        controller.search(&catalog, "batman");

        let session = controller.session();
        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.error_message(), Some(NETWORK_ERROR_MESSAGE));
        assert!(session.results().is_empty());
        assert_eq!(session.total_results(), 0);
    }

    #[test]
    fn test_begin_search_clears_previous_results() {
        let catalog = FakeCatalog::default().with_term("batman", 34);
        let mut controller = SearchController::new();
        controller.search(&catalog, "batman");

        let request = controller.begin_search("superman").unwrap();

        let session = controller.session();
        assert_eq!(session.status(), SessionStatus::Loading);
        assert_eq!(session.term(), "superman");
        assert!(session.results().is_empty());
        assert_eq!(session.total_results(), 0);
        assert_eq!(request.term(), "superman");
        assert_eq!(request.page(), 1);
    }

    #[test]
    fn test_pagination_bounds() {
        let catalog = FakeCatalog::default().with_term("alien", 23);
        let mut controller = SearchController::new();
        controller.search(&catalog, "alien");

        assert!(!controller.change_page(&catalog, 0));
        assert_eq!(controller.session().page(), 1);
        assert!(!controller.change_page(&catalog, 4));
        assert_eq!(controller.session().page(), 1);
        assert_eq!(controller.session().status(), SessionStatus::Ready);

        assert!(controller.change_page(&catalog, 3));
        let session = controller.session();
        assert_eq!(session.page(), 3);
        assert_eq!(session.results().len(), 3);
        assert!(all_from(session.results(), "alien", 3));
    }

    #[test]
    fn test_rejected_page_keeps_results() {
        let catalog = FakeCatalog::default().with_term("batman", 34);
        let mut controller = SearchController::new();
        controller.search(&catalog, "batman");
        let before = controller.session().clone();

        assert!(!controller.change_page(&catalog, 5));

        let session = controller.session();
        assert_eq!(session, &before);
        assert_eq!(session.page(), 1);
        assert_eq!(session.results().len(), 10);
        assert_eq!(session.status(), SessionStatus::Ready);

        // ceil(34 / 10) = 4 is still reachable
        assert!(controller.change_page(&catalog, 4));
        assert_eq!(controller.session().results().len(), 4);
    }

    #[test]
    fn test_search_resets_page() {
        let catalog = FakeCatalog::default()
            .with_term("batman", 34)
            .with_term("robin", 12);
        let mut controller = SearchController::new();
        controller.search(&catalog, "batman");
        controller.change_page(&catalog, 3);
        assert_eq!(controller.session().page(), 3);

        controller.search(&catalog, "robin");

        let session = controller.session();
        assert_eq!(session.page(), 1);
        assert_eq!(session.total_results(), 12);
        assert_eq!(session.results().len(), 10);
        assert!(all_from(session.results(), "robin", 1));
    }

    #[test]
    fn test_last_page_request_wins_in_order() {
        let catalog = FakeCatalog::default().with_term("batman", 34);
        let mut controller = SearchController::new();
        controller.search(&catalog, "batman");

        let second = controller.begin_change_page(2).unwrap();
        let third = controller.begin_change_page(3).unwrap();

        assert!(!controller.complete(&second, Ok(page_of("batman", 2, 34))));
        assert_eq!(controller.session().status(), SessionStatus::Loading);
        assert!(controller.complete(&third, Ok(page_of("batman", 3, 34))));

        let session = controller.session();
        assert_eq!(session.page(), 3);
        assert_eq!(session.status(), SessionStatus::Ready);
        assert!(all_from(session.results(), "batman", 3));
    }

    #[test]
    fn test_last_page_request_wins_out_of_order() {
        let catalog = FakeCatalog::default().with_term("batman", 34);
        let mut controller = SearchController::new();
        controller.search(&catalog, "batman");

        let second = controller.begin_change_page(2).unwrap();
        let third = controller.begin_change_page(3).unwrap();

        assert!(controller.complete(&third, Ok(page_of("batman", 3, 34))));
        assert!(!controller.complete(&second, Ok(page_of("batman", 2, 34))));

        let session = controller.session();
        assert_eq!(session.page(), 3);
        assert_eq!(session.status(), SessionStatus::Ready);
        assert!(all_from(session.results(), "batman", 3));
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let catalog = FakeCatalog::default().with_term("batman", 34);
        let mut controller = SearchController::new();
        controller.search(&catalog, "batman");

        let second = controller.begin_change_page(2).unwrap();
        let third = controller.begin_change_page(3).unwrap();
        controller.complete(&third, Ok(page_of("batman", 3, 34)));
        controller.complete(&second, Err(CatalogError::Network("timeout".to_string())));

        assert_eq!(controller.session().status(), SessionStatus::Ready);
        assert_eq!(controller.session().error_message(), None);
    }

    #[test]
    fn test_stale_search_response_is_discarded() {
        let mut controller = SearchController::new();

        let old = controller.begin_search("batman").unwrap();
        let new = controller.begin_search("superman").unwrap();
        assert!(new.seq() > old.seq());

        controller.complete(&new, Ok(page_of("superman", 1, 5)));
        controller.complete(&old, Ok(page_of("batman", 1, 34)));

        let session = controller.session();
        assert_eq!(session.term(), "superman");
        assert_eq!(session.total_results(), 5);
        assert!(all_from(session.results(), "superman", 1));
    }

    #[test]
    fn test_page_change_refused_while_new_search_pending() {
        let catalog = FakeCatalog::default().with_term("batman", 34);
        let mut controller = SearchController::new();
        controller.search(&catalog, "batman");

        let pending = controller.begin_search("robin").unwrap();

        // The old term's 34 results must not be used as the bound
        assert!(controller.begin_change_page(2).is_none());
        assert_eq!(controller.session().page(), 1);

        controller.complete(&pending, Ok(page_of("robin", 1, 12)));
        assert!(controller.begin_change_page(2).is_some());
    }

    #[test]
    fn test_page_change_after_failure_is_refused() {
        let catalog = FakeCatalog::default().with_term("batman", 34);
        let mut controller = SearchController::new();
        controller.search(&catalog, "batman");

        let request = controller.begin_change_page(2).unwrap();
        controller.complete(&request, Err(CatalogError::Network("reset".to_string())));
        assert_eq!(controller.session().status(), SessionStatus::Failed);

        assert!(!controller.change_page(&catalog, 1));
        assert_eq!(controller.session().status(), SessionStatus::Failed);
    }

    #[test]
    fn test_next_and_previous_page() {
        let catalog = FakeCatalog::default().with_term("batman", 25);
        let mut controller = SearchController::new();
        controller.search(&catalog, "batman");

        assert!(!controller.session().has_previous_page());
        assert!(controller.session().has_next_page());
        assert!(!controller.previous_page(&catalog));

        assert!(controller.next_page(&catalog));
        assert!(controller.next_page(&catalog));
        assert_eq!(controller.session().page(), 3);
        assert!(!controller.session().has_next_page());
        assert!(!controller.next_page(&catalog));

        assert!(controller.previous_page(&catalog));
        assert_eq!(controller.session().page(), 2);
        assert!(controller.session().has_previous_page());
    }
}
