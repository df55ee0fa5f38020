//! Incremental search-and-pagination state for one list screen.
//!
//! [`PagedList`] never performs I/O itself. Operations that need data return a
//! [`PageRequest`]; the caller runs it against a [`PageSource`] and hands the
//! outcome back through [`PagedList::apply`]. Every request carries a sequence
//! number and only the request currently tracked as in flight may change the
//! list, so late or superseded responses are dropped no matter when they land.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::RequestError;

/// One page of results as returned by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of matches, for endpoints that report one.
    pub total_count: Option<usize>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: Some(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Reset fetch for a new debounced query.
    Initial,
    /// Next page appended to the current results.
    More,
    /// Reset fetch for the current query, requested by the user.
    Refresh,
}

impl FetchKind {
    pub fn is_reset(self) -> bool {
        matches!(self, FetchKind::Initial | FetchKind::Refresh)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub seq: u64,
    pub kind: FetchKind,
    /// `None` when the search box is empty.
    pub query: Option<String>,
    pub offset: usize,
    pub limit: usize,
}

/// Anything that can serve pages of `T`.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<T>, RequestError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub offset: usize,
    pub has_more: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            offset: 0,
            has_more: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    LoadingInitial,
    LoadingMore,
    Refreshing,
    Errored,
}

impl FetchStatus {
    fn for_kind(kind: FetchKind) -> Self {
        match kind {
            FetchKind::Initial => FetchStatus::LoadingInitial,
            FetchKind::More => FetchStatus::LoadingMore,
            FetchKind::Refresh => FetchStatus::Refreshing,
        }
    }
}

/// What [`PagedList::apply`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Replaced,
    Appended,
    Failed,
    /// The response was superseded or the list is closed; nothing changed.
    Stale,
}

#[derive(Debug, Clone)]
struct InFlight {
    seq: u64,
    kind: FetchKind,
    query: Option<String>,
}

#[derive(Debug)]
pub struct PagedList<T> {
    page_size: usize,
    /// Text as typed, echoed back to the search box.
    query: String,
    /// Last value delivered by the debouncer; refreshes use it.
    debounced: Option<String>,
    /// Query the current items were fetched for; load-more continues it.
    loaded_query: Option<String>,
    items: Vec<T>,
    total_count: Option<usize>,
    cursor: Cursor,
    status: FetchStatus,
    error: Option<String>,
    last_seq: u64,
    in_flight: Option<InFlight>,
    closed: bool,
}

impl<T> PagedList<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            query: String::new(),
            debounced: None,
            loaded_query: None,
            items: Vec::new(),
            total_count: None,
            cursor: Cursor::default(),
            status: FetchStatus::Idle,
            error: None,
            last_seq: 0,
            in_flight: None,
            closed: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Server-reported total for the loaded query, if the source reports one.
    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[allow(dead_code)]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    #[allow(dead_code)]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Echo the typed text. Fetching is left to the debouncer.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Start a reset fetch for a settled query, superseding anything in flight.
    pub fn on_debounced_query_change(&mut self, query: &str) -> Option<PageRequest> {
        if self.closed {
            return None;
        }
        let query = normalize(query);
        self.debounced = query.clone();
        Some(self.issue(FetchKind::Initial, query, 0))
    }

    /// Fetch the next page, unless the end was reached or a fetch is running.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.closed || !self.cursor.has_more || self.in_flight.is_some() {
            return None;
        }
        let query = self.loaded_query.clone();
        let offset = self.cursor.offset;
        Some(self.issue(FetchKind::More, query, offset))
    }

    /// Reload the current query from the first page. A reset already in
    /// flight makes this a no-op; a pending load-more is superseded.
    pub fn refresh(&mut self) -> Option<PageRequest> {
        if self.closed {
            return None;
        }
        if self.in_flight.as_ref().is_some_and(|f| f.kind.is_reset()) {
            debug!("refresh ignored, reset already in flight");
            return None;
        }
        let query = self.debounced.clone();
        Some(self.issue(FetchKind::Refresh, query, 0))
    }

    fn issue(&mut self, kind: FetchKind, query: Option<String>, offset: usize) -> PageRequest {
        self.last_seq += 1;
        let seq = self.last_seq;

        if let Some(previous) = self.in_flight.as_ref() {
            debug!(superseded = previous.seq, seq, "superseding in-flight fetch");
        }

        self.in_flight = Some(InFlight {
            seq,
            kind,
            query: query.clone(),
        });
        self.status = FetchStatus::for_kind(kind);
        self.error = None;

        PageRequest {
            seq,
            kind,
            query,
            offset,
            limit: self.page_size,
        }
    }

    /// Feed back the outcome of request `seq`.
    pub fn apply(&mut self, seq: u64, result: Result<Page<T>, RequestError>) -> Applied {
        if self.closed {
            debug!(seq, "discarding response for closed list");
            return Applied::Stale;
        }
        if self.in_flight.as_ref().map(|f| f.seq) != Some(seq) {
            debug!(seq, "discarding stale response");
            return Applied::Stale;
        }
        let Some(in_flight) = self.in_flight.take() else {
            return Applied::Stale;
        };

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!(seq, kind = ?in_flight.kind, status = ?err.status(), error = %err, "page fetch failed");
                self.status = FetchStatus::Errored;
                self.error = Some(err.to_string());
                return Applied::Failed;
            }
        };

        let received = page.items.len();
        let applied = if in_flight.kind.is_reset() {
            self.items = page.items;
            self.loaded_query = in_flight.query;
            Applied::Replaced
        } else {
            self.items.extend(page.items);
            Applied::Appended
        };

        self.total_count = page.total_count;
        if let Some(total) = page.total_count {
            if self.items.len() > total {
                warn!(total, len = self.items.len(), "server returned more rows than its total");
                self.items.truncate(total);
            }
        }

        self.cursor = Cursor {
            offset: self.items.len(),
            has_more: has_more(received, self.page_size, self.items.len(), page.total_count),
        };
        self.status = FetchStatus::Idle;

        debug!(seq, received, len = self.items.len(), has_more = self.cursor.has_more, "page applied");
        applied
    }

    /// Tear down the session. Responses that arrive afterwards are ignored.
    pub fn close(&mut self) {
        self.closed = true;
        self.in_flight = None;
    }
}

/// A short page always ends the list, whatever the server's total says.
/// A full page ends it only when the total has been reached.
fn has_more(received: usize, page_size: usize, loaded: usize, total: Option<usize>) -> bool {
    if received < page_size {
        return false;
    }
    total.map_or(true, |total| loaded < total)
}

fn normalize(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(range: std::ops::Range<u32>, total: Option<usize>) -> Result<Page<u32>, RequestError> {
        Ok(Page {
            items: range.collect(),
            total_count: total,
        })
    }

    fn loaded(range: std::ops::Range<u32>, total: Option<usize>) -> PagedList<u32> {
        let mut list = PagedList::new(10);
        let req = list.on_debounced_query_change("").unwrap();
        assert_eq!(list.apply(req.seq, page(range, total)), Applied::Replaced);
        list
    }

    #[test]
    fn starts_idle_and_empty() {
        let list: PagedList<u32> = PagedList::new(10);
        assert_eq!(list.status(), FetchStatus::Idle);
        assert!(list.items().is_empty());
        assert_eq!(list.cursor(), Cursor { offset: 0, has_more: true });
        assert!(list.error().is_none());
    }

    #[test]
    fn set_query_only_echoes() {
        let mut list: PagedList<u32> = PagedList::new(10);
        list.set_query("refor");
        assert_eq!(list.query(), "refor");
        assert_eq!(list.status(), FetchStatus::Idle);
        assert!(!list.is_loading());
    }

    #[test]
    fn debounced_query_issues_reset_request() {
        let mut list: PagedList<u32> = PagedList::new(10);
        let req = list.on_debounced_query_change("  salud ").unwrap();
        assert_eq!(req.kind, FetchKind::Initial);
        assert_eq!(req.query.as_deref(), Some("salud"));
        assert_eq!(req.offset, 0);
        assert_eq!(req.limit, 10);
        assert_eq!(list.status(), FetchStatus::LoadingInitial);

        let req = list.on_debounced_query_change("").unwrap();
        assert_eq!(req.query, None);
    }

    #[test]
    fn reset_replaces_and_load_more_appends() {
        let mut list = loaded(1..11, Some(50));
        assert_eq!(list.cursor(), Cursor { offset: 10, has_more: true });

        let more = list.load_more().unwrap();
        assert_eq!(more.kind, FetchKind::More);
        assert_eq!(more.offset, 10);
        assert_eq!(list.status(), FetchStatus::LoadingMore);
        assert_eq!(list.apply(more.seq, page(11..21, Some(50))), Applied::Appended);
        assert_eq!(list.items(), (1..21).collect::<Vec<_>>().as_slice());
        assert_eq!(list.cursor().offset, 20);

        let reset = list.on_debounced_query_change("j").unwrap();
        assert_eq!(list.apply(reset.seq, page(100..105, Some(5))), Applied::Replaced);
        assert_eq!(list.items(), &[100, 101, 102, 103, 104]);
        assert_eq!(list.cursor(), Cursor { offset: 5, has_more: false });
        assert_eq!(list.status(), FetchStatus::Idle);
    }

    #[test]
    fn short_page_ends_list_despite_total() {
        let list = loaded(0..7, Some(50));
        assert!(!list.cursor().has_more);
    }

    #[test]
    fn full_page_reaching_total_ends_list() {
        let list = loaded(0..10, Some(10));
        assert!(!list.cursor().has_more);
    }

    #[test]
    fn full_page_without_total_keeps_going() {
        let list = loaded(0..10, None);
        assert!(list.cursor().has_more);
    }

    #[test]
    fn result_set_never_exceeds_total() {
        let list = loaded(0..10, Some(6));
        assert_eq!(list.items().len(), 6);
        assert_eq!(list.cursor(), Cursor { offset: 6, has_more: false });
    }

    #[test]
    fn load_more_is_noop_at_end() {
        let mut list = loaded(0..3, None);
        assert!(list.load_more().is_none());
        assert_eq!(list.status(), FetchStatus::Idle);
    }

    #[test]
    fn load_more_is_noop_while_fetching() {
        let mut list = loaded(0..10, None);
        let first = list.load_more().unwrap();
        assert!(list.load_more().is_none());
        assert!(list.load_more().is_none());
        assert_eq!(list.apply(first.seq, page(10..20, None)), Applied::Appended);
        assert!(list.load_more().is_some());
    }

    #[test]
    fn load_more_continues_loaded_query() {
        let mut list: PagedList<u32> = PagedList::new(10);
        let req = list.on_debounced_query_change("agua").unwrap();
        list.apply(req.seq, page(0..10, None));
        list.set_query("agua pot");

        let more = list.load_more().unwrap();
        assert_eq!(more.query.as_deref(), Some("agua"));
    }

    #[test]
    fn newer_reset_wins_over_late_older_one() {
        let mut list: PagedList<u32> = PagedList::new(10);
        let r1 = list.on_debounced_query_change("x").unwrap();
        let r2 = list.on_debounced_query_change("y").unwrap();
        assert!(r2.seq > r1.seq);

        assert_eq!(list.apply(r2.seq, page(200..203, None)), Applied::Replaced);
        assert_eq!(list.apply(r1.seq, page(100..110, None)), Applied::Stale);
        assert_eq!(list.items(), &[200, 201, 202]);
    }

    #[test]
    fn older_reset_resolving_first_is_discarded() {
        let mut list: PagedList<u32> = PagedList::new(10);
        let r1 = list.on_debounced_query_change("x").unwrap();
        let r2 = list.on_debounced_query_change("y").unwrap();

        assert_eq!(list.apply(r1.seq, page(100..110, None)), Applied::Stale);
        assert!(list.items().is_empty());
        assert_eq!(list.status(), FetchStatus::LoadingInitial);

        assert_eq!(list.apply(r2.seq, page(200..201, None)), Applied::Replaced);
        assert_eq!(list.items(), &[200]);
    }

    #[test]
    fn reset_invalidates_pending_load_more() {
        let mut list = loaded(0..10, None);
        let more = list.load_more().unwrap();
        let reset = list.on_debounced_query_change("new").unwrap();

        assert_eq!(list.apply(more.seq, page(10..20, None)), Applied::Stale);
        assert_eq!(list.items().len(), 10);
        assert_eq!(list.apply(reset.seq, page(50..52, None)), Applied::Replaced);
        assert_eq!(list.items(), &[50, 51]);
    }

    #[test]
    fn refresh_is_idempotent_while_in_flight() {
        let mut list = loaded(0..10, None);
        let first = list.refresh().unwrap();
        assert_eq!(first.kind, FetchKind::Refresh);
        assert_eq!(first.offset, 0);
        assert_eq!(list.status(), FetchStatus::Refreshing);
        assert!(list.refresh().is_none());

        assert_eq!(list.apply(first.seq, page(0..4, None)), Applied::Replaced);
        assert_eq!(list.status(), FetchStatus::Idle);
    }

    #[test]
    fn refresh_uses_debounced_query_and_keeps_echo() {
        let mut list: PagedList<u32> = PagedList::new(10);
        let req = list.on_debounced_query_change("mineria").unwrap();
        list.apply(req.seq, page(0..10, None));
        list.set_query("miner");

        let refresh = list.refresh().unwrap();
        assert_eq!(refresh.query.as_deref(), Some("mineria"));
        assert_eq!(list.query(), "miner");
    }

    #[test]
    fn refresh_supersedes_load_more() {
        let mut list = loaded(0..10, None);
        let more = list.load_more().unwrap();
        let refresh = list.refresh().unwrap();

        assert_eq!(list.apply(more.seq, page(10..20, None)), Applied::Stale);
        assert_eq!(list.apply(refresh.seq, page(0..10, None)), Applied::Replaced);
        assert_eq!(list.items().len(), 10);
    }

    #[test]
    fn failed_load_more_leaves_results_untouched() {
        let mut list = loaded(0..10, Some(40));
        let before = list.cursor();

        let more = list.load_more().unwrap();
        let outcome = list.apply(more.seq, Err(RequestError::Network("connection reset".into())));
        assert_eq!(outcome, Applied::Failed);
        assert_eq!(list.status(), FetchStatus::Errored);
        assert_eq!(list.error(), Some("Network error: connection reset"));
        assert_eq!(list.items().len(), 10);
        assert_eq!(list.cursor(), before);

        let retry = list.load_more().unwrap();
        assert_eq!(retry.offset, 10);
        assert!(list.error().is_none());
        assert_eq!(list.apply(retry.seq, page(10..20, Some(40))), Applied::Appended);
        assert_eq!(list.status(), FetchStatus::Idle);
    }

    #[test]
    fn refresh_clears_error() {
        let mut list: PagedList<u32> = PagedList::new(10);
        let req = list.on_debounced_query_change("").unwrap();
        list.apply(
            req.seq,
            Err(RequestError::Status {
                status: 502,
                message: "Bad Gateway".into(),
            }),
        );
        assert_eq!(list.status(), FetchStatus::Errored);

        let refresh = list.refresh().unwrap();
        assert_eq!(list.status(), FetchStatus::Refreshing);
        list.apply(refresh.seq, page(0..3, None));
        assert_eq!(list.status(), FetchStatus::Idle);
        assert!(list.error().is_none());
        assert_eq!(list.items().len(), 3);
    }

    #[test]
    fn closed_list_ignores_late_results() {
        let mut list = loaded(0..10, None);
        let more = list.load_more().unwrap();
        list.close();

        assert_eq!(list.apply(more.seq, page(10..20, None)), Applied::Stale);
        assert_eq!(list.apply(more.seq, Err(RequestError::Network("x".into()))), Applied::Stale);
        assert_eq!(list.items().len(), 10);
        assert!(list.load_more().is_none());
        assert!(list.refresh().is_none());
        assert!(list.on_debounced_query_change("q").is_none());
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let list: PagedList<u32> = PagedList::new(0);
        assert_eq!(list.page_size(), 1);
    }
}
