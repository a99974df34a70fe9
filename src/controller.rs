//! Search orchestration
//!
//! `SearchController` owns the search lifecycle: it snapshots the
//! current criteria, dispatches the request, and applies the response
//! to the shared result state. Responses from superseded requests are
//! discarded, so the visible state always reflects the most recently
//! issued search even when responses arrive out of order.

use crate::markers::{self, Marker};
use crate::notify::Notifier;
use crate::query::{UserQuery, ITEMS_PER_PAGE};
use crate::service::{SearchResults, SearchService};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Shown when a search succeeds but matches nothing.
pub const NO_MATCH_MESSAGE: &str =
    "It seems that we don't have any user which meets your criteria!";

/// Shown when the search request itself fails.
pub const SEARCH_FAILED_MESSAGE: &str = "Search failed, please try again.";

/// Projection of the latest applied search response.
#[derive(Debug, Clone, Default)]
pub struct ResultState {
    /// Raw user records for the current page.
    pub users: Vec<Value>,
    /// Markers for the current page. `None` means the map is cleared,
    /// which is distinct from an empty marker list.
    pub markers: Option<Vec<Marker>>,
    /// Total matches across all pages.
    pub total: u64,
    /// Whether any search response has ever been applied.
    pub has_searched: bool,
}

/// Drives searches and owns the criteria and result state.
pub struct SearchController {
    service: Arc<dyn SearchService>,
    notifier: Arc<dyn Notifier>,
    query: Mutex<UserQuery>,
    state: Mutex<ResultState>,
    /// Ticket of the most recently issued search.
    issued: AtomicU64,
    /// The initial page binding must not trigger a search.
    first_run: AtomicBool,
}

impl SearchController {
    pub fn new(service: Arc<dyn SearchService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            notifier,
            query: Mutex::new(UserQuery::new()),
            state: Mutex::new(ResultState::default()),
            issued: AtomicU64::new(0),
            first_run: AtomicBool::new(true),
        }
    }

    /// Run a search with the current criteria and apply the response.
    ///
    /// The criteria snapshot and the ticket are taken together, so a
    /// later-issued search always carries criteria at least as fresh as
    /// any earlier one. After the response arrives the ticket is checked
    /// again under the state lock; a superseded response is dropped
    /// without touching state or notifying.
    pub async fn search(&self) {
        let (params, page, ticket) = {
            let query = self.query.lock().await;
            let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            (query.find_params(), query.page_index(), ticket)
        };

        debug!("Start searching for users (request #{}, page {})", ticket, page);
        let outcome = self.service.find(&params).await;

        let mut state = self.state.lock().await;
        if self.issued.load(Ordering::SeqCst) != ticket {
            debug!("Discarding superseded search response #{}", ticket);
            return;
        }

        match outcome {
            Ok(results) => self.apply(&mut state, results, page),
            Err(err) => {
                warn!("Search request failed: {}", err);
                self.notifier.error(SEARCH_FAILED_MESSAGE);
            }
        }
    }

    fn apply(&self, state: &mut ResultState, results: SearchResults, page: u64) {
        info!("Found a total of {} users", results.total);

        state.total = results.total;
        state.users = results.users;
        state.has_searched = true;

        if state.users.is_empty() {
            state.markers = None;
            self.notifier.error(NO_MATCH_MESSAGE);
        } else {
            state.markers = Some(markers::project_all(&state.users));
            if page == 1 {
                self.notifier.info(&format!(
                    "We found {} users which meet your criteria",
                    state.total
                ));
            }
        }
    }

    /// Move to a page. Changing the page triggers a fresh search, with
    /// one exception: the very first call only establishes the binding
    /// and never searches, so a shell can set its starting page without
    /// firing a request.
    pub async fn set_page(&self, page: u64) {
        let page = page.max(1);
        let changed = {
            let mut query = self.query.lock().await;
            let changed = query.page_index() != page;
            query.set_page(page);
            changed
        };

        if self.first_run.swap(false, Ordering::SeqCst) {
            debug!("Initial page binding, search suppressed");
            return;
        }

        if changed {
            self.search().await;
        }
    }

    pub async fn set_free_text(&self, text: Option<String>) {
        self.query.lock().await.set_free_text(text);
    }

    pub async fn set_wildcard(&self, wildcard: Option<bool>) {
        self.query.lock().await.set_wildcard(wildcard);
    }

    /// Record a map click as the active point of interest.
    pub async fn map_click(&self, lat: f64, lon: f64) {
        self.query.lock().await.set_map_click(lat, lon);
    }

    pub async fn set_distance(&self, distance: Option<String>) {
        self.query.lock().await.set_distance(distance);
    }

    pub async fn set_field(&self, field: Option<String>) {
        self.query.lock().await.set_field(field);
    }

    /// Snapshot of the latest applied results.
    pub async fn results(&self) -> ResultState {
        self.state.lock().await.clone()
    }

    pub async fn current_page(&self) -> u64 {
        self.query.lock().await.page_index()
    }

    /// Snapshot of the current criteria.
    pub async fn query(&self) -> UserQuery {
        self.query.lock().await.clone()
    }

    pub fn items_per_page(&self) -> u64 {
        ITEMS_PER_PAGE
    }
}
