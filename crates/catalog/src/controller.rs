//! Listing controller: the view state behind the anime grid.
//!
//! Owns the current section, page, accumulated items and loading/error flags,
//! and turns UI commands into catalog fetches. State changes are published
//! through a `watch` channel so a view can re-render on every change.
//!
//! Every fetch carries a request generation. Full reloads start a new
//! generation; a result is applied only if its generation is still the latest,
//! so a slow response for an abandoned section or query is dropped instead of
//! overwriting newer state.

use crate::debounce::Debouncer;
use crate::gateway::{CatalogSource, ListingRequest, Section};
use shared::config::ListingConfig;
use shared::{Anime, SearchFilters};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Message shown when the catalog source itself fails
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load anime. Please try again.";

/// Snapshot of the listing view state
#[derive(Debug, Clone, PartialEq)]
pub struct ListingState {
    pub items: Vec<Anime>,
    pub loading: bool,
    pub error: Option<String>,
    /// 1-based page of the last fetch
    pub page: u32,
    pub has_more: bool,
    pub current_section: Section,
    pub search_query: String,
    pub search_filters: SearchFilters,
}

impl ListingState {
    fn new(section: Section) -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            page: 1,
            has_more: true,
            current_section: section,
            search_query: String::new(),
            search_filters: SearchFilters::default(),
        }
    }

    fn request(&self) -> ListingRequest {
        ListingRequest {
            section: self.current_section,
            query: self.search_query.clone(),
            filters: self.search_filters.clone(),
            page: self.page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    Replace,
    Append,
}

struct Inner<S> {
    source: Arc<S>,
    state: watch::Sender<ListingState>,
    generation: AtomicU64,
    appending: AtomicBool,
    debouncer: Debouncer,
    has_more_threshold: usize,
}

impl<S: CatalogSource> Inner<S> {
    /// Reset to page 1 of `section` and start a new generation.
    /// `keep_query` preserves the active search query and filters.
    fn begin_reload(&self, section: Section, keep_query: bool) -> (u64, ListingRequest) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut request = ListingRequest::default();

        self.state.send_modify(|state| {
            state.current_section = section;
            state.page = 1;
            state.loading = true;
            state.error = None;
            if !keep_query {
                state.search_query.clear();
                state.search_filters = SearchFilters::default();
            }
            request = state.request();
        });

        debug!(generation = generation, section = %section, "Listing reload started");
        (generation, request)
    }

    fn begin_search(&self, query: String, filters: SearchFilters) -> (u64, ListingRequest) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut request = ListingRequest::default();

        self.state.send_modify(|state| {
            state.search_query = query;
            state.search_filters = filters;
            state.current_section = Section::Search;
            state.page = 1;
            state.loading = true;
            state.error = None;
            request = state.request();
        });

        info!(generation = generation, query = %request.query, "Search started");
        (generation, request)
    }

    /// Apply a fetch result if `generation` is still current
    fn finish(&self, generation: u64, mode: FetchMode, result: anyhow::Result<Vec<Anime>>) {
        if mode == FetchMode::Append {
            self.appending.store(false, Ordering::SeqCst);
        }

        let threshold = self.has_more_threshold;
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }

            match result {
                Ok(items) => {
                    state.has_more = items.len() >= threshold;
                    match mode {
                        FetchMode::Replace => state.items = items,
                        FetchMode::Append => state.items.extend(items),
                    }
                    debug!(
                        section = %state.current_section,
                        page = state.page,
                        total = state.items.len(),
                        has_more = state.has_more,
                        "Listing updated"
                    );
                }
                Err(e) => {
                    error!(section = %state.current_section, error = %e, "Error fetching anime");
                    state.error = Some(LOAD_ERROR_MESSAGE.to_string());
                }
            }
            state.loading = false;
            true
        });

        if !applied {
            debug!(generation = generation, "Discarding stale listing result");
        }
    }
}

impl<S> Inner<S> {
    /// Settle the flags of a fetch whose result will never arrive. A current
    /// reload stops loading; a current append gives its page back.
    fn abandon(&self, generation: u64, mode: FetchMode) {
        if mode == FetchMode::Append {
            self.appending.store(false, Ordering::SeqCst);
        }

        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match mode {
                FetchMode::Replace => std::mem::replace(&mut state.loading, false),
                FetchMode::Append => {
                    state.page = state.page.saturating_sub(1).max(1);
                    true
                }
            }
        });

        debug!(generation = generation, mode = ?mode, "Listing fetch abandoned");
    }
}

/// Calls [`Inner::abandon`] if dropped before the fetch completes
struct FetchGuard<'a, S> {
    inner: &'a Inner<S>,
    generation: u64,
    mode: FetchMode,
    completed: bool,
}

impl<S> Drop for FetchGuard<'_, S> {
    fn drop(&mut self) {
        if !self.completed {
            self.inner.abandon(self.generation, self.mode);
        }
    }
}

/// Fetch in the background, applying the result only while the controller
/// is still alive
async fn fetch_detached<S: CatalogSource>(
    inner: Weak<Inner<S>>,
    source: Arc<S>,
    generation: u64,
    request: ListingRequest,
) {
    let result = source.fetch_listing(&request).await;
    match inner.upgrade() {
        Some(inner) => inner.finish(generation, FetchMode::Replace, result),
        None => debug!(generation = generation, "Listing controller gone, dropping result"),
    }
}

/// Listing controller handle. Clones share the same state.
pub struct ListingController<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for ListingController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: CatalogSource> ListingController<S> {
    /// Create a controller showing `section`. Nothing is fetched until a
    /// command is issued; see [`ListingController::open`].
    pub fn new(source: S, section: Section, config: &ListingConfig) -> Self {
        let (state, _) = watch::channel(ListingState::new(section));
        Self {
            inner: Arc::new(Inner {
                source: Arc::new(source),
                state,
                generation: AtomicU64::new(0),
                appending: AtomicBool::new(false),
                debouncer: Debouncer::new(Duration::from_millis(config.search_debounce_ms)),
                has_more_threshold: config.has_more_threshold,
            }),
        }
    }

    /// Create a controller and load its first page
    pub async fn open(source: S, section: Section, config: &ListingConfig) -> Self {
        let controller = Self::new(source, section, config);
        controller.change_section(section).await;
        controller
    }

    /// Current state
    pub fn snapshot(&self) -> ListingState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ListingState> {
        self.inner.state.subscribe()
    }

    /// Switch to `section`: clears the search, resets to page 1 and replaces
    /// the items with one fetch
    pub async fn change_section(&self, section: Section) {
        let (generation, request) = self.inner.begin_reload(section, false);
        self.run(generation, FetchMode::Replace, request).await;
    }

    /// Alias of [`ListingController::change_section`]
    pub async fn load_section(&self, section: Section) {
        self.change_section(section).await;
    }

    /// Fetch the next page and append it. Ignored while a reload is running,
    /// while another page is being appended, or when there is nothing more.
    pub async fn load_more(&self) {
        let mut request = None;
        self.inner.state.send_if_modified(|state| {
            if state.loading
                || !state.has_more
                || self.inner.appending.swap(true, Ordering::SeqCst)
            {
                return false;
            }
            state.page += 1;
            request = Some(state.request());
            true
        });

        let Some(request) = request else {
            debug!("load_more ignored");
            return;
        };

        // Appends belong to the current generation; a reload discards them
        let generation = self.inner.generation.load(Ordering::SeqCst);
        info!(section = %request.section, page = request.page, "Loading more anime");
        self.run(generation, FetchMode::Append, request).await;
    }

    /// Search the catalog.
    ///
    /// A blank query cancels any pending search and returns to the default
    /// section right away. Anything else is debounced; only the last query of
    /// a burst is fetched. Must be called from within a Tokio runtime.
    pub fn search(&self, query: &str, filters: Option<SearchFilters>) {
        if query.trim().is_empty() {
            self.inner.debouncer.cancel_pending();
            let (generation, request) = self.inner.begin_reload(Section::default(), false);
            tokio::spawn(fetch_detached(
                Arc::downgrade(&self.inner),
                Arc::clone(&self.inner.source),
                generation,
                request,
            ));
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let query = query.to_string();
        let filters = filters.unwrap_or_default();
        debug!(
            query = %query,
            delay_ms = self.inner.debouncer.delay().as_millis() as u64,
            "Search scheduled"
        );

        self.inner.debouncer.schedule(async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let (generation, request) = inner.begin_search(query, filters);
            let source = Arc::clone(&inner.source);
            drop(inner);

            fetch_detached(weak, source, generation, request).await;
        });
    }

    /// Reload the current section from page 1. An active search keeps its
    /// query and filters.
    pub async fn refresh(&self) {
        let section = self.inner.state.borrow().current_section;
        let keep_query = section == Section::Search;
        let (generation, request) = self.inner.begin_reload(section, keep_query);
        self.run(generation, FetchMode::Replace, request).await;
    }

    /// Whether a debounced search is waiting to fire
    pub fn search_pending(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    async fn run(&self, generation: u64, mode: FetchMode, request: ListingRequest) {
        let mut guard = FetchGuard {
            inner: &self.inner,
            generation,
            mode,
            completed: false,
        };
        let result = self.inner.source.fetch_listing(&request).await;
        guard.completed = true;
        self.inner.finish(generation, mode, result);
    }
}
