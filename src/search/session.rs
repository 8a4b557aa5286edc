//! Synchronous search state machine.
//!
//! Owns the query, page, visible results, de-dup marker and request guard.
//! Every transition is a plain method call; the orchestrator wraps these in
//! a mutex and performs the awaits in between.

use tokio_util::sync::CancellationToken;

use crate::catalog::{
    CatalogClient, Item, ListLatestParams, ListingPage, SearchPage, SearchParams,
};
use crate::error::{Result, StorefrontError};

use super::SearchOptions;
use super::cache::SharedResultCache;
use super::guard::{FetchTicket, RequestGuard};
use super::key::RequestKey;
use super::query::{Mode, Query};
use super::state::SearchSnapshot;

/// The backend call a fetch resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRequest {
    Latest(ListLatestParams),
    Search(SearchParams),
}

impl CatalogRequest {
    /// Run the request, normalizing listing responses.
    pub async fn execute<C>(self, client: &C, cancel: CancellationToken) -> Result<SearchPage>
    where
        C: CatalogClient,
    {
        match self {
            CatalogRequest::Latest(params) => client
                .list_latest(params, cancel)
                .await
                .map(ListingPage::normalize),
            CatalogRequest::Search(params) => client.search(params, cancel).await,
        }
    }
}

/// What is needed to apply a response once it arrives.
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub sequence: u64,
    pub mode: Mode,
    pub page: u32,
    pub append: bool,
    pub key: RequestKey,
}

/// A network fetch that has been issued but not awaited.
#[derive(Debug)]
pub struct PendingFetch {
    pub cancel: CancellationToken,
    pub request: CatalogRequest,
    pub context: FetchContext,
}

#[derive(Debug)]
pub enum FetchStep {
    /// De-duplicated or not allowed right now
    Skipped,
    /// Answered from the cache
    Served,
    Issued(PendingFetch),
}

/// How a resolved fetch affected visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// Superseded by a newer fetch; nothing changed
    Stale,
    Canceled,
    /// Failure shown as an empty result set
    Degraded,
    /// Failure shown as an error message
    Failed,
}

pub struct SearchSession {
    options: SearchOptions,
    query: Query,
    page: u32,
    results: Vec<Item>,
    /// Page the first entry of `results` came from; appends continue after it
    first_page: u32,
    total: usize,
    has_more: bool,
    error: Option<String>,
    is_loading: bool,
    is_searching: bool,
    is_loading_more: bool,
    /// Key of the last non-append fetch, for de-duplication
    last_key: Option<RequestKey>,
    guard: RequestGuard,
    cache: SharedResultCache,
}

impl SearchSession {
    pub fn new(options: SearchOptions, cache: SharedResultCache) -> Self {
        let query = Query::new(options.initial_query.clone());
        let page = options.initial_page.max(1);
        Self {
            options,
            query,
            page,
            results: Vec::new(),
            first_page: page,
            total: 0,
            has_more: true,
            error: None,
            is_loading: false,
            is_searching: false,
            is_loading_more: false,
            last_key: None,
            guard: RequestGuard::new(),
            cache,
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn mode(&self) -> Mode {
        self.query.mode(self.options.min_search_len)
    }

    /// Update the query. Returns true when the trimmed query changed, in
    /// which case the position is reset and anything in flight is dropped.
    pub fn set_query(&mut self, raw: String) -> bool {
        let next = Query::new(raw);
        if next.trimmed() == self.query.trimmed() {
            self.query = next;
            return false;
        }

        tracing::debug!(query = next.trimmed(), "query changed, resetting position");
        self.query = next;
        self.page = 1;
        self.reset_results();
        self.guard.supersede();
        self.clear_flags();
        true
    }

    /// Update the page. Returns true when it changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    /// Go back to the first page, as `submitNow` does.
    pub fn rewind(&mut self) {
        self.page = 1;
    }

    /// Empty query, first page, no results, nothing in flight.
    pub fn clear(&mut self) {
        self.query = Query::default();
        self.page = 1;
        self.reset_results();
        self.guard.supersede();
        self.clear_flags();
    }

    /// Drop anything in flight for good (the consumer is going away).
    pub fn detach(&mut self) {
        self.guard.supersede();
        self.clear_flags();
    }

    fn reset_results(&mut self) {
        self.results.clear();
        self.first_page = self.page;
        self.total = 0;
        self.has_more = true;
        self.error = None;
        self.last_key = None;
    }

    fn clear_flags(&mut self) {
        self.is_loading = false;
        self.is_searching = false;
        self.is_loading_more = false;
    }

    fn is_busy(&self) -> bool {
        self.is_loading || self.is_loading_more
    }

    /// Page a "load more" would fetch next: the one after the last full
    /// page loaded, counting from the page the results started at.
    pub fn next_append_page(&self) -> u32 {
        let loaded = self.results.len() / self.options.limit.max(1) as usize;
        u32::try_from(loaded)
            .unwrap_or(u32::MAX)
            .saturating_add(self.first_page)
    }

    /// Decide what a fetch does: nothing, a cache answer, or a network call.
    pub fn begin_fetch(&mut self, append: bool) -> FetchStep {
        if append {
            if !self.options.infinite_scroll {
                tracing::debug!("load more ignored: infinite scroll disabled");
                return FetchStep::Skipped;
            }
            if self.is_busy() || !self.has_more {
                tracing::trace!(
                    busy = self.is_busy(),
                    has_more = self.has_more,
                    "load more ignored"
                );
                return FetchStep::Skipped;
            }
        }

        let mode = self.mode();
        let page = if append {
            self.next_append_page()
        } else {
            self.page
        };
        let key = RequestKey::new(
            self.query.trimmed(),
            page,
            self.options.limit,
            &self.options.sort,
        );

        if !append {
            if self.last_key.as_ref() == Some(&key) {
                tracing::trace!(key = %key, "duplicate fetch skipped");
                return FetchStep::Skipped;
            }
            self.last_key = Some(key.clone());

            let cached = self.cache.lock().get(&key);
            if let Some(cached) = cached {
                tracing::debug!(key = %key, "serving page from cache");
                self.guard.supersede();
                self.clear_flags();
                self.error = None;
                self.apply_page(mode, page, false, cached.items, cached.total);
                return FetchStep::Served;
            }
        }

        let FetchTicket { sequence, cancel } = self.guard.issue();
        let request = match mode {
            Mode::Browse => CatalogRequest::Latest(ListLatestParams {
                page,
                limit: self.options.limit,
            }),
            Mode::Search => CatalogRequest::Search(SearchParams {
                query: self.query.trimmed().to_string(),
                page,
                limit: self.options.limit,
                sort: self.options.sort.clone(),
            }),
        };

        tracing::debug!(sequence, %mode, page, append, "issuing catalog request");
        self.is_loading = !append;
        self.is_loading_more = append;
        self.is_searching = mode == Mode::Search;
        self.error = None;

        FetchStep::Issued(PendingFetch {
            cancel,
            request,
            context: FetchContext {
                sequence,
                mode,
                page,
                append,
                key,
            },
        })
    }

    /// Apply a resolved fetch if it is still the latest one.
    pub fn complete(&mut self, context: FetchContext, outcome: Result<SearchPage>) -> Resolution {
        if !self.guard.is_current(context.sequence) {
            tracing::trace!(sequence = context.sequence, "discarding stale response");
            return Resolution::Stale;
        }
        self.guard.finish(context.sequence);
        self.clear_flags();

        let error = match outcome {
            Ok(page) => {
                if !context.append {
                    self.cache
                        .lock()
                        .insert(context.key, page.items.clone(), page.total);
                }
                self.error = None;
                self.apply_page(
                    context.mode,
                    context.page,
                    context.append,
                    page.items,
                    page.total,
                );
                return Resolution::Applied;
            }
            Err(e) => e,
        };

        // Any failure must let an identical retry through.
        self.last_key = None;

        if error.is_canceled() {
            tracing::trace!(sequence = context.sequence, "request canceled");
            return Resolution::Canceled;
        }

        if context.mode == Mode::Search || error.is_not_found() {
            tracing::debug!(%error, mode = %context.mode, "fetch failed, showing no results");
            if !context.append {
                self.results.clear();
                self.first_page = context.page;
                self.total = 0;
            }
            self.has_more = false;
            self.error = None;
            return Resolution::Degraded;
        }

        tracing::warn!(%error, "failed to load latest items");
        self.error = Some(browse_error_message(&error));
        self.has_more = false;
        Resolution::Failed
    }

    fn apply_page(&mut self, mode: Mode, page: u32, append: bool, items: Vec<Item>, total: usize) {
        let limit = self.options.limit as usize;
        let received = items.len();

        if append {
            self.results.extend(items);
            self.total = match mode {
                Mode::Search => total,
                Mode::Browse => self.results.len(),
            };
            let skipped = (self.first_page as usize).saturating_sub(1).saturating_mul(limit);
            self.has_more = match mode {
                Mode::Search => skipped.saturating_add(self.results.len()) < total,
                Mode::Browse => received == limit,
            };
        } else {
            self.results = items;
            self.first_page = page;
            self.total = total;
            self.has_more = match mode {
                Mode::Search => (page as usize).saturating_mul(limit) < total,
                Mode::Browse => received == limit,
            };
        }
    }

    pub fn snapshot(&self, is_debouncing: bool) -> SearchSnapshot {
        SearchSnapshot {
            query: self.query.raw().to_string(),
            page: self.page,
            limit: self.options.limit,
            results: self.results.clone(),
            total: self.total,
            is_loading: self.is_loading,
            is_searching: self.is_searching,
            is_loading_more: self.is_loading_more,
            is_debouncing,
            error: self.error.clone(),
            has_more: self.has_more,
        }
    }
}

fn browse_error_message(error: &StorefrontError) -> String {
    match error {
        StorefrontError::Http { status, .. } => format!(
            "Could not load the latest items (HTTP {}). Please try again.",
            status.as_u16()
        ),
        _ => "Could not load the latest items. Please try again.".to_string(),
    }
}
