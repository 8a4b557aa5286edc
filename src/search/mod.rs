//! Search and listing request orchestration.
//!
//! Turns query edits, page changes and "load more" requests into a stream
//! of result pages with:
//! - Debounced input (only the last edit in the window fetches)
//! - One request in flight, older ones canceled
//! - Sequence-gated responses (a late reply never overwrites newer state)
//! - A bounded, expiring page cache and de-duplication of repeat requests
//! - Replace (numbered pages) or append (infinite scroll) pagination

pub mod cache;
pub mod debounce;
pub mod guard;
pub mod key;
pub mod orchestrator;
pub mod query;
pub mod session;
pub mod state;

use std::time::Duration;

pub use cache::{ResultCache, SharedResultCache};
pub use key::RequestKey;
pub use orchestrator::SearchOrchestrator;
pub use query::{Mode, Query};
pub use state::SearchSnapshot;

/// Tuning for one orchestrator instance
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Quiet period before an input change triggers a fetch
    pub debounce: Duration,
    /// Page size
    pub limit: u32,
    /// Sort order sent to the keyword endpoint
    pub sort: String,
    /// Append on "load more" instead of replacing on page change
    pub infinite_scroll: bool,
    pub cache_capacity: usize,
    pub cache_ttl: Duration,
    /// Shortest trimmed query that counts as a search
    pub min_search_len: usize,
    /// Query at mount time
    pub initial_query: String,
    /// Page at mount time (1-based)
    pub initial_page: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce: debounce::DEFAULT_DEBOUNCE,
            limit: 12,
            sort: "relevance".to_string(),
            infinite_scroll: false,
            cache_capacity: cache::DEFAULT_CACHE_CAPACITY,
            cache_ttl: cache::DEFAULT_CACHE_TTL,
            min_search_len: 2,
            initial_query: String::new(),
            initial_page: 1,
        }
    }
}
