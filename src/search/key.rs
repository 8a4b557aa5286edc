//! Request keys for caching and de-duplication.

use std::fmt;

/// Every parameter that affects what a non-append fetch returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    query: String,
    page: u32,
    limit: u32,
    sort: String,
}

impl RequestKey {
    pub fn new(trimmed_query: &str, page: u32, limit: u32, sort: &str) -> Self {
        Self {
            query: trimmed_query.to_string(),
            page,
            limit,
            sort: sort.to_string(),
        }
    }
}

/// Renders as `"query"|page|limit|sort`. The query is debug-quoted so a `|`
/// inside it cannot collide with the separator.
impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}|{}|{}|{}",
            self.query, self.page, self.limit, self.sort
        )
    }
}
