//! Query text and the fetch mode derived from it.

use std::fmt;

/// Which backend read path a query maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Unfiltered "latest items" listing
    Browse,
    /// Keyword search
    Search,
}

impl Mode {
    /// Derive the mode from a trimmed query. Length counts characters, not bytes.
    pub fn for_query(trimmed: &str, min_search_len: usize) -> Self {
        if trimmed.chars().count() >= min_search_len {
            Mode::Search
        } else {
            Mode::Browse
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Browse => write!(f, "browse"),
            Mode::Search => write!(f, "search"),
        }
    }
}

/// The user's query as typed, plus the trimmed form every fetch uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    raw: String,
    trimmed: String,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim().to_string();
        Self { raw, trimmed }
    }

    /// Untrimmed text, for display only
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn trimmed(&self) -> &str {
        &self.trimmed
    }

    pub fn mode(&self, min_search_len: usize) -> Mode {
        Mode::for_query(&self.trimmed, min_search_len)
    }
}
