//! State exposed to the view layer.

use serde::Serialize;

use crate::catalog::Item;

/// A consistent copy of everything a view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSnapshot {
    /// Query as typed (untrimmed)
    pub query: String,
    pub page: u32,
    pub limit: u32,
    pub results: Vec<Item>,
    pub total: usize,
    /// A replace-mode fetch is in flight
    pub is_loading: bool,
    /// The in-flight fetch targets the keyword endpoint
    pub is_searching: bool,
    /// An append ("load more") fetch is in flight
    pub is_loading_more: bool,
    /// An input change is waiting out the debounce window
    pub is_debouncing: bool,
    pub error: Option<String>,
    pub has_more: bool,
}

impl SearchSnapshot {
    /// Nothing pending: no armed timer and no fetch in flight.
    pub fn is_settled(&self) -> bool {
        !self.is_debouncing && !self.is_loading && !self.is_loading_more
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> SearchSnapshot {
        SearchSnapshot {
            query: String::new(),
            page: 1,
            limit: 12,
            results: vec![],
            total: 0,
            is_loading: false,
            is_searching: false,
            is_loading_more: false,
            is_debouncing: false,
            error: None,
            has_more: true,
        }
    }

    #[test]
    fn test_settled_requires_every_flag_clear() {
        assert!(idle().is_settled());
        let debouncing = SearchSnapshot {
            is_debouncing: true,
            ..idle()
        };
        assert!(!debouncing.is_settled());

        let loading = SearchSnapshot {
            is_loading: true,
            ..idle()
        };
        assert!(!loading.is_settled());

        let loading_more = SearchSnapshot {
            is_loading_more: true,
            ..idle()
        };
        assert!(!loading_more.is_settled());
    }

    #[test]
    fn test_serializes_for_views() {
        let json = serde_json::to_value(idle()).unwrap();
        assert_eq!(json["has_more"], serde_json::json!(true));
        assert_eq!(json["error"], serde_json::Value::Null);
    }
}
