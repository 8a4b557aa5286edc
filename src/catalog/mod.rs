//! Catalog read API.
//!
//! The orchestrator consumes the backend through the [`CatalogClient`] trait:
//! an unfiltered "latest items" listing and a keyword search. Both take a
//! cancellation token and must resolve with [`StorefrontError::Canceled`]
//! once it fires.
//!
//! [`StorefrontError::Canceled`]: crate::error::StorefrontError::Canceled

pub mod http;

use std::future::Future;

use serde::{Deserialize, Deserializer, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::Result;

pub use http::HttpCatalogClient;

/// A catalog product as returned by either read endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Fields the storefront does not model, kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: None,
            currency: None,
            image_url: None,
            created_at: None,
            extra: serde_json::Map::new(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// `{items, total}` envelope. The keyword endpoint always answers with this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<Item>,
    #[serde(default)]
    pub total: usize,
}

/// Listing endpoint response: a bare array or the same envelope as search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListingPage {
    Bare(Vec<Item>),
    Envelope(SearchPage),
}

impl ListingPage {
    /// Normalize to an envelope whose `total` is the number of items received.
    pub fn normalize(self) -> SearchPage {
        let items = match self {
            ListingPage::Bare(items) => items,
            ListingPage::Envelope(page) => page.items,
        };
        let total = items.len();
        SearchPage { items, total }
    }
}

/// Parameters for the unfiltered listing endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListLatestParams {
    pub page: u32,
    pub limit: u32,
}

/// Parameters for the keyword search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub query: String,
    pub page: u32,
    pub limit: u32,
    pub sort: String,
}

/// Transport contract for the two catalog read paths.
pub trait CatalogClient: Send + Sync {
    /// Fetch the latest items, unfiltered
    fn list_latest(
        &self,
        params: ListLatestParams,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<ListingPage>> + Send;

    /// Keyword search
    fn search(
        &self,
        params: SearchParams,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<SearchPage>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_accepts_bare_array() {
        let json = r#"[{"id": 1, "name": "Rose"}, {"id": "b-2", "title": "Tulip"}]"#;
        let page: ListingPage = serde_json::from_str(json).unwrap();
        let page = page.normalize();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].id, "1");
        assert_eq!(page.items[1].name, "Tulip");
    }

    #[test]
    fn test_listing_envelope_total_is_item_count() {
        let json = r#"{"items": [{"id": 7, "name": "Lily"}], "total": 480}"#;
        let page: ListingPage = serde_json::from_str(json).unwrap();
        assert!(matches!(page, ListingPage::Envelope(_)));
        assert_eq!(page.normalize().total, 1);
    }

    #[test]
    fn test_search_page_keeps_server_total() {
        let json = r#"{"items": [{"id": 3, "name": "Rose bush", "price": 19.5}], "total": 42}"#;
        let page: SearchPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total, 42);
        assert_eq!(page.items[0].price, Some(19.5));
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let json = r#"{"id": 9, "name": "Fern", "imageUrl": "/f.png", "stock": 4}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.image_url.as_deref(), Some("/f.png"));
        assert_eq!(item.extra.get("stock"), Some(&serde_json::json!(4)));
    }
}
