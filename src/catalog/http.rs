//! reqwest-backed catalog client.
//!
//! # Security Note - Logging
//!
//! The bearer token is held in a [`SecretString`] and never appears in the
//! `Debug` output of the client. Do not enable `RUST_LOG=reqwest=trace` in
//! production; reqwest may still log other request details.

use std::fmt;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::Config;
use crate::error::{Result, StorefrontError};

use super::{CatalogClient, ListLatestParams, ListingPage, SearchPage, SearchParams};

const LISTING_PATH: &str = "products";
const SEARCH_PATH: &str = "products/search";

/// Longest error body echoed back in an `Http` error message.
const MAX_ERROR_BODY: usize = 200;

pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl fmt::Debug for HttpCatalogClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCatalogClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
    page: u32,
    limit: u32,
    sort: &'a str,
}

impl HttpCatalogClient {
    /// Build a client from configuration (base URL, token and timeouts).
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        let mut provider = Self::with_client(client, config.base_url()?);
        if let Some(token) = config.api_token() {
            provider = provider.with_token(token);
        }
        Ok(provider)
    }

    /// Build a client around an existing reqwest client.
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            token: None,
        }
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(SecretString::from(token));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `path` to the base URL, whether or not it ends with a slash.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StorefrontError::Config(format!(
                    "base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(path.split('/'));
        Ok(url)
    }

    /// GET `url` and decode the JSON body, giving up as soon as `cancel` fires.
    async fn get_json<T, Q>(&self, url: Url, query: &Q, cancel: &CancellationToken) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = async {
            let mut builder = self.client.get(url).query(query);
            if let Some(token) = &self.token {
                builder = builder.bearer_auth(token.expose_secret());
            }

            let response = builder.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(StorefrontError::Http {
                    status,
                    message: error_message(status, &body),
                });
            }

            Ok(response.json::<T>().await?)
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(StorefrontError::Canceled),
            result = request => result,
        }
    }
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    body.chars().take(MAX_ERROR_BODY).collect()
}

impl CatalogClient for HttpCatalogClient {
    async fn list_latest(
        &self,
        params: ListLatestParams,
        cancel: CancellationToken,
    ) -> Result<ListingPage> {
        let url = self.endpoint(LISTING_PATH)?;
        self.get_json(url, &params, &cancel).await
    }

    async fn search(&self, params: SearchParams, cancel: CancellationToken) -> Result<SearchPage> {
        let url = self.endpoint(SEARCH_PATH)?;
        let query = SearchQuery {
            q: &params.query,
            page: params.page,
            limit: params.limit,
            sort: &params.sort,
        };
        self.get_json(url, &query, &cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpCatalogClient {
        HttpCatalogClient::with_client(Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let c = client("https://shop.example.com/api");
        assert_eq!(
            c.endpoint(SEARCH_PATH).unwrap().as_str(),
            "https://shop.example.com/api/products/search"
        );
    }

    #[test]
    fn test_endpoint_with_trailing_slash() {
        let c = client("https://shop.example.com/api/");
        assert_eq!(
            c.endpoint(LISTING_PATH).unwrap().as_str(),
            "https://shop.example.com/api/products"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let c = client("https://shop.example.com").with_token("secret-token".to_string());
        let debug = format!("{:?}", c);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(
            error_message(reqwest::StatusCode::SERVICE_UNAVAILABLE, "  "),
            "Service Unavailable"
        );
        assert_eq!(
            error_message(reqwest::StatusCode::BAD_REQUEST, "bad page"),
            "bad page"
        );
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        // Port 9 (discard) is never contacted: the biased select sees the
        // cancellation first.
        let c = client("http://127.0.0.1:9/api");
        let token = CancellationToken::new();
        token.cancel();

        let result = c
            .list_latest(ListLatestParams { page: 1, limit: 12 }, token)
            .await;
        assert!(matches!(result, Err(StorefrontError::Canceled)));
    }
}
