//! Catalog search and browse commands.
//!
//! Both commands drive a [`SearchOrchestrator`] the way a view would: mount
//! it on the requested query and page, wait for the first page, then call
//! `load_more` once per extra page requested.

use std::time::Duration;

use owo_colors::OwoColorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::CommandOutput;
use crate::catalog::{CatalogClient, HttpCatalogClient, Item};
use crate::cli::PagingArgs;
use crate::config::Config;
use crate::error::{Result, StorefrontError};
use crate::search::{SearchOptions, SearchOrchestrator, SearchSnapshot};

/// A row in the results table
#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        let price = match (item.price, item.currency.as_deref()) {
            (Some(price), Some(currency)) => format!("{price:.2} {currency}"),
            (Some(price), None) => format!("{price:.2}"),
            (None, _) => "-".to_string(),
        };
        ItemRow {
            id: item.id.clone(),
            name: item.name.clone(),
            price,
        }
    }
}

/// What the user asked a listing command for
#[derive(Debug, Clone)]
pub struct ListingRequest {
    pub query: String,
    pub page: u32,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    /// Extra pages to append after the first
    pub more: u32,
    pub json: bool,
}

impl ListingRequest {
    pub fn from_paging(query: String, paging: PagingArgs, sort: Option<String>) -> Self {
        Self {
            query,
            page: paging.page,
            limit: paging.limit,
            sort,
            more: paging.more,
            json: paging.json,
        }
    }
}

/// Orchestrator options for a one-shot listing: configured settings with
/// command-line overrides and no debounce.
pub fn listing_options(config: &Config, request: &ListingRequest) -> Result<SearchOptions> {
    let mut options = config.search.to_options()?;
    if let Some(limit) = request.limit {
        options.limit = limit;
    }
    if let Some(sort) = &request.sort {
        options.sort = sort.clone();
    }
    if request.more > 0 {
        options.infinite_scroll = true;
    }
    options.debounce = Duration::ZERO;
    options.initial_query = request.query.clone();
    options.initial_page = request.page;
    Ok(options)
}

/// Mount an orchestrator, load the first page and `more` further pages.
///
/// A user-visible error in the final state becomes an `Err`.
pub async fn run_listing<C>(client: C, options: SearchOptions, more: u32) -> Result<SearchSnapshot>
where
    C: CatalogClient + 'static,
{
    let orchestrator = SearchOrchestrator::mount(client, options)?;
    let mut snapshot = orchestrator.settled().await;

    for _ in 0..more {
        if !snapshot.has_more || snapshot.error.is_some() {
            break;
        }
        orchestrator.load_more();
        snapshot = orchestrator.settled().await;
    }

    if let Some(error) = &snapshot.error {
        return Err(StorefrontError::Other(error.clone()));
    }
    Ok(snapshot)
}

/// Keyword search
pub async fn cmd_search(request: ListingRequest) -> Result<()> {
    let config = Config::load()?;

    let min_len = config.search.min_search_len;
    if request.query.trim().chars().count() < min_len {
        return Err(StorefrontError::InvalidInput(format!(
            "search query must be at least {min_len} characters"
        )));
    }

    let client = HttpCatalogClient::from_config(&config)?;
    let options = listing_options(&config, &request)?;
    let snapshot = run_listing(client, options, request.more).await?;
    render(&request, &snapshot).print(request.json)
}

/// Latest items, unfiltered
pub async fn cmd_browse(request: ListingRequest) -> Result<()> {
    let config = Config::load()?;
    let client = HttpCatalogClient::from_config(&config)?;
    let options = listing_options(&config, &request)?;
    let snapshot = run_listing(client, options, request.more).await?;
    render(&request, &snapshot).print(request.json)
}

fn render(request: &ListingRequest, snapshot: &SearchSnapshot) -> CommandOutput {
    let json_output = json!({
        "query": snapshot.query,
        "page": snapshot.page,
        "limit": snapshot.limit,
        "total": snapshot.total,
        "has_more": snapshot.has_more,
        "items": snapshot.results,
    });

    let mut text_output = String::new();
    let heading = if request.query.trim().is_empty() {
        "Latest items".to_string()
    } else {
        format!("Search results for \"{}\"", request.query.trim())
    };
    text_output.push_str(&format!(
        "{} {}\n\n",
        heading.cyan().bold(),
        format!("(page {})", snapshot.page).dimmed()
    ));

    if snapshot.results.is_empty() {
        text_output.push_str("No matching items found.");
        return CommandOutput::new(json_output).with_text(text_output);
    }

    let rows: Vec<ItemRow> = snapshot.results.iter().map(ItemRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    text_output.push_str(&format!("{table}\n"));

    text_output.push_str(&format!(
        "\n{} of {} item(s)",
        snapshot.results.len(),
        snapshot.total
    ));
    if snapshot.has_more {
        text_output.push_str(&format!(" {}", "(more available)".dimmed()));
    }

    CommandOutput::new(json_output).with_text(text_output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn request(query: &str) -> ListingRequest {
        ListingRequest {
            query: query.to_string(),
            page: 2,
            limit: Some(5),
            sort: Some("newest".to_string()),
            more: 1,
            json: false,
        }
    }

    #[test]
    fn test_listing_options_apply_overrides() {
        let options = listing_options(&Config::default(), &request("rose")).unwrap();
        assert_eq!(options.limit, 5);
        assert_eq!(options.sort, "newest");
        assert!(options.infinite_scroll);
        assert_eq!(options.debounce, Duration::ZERO);
        assert_eq!(options.initial_query, "rose");
        assert_eq!(options.initial_page, 2);
    }

    #[test]
    fn test_item_row_price_formatting() {
        let mut item = Item::new("1", "Rose");
        assert_eq!(ItemRow::from(&item).price, "-");
        item.price = Some(4.5);
        assert_eq!(ItemRow::from(&item).price, "4.50");
        item.currency = Some("EUR".to_string());
        assert_eq!(ItemRow::from(&item).price, "4.50 EUR");
    }

    #[tokio::test]
    #[serial]
    async fn test_short_search_query_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        // SAFETY: We use #[serial] to ensure single-threaded access
        unsafe { std::env::set_var(crate::paths::ROOT_ENV, tmp.path()) };
        let result = cmd_search(request("a")).await;
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("at least 2 characters"));
        unsafe { std::env::remove_var(crate::paths::ROOT_ENV) };
    }
}
