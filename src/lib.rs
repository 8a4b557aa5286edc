pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod paths;
pub mod search;

pub use catalog::{
    CatalogClient, HttpCatalogClient, Item, ListLatestParams, ListingPage, SearchPage,
    SearchParams,
};
pub use config::Config;
pub use error::{Result, StorefrontError};
pub use search::{
    Mode, Query, RequestKey, ResultCache, SearchOptions, SearchOrchestrator, SearchSnapshot,
    SharedResultCache,
};
