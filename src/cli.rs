use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Browse and search the storefront catalog")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog by keyword
    #[command(visible_alias = "s")]
    Search {
        /// Search terms
        query: String,

        #[command(flatten)]
        paging: PagingArgs,

        /// Sort order (default from config, e.g. relevance, newest, price_asc)
        #[arg(long)]
        sort: Option<String>,
    },

    /// List the latest catalog items
    #[command(visible_alias = "b")]
    Browse {
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct PagingArgs {
    /// Page to show (1-based)
    #[arg(short, long, default_value = "1", value_parser = parse_page)]
    pub page: u32,

    /// Items per page (default from config)
    #[arg(short, long, value_parser = parse_limit)]
    pub limit: Option<u32>,

    /// Append this many further pages, infinite-scroll style
    #[arg(long, default_value = "0")]
    pub more: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Key in dot notation, e.g. search.limit
        key: String,
        /// New value
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the config file path
    Path,
}

fn parse_page(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) => Err("page numbers start at 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("invalid page '{s}'")),
    }
}

fn parse_limit(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) => Err("limit must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("invalid limit '{s}'")),
    }
}
