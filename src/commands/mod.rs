//! Command implementations for the `storefront` binary.

mod config;
mod search;

pub use config::{cmd_config_path, cmd_config_set, cmd_config_show};
pub use search::{ListingRequest, cmd_browse, cmd_search, listing_options, run_listing};

use serde_json::Value;

use crate::error::Result;

/// Output of a command in both renderings; the caller picks one.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, json: bool) -> Result<()> {
        match (json, self.text) {
            (false, Some(text)) => println!("{text}"),
            _ => print_json(&self.json)?,
        }
        Ok(())
    }
}

/// Pretty-print any serializable value as JSON
pub fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
