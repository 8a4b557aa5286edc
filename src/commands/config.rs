//! Configuration commands.
//!
//! - `config show`: Display the effective configuration
//! - `config set`: Set a configuration value
//! - `config path`: Print the config file location

use owo_colors::OwoColorize;
use serde_json::json;
use url::Url;

use super::CommandOutput;
use crate::config::Config;
use crate::error::{Result, StorefrontError};

const VALID_KEYS: &str =
    "api.base_url, api.token, search.debounce_ms, search.limit, search.sort, search.infinite_scroll";

/// Reject underscore-only spellings such as `api_token` with a dot-notation hint
fn validate_config_key(key: &str) -> Result<&str> {
    if !key.contains('.')
        && let Some(pos) = key.find('_')
    {
        let dot_version = format!("{}.{}", &key[..pos], &key[pos + 1..]);
        return Err(StorefrontError::Config(format!(
            "invalid config key '{key}'. Use dot notation: '{dot_version}'"
        )));
    }
    Ok(key)
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        StorefrontError::Config(format!(
            "invalid value '{value}' for {key}. Expected: {expected}"
        ))
    })
}

/// Show current configuration
pub fn cmd_config_show(json: bool) -> Result<()> {
    let config = Config::load()?;

    let base_url = config.base_url()?;
    let token_configured = config.api_token().is_some();
    let search = &config.search;

    let json_output = json!({
        "api": {
            "base_url": base_url.as_str(),
            "token_configured": token_configured,
            "timeout_secs": config.api.timeout_secs,
            "connect_timeout_secs": config.api.connect_timeout_secs,
        },
        "search": search,
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    // Never show the token itself
    let token_status = if token_configured {
        "configured".green().to_string()
    } else {
        "not configured".dimmed().to_string()
    };
    text_output.push_str(&format!("{}:\n", "api".cyan()));
    text_output.push_str(&format!("  base_url: {base_url}\n"));
    text_output.push_str(&format!("  token: {token_status}\n"));
    text_output.push_str(&format!("  timeout_secs: {}\n", config.api.timeout_secs));
    text_output.push_str(&format!(
        "  connect_timeout_secs: {}\n",
        config.api.connect_timeout_secs
    ));

    text_output.push('\n');
    text_output.push_str(&format!("{}:\n", "search".cyan()));
    text_output.push_str(&format!("  debounce_ms: {}\n", search.debounce_ms));
    text_output.push_str(&format!("  limit: {}\n", search.limit));
    text_output.push_str(&format!("  sort: {}\n", search.sort));
    text_output.push_str(&format!("  infinite_scroll: {}\n", search.infinite_scroll));
    text_output.push_str(&format!("  cache_capacity: {}\n", search.cache_capacity));
    text_output.push_str(&format!("  cache_ttl_secs: {}\n", search.cache_ttl_secs));
    text_output.push_str(&format!("  min_search_len: {}\n", search.min_search_len));

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(json)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, json: bool) -> Result<()> {
    validate_config_key(key)?;

    let mut config = Config::load()?;
    let shown = apply_setting(&mut config, key, value)?;
    config.save()?;

    let json_output = json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    });
    let text_output = format!("Set {} to {}", key.cyan(), shown);

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(json)
}

/// Apply one setting and return the value as it should be echoed back.
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<String> {
    match key {
        "api.base_url" => {
            Url::parse(value)?;
            config.api.base_url = value.to_string();
            Ok(value.to_string())
        }
        "api.token" => {
            config.set_api_token(value.to_string());
            Ok("(hidden)".to_string())
        }
        "search.debounce_ms" => {
            config.search.debounce_ms = parse_value(key, value, "milliseconds")?;
            Ok(config.search.debounce_ms.to_string())
        }
        "search.limit" => {
            let limit: u32 = parse_value(key, value, "a positive integer")?;
            if limit == 0 {
                return Err(StorefrontError::Config(
                    "search.limit must be at least 1".to_string(),
                ));
            }
            config.search.limit = limit;
            Ok(limit.to_string())
        }
        "search.sort" => {
            if value.trim().is_empty() {
                return Err(StorefrontError::Config(
                    "search.sort cannot be empty".to_string(),
                ));
            }
            config.search.sort = value.trim().to_string();
            Ok(config.search.sort.clone())
        }
        "search.infinite_scroll" => {
            config.search.infinite_scroll = parse_value(key, value, "true or false")?;
            Ok(config.search.infinite_scroll.to_string())
        }
        _ => Err(StorefrontError::Config(format!(
            "unknown config key '{key}'. Valid keys: {VALID_KEYS}"
        ))),
    }
}

/// Print the config file path
pub fn cmd_config_path() -> Result<()> {
    println!("{}", Config::config_path().display());
    Ok(())
}
