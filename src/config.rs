//! Top-level application configuration.
//!
//! Configuration is stored in `.storefront/config.yaml` and includes:
//! - Catalog API location, credentials and timeouts
//! - Search orchestration tuning (debounce, page size, cache budget)

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, StorefrontError};
use crate::paths::config_file;
use crate::search::SearchOptions;

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "STOREFRONT_API_URL";
/// Environment variable overriding `api.token`.
pub const API_TOKEN_ENV: &str = "STOREFRONT_API_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Search orchestrator settings
    #[serde(default, skip_serializing_if = "SearchSettings::is_default")]
    pub search: SearchSettings,
}

/// Catalog API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL both read endpoints hang off
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Total request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds (default: 10)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Search orchestration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiet period before a query or page edit triggers a fetch (default: 350)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Page size (default: 12)
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Sort order passed to the keyword endpoint (default: relevance)
    #[serde(default = "default_sort")]
    pub sort: String,

    /// Append pages on "load more" instead of replacing them (default: false)
    #[serde(default)]
    pub infinite_scroll: bool,

    /// Maximum cached result pages (default: 50)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Cached page lifetime in seconds (default: 300)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Shortest trimmed query that hits the keyword endpoint (default: 2)
    #[serde(default = "default_min_search_len")]
    pub min_search_len: usize,
}

fn default_debounce_ms() -> u64 {
    350
}

fn default_limit() -> u32 {
    12
}

fn default_sort() -> String {
    "relevance".to_string()
}

fn default_cache_capacity() -> usize {
    50
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_min_search_len() -> usize {
    2
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            limit: default_limit(),
            sort: default_sort(),
            infinite_scroll: false,
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
            min_search_len: default_min_search_len(),
        }
    }
}

impl SearchSettings {
    /// Check if this config has default values
    pub fn is_default(&self) -> bool {
        *self == SearchSettings::default()
    }

    /// Convert to orchestrator options, rejecting values that cannot work.
    pub fn to_options(&self) -> Result<SearchOptions> {
        if self.limit == 0 {
            return Err(StorefrontError::Config(
                "search.limit must be at least 1".to_string(),
            ));
        }
        if self.cache_capacity == 0 {
            return Err(StorefrontError::Config(
                "search.cache_capacity must be at least 1".to_string(),
            ));
        }

        Ok(SearchOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            limit: self.limit,
            sort: self.sort.clone(),
            infinite_scroll: self.infinite_scroll,
            cache_capacity: self.cache_capacity,
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            min_search_len: self.min_search_len,
            ..SearchOptions::default()
        })
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        config_file()
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, or default if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            StorefrontError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StorefrontError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| {
            StorefrontError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Set restrictive permissions on Unix (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, permissions)?;
        }

        Ok(())
    }

    /// Get the API base URL from environment or config
    pub fn base_url(&self) -> Result<Url> {
        let raw = match env::var(API_URL_ENV) {
            Ok(url) if !url.is_empty() => url,
            _ => self.api.base_url.clone(),
        };
        Ok(Url::parse(&raw)?)
    }

    /// Get the API token from environment or config
    pub fn api_token(&self) -> Option<String> {
        if let Ok(token) = env::var(API_TOKEN_ENV)
            && !token.is_empty()
        {
            return Some(token);
        }

        self.api.token.clone()
    }

    /// Set the API token
    pub fn set_api_token(&mut self, token: String) {
        self.api.token = Some(token);
    }

    /// Total request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Connect timeout
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.api.connect_timeout_secs)
    }
}
