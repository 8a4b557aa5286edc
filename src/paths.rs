use std::path::PathBuf;

/// Environment variable that relocates the storefront directory.
pub const ROOT_ENV: &str = "STOREFRONT_ROOT";

/// Returns the root storefront directory path.
///
/// Resolution order:
/// 1. `STOREFRONT_ROOT` environment variable (if set)
/// 2. Current working directory + `.storefront`
pub fn storefront_root() -> PathBuf {
    if let Ok(root) = std::env::var(ROOT_ENV)
        && !root.is_empty()
    {
        PathBuf::from(root)
    } else {
        PathBuf::from(".storefront")
    }
}

/// Returns the path to the YAML configuration file.
pub fn config_file() -> PathBuf {
    storefront_root().join("config.yaml")
}
