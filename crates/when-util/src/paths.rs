//! Default paths
//!
//! The date catalog is looked up at:
//! - `$WHEN_CONFIG` if set
//! - `$XDG_CONFIG_HOME/when/dates.toml`
//! - `~/.config/when/dates.toml`

use std::path::PathBuf;

/// Environment variable for overriding the catalog path
pub const WHEN_CONFIG_ENV: &str = "WHEN_CONFIG";

/// Catalog filename within the config directory
const CONFIG_FILENAME: &str = "dates.toml";

/// Application subdirectory name
const APP_DIR: &str = "when";

/// Get the default catalog path.
///
/// Order of precedence:
/// 1. `$WHEN_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/when/dates.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/when/dates.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(WHEN_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the catalog path without checking WHEN_CONFIG.
pub fn config_path_without_env() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    // Last resort
    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}
