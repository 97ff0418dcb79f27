//! Default paths for sortie components
//!
//! The schedule file is user-writable by default:
//! `$XDG_CONFIG_HOME/sortie/schedule.toml` or `~/.config/sortie/schedule.toml`

use std::path::PathBuf;

/// Environment variable for overriding the schedule file path
pub const SORTIE_CONFIG_ENV: &str = "SORTIE_CONFIG";

/// Schedule filename within the config directory
const CONFIG_FILENAME: &str = "schedule.toml";

/// Application subdirectory name
const APP_DIR: &str = "sortie";

/// Get the default schedule file path.
///
/// Order of precedence:
/// 1. `$SORTIE_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/sortie/schedule.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/sortie/schedule.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(SORTIE_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the schedule path without checking the SORTIE_CONFIG env var.
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
    PathBuf::from(CONFIG_FILENAME)
}
