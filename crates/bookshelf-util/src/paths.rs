//! Default paths for bookshelf
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/bookshelf/config.toml` or `~/.config/bookshelf/config.toml`
//! - Data: `$BOOKSHELF_DATA_DIR`, `$XDG_DATA_HOME/bookshelf` or `~/.local/share/bookshelf`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const BOOKSHELF_DATA_DIR_ENV: &str = "BOOKSHELF_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "bookshelf";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$BOOKSHELF_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/bookshelf` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/bookshelf` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(BOOKSHELF_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking BOOKSHELF_DATA_DIR.
/// Used where the env var is handled separately (e.g. by clap).
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort: relative to the working directory
    PathBuf::from(APP_DIR)
}
