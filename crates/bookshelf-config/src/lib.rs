//! Configuration parsing and validation for bookshelf
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Catalog name and storage locations
//! - Validation with clear error messages
//!
//! A missing config file is not an error: every field has a default.

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load settings from a TOML file, falling back to defaults when the file
/// does not exist. `data_dir` overrides the configured data directory.
pub fn load_settings(path: impl AsRef<Path>, data_dir: Option<PathBuf>) -> ConfigResult<Settings> {
    let path = path.as_ref();
    let mut raw = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        debug!(path = %path.display(), "No config file, using defaults");
        RawConfig::default()
    };

    if let Some(dir) = data_dir {
        raw.catalog.data_dir = Some(dir);
    }

    resolve(raw)
}

/// Load and validate settings from a TOML file that must exist
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate settings from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Settings> {
    let raw: RawConfig = toml::from_str(content)?;
    resolve(raw)
}

fn resolve(raw: RawConfig) -> ConfigResult<Settings> {
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Settings::from_raw(raw))
}
