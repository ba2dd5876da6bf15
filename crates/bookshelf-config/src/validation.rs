//! Configuration validation

use crate::schema::RawConfig;
use std::path::Path;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid catalog name '{name}': {message}")]
    InvalidCatalogName { name: String, message: String },

    #[error("Empty path for '{0}'")]
    EmptyPath(&'static str),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let catalog = &config.catalog;

    if let Some(name) = &catalog.name
        && let Err(message) = validate_catalog_name(name)
    {
        errors.push(ValidationError::InvalidCatalogName {
            name: name.clone(),
            message,
        });
    }

    let paths: [(&'static str, Option<&Path>); 4] = [
        ("data_dir", catalog.data_dir.as_deref()),
        ("database", catalog.database.as_deref()),
        ("backup_dir", catalog.backup_dir.as_deref()),
        ("csv_dir", catalog.csv_dir.as_deref()),
    ];
    for (key, path) in paths {
        if path.is_some_and(|p| p.as_os_str().is_empty()) {
            errors.push(ValidationError::EmptyPath(key));
        }
    }

    errors
}

/// Catalog names end up inside file names, so only `[A-Za-z0-9_-]` is allowed.
pub fn validate_catalog_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".into());
    }

    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(format!("character '{}' is not allowed", c));
    }

    Ok(())
}
