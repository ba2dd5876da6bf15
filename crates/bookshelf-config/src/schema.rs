//! Raw configuration schema (as parsed from TOML)

use serde::Deserialize;
use std::path::PathBuf;

use crate::CURRENT_CONFIG_VERSION;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Catalog settings
    #[serde(default)]
    pub catalog: RawCatalogConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_CONFIG_VERSION,
            catalog: RawCatalogConfig::default(),
        }
    }
}

/// Catalog-level settings. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatalogConfig {
    /// Catalog name, embedded in database and backup file names
    pub name: Option<String>,

    /// Base directory for the database, backups and CSV files
    pub data_dir: Option<PathBuf>,

    /// Live database file (default: `<data_dir>/<name>.db`)
    pub database: Option<PathBuf>,

    /// Backup directory (default: `<data_dir>/backups`)
    pub backup_dir: Option<PathBuf>,

    /// CSV interchange directory (default: `<data_dir>/csv`)
    pub csv_dir: Option<PathBuf>,
}
