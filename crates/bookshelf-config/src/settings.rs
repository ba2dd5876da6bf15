//! Resolved settings handed to the catalog at startup

use crate::schema::RawConfig;
use bookshelf_util::default_data_dir;
use std::path::PathBuf;

/// Catalog name used when none is configured
pub const DEFAULT_CATALOG_NAME: &str = "livraria";

/// Validated settings. Built once at startup and passed explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog_name: String,
    pub database: PathBuf,
    pub backup_dir: PathBuf,
    pub csv_dir: PathBuf,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let catalog = raw.catalog;
        let catalog_name = catalog
            .name
            .unwrap_or_else(|| DEFAULT_CATALOG_NAME.to_string());
        let data_dir = catalog.data_dir.unwrap_or_else(default_data_dir);

        Self {
            database: catalog
                .database
                .unwrap_or_else(|| data_dir.join(format!("{}.db", catalog_name))),
            backup_dir: catalog
                .backup_dir
                .unwrap_or_else(|| data_dir.join("backups")),
            csv_dir: catalog.csv_dir.unwrap_or_else(|| data_dir.join("csv")),
            catalog_name,
        }
    }

    /// All settings rooted in one directory
    pub fn in_dir(data_dir: impl Into<PathBuf>, catalog_name: impl Into<String>) -> Self {
        let data_dir = data_dir.into();
        let catalog_name = catalog_name.into();
        Self {
            database: data_dir.join(format!("{}.db", catalog_name)),
            backup_dir: data_dir.join("backups"),
            csv_dir: data_dir.join("csv"),
            catalog_name,
        }
    }

    /// Create the backup and CSV directories if missing
    pub fn create_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.backup_dir)?;
        std::fs::create_dir_all(&self.csv_dir)?;
        if let Some(parent) = self.database.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
