//! bookshelf - interactive book catalog
//!
//! Wires together:
//! - Configuration loading
//! - Directory setup and store initialization
//! - The interactive menu

use anyhow::{bail, Context, Result};
use bookshelf::Menu;
use bookshelf_config::load_settings;
use bookshelf_core::Catalog;
use bookshelf_store::BookStore;
use bookshelf_util::{default_config_path, is_mock_time_active};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// bookshelf - personal book catalog with automatic backups
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(about = "Personal book catalog with automatic backups", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/bookshelf/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set BOOKSHELF_DATA_DIR env var)
    #[arg(short, long, env = "BOOKSHELF_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they do not interleave with the menu
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "bookshelf starting");

    if is_mock_time_active() {
        warn!("Mock time is active, backup names use the mocked clock");
    }

    let settings = load_settings(&args.config, args.data_dir.clone())
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    let catalog = Catalog::open(&settings)
        .with_context(|| format!("Failed to open catalog {:?}", settings.database))?;

    if !catalog.store().is_healthy() {
        bail!("Store at {:?} is not usable", settings.database);
    }

    info!(
        database = %settings.database.display(),
        backups = %settings.backup_dir.display(),
        csv = %settings.csv_dir.display(),
        "Catalog ready"
    );

    let stdin = io::stdin();
    Menu::new(&catalog, stdin.lock(), io::stdout().lock()).run()?;

    info!("bookshelf exiting");
    Ok(())
}
