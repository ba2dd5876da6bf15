//! Timestamped snapshots of the live database file
//!
//! Snapshots are named `<catalog>_backup_<YYYYMMDD_HHMMSS>.db` and live in a
//! dedicated backup directory. A second snapshot within the same second gets
//! a two-digit suffix (`_01`, `_02`, ...) so nothing is ever overwritten and
//! names still sort in creation order.

use bookshelf_config::Settings;
use bookshelf_util::{format_backup_timestamp, now, parse_backup_timestamp, BACKUP_TIMESTAMP_LEN};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::retention::decide;

/// Highest collision suffix tried before giving up
const MAX_COLLISION_SUFFIX: u32 = 99;

/// Snapshot errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot of {} failed: {source}", live_store.display())]
    Failed {
        live_store: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Snapshot name already taken: {}", .0.display())]
    NameCollision(PathBuf),

    #[error("Failed to delete snapshot {}: {source}", path.display())]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Backup directory error: {0}")]
    Io(#[from] io::Error),
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// One point-in-time copy of the live store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub path: PathBuf,
    /// Timestamp encoded in the file name
    pub created_at: DateTime<Local>,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl Snapshot {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Result of one prune cycle. Failed deletions are reported, not raised.
#[derive(Debug, Default)]
pub struct PruneReport {
    pub deleted: Vec<Snapshot>,
    pub failed: Vec<SnapshotError>,
}

/// A completed snapshot plus the prune cycle that followed it
#[derive(Debug)]
pub struct BackupReport {
    pub snapshot: Snapshot,
    pub prune: PruneReport,
}

/// Owns the backup directory for one catalog
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    catalog_name: String,
    live_store: PathBuf,
    backup_dir: PathBuf,
}

impl SnapshotStore {
    /// Open the snapshot store, creating the backup directory if needed
    pub fn open(
        catalog_name: impl Into<String>,
        live_store: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
    ) -> SnapshotResult<Self> {
        let store = Self {
            catalog_name: catalog_name.into(),
            live_store: live_store.into(),
            backup_dir: backup_dir.into(),
        };
        fs::create_dir_all(&store.backup_dir)?;
        Ok(store)
    }

    pub fn from_settings(settings: &Settings) -> SnapshotResult<Self> {
        Self::open(
            settings.catalog_name.clone(),
            settings.database.clone(),
            settings.backup_dir.clone(),
        )
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn live_store(&self) -> &Path {
        &self.live_store
    }

    fn prefix(&self) -> String {
        format!("{}_backup_", self.catalog_name)
    }

    /// Copy the live store into a new snapshot named after the current time
    pub fn create_snapshot(&self) -> SnapshotResult<Snapshot> {
        self.create_snapshot_at(now())
    }

    /// Copy the live store into a new snapshot named after `now`
    pub fn create_snapshot_at(&self, now: DateTime<Local>) -> SnapshotResult<Snapshot> {
        let failed = |source: io::Error| SnapshotError::Failed {
            live_store: self.live_store.clone(),
            source,
        };

        let metadata = fs::metadata(&self.live_store).map_err(failed)?;
        if !metadata.is_file() {
            return Err(failed(io::Error::new(
                io::ErrorKind::InvalidInput,
                "live store is not a regular file",
            )));
        }
        let mut source = File::open(&self.live_store).map_err(failed)?;

        let stamp = format_backup_timestamp(&now);
        let (path, mut dest) = self.create_unique(&stamp)?;

        let copied = io::copy(&mut source, &mut dest).and_then(|n| {
            dest.sync_all()?;
            Ok(n)
        });
        drop(dest);

        let result = match copied {
            Ok(n) if n == metadata.len() => Ok(n),
            Ok(n) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("short copy: {} of {} bytes", n, metadata.len()),
            )),
            Err(e) => Err(e),
        };

        let size = match result {
            Ok(n) => n,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %cleanup, "Failed to remove partial snapshot");
                }
                return Err(failed(e));
            }
        };

        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        info!(path = %path.display(), size, "Snapshot created");

        Ok(Snapshot {
            path,
            created_at: now,
            size,
            modified,
        })
    }

    /// Open a fresh snapshot file, adding a suffix if the name is taken
    fn create_unique(&self, stamp: &str) -> SnapshotResult<(PathBuf, File)> {
        let base = format!("{}{}", self.prefix(), stamp);

        for n in 0..=MAX_COLLISION_SUFFIX {
            let name = if n == 0 {
                format!("{}.db", base)
            } else {
                format!("{}_{:02}.db", base, n)
            };
            let path = self.backup_dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    if n > 0 {
                        debug!(path = %path.display(), "Snapshot name collision resolved with suffix");
                    }
                    return Ok((path, file));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => {
                    return Err(SnapshotError::Failed {
                        live_store: self.live_store.clone(),
                        source,
                    });
                }
            }
        }

        Err(SnapshotError::NameCollision(
            self.backup_dir.join(format!("{}.db", base)),
        ))
    }

    /// Snapshots of this catalog, oldest first.
    ///
    /// Ordered by modification time, ties broken by file name.
    pub fn list_snapshots(&self) -> SnapshotResult<Vec<Snapshot>> {
        let mut snapshots = Vec::new();

        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let Some(created_at) = self.parse_name(&name) else {
                continue;
            };
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            snapshots.push(Snapshot {
                path: entry.path(),
                created_at,
                size: metadata.len(),
                modified: metadata.modified().ok(),
            });
        }

        snapshots.sort_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.file_name().cmp(b.file_name()))
        });

        Ok(snapshots)
    }

    /// Extract the timestamp from `<catalog>_backup_<stamp>[_NN].db`
    fn parse_name(&self, name: &str) -> Option<DateTime<Local>> {
        let stem = name
            .strip_prefix(&self.prefix())?
            .strip_suffix(".db")?;
        let (stamp, rest) = stem.split_at_checked(BACKUP_TIMESTAMP_LEN)?;

        let valid_suffix = rest.is_empty()
            || rest
                .strip_prefix('_')
                .is_some_and(|n| n.len() == 2 && n.bytes().all(|b| b.is_ascii_digit()));
        if !valid_suffix {
            return None;
        }

        parse_backup_timestamp(stamp)
    }

    /// Remove one snapshot file
    pub fn delete_snapshot(&self, snapshot: &Snapshot) -> SnapshotResult<()> {
        fs::remove_file(&snapshot.path).map_err(|source| SnapshotError::DeleteFailed {
            path: snapshot.path.clone(),
            source,
        })?;
        debug!(path = %snapshot.path.display(), "Snapshot deleted");
        Ok(())
    }

    /// Delete everything but the `keep` most recent snapshots.
    ///
    /// Individual deletion failures are logged and collected in the report.
    pub fn prune(&self, keep: usize) -> SnapshotResult<PruneReport> {
        let decision = decide(self.list_snapshots()?, keep);
        let mut report = PruneReport::default();

        for snapshot in decision.delete {
            match self.delete_snapshot(&snapshot) {
                Ok(()) => report.deleted.push(snapshot),
                Err(e) => {
                    warn!(error = %e, "Snapshot prune failed");
                    report.failed.push(e);
                }
            }
        }

        Ok(report)
    }

    /// Create a snapshot, then prune down to `keep`. Prune problems never
    /// fail the call.
    pub fn snapshot_and_prune(
        &self,
        now: DateTime<Local>,
        keep: usize,
    ) -> SnapshotResult<BackupReport> {
        let snapshot = self.create_snapshot_at(now)?;

        let prune = match self.prune(keep) {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Could not list snapshots for pruning");
                PruneReport {
                    deleted: Vec::new(),
                    failed: vec![e],
                }
            }
        };

        Ok(BackupReport { snapshot, prune })
    }
}
