//! Snapshot-before-mutate enforcement

use bookshelf_util::now;
use chrono::{DateTime, Local};
use tracing::debug;

use crate::retention::RETENTION_KEEP;
use crate::snapshot::{SnapshotError, SnapshotStore};

/// Wraps state-changing operations so that none runs without a prior
/// successful snapshot.
pub struct MutationGuard<'a> {
    snapshots: &'a SnapshotStore,
    keep: usize,
}

impl<'a> MutationGuard<'a> {
    pub fn new(snapshots: &'a SnapshotStore) -> Self {
        Self {
            snapshots,
            keep: RETENTION_KEEP,
        }
    }

    /// Snapshot, prune, then run `mutation`.
    ///
    /// If the snapshot fails, `mutation` is not called and the snapshot
    /// error is returned. Prune failures are logged and ignored. The
    /// mutation's own result is returned unchanged.
    pub fn run<T, E, F>(&self, mutation: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<SnapshotError>,
    {
        self.run_at(now(), mutation)
    }

    /// Same as [`run`](Self::run) with an explicit snapshot timestamp
    pub fn run_at<T, E, F>(&self, now: DateTime<Local>, mutation: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<SnapshotError>,
    {
        let report = self.snapshots.snapshot_and_prune(now, self.keep)?;
        debug!(
            snapshot = %report.snapshot.path.display(),
            pruned = report.prune.deleted.len(),
            prune_failures = report.prune.failed.len(),
            "Pre-mutation snapshot complete"
        );

        mutation()
    }
}
