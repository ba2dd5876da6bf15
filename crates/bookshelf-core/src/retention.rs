//! Snapshot retention policy

/// Number of snapshots kept after every prune cycle
pub const RETENTION_KEEP: usize = 5;

/// Outcome of applying the retention policy to an ordered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionDecision<T> {
    /// The most recent entries, oldest first
    pub keep: Vec<T>,
    /// Entries to delete, oldest first
    pub delete: Vec<T>,
}

/// Split `ordered` (oldest first) into the `keep` most recent entries and
/// everything older.
pub fn decide<T>(mut ordered: Vec<T>, keep: usize) -> RetentionDecision<T> {
    let cut = ordered.len().saturating_sub(keep);
    let kept = ordered.split_off(cut);

    RetentionDecision {
        keep: kept,
        delete: ordered,
    }
}
