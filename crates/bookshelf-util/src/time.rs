//! Clock utilities for bookshelf
//!
//! All wall-clock reads go through [`now`] so that backup names can be
//! pinned during development.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `BOOKSHELF_MOCK_TIME` environment variable overrides
//! the system time. Format: `YYYY-MM-DD HH:MM:SS`. The mocked clock advances
//! at the same rate as the real one.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "BOOKSHELF_MOCK_TIME";

/// Timestamp format embedded in backup file names. Sorts lexicographically
/// in chronological order.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Length of a formatted backup timestamp (`YYYYMMDD_HHMMSS`)
pub const BACKUP_TIMESTAMP_LEN: usize = 15;

static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S") {
                    Ok(naive_dt) => {
                        if let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() {
                            let offset = mock_dt.signed_duration_since(Local::now());
                            tracing::info!(
                                mock_time = %mock_time_str,
                                offset_secs = offset.num_seconds(),
                                "Mock time enabled"
                            );
                            return Some(offset);
                        }
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            "Failed to convert mock time to local timezone"
                        );
                    }
                    Err(_) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = "%Y-%m-%d %H:%M:%S",
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Current local time, respecting mock time in debug builds.
pub fn now() -> DateTime<Local> {
    let real_now = Local::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Format a time as a backup file timestamp (`YYYYMMDD_HHMMSS`).
pub fn format_backup_timestamp(dt: &DateTime<Local>) -> String {
    dt.format(BACKUP_TIMESTAMP_FORMAT).to_string()
}

/// Parse a backup file timestamp back into a local time.
pub fn parse_backup_timestamp(s: &str) -> Option<DateTime<Local>> {
    if s.len() != BACKUP_TIMESTAMP_LEN {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(s, BACKUP_TIMESTAMP_FORMAT).ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Format a DateTime for display with full date and time.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
