//! Temporary file analysis.
//!
//! Measures how much of a temp or cache directory is old enough to be
//! cleaned.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tracing::debug;

use reclaim_core::{FileRecord, ScanConfig};
use reclaim_scan::{FileWalk, LocationKind, is_older_than};

/// Default age threshold for system temp files.
pub const DEFAULT_MIN_AGE_DAYS: u32 = 7;

/// Maximum number of old files listed in a report.
pub const MAX_OLD_FILES: usize = 1000;

/// Analysis of one temp directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TempReport {
    /// Directory that was analyzed.
    pub directory: PathBuf,
    /// Size of all regular files.
    pub total_size: u64,
    /// Number of regular files.
    pub total_count: u64,
    /// Size of the files cleaning would remove.
    pub old_files_size: u64,
    /// Number of files cleaning would remove.
    pub old_files_count: u64,
    /// The first old files found, capped at [`MAX_OLD_FILES`].
    pub old_files: Vec<FileRecord>,
}

/// Analyze the regular files below `dir`.
///
/// An unreadable or missing directory yields an empty report.
pub fn analyze_temp_dir(dir: &Path, min_age_days: u32, now: SystemTime) -> TempReport {
    measure(dir, |modified| is_older_than(modified, min_age_days, now))
}

fn measure(dir: &Path, cleanable: impl Fn(SystemTime) -> bool) -> TempReport {
    let mut report = TempReport {
        directory: dir.to_path_buf(),
        ..TempReport::default()
    };

    let walk = match FileWalk::new(&ScanConfig::new(dir)) {
        Ok(walk) => walk,
        Err(err) => {
            debug!("Cannot analyze temp directory: {err}");
            return report;
        }
    };

    for record in walk.filter_map(Result::ok) {
        report.total_size += record.size;
        report.total_count += 1;

        if cleanable(record.modified) {
            report.old_files_size += record.size;
            report.old_files_count += 1;
            if report.old_files.len() < MAX_OLD_FILES {
                report.old_files.push(record);
            }
        }
    }

    report
}

/// Age threshold applied when cleaning a location kind.
///
/// Package caches are cleared outright, so every file counts.
pub fn cleanable_age_days(kind: LocationKind) -> Option<u32> {
    match kind {
        LocationKind::SystemTemp => Some(DEFAULT_MIN_AGE_DAYS),
        LocationKind::BrowserCache => Some(1),
        LocationKind::PackageCache => None,
    }
}

/// Analyze every existing directory of a location kind.
pub fn analyze_location(kind: LocationKind, now: SystemTime) -> Vec<TempReport> {
    analyze_directories(kind, &kind.existing(), now)
}

/// Analyze the given directories with the threshold cleaning uses for `kind`.
pub fn analyze_directories(kind: LocationKind, dirs: &[PathBuf], now: SystemTime) -> Vec<TempReport> {
    let min_age_days = cleanable_age_days(kind);
    dirs.iter()
        .map(|dir| match min_age_days {
            Some(days) => analyze_temp_dir(dir, days, now),
            None => measure(dir, |_| true),
        })
        .collect()
}

/// Format a duration as a human-readable age string.
pub fn format_age(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs} seconds")
    } else if secs < 3600 {
        format!("{} minutes", secs / 60)
    } else if secs < 86400 {
        format!("{} hours", secs / 3600)
    } else if secs < 2592000 {
        format!("{} days", secs / 86400)
    } else if secs < 31536000 {
        format!("{} months", secs / 2592000)
    } else {
        format!("{:.1} years", secs as f64 / 31536000.0)
    }
}
