//! Cleaners for temp directories, caches and large files.
//!
//! A failure on one item never stops the rest; failed paths are listed in
//! the result.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use reclaim_analyze::{cleanable_age_days, find_large_files};
use reclaim_core::{FileRecord, ScanConfig};
use reclaim_scan::{FileWalk, LocationKind, is_older_than, probe_file};

use crate::delete::SafeDeleter;
use crate::progress::ProgressReporter;
use crate::result::{CleanResult, CleanSummary};

/// Permanently remove every child of `dir`, keeping `dir` itself.
///
/// The reported size and count are those of the regular files found before
/// removal started. Only an unreadable `dir` makes the result unsuccessful.
pub fn clean_directory<R>(dir: &Path, reporter: &mut R) -> CleanResult
where
    R: ProgressReporter + ?Sized,
{
    let mut result = CleanResult::new(dir);

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), "Cannot read directory: {e}");
            result.error = Some(e.to_string());
            return result;
        }
    };

    if let Ok(walk) = FileWalk::new(&ScanConfig::new(dir)) {
        for record in walk.filter_map(Result::ok) {
            result.total_size += record.size;
            result.total_count += 1;
        }
    }

    let deleter = SafeDeleter::permanent();
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        match deleter.remove(&path) {
            Ok(_) => debug!(path = %path.display(), "Removed"),
            Err(err) => {
                debug!("Skipping: {err}");
                reporter.report_error(&path, &err.message);
                result.failed.push(path.clone());
            }
        }
        reporter.report_progress(&path);
    }

    info!(
        path = %dir.display(),
        files = result.total_count,
        failed = result.failed.len(),
        "Directory cleaned"
    );
    result
}

/// Safe-delete the regular files below `dir` older than `min_age_days`.
pub fn clean_old_files<R>(
    dir: &Path,
    min_age_days: u32,
    now: SystemTime,
    deleter: &SafeDeleter,
    reporter: &mut R,
) -> CleanResult
where
    R: ProgressReporter + ?Sized,
{
    let mut result = CleanResult::new(dir);
    let walk = match FileWalk::new(&ScanConfig::new(dir)) {
        Ok(walk) => walk,
        Err(err) => {
            warn!("Cannot clean directory: {err}");
            result.error = Some(err.to_string());
            return result;
        }
    };

    let old_files = walk
        .filter_map(Result::ok)
        .filter(|record| is_older_than(record.modified, min_age_days, now));
    remove_records(old_files, deleter, reporter, &mut result);
    result
}

/// Safe-delete the regular files below `dir` of at least `min_size` bytes.
pub fn clean_large_files<R>(
    dir: &Path,
    min_size: u64,
    deleter: &SafeDeleter,
    reporter: &mut R,
) -> CleanResult
where
    R: ProgressReporter + ?Sized,
{
    let mut result = CleanResult::new(dir);
    match find_large_files(dir, min_size) {
        Ok(files) => remove_records(files, deleter, reporter, &mut result),
        Err(err) => {
            warn!("Cannot clean directory: {err}");
            result.error = Some(err.to_string());
        }
    }
    result
}

/// Safe-delete an explicit selection of files.
///
/// Symlinks, directories and missing paths are skipped. The result's
/// directory is empty.
pub fn clean_paths<R>(paths: &[PathBuf], deleter: &SafeDeleter, reporter: &mut R) -> CleanResult
where
    R: ProgressReporter + ?Sized,
{
    let mut result = CleanResult::default();
    let files = paths.iter().filter_map(|path| match probe_file(path) {
        Ok(record) => Some(record),
        Err(err) => {
            debug!("Skipping: {err}");
            None
        }
    });
    remove_records(files, deleter, reporter, &mut result);
    result
}

/// Clean every existing directory of a location kind.
///
/// Temp and browser cache directories lose their old files; package caches
/// are emptied.
pub fn clean_locations<R>(
    kind: LocationKind,
    now: SystemTime,
    deleter: &SafeDeleter,
    reporter: &mut R,
) -> CleanSummary
where
    R: ProgressReporter + ?Sized,
{
    clean_directories(kind, &kind.existing(), now, deleter, reporter)
}

/// Clean the given directories the way `kind` is cleaned.
pub fn clean_directories<R>(
    kind: LocationKind,
    dirs: &[PathBuf],
    now: SystemTime,
    deleter: &SafeDeleter,
    reporter: &mut R,
) -> CleanSummary
where
    R: ProgressReporter + ?Sized,
{
    let mut summary = CleanSummary::default();
    for dir in dirs {
        summary.add(match cleanable_age_days(kind) {
            Some(days) => clean_old_files(dir, days, now, deleter, &mut *reporter),
            None => clean_directory(dir, &mut *reporter),
        });
    }

    info!(%kind, directories = dirs.len(), "{}", summary.summary());
    summary
}

fn remove_records<I, R>(files: I, deleter: &SafeDeleter, reporter: &mut R, result: &mut CleanResult)
where
    I: IntoIterator<Item = FileRecord>,
    R: ProgressReporter + ?Sized,
{
    for file in files {
        match deleter.remove(&file.path) {
            Ok(removal) => {
                debug!(path = %file.path.display(), ?removal, "Removed");
                result.total_size += file.size;
                result.total_count += 1;
            }
            Err(err) => {
                warn!("Failed to remove: {err}");
                reporter.report_error(&file.path, &err.message);
                result.failed.push(file.path.clone());
            }
        }
        reporter.report_progress(&file.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use tempfile::TempDir;

    #[test]
    fn test_clean_directory_missing() {
        let temp = TempDir::new().unwrap();
        let result = clean_directory(&temp.path().join("missing"), &mut NoProgress);
        assert!(!result.is_success());
        assert_eq!(result.total_count, 0);
    }

    #[test]
    fn test_clean_paths_skips_directories_and_missing() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.bin");
        fs::write(&file, vec![0u8; 64]).unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir(&dir).unwrap();

        let paths = [file.clone(), dir.clone(), temp.path().join("missing")];
        let result = clean_paths(&paths, &SafeDeleter::permanent(), &mut NoProgress);

        assert_eq!(result.total_count, 1);
        assert_eq!(result.total_size, 64);
        assert!(result.failed.is_empty());
        assert!(!file.exists());
        assert!(dir.exists());
    }
}
