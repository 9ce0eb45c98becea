//! Space usage analysis of a directory tree.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use compact_str::{CompactString, format_compact};
use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use reclaim_core::size::MB;
use reclaim_core::{FileRecord, ScanConfig, ScanError, SizeDistribution};
use reclaim_scan::{FileWalk, directory_size};

/// Default threshold for [`find_large_files`].
pub const LARGE_FILE_THRESHOLD: u64 = 100 * MB;

/// Key used for files without an extension.
pub const NO_EXTENSION: &str = "no extension";

/// Size of one subdirectory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectorySize {
    /// Full path of the directory.
    pub path: PathBuf,
    /// Path relative to the analyzed directory, e.g. `parent/child`.
    pub label: String,
    /// Total size of the regular files inside.
    pub size: u64,
}

/// Count and total size of one file extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTypeStats {
    /// Lowercase extension with its dot, or [`NO_EXTENSION`].
    pub extension: CompactString,
    pub count: u64,
    pub total_size: u64,
}

/// Sizes of the subdirectories of `dir`, descending `depth` levels.
///
/// Each level lists its immediate subdirectories in name order, followed
/// by their own children when `depth > 1`. Symlinked directories and
/// unreadable subdirectories are skipped.
pub fn directory_tree_sizes(dir: &Path, depth: usize) -> Result<Vec<DirectorySize>, ScanError> {
    let mut result = Vec::new();
    collect_tree_sizes(dir, "", depth, &mut result)?;
    Ok(result)
}

fn collect_tree_sizes(
    dir: &Path,
    prefix: &str,
    depth: usize,
    out: &mut Vec<DirectorySize>,
) -> Result<(), ScanError> {
    if depth == 0 {
        return Ok(());
    }

    let entries = fs::read_dir(dir).map_err(|e| ScanError::io(dir, e))?;
    let subdirs = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.path())
        .sorted();

    for subdir in subdirs {
        let name = subdir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        let size = match directory_size(&subdir) {
            Ok(size) => size,
            Err(err) => {
                debug!("Skipping directory: {err}");
                continue;
            }
        };

        out.push(DirectorySize {
            path: subdir.clone(),
            label: label.clone(),
            size,
        });

        if depth > 1 {
            if let Err(err) = collect_tree_sizes(&subdir, &label, depth - 1, out) {
                debug!("Skipping children: {err}");
            }
        }
    }

    Ok(())
}

/// Regular files of at least `min_size` bytes below `dir`, largest first.
pub fn find_large_files(dir: &Path, min_size: u64) -> Result<Vec<FileRecord>, ScanError> {
    let mut files: Vec<FileRecord> = FileWalk::new(&ScanConfig::new(dir))?
        .filter_map(Result::ok)
        .filter(|record| record.size >= min_size)
        .collect();
    files.sort_by_key(|record| Reverse(record.size));
    Ok(files)
}

/// Count and size of files per extension below `dir`, largest total first.
pub fn file_type_summary(dir: &Path) -> Result<Vec<FileTypeStats>, ScanError> {
    let mut types: HashMap<CompactString, (u64, u64)> = HashMap::new();

    for record in FileWalk::new(&ScanConfig::new(dir))?.filter_map(Result::ok) {
        let entry = types.entry(extension_key(&record.path)).or_default();
        entry.0 += 1;
        entry.1 += record.size;
    }

    Ok(types
        .into_iter()
        .map(|(extension, (count, total_size))| FileTypeStats {
            extension,
            count,
            total_size,
        })
        .sorted_by(|a, b| {
            b.total_size
                .cmp(&a.total_size)
                .then_with(|| a.extension.cmp(&b.extension))
        })
        .collect())
}

/// Bucket every file below `dir` by size range.
pub fn size_distribution(dir: &Path) -> Result<SizeDistribution, ScanError> {
    Ok(SizeDistribution::from_sizes(
        FileWalk::new(&ScanConfig::new(dir))?
            .filter_map(Result::ok)
            .map(|record| record.size),
    ))
}

/// Lowercase extension with a leading dot. Dotfiles such as `.bashrc` have
/// no extension.
fn extension_key(path: &Path) -> CompactString {
    match path.extension() {
        Some(ext) => format_compact!(".{}", ext.to_string_lossy().to_lowercase()),
        None => CompactString::from(NO_EXTENSION),
    }
}
