//! Serial directory walker built on jwalk.
//!
//! The walk runs on the calling thread with entries sorted by name, so the
//! order in which files are yielded is stable between runs.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use jwalk::{DirEntry, Parallelism, WalkDir};
use tracing::debug;

use reclaim_core::{FileRecord, InodeInfo, ScanConfig, ScanError, ScanWarning, WarningKind};

use crate::inode::InodeTracker;
use crate::probe::{inode_info, link_count, record_from_metadata};

type Entries = Box<dyn Iterator<Item = Result<DirEntry<((), ())>, jwalk::Error>>>;

/// A regular file found by the walker, with its link identity.
#[derive(Debug, Clone)]
pub struct WalkedFile {
    /// Snapshot of the file.
    pub record: FileRecord,
    /// Inode identity, when the platform has one.
    pub inode: Option<InodeInfo>,
    /// Number of hard links to the file.
    pub links: u64,
}

/// Iterator over every regular file below a root directory.
///
/// Symlinks are never followed and never yielded. Entries that cannot be
/// read become [`ScanWarning`]s instead of ending the walk.
pub struct FileWalk {
    root: PathBuf,
    entries: Entries,
}

impl FileWalk {
    /// Start a walk. Fails only if the root is missing, unreadable or not
    /// a directory, or if an ignore pattern is not a valid glob.
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        let root = validate_root(&config.root)?;
        let ignore = build_globset(&config.ignore_patterns)?;

        let mut walker = WalkDir::new(&root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(!config.include_hidden)
            .follow_links(false);

        if let Some(depth) = config.max_depth {
            walker = walker.max_depth(depth);
        }

        if let Some(ignore) = ignore {
            // Pruning here keeps jwalk from descending into ignored directories.
            walker = walker.process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|child| match child {
                    Ok(entry) => !ignore.is_match(entry.file_name()),
                    Err(_) => true,
                });
            });
        }

        Ok(Self {
            root,
            entries: Box::new(walker.into_iter()),
        })
    }

    /// Absolute root of the walk.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Next regular file, including its inode identity.
    pub fn next_file(&mut self) -> Option<Result<WalkedFile, ScanWarning>> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(warning_from_walk_error(&err))),
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    let mut warning = warning_from_walk_error(&err);
                    if warning.kind == WarningKind::ReadError {
                        warning.kind = WarningKind::MetadataError;
                    }
                    warning.path = path;
                    return Some(Err(warning));
                }
            };

            return Some(
                record_from_metadata(&path, &metadata)
                    .map(|record| WalkedFile {
                        record,
                        inode: inode_info(&metadata),
                        links: link_count(&metadata),
                    })
                    .map_err(|err| ScanWarning::from(&err)),
            );
        }
    }
}

impl Iterator for FileWalk {
    type Item = Result<FileRecord, ScanWarning>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_file().map(|file| file.map(|f| f.record))
    }
}

impl std::fmt::Debug for FileWalk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWalk").field("root", &self.root).finish_non_exhaustive()
    }
}

/// Total size of the regular files below `path`.
///
/// Files with several hard links inside the tree are counted once.
/// Unreadable entries are skipped.
pub fn directory_size(path: &Path) -> Result<u64, ScanError> {
    let mut walk = FileWalk::new(&ScanConfig::new(path))?;
    let mut tracker = InodeTracker::new();
    let mut total = 0u64;

    while let Some(file) = walk.next_file() {
        match file {
            Ok(file) => {
                let counted = match file.inode {
                    Some(inode) if file.links > 1 => tracker.track(inode),
                    _ => true,
                };
                if counted {
                    total += file.record.size;
                }
            }
            Err(warning) => {
                debug!(path = %warning.path.display(), "Skipping entry: {}", warning.message);
            }
        }
    }

    Ok(total)
}

/// Check that the root exists and is a directory, and make it absolute.
fn validate_root(root: &Path) -> Result<PathBuf, ScanError> {
    let metadata = fs::metadata(root).map_err(|e| ScanError::io(root, e))?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    std::path::absolute(root).map_err(|e| ScanError::io(root, e))
}

/// Compile glob patterns into a matcher. No patterns means no matcher.
fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, ScanError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidConfig {
            message: format!("invalid pattern '{pattern}': {e}"),
        })?;
        builder.add(glob);
    }

    builder
        .build()
        .map(Some)
        .map_err(|e| ScanError::InvalidConfig {
            message: e.to_string(),
        })
}

fn warning_from_walk_error(err: &jwalk::Error) -> ScanWarning {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    match err.io_error().map(std::io::Error::kind) {
        Some(ErrorKind::PermissionDenied) => ScanWarning::permission_denied(path),
        Some(ErrorKind::NotFound) => ScanWarning::new(path, err.to_string(), WarningKind::Vanished),
        _ => ScanWarning::new(path, err.to_string(), WarningKind::ReadError),
    }
}
