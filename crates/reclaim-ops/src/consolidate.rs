//! Duplicate consolidation.
//!
//! One member of each group survives; every other member is deleted or
//! replaced by a link to the survivor. Members are processed independently
//! and each one leaves the filesystem consistent on its own.

use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use derive_builder::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use reclaim_analyze::DuplicateGroup;
use reclaim_core::{FileRecord, format_size};
use reclaim_scan::inode_info;

use crate::delete::SafeDeleter;
use crate::operation::{ConsolidationStrategy, MemberAction, OperationError};
use crate::progress::ProgressReporter;
use crate::result::{ConsolidationResult, MemberOutcome};

/// Suffix of the temporary name a link is created under before it replaces
/// the member.
const TEMP_SUFFIX: &str = ".reclaim-tmp";

/// Options for consolidating duplicates.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct ConsolidateOptions {
    /// What to do with non-survivor members.
    #[builder(default)]
    pub strategy: ConsolidationStrategy,

    /// Keep the most recently modified member (otherwise the oldest).
    #[builder(default = "true")]
    pub keep_newest: bool,

    /// Try the OS trash before deleting permanently.
    #[builder(default = "true")]
    pub use_trash: bool,
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            strategy: ConsolidationStrategy::default(),
            keep_newest: true,
            use_trash: true,
        }
    }
}

impl ConsolidateOptions {
    /// Create a new options builder.
    pub fn builder() -> ConsolidateOptionsBuilder {
        ConsolidateOptionsBuilder::default()
    }
}

/// Index of the member to keep.
///
/// Members are stably sorted by modification time, newest first; ties keep
/// their enumeration order. Returns `None` for an empty slice.
pub fn select_survivor(members: &[FileRecord], keep_newest: bool) -> Option<usize> {
    let order = (0..members.len())
        .sorted_by(|&a, &b| members[b].modified.cmp(&members[a].modified))
        .collect_vec();

    if keep_newest {
        order.first().copied()
    } else {
        order.last().copied()
    }
}

/// Applies a [`ConsolidationStrategy`] to duplicate groups.
#[derive(Debug, Clone)]
pub struct Consolidator {
    options: ConsolidateOptions,
    deleter: SafeDeleter,
}

impl Default for Consolidator {
    fn default() -> Self {
        Self::new(ConsolidateOptions::default())
    }
}

impl Consolidator {
    /// Create a consolidator with the given options.
    pub fn new(options: ConsolidateOptions) -> Self {
        let deleter = SafeDeleter {
            use_trash: options.use_trash,
        };
        Self { options, deleter }
    }

    /// Get the options.
    pub fn options(&self) -> &ConsolidateOptions {
        &self.options
    }

    /// Consolidate one group, keeping a single survivor.
    ///
    /// The reporter is called once per non-survivor member, after it has
    /// been processed.
    pub fn consolidate<R>(&self, group: &DuplicateGroup, reporter: &mut R) -> ConsolidationResult
    where
        R: ProgressReporter + ?Sized,
    {
        let mut result = ConsolidationResult::default();
        let Some(survivor_index) = select_survivor(&group.members, self.options.keep_newest)
        else {
            return result;
        };

        let survivor = &group.members[survivor_index];
        result.survivors.push(survivor.path.clone());
        let members = group
            .members
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != survivor_index)
            .map(|(_, member)| member);

        let survivor_metadata = match check_survivor(&survivor.path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("Survivor unusable, skipping group: {err}");
                for member in members {
                    let message = format!("survivor {} is unusable: {}", survivor.path.display(), err.message);
                    reporter.report_error(&member.path, &message);
                    result.push(MemberOutcome::failed(&member.path, member.size, message));
                    reporter.report_progress(&member.path);
                }
                return result;
            }
        };

        for member in members {
            let outcome = match self.process_member(member, &survivor.path, &survivor_metadata) {
                Ok(outcome) => {
                    debug!(path = %member.path.display(), action = %outcome.action, "Consolidated");
                    outcome
                }
                Err(err) => {
                    warn!("Failed to consolidate: {err}");
                    reporter.report_error(&member.path, &err.message);
                    MemberOutcome::failed(&member.path, member.size, err.message)
                }
            };
            result.push(outcome);
            reporter.report_progress(&member.path);
        }

        result
    }

    /// Consolidate every group and merge the results.
    pub fn consolidate_all<R>(&self, groups: &[DuplicateGroup], reporter: &mut R) -> ConsolidationResult
    where
        R: ProgressReporter + ?Sized,
    {
        let mut total = ConsolidationResult::default();
        for group in groups {
            total.merge(self.consolidate(group, reporter));
        }

        info!(
            groups = groups.len(),
            processed = total.total_count,
            failed = total.failed_count(),
            strategy = %self.options.strategy,
            "Consolidation finished, reclaimed {}",
            format_size(total.total_bytes_reclaimed)
        );
        total
    }

    fn process_member(
        &self,
        member: &FileRecord,
        survivor: &Path,
        survivor_metadata: &Metadata,
    ) -> Result<MemberOutcome, OperationError> {
        let path = member.path.as_path();
        let metadata =
            fs::symlink_metadata(path).map_err(|e| OperationError::io(path, "cannot stat", &e))?;
        if !metadata.is_file() {
            return Err(OperationError::new(path, "no longer a regular file"));
        }
        let shared = same_inode(&metadata, survivor_metadata);

        let action = match self.options.strategy {
            ConsolidationStrategy::Delete => self.deleter.remove(path).map(MemberAction::from)?,
            ConsolidationStrategy::Hardlink if shared => MemberAction::Unchanged,
            ConsolidationStrategy::Hardlink => {
                replace_with_link(path, |temp| fs::hard_link(survivor, temp))?;
                MemberAction::Hardlinked
            }
            ConsolidationStrategy::Symlink => {
                let target = std::path::absolute(survivor)
                    .map_err(|e| OperationError::io(survivor, "cannot resolve survivor", &e))?;
                replace_with_link(path, |temp| symlink_file(&target, temp))?;
                MemberAction::Symlinked
            }
        };
        Ok(MemberOutcome::succeeded(path, member.size, action).with_shared_inode(shared))
    }
}

fn check_survivor(path: &Path) -> Result<Metadata, OperationError> {
    let metadata =
        fs::symlink_metadata(path).map_err(|e| OperationError::io(path, "cannot stat", &e))?;
    if metadata.is_file() {
        Ok(metadata)
    } else {
        Err(OperationError::new(path, "no longer a regular file"))
    }
}

fn same_inode(a: &Metadata, b: &Metadata) -> bool {
    matches!((inode_info(a), inode_info(b)), (Some(a), Some(b)) if a == b)
}

/// Hidden sibling name used while the link is being created.
fn temp_sibling(path: &Path) -> Result<PathBuf, OperationError> {
    let name = path
        .file_name()
        .ok_or_else(|| OperationError::new(path, "path has no file name"))?;
    let mut temp_name = OsString::from(".");
    temp_name.push(name);
    temp_name.push(TEMP_SUFFIX);
    Ok(path.with_file_name(temp_name))
}

/// Create a link beside `member` and rename it over the member.
///
/// On any failure the member is left untouched.
fn replace_with_link<F>(member: &Path, create: F) -> Result<(), OperationError>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let temp = temp_sibling(member)?;
    create(&temp).map_err(|e| OperationError::io(member, "cannot create link", &e))?;

    if let Err(e) = fs::rename(&temp, member) {
        if let Err(cleanup) = fs::remove_file(&temp) {
            warn!(path = %temp.display(), "Failed to remove temporary link: {cleanup}");
        }
        return Err(OperationError::io(member, "cannot replace file", &e));
    }
    Ok(())
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink_file(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn record(path: &str, secs: u64) -> FileRecord {
        FileRecord::new(path, 10, SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn test_select_survivor_newest_and_oldest() {
        let members = [record("/a", 100), record("/b", 300), record("/c", 200)];
        assert_eq!(select_survivor(&members, true), Some(1));
        assert_eq!(select_survivor(&members, false), Some(0));
        assert_eq!(select_survivor(&[], true), None);
    }

    #[test]
    fn test_select_survivor_ties_keep_enumeration_order() {
        let members = [record("/a", 100), record("/b", 100), record("/c", 100)];
        assert_eq!(select_survivor(&members, true), Some(0));
        assert_eq!(select_survivor(&members, false), Some(2));
    }

    #[test]
    fn test_temp_sibling_is_hidden_neighbour() {
        let temp = temp_sibling(Path::new("/data/photo.jpg")).unwrap();
        assert_eq!(temp, Path::new("/data/.photo.jpg.reclaim-tmp"));
        assert!(temp_sibling(Path::new("/")).is_err());
    }

    #[test]
    fn test_options_builder_defaults() {
        let options = ConsolidateOptions::builder()
            .strategy(ConsolidationStrategy::Hardlink)
            .build()
            .unwrap();
        assert_eq!(options.strategy, ConsolidationStrategy::Hardlink);
        assert!(options.keep_newest);
        assert!(options.use_trash);
    }
}
