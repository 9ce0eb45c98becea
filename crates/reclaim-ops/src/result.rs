//! Outcome types for completed operations.

use std::path::PathBuf;

use reclaim_core::format_size;
use serde::Serialize;

use crate::operation::MemberAction;

/// What happened to one duplicate member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberOutcome {
    /// The member that was processed.
    pub path: PathBuf,
    /// Size of the member when it was scanned.
    pub size: u64,
    /// What was done to it.
    pub action: MemberAction,
    /// Why it failed, if it did.
    pub error: Option<String>,
    /// The member was a hard link to the survivor, so no data was freed.
    pub shared_inode: bool,
}

impl MemberOutcome {
    /// A member that was processed successfully.
    pub fn succeeded(path: impl Into<PathBuf>, size: u64, action: MemberAction) -> Self {
        Self {
            path: path.into(),
            size,
            action,
            error: None,
            shared_inode: false,
        }
    }

    /// Mark the member as sharing the survivor's inode.
    pub fn with_shared_inode(mut self, shared: bool) -> Self {
        self.shared_inode = shared;
        self
    }

    /// A member that could not be processed.
    pub fn failed(path: impl Into<PathBuf>, size: u64, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size,
            action: MemberAction::Failed,
            error: Some(error.into()),
            shared_inode: false,
        }
    }

    /// Whether the member was processed successfully.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Bytes freed by processing this member.
    pub fn bytes_reclaimed(&self) -> u64 {
        if self.shared_inode {
            return 0;
        }
        match self.action {
            MemberAction::Trashed
            | MemberAction::Deleted
            | MemberAction::Hardlinked
            | MemberAction::Symlinked => self.size,
            MemberAction::Unchanged | MemberAction::Failed => 0,
        }
    }
}

/// Result of consolidating one or more duplicate groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationResult {
    /// Files that were kept, one per group.
    pub survivors: Vec<PathBuf>,
    /// One entry per non-survivor member.
    pub outcomes: Vec<MemberOutcome>,
    /// Bytes freed by successful members.
    pub total_bytes_reclaimed: u64,
    /// Number of successful members.
    pub total_count: usize,
}

impl ConsolidationResult {
    pub(crate) fn push(&mut self, outcome: MemberOutcome) {
        if outcome.is_success() {
            self.total_count += 1;
            self.total_bytes_reclaimed += outcome.bytes_reclaimed();
        }
        self.outcomes.push(outcome);
    }

    /// Fold another result into this one.
    pub fn merge(&mut self, other: ConsolidationResult) {
        self.survivors.extend(other.survivors);
        self.outcomes.extend(other.outcomes);
        self.total_bytes_reclaimed += other.total_bytes_reclaimed;
        self.total_count += other.total_count;
    }

    /// Members that failed.
    pub fn failures(&self) -> impl Iterator<Item = &MemberOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    /// Number of members that failed.
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Check if every member was processed.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get a human-readable summary of the operation.
    pub fn summary(&self) -> String {
        let failed = self.failed_count();
        let base = format!(
            "Processed {} files, reclaimed {}",
            self.total_count,
            format_size(self.total_bytes_reclaimed)
        );
        if failed == 0 {
            base
        } else {
            format!("{base}, {failed} failed")
        }
    }
}

/// Result of cleaning one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanResult {
    /// Directory that was cleaned.
    pub directory: PathBuf,
    /// Bytes removed.
    pub total_size: u64,
    /// Number of files removed.
    pub total_count: u64,
    /// Paths that could not be removed.
    pub failed: Vec<PathBuf>,
    /// Set when the directory itself could not be read.
    pub error: Option<String>,
}

impl CleanResult {
    pub(crate) fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Whether the directory could be processed at all.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Totals over several cleaned directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    /// Bytes removed across all directories.
    pub total_size: u64,
    /// Files removed across all directories.
    pub total_count: u64,
    /// Per-directory results.
    pub details: Vec<CleanResult>,
}

impl CleanSummary {
    /// Add one directory's result to the totals.
    pub fn add(&mut self, result: CleanResult) {
        self.total_size += result.total_size;
        self.total_count += result.total_count;
        self.details.push(result);
    }

    /// Get a human-readable summary of the cleanup.
    pub fn summary(&self) -> String {
        format!(
            "Cleaned {} files ({}) in {} directories",
            self.total_count,
            format_size(self.total_size),
            self.details.len()
        )
    }
}

impl FromIterator<CleanResult> for CleanSummary {
    fn from_iter<I: IntoIterator<Item = CleanResult>>(iter: I) -> Self {
        let mut summary = Self::default();
        for result in iter {
            summary.add(result);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_count_only_successes() {
        let mut result = ConsolidationResult::default();
        result.push(MemberOutcome::succeeded("/a", 100, MemberAction::Deleted));
        result.push(MemberOutcome::succeeded("/b", 100, MemberAction::Unchanged));
        result.push(MemberOutcome::failed("/c", 100, "gone"));

        assert_eq!(result.total_count, 2);
        assert_eq!(result.total_bytes_reclaimed, 100);
        assert_eq!(result.failed_count(), 1);
        assert!(!result.is_success());
        assert_eq!(result.summary(), "Processed 2 files, reclaimed 100 B, 1 failed");
    }

    #[test]
    fn test_merge() {
        let mut first = ConsolidationResult::default();
        first.survivors.push("/keep1".into());
        first.push(MemberOutcome::succeeded("/a", 10, MemberAction::Hardlinked));

        let mut second = ConsolidationResult::default();
        second.survivors.push("/keep2".into());
        second.push(MemberOutcome::succeeded("/b", 20, MemberAction::Symlinked));

        first.merge(second);
        assert_eq!(first.survivors.len(), 2);
        assert_eq!(first.outcomes.len(), 2);
        assert_eq!(first.total_count, 2);
        assert_eq!(first.total_bytes_reclaimed, 30);
    }

    #[test]
    fn test_shared_inode_frees_nothing() {
        let mut result = ConsolidationResult::default();
        result.push(MemberOutcome::succeeded("/a", 100, MemberAction::Deleted).with_shared_inode(true));
        result.push(MemberOutcome::succeeded("/b", 100, MemberAction::Deleted));

        assert_eq!(result.total_count, 2);
        assert_eq!(result.total_bytes_reclaimed, 100);
        assert_eq!(result.outcomes[0].bytes_reclaimed(), 0);
    }

    #[test]
    fn test_clean_summary_collect() {
        let summary: CleanSummary = [
            CleanResult {
                total_size: 1024,
                total_count: 2,
                ..CleanResult::new("/tmp/a")
            },
            CleanResult {
                total_size: 512,
                total_count: 1,
                ..CleanResult::new("/tmp/b")
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(summary.total_size, 1536);
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.summary(), "Cleaned 3 files (1.50 KB) in 2 directories");
    }
}
