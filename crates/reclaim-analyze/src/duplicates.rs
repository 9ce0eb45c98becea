//! Duplicate file detection using content hashing.
//!
//! Uses a two-phase algorithm:
//! 1. Group files by exact size (no I/O beyond the directory walk)
//! 2. Compute a full BLAKE3 hash for every file that shares its size
//!
//! Files with a unique size are never opened, and every candidate is hashed
//! exactly once.

use std::collections::HashMap;
use std::path::Path;

use derive_builder::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use reclaim_core::{ContentHash, FileRecord, ScanConfig, ScanError, ScanWarning};
use reclaim_scan::{Blake3Hasher, ContentHasher, FileWalk};

/// Default lower size bound; smaller files are not worth consolidating.
pub const DEFAULT_MIN_SIZE: u64 = 1024;

/// Configuration for duplicate detection.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct DuplicateConfig {
    /// Minimum file size to consider (skip tiny files).
    #[builder(default = "DEFAULT_MIN_SIZE")]
    pub min_size: u64,

    /// Maximum file size to consider (skip huge files).
    #[builder(default = "u64::MAX")]
    pub max_size: u64,

    /// Glob patterns to exclude from duplicate detection.
    #[builder(default)]
    pub exclude_patterns: Vec<String>,

    /// Maximum number of groups to return (0 = unlimited).
    #[builder(default = "0")]
    pub max_groups: usize,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_size: u64::MAX,
            exclude_patterns: Vec::new(),
            max_groups: 0,
        }
    }
}

impl DuplicateConfig {
    /// Create a new config builder.
    pub fn builder() -> DuplicateConfigBuilder {
        DuplicateConfigBuilder::default()
    }

    /// Check whether a file of this size is a candidate.
    pub fn accepts(&self, size: u64) -> bool {
        size >= self.min_size && size <= self.max_size
    }
}

/// A group of files with identical size and content.
///
/// Always has at least two members, listed in the order the walk found them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content hash shared by all files in this group.
    pub hash: ContentHash,

    /// Size of each file in bytes.
    pub size: u64,

    /// Snapshots of every file in the group.
    pub members: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Get the number of duplicate files.
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Check if keeping one file, how many could be deleted.
    pub fn deletable_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Wasted space: size * (count - 1).
    pub fn wasted_bytes(&self) -> u64 {
        self.size * self.deletable_count() as u64
    }
}

/// Results from duplicate analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Groups of duplicate files, sorted by wasted space descending.
    pub groups: Vec<DuplicateGroup>,

    /// Total size of all duplicate files.
    pub total_duplicate_size: u64,

    /// Total wasted space (could be reclaimed).
    pub total_wasted_space: u64,

    /// Number of files that passed the size filters.
    pub files_analyzed: u64,

    /// Number of files whose content was hashed.
    pub files_hashed: u64,

    /// Number of files that have duplicates.
    pub files_with_duplicates: u64,

    /// Number of duplicate groups.
    pub group_count: usize,

    /// Entries that could not be read during the scan.
    pub warnings: Vec<ScanWarning>,
}

impl DuplicateReport {
    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Get total number of duplicate files across all groups.
    pub fn total_duplicate_files(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::count).sum()
    }
}

/// Duplicate file finder.
///
/// The hasher is a type parameter so tests and callers can substitute the
/// content hash function.
#[derive(Debug, Clone)]
pub struct DuplicateFinder<H = Blake3Hasher> {
    config: DuplicateConfig,
    hasher: H,
}

impl DuplicateFinder<Blake3Hasher> {
    /// Create a new duplicate finder with default config.
    pub fn new() -> Self {
        Self::with_config(DuplicateConfig::default())
    }

    /// Create a new duplicate finder with custom config.
    pub fn with_config(config: DuplicateConfig) -> Self {
        Self {
            config,
            hasher: Blake3Hasher,
        }
    }
}

impl Default for DuplicateFinder<Blake3Hasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ContentHasher> DuplicateFinder<H> {
    /// Replace the content hasher.
    pub fn with_hasher<G: ContentHasher>(self, hasher: G) -> DuplicateFinder<G> {
        DuplicateFinder {
            config: self.config,
            hasher,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &DuplicateConfig {
        &self.config
    }

    /// Find duplicates below the configured root.
    pub fn find(&self, scan: &ScanConfig) -> Result<DuplicateReport, ScanError> {
        self.find_with_progress(scan, |_| {})
    }

    /// Find duplicates, calling `on_hash` before each file is hashed.
    ///
    /// Fails only if the walk cannot start. Unreadable files are skipped and
    /// reported in [`DuplicateReport::warnings`].
    pub fn find_with_progress<P>(
        &self,
        scan: &ScanConfig,
        mut on_hash: P,
    ) -> Result<DuplicateReport, ScanError>
    where
        P: FnMut(&Path),
    {
        let mut scan = scan.clone();
        scan.ignore_patterns
            .extend(self.config.exclude_patterns.iter().cloned());

        let walk = FileWalk::new(&scan)?;
        let mut warnings = Vec::new();
        let mut candidates = Vec::new();

        for item in walk {
            match item {
                Ok(record) if self.config.accepts(record.size) => candidates.push(record),
                Ok(_) => {}
                Err(warning) => {
                    debug!(path = %warning.path.display(), "Skipping entry: {}", warning.message);
                    warnings.push(warning);
                }
            }
        }

        let files_analyzed = candidates.len() as u64;
        let (groups, files_hashed) = self.group_records(candidates, &mut warnings, &mut on_hash);

        let total_duplicate_size = groups.iter().map(|g| g.size * g.count() as u64).sum();
        let total_wasted_space = groups.iter().map(DuplicateGroup::wasted_bytes).sum();
        let files_with_duplicates = groups.iter().map(|g| g.count() as u64).sum();
        let group_count = groups.len();

        info!(
            root = %scan.root.display(),
            files_analyzed,
            files_hashed,
            group_count,
            "Duplicate scan finished"
        );

        Ok(DuplicateReport {
            groups,
            total_duplicate_size,
            total_wasted_space,
            files_analyzed,
            files_hashed,
            files_with_duplicates,
            group_count,
            warnings,
        })
    }

    /// Bucket records by size, hash the collisions and build sorted groups.
    ///
    /// Returns the groups and the number of files successfully hashed.
    pub fn group_records<P>(
        &self,
        records: Vec<FileRecord>,
        warnings: &mut Vec<ScanWarning>,
        on_hash: &mut P,
    ) -> (Vec<DuplicateGroup>, u64)
    where
        P: FnMut(&Path),
    {
        let buckets = records.into_iter().into_group_map_by(|record| record.size);
        let mut files_hashed = 0u64;
        let mut groups = Vec::new();

        for (size, bucket) in buckets {
            if bucket.len() < 2 {
                continue;
            }

            let mut by_hash: HashMap<ContentHash, Vec<FileRecord>> = HashMap::new();
            for record in bucket {
                on_hash(&record.path);
                match self.hasher.hash(&record.path) {
                    Ok(hash) => {
                        files_hashed += 1;
                        by_hash.entry(hash).or_default().push(record);
                    }
                    Err(err) => {
                        debug!("Cannot hash file: {err}");
                        warnings.push(ScanWarning::from(&err));
                    }
                }
            }

            groups.extend(
                by_hash
                    .into_iter()
                    .filter(|(_, members)| members.len() >= 2)
                    .map(|(hash, members)| DuplicateGroup { hash, size, members }),
            );
        }

        groups.sort_by(|a, b| {
            b.wasted_bytes()
                .cmp(&a.wasted_bytes())
                .then_with(|| a.hash.cmp(&b.hash))
                .then_with(|| a.size.cmp(&b.size))
        });

        if self.config.max_groups > 0 {
            groups.truncate(self.config.max_groups);
        }

        (groups, files_hashed)
    }
}

/// Find duplicate groups below `root`, ignoring files smaller than `min_size`.
pub fn detect_duplicates(root: &Path, min_size: u64) -> Result<Vec<DuplicateGroup>, ScanError> {
    let config = DuplicateConfig {
        min_size,
        ..DuplicateConfig::default()
    };
    DuplicateFinder::with_config(config)
        .find(&ScanConfig::new(root))
        .map(|report| report.groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reclaim_core::ProbeError;
    use std::fs;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn create_test_files() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let content = "duplicate content here".repeat(100);

        fs::write(root.join("file1.txt"), &content).unwrap();
        fs::write(root.join("file2.txt"), &content).unwrap();
        fs::write(root.join("file3.txt"), "unique content".repeat(200)).unwrap();

        fs::create_dir(root.join("subdir")).unwrap();
        fs::write(root.join("subdir/file4.txt"), &content).unwrap();

        temp
    }

    fn record(path: &str, size: u64) -> FileRecord {
        FileRecord::new(path, size, SystemTime::UNIX_EPOCH)
    }

    #[test]
    fn test_find_duplicates() {
        let temp = create_test_files();
        let report = DuplicateFinder::new()
            .find(&ScanConfig::new(temp.path()))
            .unwrap();

        assert_eq!(report.group_count, 1);
        let group = &report.groups[0];
        assert_eq!(group.count(), 3);
        assert_eq!(group.size, 2200);
        assert_eq!(group.wasted_bytes(), 4400);
        assert_eq!(report.total_wasted_space, 4400);
        assert_eq!(report.files_with_duplicates, 3);
        // file3 has a unique size and is never hashed
        assert_eq!(report.files_hashed, 3);
    }

    #[test]
    fn test_group_records_sorts_by_wasted_space() {
        let finder = DuplicateFinder::new().with_hasher(|path: &Path| {
            let first = path.to_string_lossy().as_bytes()[1];
            Ok::<_, ProbeError>(ContentHash::new([first; 32]))
        });

        let records = vec![
            record("/a1", 2000),
            record("/a2", 2000),
            record("/b1", 5000),
            record("/b2", 5000),
            record("/b3", 5000),
            record("/c1", 7000),
        ];

        let mut warnings = Vec::new();
        let (groups, hashed) = finder.group_records(records, &mut warnings, &mut |_| {});

        assert_eq!(hashed, 5);
        assert!(warnings.is_empty());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].size, 5000);
        assert_eq!(groups[0].wasted_bytes(), 10_000);
        assert_eq!(groups[1].size, 2000);
    }

    #[test]
    fn test_max_groups_truncates() {
        let config = DuplicateConfig::builder().max_groups(1usize).build().unwrap();
        let finder = DuplicateFinder::with_config(config)
            .with_hasher(|_: &Path| Ok::<_, ProbeError>(ContentHash::new([0; 32])));

        let records = vec![
            record("/a1", 2000),
            record("/a2", 2000),
            record("/b1", 3000),
            record("/b2", 3000),
        ];
        let (groups, _) = finder.group_records(records, &mut Vec::new(), &mut |_| {});
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size, 3000);
    }

    #[test]
    fn test_accepts_size_window() {
        let config = DuplicateConfig::builder()
            .min_size(10u64)
            .max_size(20u64)
            .build()
            .unwrap();
        assert!(!config.accepts(9));
        assert!(config.accepts(10));
        assert!(config.accepts(20));
        assert!(!config.accepts(21));
    }

    #[test]
    fn test_detect_duplicates_invalid_root() {
        let temp = TempDir::new().unwrap();
        let result = detect_duplicates(&temp.path().join("missing"), DEFAULT_MIN_SIZE);
        assert!(matches!(result, Err(ScanError::NotFound { .. })));
    }
}
