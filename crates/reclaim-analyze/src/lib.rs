//! Analysis algorithms for reclaim.
//!
//! This crate turns directory walks into reports:
//!
//! - **Duplicate detection** - Find duplicate files using BLAKE3 hashing
//! - **Usage analysis** - Directory sizes, large files, file types
//! - **Temp analysis** - How much of a temp or cache directory is stale
//!
//! # Duplicate Detection
//!
//! Uses a two-phase algorithm:
//!
//! 1. Group files by size (no reads)
//! 2. Compute a full BLAKE3 hash for every size collision
//!
//! ```rust,no_run
//! use reclaim_analyze::{DuplicateConfig, DuplicateFinder};
//! use reclaim_core::ScanConfig;
//!
//! let finder = DuplicateFinder::with_config(DuplicateConfig::default());
//! let report = finder.find(&ScanConfig::new("/path/to/scan")).unwrap();
//!
//! println!("Found {} duplicate groups", report.group_count);
//! println!("Wasted space: {} bytes", report.total_wasted_space);
//! ```
//!
//! # Temp Analysis
//!
//! ```rust,no_run
//! use std::time::SystemTime;
//! use reclaim_analyze::analyze_temp_dir;
//!
//! let report = analyze_temp_dir("/tmp".as_ref(), 7, SystemTime::now());
//! println!("{} of {} files are older than a week", report.old_files_count, report.total_count);
//! ```

mod duplicates;
pub mod temp;
pub mod usage;

pub use duplicates::{
    DEFAULT_MIN_SIZE, DuplicateConfig, DuplicateConfigBuilder, DuplicateFinder, DuplicateGroup,
    DuplicateReport, detect_duplicates,
};
pub use temp::{
    TempReport, analyze_directories, analyze_location, analyze_temp_dir, cleanable_age_days,
    format_age,
};
pub use usage::{
    DirectorySize, FileTypeStats, LARGE_FILE_THRESHOLD, directory_tree_sizes, file_type_summary,
    find_large_files, size_distribution,
};

// Re-export core types
pub use reclaim_core::{ContentHash, FileRecord};
