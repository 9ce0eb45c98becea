//! Operations that reclaim disk space.
//!
//! This crate modifies the filesystem:
//!
//! - **Consolidation** - keep one survivor per duplicate group and delete or
//!   link the rest ([`Consolidator`])
//! - **Safe deletion** - trash first, permanent delete as fallback
//!   ([`SafeDeleter`])
//! - **Cleaning** - temp directories, caches and large files ([`clean`])
//!
//! Every operation processes items independently and reports per-item
//! outcomes instead of stopping at the first failure.
//!
//! ```rust,no_run
//! use reclaim_analyze::DuplicateFinder;
//! use reclaim_core::ScanConfig;
//! use reclaim_ops::{ConsolidateOptions, ConsolidationStrategy, Consolidator, NoProgress};
//!
//! let report = DuplicateFinder::new().find(&ScanConfig::new("/data")).unwrap();
//! let options = ConsolidateOptions::builder()
//!     .strategy(ConsolidationStrategy::Hardlink)
//!     .build()
//!     .unwrap();
//! let result = Consolidator::new(options).consolidate_all(&report.groups, &mut NoProgress);
//! println!("{}", result.summary());
//! ```

pub mod clean;
mod consolidate;
mod delete;
mod operation;
mod progress;
mod result;

pub use clean::{
    clean_directories, clean_directory, clean_large_files, clean_locations, clean_old_files,
    clean_paths,
};
pub use consolidate::{ConsolidateOptions, ConsolidateOptionsBuilder, Consolidator, select_survivor};
pub use delete::{Removal, SafeDeleter};
pub use operation::{ConsolidationStrategy, MemberAction, OperationError};
pub use progress::{NoProgress, ProgressReporter};
pub use result::{CleanResult, CleanSummary, ConsolidationResult, MemberOutcome};
