//! Core types for reclaim.
//!
//! This crate provides the fundamental data structures shared by the
//! scanning, analysis and operation crates: file records, content hashes,
//! error types, scan configuration and the size formatter.

mod config;
mod error;
mod record;
pub mod size;

pub use config::{ScanConfig, ScanConfigBuilder};
pub use error::{ParseSizeError, ProbeError, ScanError, ScanWarning, WarningKind};
pub use record::{ContentHash, FileRecord, InodeInfo};
pub use size::{SizeDistribution, format_size, parse_size};
