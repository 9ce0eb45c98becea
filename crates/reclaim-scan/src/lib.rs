//! File system access for reclaim.
//!
//! This crate provides everything that touches the filesystem read-only:
//! per-file probing and hashing, a serial directory walker, partition usage
//! and the well-known temp/cache locations of each platform.
//!
//! # Overview
//!
//! - **Probing** via [`probe_file`] and streaming BLAKE3 [`hash_file`]
//! - **Walking** via [`FileWalk`], which yields regular files in a stable order
//! - **Hardlink detection** via [`InodeTracker`] in [`directory_size`]
//! - **Disks** via [`disk_usage`]
//! - **Locations** via [`LocationKind`]
//!
//! # Example
//!
//! ```rust,no_run
//! use reclaim_scan::{FileWalk, ScanConfig};
//!
//! let config = ScanConfig::new("/path/to/scan");
//! let mut total = 0;
//! for file in FileWalk::new(&config).unwrap().flatten() {
//!     total += file.size;
//! }
//! println!("Total size: {total} bytes");
//! ```

pub mod disks;
mod inode;
pub mod locations;
mod probe;
mod walk;

pub use disks::{DiskUsage, disk_usage, parse_mounts};
pub use inode::InodeTracker;
pub use locations::{LocationKind, Platform};
pub use probe::{
    Blake3Hasher, ContentHasher, HASH_BLOCK_SIZE, file_age, hash_file, inode_info,
    is_older_than, link_count, probe_file, record_from_metadata,
};
pub use walk::{FileWalk, WalkedFile, directory_size};

// Re-export core types for convenience
pub use reclaim_core::{
    ContentHash, FileRecord, InodeInfo, ProbeError, ScanConfig, ScanError, ScanWarning,
    WarningKind,
};
