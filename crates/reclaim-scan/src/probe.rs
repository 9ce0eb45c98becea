//! Per-file queries: size, content hash and age.
//!
//! Every query uses `symlink_metadata`, so a symbolic link is reported as
//! [`ProbeError::NotAFile`] instead of being followed.

use std::fs::{self, File, Metadata};
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use blake3::Hasher;

use reclaim_core::{ContentHash, FileRecord, InodeInfo, ProbeError};

/// Block size used when streaming file contents into the hasher.
pub const HASH_BLOCK_SIZE: usize = 64 * 1024;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Take a snapshot of a regular file.
pub fn probe_file(path: &Path) -> Result<FileRecord, ProbeError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| ProbeError::io(path, e))?;
    record_from_metadata(path, &metadata)
}

/// Build a record from metadata that was already fetched.
pub fn record_from_metadata(path: &Path, metadata: &Metadata) -> Result<FileRecord, ProbeError> {
    if !metadata.file_type().is_file() {
        return Err(ProbeError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(FileRecord::new(
        path,
        metadata.len(),
        metadata.modified().unwrap_or(UNIX_EPOCH),
    ))
}

/// Compute the BLAKE3 hash of a file, streaming it in fixed-size blocks.
pub fn hash_file(path: &Path) -> Result<ContentHash, ProbeError> {
    let mut file = File::open(path).map_err(|e| ProbeError::io(path, e))?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; HASH_BLOCK_SIZE];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ProbeError::io(path, e)),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(ContentHash::new(*hasher.finalize().as_bytes()))
}

/// Something that can produce a content hash for a file.
///
/// Implemented by [`Blake3Hasher`] and by any matching closure, so the
/// duplicate detector can be driven by a substitute hash function.
pub trait ContentHasher {
    /// Hash the contents of the file at `path`.
    fn hash(&self, path: &Path) -> Result<ContentHash, ProbeError>;
}

/// Default hasher: streaming BLAKE3.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl ContentHasher for Blake3Hasher {
    fn hash(&self, path: &Path) -> Result<ContentHash, ProbeError> {
        hash_file(path)
    }
}

impl<F> ContentHasher for F
where
    F: Fn(&Path) -> Result<ContentHash, ProbeError>,
{
    fn hash(&self, path: &Path) -> Result<ContentHash, ProbeError> {
        self(path)
    }
}

/// Age of a file relative to `now`. Future timestamps count as zero.
pub fn file_age(modified: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or(Duration::ZERO)
}

/// Check whether a file is strictly older than `days` days.
///
/// A threshold of zero days never matches.
pub fn is_older_than(modified: SystemTime, days: u32, now: SystemTime) -> bool {
    if days == 0 {
        return false;
    }
    file_age(modified, now) > Duration::from_secs(u64::from(days) * SECONDS_PER_DAY)
}

/// Inode identity of a file, if the platform has one.
#[cfg(unix)]
pub fn inode_info(metadata: &Metadata) -> Option<InodeInfo> {
    Some(InodeInfo::new(metadata.ino(), metadata.dev()))
}

#[cfg(not(unix))]
pub fn inode_info(_metadata: &Metadata) -> Option<InodeInfo> {
    None
}

/// Number of hard links to a file.
#[cfg(unix)]
pub fn link_count(metadata: &Metadata) -> u64 {
    metadata.nlink()
}

#[cfg(not(unix))]
pub fn link_count(_metadata: &Metadata) -> u64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hash_file_matches_content() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("a"), "duplicate content here").unwrap();
        fs::write(root.join("b"), "duplicate content here").unwrap();
        fs::write(root.join("c"), "unique content").unwrap();

        let a = hash_file(&root.join("a")).unwrap();
        let b = hash_file(&root.join("b")).unwrap();
        let c = hash_file(&root.join("c")).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, ContentHash::new(*blake3::hash(b"duplicate content here").as_bytes()));
    }

    #[test]
    fn test_hash_file_spanning_several_blocks() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("big");
        let data: Vec<u8> = (0..HASH_BLOCK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        let streamed = hash_file(&path).unwrap();
        assert_eq!(streamed, ContentHash::new(*blake3::hash(&data).as_bytes()));
    }

    #[test]
    fn test_hash_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = hash_file(&temp.path().join("nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_probe_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.bin");
        fs::write(&path, vec![7u8; 1500]).unwrap();

        let record = probe_file(&path).unwrap();
        assert_eq!(record.size, 1500);
        assert_eq!(record.path, path);
    }

    #[test]
    fn test_probe_directory_is_not_a_file() {
        let temp = TempDir::new().unwrap();
        let err = probe_file(temp.path()).unwrap_err();
        assert!(matches!(err, ProbeError::NotAFile { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_does_not_follow_symlinks() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target");
        let link = temp.path().join("link");
        fs::write(&target, "payload").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(matches!(probe_file(&link), Err(ProbeError::NotAFile { .. })));
    }

    #[test]
    fn test_is_older_than() {
        let now = SystemTime::now();
        let ten_days_ago = now - Duration::from_secs(10 * SECONDS_PER_DAY);

        assert!(is_older_than(ten_days_ago, 7, now));
        assert!(!is_older_than(ten_days_ago, 30, now));
        assert!(!is_older_than(ten_days_ago, 0, now));
        // Timestamps in the future are never old
        assert!(!is_older_than(now + Duration::from_secs(60), 1, now));
    }

    #[test]
    fn test_closure_hasher() {
        let constant = |_: &Path| Ok::<_, ProbeError>(ContentHash::new([1; 32]));
        assert_eq!(
            constant.hash(Path::new("/anything")).unwrap(),
            ContentHash::new([1; 32])
        );
    }
}
