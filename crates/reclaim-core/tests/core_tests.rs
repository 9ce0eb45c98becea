use reclaim_core::{
    ContentHash, FileRecord, InodeInfo, ParseSizeError, ProbeError, ScanConfig, ScanError,
    ScanWarning, SizeDistribution, WarningKind, format_size, parse_size,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[test]
fn test_content_hash_creation_and_hex() {
    let bytes = [0xab; 32];
    let hash = ContentHash::new(bytes);

    let hex = hash.to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(hex.starts_with("ab"));

    assert_eq!(hash, ContentHash::new(bytes));
    assert_ne!(hash, ContentHash::new([0xcd; 32]));

    // Ordering is byte-wise so groups can be sorted deterministically
    assert!(ContentHash::new([0x01; 32]) < ContentHash::new([0x02; 32]));
}

#[test]
fn test_inode_info() {
    let inode1 = InodeInfo::new(12345, 67890);
    assert_eq!(inode1.inode, 12345);
    assert_eq!(inode1.device, 67890);
    assert_eq!(inode1, InodeInfo::new(12345, 67890));
    assert_ne!(inode1, InodeInfo::new(12345, 1));
}

#[test]
fn test_file_record_is_a_snapshot() {
    let earlier = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
    let a = FileRecord::new("/data/a.bin", 4096, earlier);
    let b = a.clone();

    assert_eq!(a, b);
    assert_eq!(a.path, PathBuf::from("/data/a.bin"));
    assert_eq!(a.modified, earlier);
}

#[test]
fn test_scan_config_builder() {
    let config = ScanConfig::builder()
        .root("/test/path")
        .max_depth(Some(5usize))
        .include_hidden(false)
        .ignore_patterns(vec!["*.tmp".to_string(), ".DS_Store".to_string()])
        .build()
        .unwrap();

    assert_eq!(config.root.to_str().unwrap(), "/test/path");
    assert_eq!(config.max_depth, Some(5));
    assert!(!config.include_hidden);
    assert_eq!(config.ignore_patterns.len(), 2);

    let default_config = ScanConfig::new("/default");
    assert_eq!(default_config.root.to_str().unwrap(), "/default");
    assert_eq!(default_config.max_depth, None);
    assert!(default_config.include_hidden);
    assert!(default_config.ignore_patterns.is_empty());
}

#[test]
fn test_scan_error_messages() {
    let err = ScanError::io(
        "/missing",
        std::io::Error::new(std::io::ErrorKind::NotFound, "nope"),
    );
    assert_eq!(err.to_string(), "Path not found: /missing");

    let err = ScanError::NotADirectory {
        path: PathBuf::from("/etc/hosts"),
    };
    assert!(err.to_string().contains("Not a directory"));
}

#[test]
fn test_probe_errors_map_to_warnings() {
    let cases = [
        (
            ProbeError::NotFound { path: "/a".into() },
            WarningKind::Vanished,
        ),
        (
            ProbeError::PermissionDenied { path: "/b".into() },
            WarningKind::PermissionDenied,
        ),
        (
            ProbeError::io("/c", std::io::Error::other("disk on fire")),
            WarningKind::ReadError,
        ),
    ];

    for (err, kind) in &cases {
        let warning = ScanWarning::from(err);
        assert_eq!(warning.kind, *kind);
        assert_eq!(warning.path, err.path());
    }
    assert_eq!(cases[0].0.path(), Path::new("/a"));
}

#[test]
fn test_size_scenarios() {
    assert_eq!(format_size(0), "0 B");
    assert_eq!(format_size(1536), "1.50 KB");
    assert_eq!(parse_size("1 MB"), Ok(1_048_576));
    assert_eq!(parse_size("1kb"), Ok(1024));
    assert_eq!(parse_size("nonsense"), Err(ParseSizeError::InvalidFormat("nonsense".into())));
}

#[test]
fn test_size_roundtrip_representative_values() {
    for bytes in [512u64, 2048, 123_456, 987_654_321, 42 * 1024 * 1024 * 1024] {
        let text = format_size(bytes);
        let back = parse_size(&text).unwrap();
        let relative = back.abs_diff(bytes) as f64 / bytes as f64;
        assert!(relative < 0.005, "{bytes} -> {text} -> {back}");
    }
}

#[test]
fn test_size_distribution_ranges_are_ordered() {
    let dist = SizeDistribution::from_sizes([1, 1, 1024 * 1024 * 2]);
    let ranges = dist.ranges();
    assert_eq!(ranges[0], ("< 1 KB", 2));
    assert_eq!(ranges[2], ("1 MB - 10 MB", 1));
    assert_eq!(dist.total(), 3);
}
