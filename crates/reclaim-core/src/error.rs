//! Error types for scanning and probing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that prevent a scan from starting.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for the root path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Root path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Errors from querying a single file.
///
/// Callers decide what to do with each kind; the scanners skip all of them.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The file disappeared or never existed.
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    /// The file exists but cannot be read.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// The path is a symlink, directory or special file.
    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// Any other I/O failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Classify an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Path the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::PermissionDenied { path }
            | Self::NotAFile { path }
            | Self::Io { path, .. } => path,
        }
    }

    /// Check whether the file simply vanished.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors from parsing a human-readable size.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSizeError {
    /// Nothing to parse.
    #[error("Size is empty")]
    Empty,

    /// The numeric part could not be read.
    #[error("Invalid size format: {0}")]
    InvalidFormat(String),

    /// The unit suffix is not recognised.
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// File vanished between listing and reading.
    Vanished,
    /// Error reading file/directory.
    ReadError,
    /// Error reading metadata.
    MetadataError,
}

/// Non-fatal warning encountered during scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a permission denied warning.
    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Permission denied: {}", path.display()),
            path,
            kind: WarningKind::PermissionDenied,
        }
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Read error: {error}"),
            path,
            kind: WarningKind::ReadError,
        }
    }
}

impl From<&ProbeError> for ScanWarning {
    fn from(err: &ProbeError) -> Self {
        let kind = match err {
            ProbeError::NotFound { .. } => WarningKind::Vanished,
            ProbeError::PermissionDenied { .. } => WarningKind::PermissionDenied,
            ProbeError::NotAFile { .. } => WarningKind::MetadataError,
            ProbeError::Io { .. } => WarningKind::ReadError,
        };
        Self::new(err.path(), err.to_string(), kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_io() {
        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ScanError::PermissionDenied { .. }));
    }

    #[test]
    fn test_probe_error_classification() {
        let missing = ProbeError::io(
            "/gone",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(missing.is_not_found());
        assert_eq!(missing.path(), Path::new("/gone"));

        let other = ProbeError::io("/bad", std::io::Error::other("boom"));
        assert!(matches!(other, ProbeError::Io { .. }));
    }

    #[test]
    fn test_warning_from_probe_error() {
        let err = ProbeError::PermissionDenied {
            path: PathBuf::from("/secret"),
        };
        let warning = ScanWarning::from(&err);
        assert_eq!(warning.kind, WarningKind::PermissionDenied);
        assert!(warning.message.contains("Permission denied"));
    }
}
