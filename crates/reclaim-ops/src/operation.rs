//! Operation kinds and the per-item error type.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// How duplicate members are disposed of once a survivor is chosen.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ConsolidationStrategy {
    /// Move members to the trash, or delete them permanently.
    #[default]
    Delete,
    /// Replace members with hard links to the survivor.
    Hardlink,
    /// Replace members with symbolic links to the survivor.
    Symlink,
}

impl ConsolidationStrategy {
    /// Short description for menus.
    pub fn description(self) -> &'static str {
        match self {
            Self::Delete => "Delete duplicates (move to trash)",
            Self::Hardlink => "Replace duplicates with hard links",
            Self::Symlink => "Replace duplicates with symbolic links",
        }
    }
}

/// What happened to one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberAction {
    /// Moved to the trash.
    Trashed,
    /// Removed permanently.
    Deleted,
    /// Replaced with a hard link.
    Hardlinked,
    /// Replaced with a symbolic link.
    Symlinked,
    /// Nothing to do; already linked to the survivor.
    Unchanged,
    /// The operation did not complete.
    Failed,
}

/// An error that occurred while operating on one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// The path that caused the error.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wrap an I/O error with a short description of what was attempted.
    pub fn io(path: &Path, action: &str, error: &std::io::Error) -> Self {
        Self::new(path, format!("{action}: {error}"))
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for OperationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            ConsolidationStrategy::from_str("hardlink").unwrap(),
            ConsolidationStrategy::Hardlink
        );
        assert_eq!(
            ConsolidationStrategy::from_str("Symlink").unwrap(),
            ConsolidationStrategy::Symlink
        );
        assert!(ConsolidationStrategy::from_str("copy").is_err());
        assert_eq!(ConsolidationStrategy::default().to_string(), "delete");
    }

    #[test]
    fn test_operation_error_display() {
        let err = OperationError::io(
            Path::new("/data/a"),
            "remove",
            &std::io::Error::other("busy"),
        );
        assert_eq!(err.to_string(), "/data/a: remove: busy");
    }
}
