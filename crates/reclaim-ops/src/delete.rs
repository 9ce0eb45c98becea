//! Removal that prefers the OS trash.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::operation::{MemberAction, OperationError};

/// How a path was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Removal {
    /// Moved to the OS trash and still recoverable.
    Trashed,
    /// Removed permanently.
    Deleted,
}

impl From<Removal> for MemberAction {
    fn from(removal: Removal) -> Self {
        match removal {
            Removal::Trashed => MemberAction::Trashed,
            Removal::Deleted => MemberAction::Deleted,
        }
    }
}

/// Removes files and directories, trying the trash first.
///
/// Any trash failure falls back to permanent deletion; only failure of both
/// is an error.
#[derive(Debug, Clone, Copy)]
pub struct SafeDeleter {
    /// Whether to try the trash before deleting.
    pub use_trash: bool,
}

impl Default for SafeDeleter {
    fn default() -> Self {
        Self::with_trash()
    }
}

impl SafeDeleter {
    /// A deleter that tries the trash first.
    pub fn with_trash() -> Self {
        Self { use_trash: true }
    }

    /// A deleter that always deletes permanently.
    pub fn permanent() -> Self {
        Self { use_trash: false }
    }

    /// Remove one path. Symlinks are removed themselves, never their target.
    pub fn remove(&self, path: &Path) -> Result<Removal, OperationError> {
        if self.use_trash {
            match trash::delete(path) {
                Ok(()) => {
                    debug!(path = %path.display(), "Moved to trash");
                    return Ok(Removal::Trashed);
                }
                Err(e) => {
                    warn!(path = %path.display(), "Trash failed, deleting permanently: {e}");
                }
            }
        }

        let metadata = fs::symlink_metadata(path)
            .map_err(|e| OperationError::io(path, "cannot stat", &e))?;
        let result = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        result
            .map(|()| Removal::Deleted)
            .map_err(|e| OperationError::io(path, "cannot delete", &e))
    }
}
