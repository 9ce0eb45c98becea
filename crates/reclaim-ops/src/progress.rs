//! Progress reporting for long-running operations.

use std::path::Path;

/// Receives liveness updates from operations.
///
/// Reporters only observe; they have no effect on control flow or results.
pub trait ProgressReporter {
    /// Called once per processed item, after success or failure.
    fn report_progress(&mut self, path: &Path);

    /// Called when an item fails.
    fn report_error(&mut self, path: &Path, message: &str) {
        let _ = (path, message);
    }
}

/// Reporter that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report_progress(&mut self, _path: &Path) {}
}

impl<F> ProgressReporter for F
where
    F: FnMut(&Path),
{
    fn report_progress(&mut self, path: &Path) {
        self(path)
    }
}
