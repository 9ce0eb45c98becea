//! Spinner progress for long-running work.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reclaim_ops::ProgressReporter;

/// Indeterminate spinner that shows the item being processed.
pub struct SpinnerReporter {
    bar: ProgressBar,
}

impl SpinnerReporter {
    /// Start a spinner on stderr.
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {prefix:.bold} {msg} [{pos} items, {elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// A spinner that draws nothing, for machine-readable output.
    pub fn hidden() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden());
        Self { bar }
    }

    /// Change the label in front of the current item.
    pub fn set_stage(&self, message: &str) {
        self.bar.set_prefix(message.to_string());
    }

    /// Remove the spinner from the terminal.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for SpinnerReporter {
    fn report_progress(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.bar.set_message(name);
        self.bar.inc(1);
    }
}
