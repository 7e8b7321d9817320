//! Progress reporting utilities using indicatif.
//!
//! [`ProgressCallback`] is the observer the duplicate finder reports to. Every
//! method has a no-op default, so an implementation only overrides what it
//! cares about. [`Progress`] is the terminal implementation used by the CLI.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Observer for the duplicate detection run.
///
/// All notifications are advisory. They are invoked synchronously from the
/// finder (or, for [`on_bytes_read`](Self::on_bytes_read), from the comparison
/// loop) and must not block for long.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "walking", "compare")
    /// * `total` - Expected number of steps, 0 if unknown
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    /// Called after each step of the current phase.
    ///
    /// # Arguments
    ///
    /// * `current` - Steps done so far (1-based)
    /// * `path` - Path involved in the step
    fn on_progress(&self, _current: usize, _path: &str) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, _phase: &str) {}

    /// Called when `added` was found identical to the files of `group`.
    ///
    /// `group` is the pool as it stands after the addition.
    fn on_duplicate(&self, _group: &[PathBuf], _added: &Path) {}

    /// Called as content bytes are consumed by a comparison.
    ///
    /// `bytes` is the increment since the previous call, counting both files.
    fn on_bytes_read(&self, _bytes: u64) {}

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
///
/// Shows a spinner while walking and a bar while comparing, with the running
/// byte count in the message.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    bytes_read: AtomicU64,
    duplicates: AtomicU64,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupfinder::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// assert_eq!(progress.bytes_read(), 0);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            bytes_read: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            quiet,
        }
    }

    /// Total bytes reported so far.
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// Number of duplicate notifications received so far.
    #[must_use]
    pub fn duplicates(&self) -> u64 {
        self.duplicates.load(Ordering::Relaxed)
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn compare_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} comparisons {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn status(&self) -> String {
        format!(
            "{} read, {} duplicates",
            ByteSize::b(self.bytes_read()),
            self.duplicates()
        )
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(ref pb) = *guard {
                f(pb);
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = match phase {
            "walking" => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::walking_style());
                pb.set_message("Collecting files");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            _ => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(Self::compare_style());
                pb.set_message(self.status());
                pb
            }
        };
        pb.set_draw_target(ProgressDrawTarget::stderr());

        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.replace(pb) {
                old.finish_and_clear();
            }
        }
    }

    fn on_progress(&self, current: usize, _path: &str) {
        if self.quiet {
            return;
        }
        self.with_bar(|pb| {
            pb.set_position(current as u64);
        });
    }

    fn on_phase_end(&self, _phase: &str) {
        if self.quiet {
            return;
        }
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn on_duplicate(&self, group: &[PathBuf], added: &Path) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "Duplicate: {} matches {} other file(s)",
            added.display(),
            group.len().saturating_sub(1)
        );
        if !self.quiet {
            let msg = self.status();
            self.with_bar(|pb| pb.set_message(msg));
        }
    }

    fn on_bytes_read(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }
        let message = message.to_string();
        self.with_bar(|pb| pb.set_message(message));
    }
}
