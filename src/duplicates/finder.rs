//! Duplicate finder: a merge sort whose comparison is the file comparison.
//!
//! # Overview
//!
//! Sorting the candidate paths with [`FileComparator`] as the ordering leaves
//! identical files next to each other, and every `Equal` outcome seen along
//! the way is recorded in a [`PoolTracker`]. Because size-then-content is a
//! strict weak ordering whose equivalence is byte identity, each class of
//! identical files gets at least one cross-half comparison whenever it spans
//! both halves of a merge, so the pools come out complete and transitive.
//!
//! A file that cannot be stat'd, opened or read is recorded as a [`Failure`],
//! dropped from the merge, and never compared again.
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_chunk_size(4096));
//! let paths = vec![PathBuf::from("a.bin"), PathBuf::from("b.bin")];
//! let (result, summary) = finder.find_duplicates(paths).unwrap();
//!
//! println!("{} groups, {} failures", result.groups.len(), result.failures.len());
//! println!("Reclaimable: {}", summary.reclaimable_display());
//! ```

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::chunks::DEFAULT_CHUNK_SIZE;
use super::compare::{CompareError, Comparison, FileComparator};
use super::groups::{assemble, Failure, FindResult};
use super::tracker::PoolTracker;
use crate::progress::ProgressCallback;
use crate::scanner::{ScanError, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Bytes read from each file per comparison step.
    pub chunk_size: usize,
    /// Walker configuration for [`DuplicateFinder::find_duplicates_in_paths`].
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("chunk_size", &self.chunk_size)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the comparison chunk size (minimum 1).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Number of distinct paths handed to the engine
    pub input_files: usize,
    /// Number of pairwise file comparisons made
    pub comparisons: u64,
    /// Content bytes read while comparing (both sides)
    pub bytes_compared: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one original per group)
    pub duplicate_files: usize,
    /// Number of files that failed
    pub failures: usize,
    /// Walker errors skipped while collecting files
    pub scan_errors: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the whole search
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format bytes compared as human-readable string.
    #[must_use]
    pub fn bytes_compared_display(&self) -> String {
        ByteSize::b(self.bytes_compared).to_string()
    }

    fn record(&mut self, result: &FindResult) {
        self.duplicate_groups = result.groups.len();
        self.duplicate_files = result.groups.iter().map(|g| g.duplicate_count()).sum();
        self.reclaimable_space = result.groups.iter().map(|g| g.wasted_space()).sum();
        self.failures = result.failures.len();
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The search was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// A root given to [`DuplicateFinder::find_duplicates_in_paths`] is unusable.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Upper bound on comparisons for `n` inputs: `n * ceil(log2 n)`.
fn comparison_bound(n: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let log = (usize::BITS - (n - 1).leading_zeros()) as usize;
    n.saturating_mul(log)
}

/// Mutable state of one merge sort run.
struct SortRun<'a> {
    comparator: &'a FileComparator,
    config: &'a FinderConfig,
    tracker: PoolTracker,
    failures: Vec<Failure>,
    failed: HashSet<PathBuf>,
    // Paths that took part in at least one successful comparison.
    compared: HashSet<PathBuf>,
    steps: usize,
}

impl<'a> SortRun<'a> {
    fn new(comparator: &'a FileComparator, config: &'a FinderConfig) -> Self {
        Self {
            comparator,
            config,
            tracker: PoolTracker::new(),
            failures: Vec::new(),
            failed: HashSet::new(),
            compared: HashSet::new(),
            steps: 0,
        }
    }

    fn sort(&mut self, mut paths: Vec<PathBuf>) -> Result<Vec<PathBuf>, FinderError> {
        if paths.len() <= 1 {
            return Ok(paths);
        }
        let right = paths.split_off(paths.len() / 2);
        let left = self.sort(paths)?;
        let right = self.sort(right)?;
        self.merge(left, right)
    }

    fn merge(&mut self, left: Vec<PathBuf>, right: Vec<PathBuf>) -> Result<Vec<PathBuf>, FinderError> {
        let mut merged = Vec::with_capacity(left.len() + right.len());
        let mut left = left.into_iter().peekable();
        let mut right = right.into_iter().peekable();

        while let (Some(a), Some(b)) = (left.peek(), right.peek()) {
            if self.failed.contains(a) {
                left.next();
                continue;
            }
            if self.failed.contains(b) {
                right.next();
                continue;
            }
            if self.config.is_shutdown_requested() {
                log::debug!("Finder: Shutdown requested, stopping merge");
                return Err(FinderError::Interrupted);
            }

            let outcome = self.comparator.compare(a, b);
            self.step(a);
            log::trace!("{} vs {}: {:?}", a.display(), b.display(), outcome);
            if let Comparison::Ordered(_) = outcome {
                self.compared.insert(a.clone());
                self.compared.insert(b.clone());
            }

            match outcome {
                Comparison::Ordered(CmpOrdering::Less) => merged.extend(left.next()),
                Comparison::Ordered(CmpOrdering::Greater) => merged.extend(right.next()),
                Comparison::Ordered(CmpOrdering::Equal) => {
                    self.declare_equal(a, b);
                    merged.extend(left.next());
                }
                Comparison::FailedFirst(error) => {
                    self.fail(error);
                    left.next();
                }
                Comparison::FailedSecond(error) => {
                    self.fail(error);
                    right.next();
                }
            }
        }

        merged.extend(left.chain(right).filter(|p| !self.failed.contains(p)));
        Ok(merged)
    }

    /// Stat every surviving path that never got a successful comparison.
    ///
    /// Such a path only met partners that failed, so nothing has shown it
    /// is readable. One that cannot be stat'd is reported like any other
    /// failure instead of vanishing from the result.
    fn check_uncompared(&mut self, survivors: &[PathBuf]) {
        for path in survivors {
            if self.compared.contains(path) {
                continue;
            }
            if let Err(source) = std::fs::metadata(path) {
                self.fail(CompareError::Stat {
                    path: path.clone(),
                    source,
                });
            }
        }
    }

    fn step(&mut self, path: &Path) {
        self.steps += 1;
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_progress(self.steps, &path.to_string_lossy());
        }
    }

    fn declare_equal(&mut self, a: &Path, b: &Path) {
        if !self.tracker.declare_equal(a, b).changed() {
            return;
        }
        if let Some(ref callback) = self.config.progress_callback {
            if let Some(pool) = self.tracker.pool_of(a) {
                callback.on_duplicate(pool, b);
            }
        }
    }

    fn fail(&mut self, error: CompareError) {
        log::warn!("{}", error);
        self.failed.insert(error.path().to_path_buf());
        self.failures.push(Failure::new(error));
    }
}

/// Duplicate finder running the merge sort over candidate paths.
///
/// # Example
///
/// ```no_run
/// use dupfinder::duplicates::DuplicateFinder;
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates_in_paths(&[PathBuf::from(".")]) {
///     Ok((result, summary)) => {
///         println!("Found {} duplicate groups", result.groups.len());
///         println!("Can reclaim {} bytes", summary.reclaimable_space);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    comparator: FileComparator,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut comparator = FileComparator::new(config.chunk_size);
        if let Some(ref callback) = config.progress_callback {
            comparator = comparator.with_progress_callback(callback.clone());
        }
        Self { config, comparator }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find groups of identical files among `paths`.
    ///
    /// Repeated paths are considered once. I/O problems never abort the run:
    /// the affected file is reported in [`FindResult::failures`] and left out
    /// of every group.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if the shutdown flag is raised.
    pub fn find_duplicates(
        &self,
        paths: Vec<PathBuf>,
    ) -> Result<(FindResult, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        let mut seen = HashSet::new();
        let paths: Vec<PathBuf> = paths
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();
        summary.input_files = paths.len();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Comparing {} files", paths.len());
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("compare", comparison_bound(paths.len()));
        }

        let comparisons_before = self.comparator.comparisons();
        let bytes_before = self.comparator.bytes_read();

        let mut run = SortRun::new(&self.comparator, &self.config);
        let sorted = run.sort(paths);

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("compare");
        }
        let sorted = sorted?;
        run.check_uncompared(&sorted);

        let SortRun {
            mut tracker,
            failures,
            ..
        } = run;
        let result = assemble(tracker.finalize_pools(), failures, |p| {
            std::fs::metadata(p).ok().map(|m| m.len())
        });

        summary.comparisons = self.comparator.comparisons() - comparisons_before;
        summary.bytes_compared = self.comparator.bytes_read() - bytes_before;
        summary.record(&result);
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Found {} duplicate groups ({} failures) in {} comparisons",
            summary.duplicate_groups,
            summary.failures,
            summary.comparisons
        );

        Ok((result, summary))
    }

    /// Walk each root and find duplicates among the files found.
    ///
    /// A root that is a regular file is used as is. Errors inside a tree are
    /// logged and counted in [`ScanSummary::scan_errors`].
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Scan`] if a root cannot be stat'd and
    /// [`FinderError::Interrupted`] on shutdown.
    pub fn find_duplicates_in_paths(
        &self,
        roots: &[PathBuf],
    ) -> Result<(FindResult, ScanSummary), FinderError> {
        let start_time = Instant::now();

        for root in roots {
            if let Err(e) = std::fs::metadata(root) {
                return Err(ScanError::from_io(root.clone(), e).into());
            }
        }

        log::info!("Collecting files from {} path(s)", roots.len());
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let mut files = Vec::new();
        let mut scan_errors = 0;
        for root in roots {
            let mut walker = Walker::new(root, self.config.walker_config.clone());
            if let Some(ref flag) = self.config.shutdown_flag {
                walker = walker.with_shutdown_flag(flag.clone());
            }
            for entry in walker.walk() {
                match entry {
                    Ok(file) => {
                        if let Some(ref callback) = self.config.progress_callback {
                            callback.on_progress(files.len() + 1, &file.path.to_string_lossy());
                        }
                        files.push(file.path);
                    }
                    Err(_) => scan_errors += 1,
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Found {} candidate files", files.len());

        let (result, mut summary) = self.find_duplicates(files)?;
        summary.scan_errors = scan_errors;
        summary.scan_duration = start_time.elapsed();
        Ok((result, summary))
    }
}

/// Find groups of identical files among `paths` with default settings.
///
/// # Example
///
/// ```no_run
/// use dupfinder::duplicates::find_duplicates;
/// use std::path::PathBuf;
///
/// let result = find_duplicates(vec![PathBuf::from("a"), PathBuf::from("b")]);
/// for group in &result.groups {
///     println!("{:?}", group.files);
/// }
/// ```
#[must_use]
pub fn find_duplicates(paths: Vec<PathBuf>) -> FindResult {
    DuplicateFinder::with_defaults()
        .find_duplicates(paths)
        .map(|(result, _)| result)
        .unwrap_or_default()
}
