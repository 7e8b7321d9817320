//! Duplicate groups, failures and result assembly.
//!
//! # Overview
//!
//! The grouping driver produces raw pools from the [`PoolTracker`] plus a list
//! of [`Failure`]s. [`assemble`] turns them into the externally visible
//! [`FindResult`]:
//!
//! - paths inside each group are sorted,
//! - groups are ordered by the size of their first file, then by first path,
//! - failures are ordered by path,
//! - failed paths never appear in a group and groups always have 2+ files.
//!
//! # Example
//!
//! ```
//! use dupfinder::duplicates::assemble;
//! use std::path::PathBuf;
//!
//! let pools = vec![
//!     vec![PathBuf::from("/b2"), PathBuf::from("/b1")],
//!     vec![PathBuf::from("/a1"), PathBuf::from("/a2")],
//! ];
//! let result = assemble(pools, Vec::new(), |p| {
//!     Some(if p.starts_with("/a") { 10 } else { 3 })
//! });
//!
//! assert_eq!(result.groups[0].files, vec![PathBuf::from("/b1"), PathBuf::from("/b2")]);
//! assert_eq!(result.groups[1].size, 10);
//! ```
//!
//! [`PoolTracker`]: super::PoolTracker

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::compare::CompareError;
use super::tracker::Pool;

/// Confirmed group of byte-identical files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// File size in bytes, shared by every file in the group
    pub size: u64,
    /// Sorted paths of the identical files
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(size: u64, files: Vec<PathBuf>) -> Self {
        Self { size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// The lexicographically smallest path of the group.
    #[must_use]
    pub fn first(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }
}

/// A file excluded from duplicate detection because of an I/O error.
#[derive(Debug)]
pub struct Failure {
    /// The path that could not be stat'd, opened or read
    pub path: PathBuf,
    /// What went wrong
    pub error: CompareError,
}

impl Failure {
    /// Build a failure from a comparator error.
    #[must_use]
    pub fn new(error: CompareError) -> Self {
        Self {
            path: error.path().to_path_buf(),
            error,
        }
    }
}

/// The outcome of a duplicate search.
#[derive(Debug, Default)]
pub struct FindResult {
    /// Groups of identical files, ordered by size then first path
    pub groups: Vec<DuplicateGroup>,
    /// Files that failed, ordered by path
    pub failures: Vec<Failure>,
}

impl FindResult {
    /// Whether any duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Group paths only, in output order.
    #[must_use]
    pub fn group_paths(&self) -> Vec<Vec<PathBuf>> {
        self.groups.iter().map(|g| g.files.clone()).collect()
    }

    /// Failed paths only, in output order.
    #[must_use]
    pub fn failed_paths(&self) -> Vec<PathBuf> {
        self.failures.iter().map(|f| f.path.clone()).collect()
    }
}

/// Turn finalized pools and failures into an ordered [`FindResult`].
///
/// `size_of` supplies the size of a group's first file. A file that can no
/// longer be stat'd sorts as size 0.
pub fn assemble<F>(pools: Vec<Pool>, mut failures: Vec<Failure>, size_of: F) -> FindResult
where
    F: Fn(&Path) -> Option<u64>,
{
    let failed: HashSet<&Path> = failures.iter().map(|f| f.path.as_path()).collect();

    let mut groups: Vec<DuplicateGroup> = pools
        .into_iter()
        .filter_map(|mut files| {
            files.retain(|p| !failed.contains(p.as_path()));
            files.sort();
            files.dedup();
            if files.len() < 2 {
                return None;
            }
            let size = size_of(&files[0]).unwrap_or_else(|| {
                log::warn!("Could not determine size of {}", files[0].display());
                0
            });
            Some(DuplicateGroup::new(size, files))
        })
        .collect();

    groups.sort_by(|a, b| a.size.cmp(&b.size).then_with(|| a.files[0].cmp(&b.files[0])));
    failures.sort_by(|a, b| a.path.cmp(&b.path));

    FindResult { groups, failures }
}
