//! Candidate path collection.
//!
//! This module provides the collaborators that feed the duplicate engine:
//! - [`walker`]: directory traversal with size and regex filters
//! - [`path_reader`]: paths from arguments or line / NUL-delimited input
//! - [`path_utils`]: lexical cleaning and Unicode normalization of paths
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     min_size: 1024,
//!     skip_hidden: true,
//!     ..Default::default()
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod path_reader;
pub mod path_utils;
pub mod walker;

use std::path::PathBuf;

use regex::Regex;

pub use walker::Walker;

/// A regular file discovered by the [`Walker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes at discovery time
    pub size: u64,
}

impl FileEntry {
    /// Create a new FileEntry.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Minimum file size to include (in bytes).
    /// The default of 1 skips empty files.
    pub min_size: u64,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,

    /// If non-empty, a file's path must match at least one of these.
    pub include: Vec<Regex>,

    /// A file whose path matches any of these is skipped.
    pub exclude: Vec<Regex>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            skip_hidden: false,
            min_size: 1,
            max_size: None,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl WalkerConfig {
    /// Compile include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn with_patterns(
        mut self,
        include: &[String],
        exclude: &[String],
    ) -> Result<Self, regex::Error> {
        self.include = include
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<_, _>>()?;
        self.exclude = exclude
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_new() {
        let entry = FileEntry::new(PathBuf::from("/test/file.txt"), 1024);
        assert_eq!(entry.path, PathBuf::from("/test/file.txt"));
        assert_eq!(entry.size, 1024);
    }

    #[test]
    fn test_walker_config_default() {
        let config = WalkerConfig::default();

        assert!(!config.follow_symlinks);
        assert!(!config.skip_hidden);
        assert_eq!(config.min_size, 1);
        assert!(config.max_size.is_none());
        assert!(config.include.is_empty());
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_walker_config_patterns() {
        let config = WalkerConfig::default()
            .with_patterns(&[r"\.txt$".to_string()], &["tmp".to_string()])
            .unwrap();
        assert_eq!(config.include.len(), 1);
        assert_eq!(config.exclude.len(), 1);

        assert!(WalkerConfig::default()
            .with_patterns(&["(".to_string()], &[])
            .is_err());
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::PermissionDenied(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "Permission denied: /test");

        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Path not found: /missing");
    }

    #[test]
    fn test_scan_error_from_io() {
        let err = ScanError::from_io(
            PathBuf::from("/x"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ScanError::NotFound(_)));

        let err = ScanError::from_io(
            PathBuf::from("/x"),
            std::io::Error::new(std::io::ErrorKind::Other, "odd"),
        );
        assert!(matches!(err, ScanError::Io { .. }));
    }
}
