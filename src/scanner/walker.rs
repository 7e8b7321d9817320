//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! [`Walker`] turns a root path into a stream of candidate files for the
//! duplicate engine. Directory entries are read in parallel by jwalk and
//! sorted by file name so the output order is deterministic.
//!
//! Filters, applied in order:
//! - regular files only (symlinks only when `follow_symlinks` is set)
//! - `min_size` / `max_size`
//! - `include` regexes: at least one must match the full path
//! - `exclude` regexes: none may match the full path
//!
//! A root that is itself a regular file is yielded if it passes the filters.
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for parallel file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set, iteration stops at the next entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if size < self.config.min_size {
            return false;
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Check if a file passes the include / exclude regexes.
    fn passes_regex_filter(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        if !self.config.include.is_empty()
            && !self.config.include.iter().any(|re| re.is_match(&path_str))
        {
            return false;
        }

        !self.config.exclude.iter().any(|re| re.is_match(&path_str))
    }

    /// Walk the tree, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration.
    pub fn walk(&self) -> Box<dyn Iterator<Item = Result<FileEntry, ScanError>> + '_> {
        let root_meta = match std::fs::metadata(&self.root) {
            Ok(m) => m,
            Err(e) => return Box::new(std::iter::once(self.io_error(&self.root, e))),
        };

        if !root_meta.is_dir() {
            let single = self.accept(self.root.clone(), &root_meta);
            return Box::new(single.into_iter());
        }

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(|_depth, _path, _state, children| {
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        Box::new(walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            match entry_result {
                Ok(entry) => {
                    let path = entry.path();
                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }
                    if file_type.is_symlink() && !self.config.follow_symlinks {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    let metadata = match std::fs::metadata(&path) {
                        Ok(m) => m,
                        Err(e) => return Some(self.io_error(&path, e)),
                    };
                    self.accept(path, &metadata)
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    Some(Err(ScanError::Io {
                        path,
                        source: std::io::Error::other(e.to_string()),
                    }))
                }
            }
        }))
    }

    /// Apply file filters to a stat'd path.
    fn accept(&self, path: PathBuf, metadata: &Metadata) -> Option<Result<FileEntry, ScanError>> {
        if !metadata.is_file() {
            return None;
        }

        let size = metadata.len();
        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        if !self.passes_regex_filter(&path) {
            log::trace!("Skipping file due to regex filter: {}", path.display());
            return None;
        }

        Some(Ok(FileEntry::new(path, size)))
    }

    fn io_error(&self, path: &Path, error: std::io::Error) -> Result<FileEntry, ScanError> {
        let err = ScanError::from_io(path.to_path_buf(), error);
        match err {
            ScanError::NotFound(_) => log::debug!("{}", err),
            _ => log::warn!("{}", err),
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    /// Create a test directory with some files.
    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        let mut f = File::create(dir.path().join("file1.txt")).unwrap();
        writeln!(f, "Hello, world!").unwrap();

        let mut f = File::create(dir.path().join("file2.pdf")).unwrap();
        writeln!(f, "Another file").unwrap();

        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        let mut f = File::create(subdir.join("nested.txt")).unwrap();
        writeln!(f, "Nested file content").unwrap();

        dir
    }

    fn names(walker: &Walker, root: &Path) -> Vec<String> {
        walker
            .walk()
            .filter_map(Result::ok)
            .map(|f| {
                f.path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_walker_finds_files_in_order() {
        let dir = create_test_dir();
        let walker = Walker::new(dir.path(), WalkerConfig::default());

        assert_eq!(
            names(&walker, dir.path()),
            vec!["file1.txt", "file2.pdf", "subdir/nested.txt"]
        );
    }

    #[test]
    fn test_walker_min_size_filter() {
        let dir = TempDir::new().unwrap();
        for (name, size) in [("f1", 1), ("f2", 2), ("f3", 3)] {
            fs::write(dir.path().join(name), vec![b'x'; size]).unwrap();
        }

        for (min_size, expected) in [
            (1, vec!["f1", "f2", "f3"]),
            (2, vec!["f2", "f3"]),
            (3, vec!["f3"]),
            (4, vec![]),
        ] {
            let config = WalkerConfig {
                min_size,
                ..Default::default()
            };
            let walker = Walker::new(dir.path(), config);
            assert_eq!(names(&walker, dir.path()), expected, "min_size={min_size}");
        }
    }

    #[test]
    fn test_walker_max_size_filter() {
        let dir = create_test_dir();
        fs::write(dir.path().join("large.txt"), vec![b'x'; 1000]).unwrap();

        let config = WalkerConfig {
            max_size: Some(100),
            ..Default::default()
        };
        let walker = Walker::new(dir.path(), config);
        assert!(!names(&walker, dir.path()).contains(&"large.txt".to_string()));
    }

    #[test]
    fn test_walker_skips_empty_files_by_default() {
        let dir = create_test_dir();
        File::create(dir.path().join("empty.txt")).unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        assert!(!names(&walker, dir.path()).contains(&"empty.txt".to_string()));

        let config = WalkerConfig {
            min_size: 0,
            ..Default::default()
        };
        let walker = Walker::new(dir.path(), config);
        assert!(names(&walker, dir.path()).contains(&"empty.txt".to_string()));
    }

    #[test]
    fn test_walker_include_regex() {
        let dir = create_test_dir();
        let config = WalkerConfig::default()
            .with_patterns(&[r"\.pdf$".to_string()], &[])
            .unwrap();
        let walker = Walker::new(dir.path(), config);
        assert_eq!(names(&walker, dir.path()), vec!["file2.pdf"]);
    }

    #[test]
    fn test_walker_exclude_regex() {
        let dir = create_test_dir();
        let config = WalkerConfig::default()
            .with_patterns(&[], &["subdir".to_string(), r"\.pdf$".to_string()])
            .unwrap();
        let walker = Walker::new(dir.path(), config);
        assert_eq!(names(&walker, dir.path()), vec!["file1.txt"]);
    }

    #[test]
    fn test_walker_skip_hidden_files() {
        let dir = create_test_dir();
        fs::write(dir.path().join(".hidden"), b"Hidden content").unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        assert!(names(&walker, dir.path()).contains(&".hidden".to_string()));

        let config = WalkerConfig {
            skip_hidden: true,
            ..Default::default()
        };
        let walker = Walker::new(dir.path(), config);
        assert!(!names(&walker, dir.path()).contains(&".hidden".to_string()));
    }

    #[test]
    fn test_walker_file_root() {
        let dir = create_test_dir();
        let file = dir.path().join("file1.txt");
        let walker = Walker::new(&file, WalkerConfig::default());

        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, file);
    }

    #[test]
    fn test_walker_missing_root() {
        let dir = TempDir::new().unwrap();
        let walker = Walker::new(&dir.path().join("nope"), WalkerConfig::default());

        let results: Vec<_> = walker.walk().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(ScanError::NotFound(_))));
    }

    #[test]
    fn test_walker_shutdown_flag() {
        let dir = create_test_dir();
        let flag = Arc::new(AtomicBool::new(true));
        let walker = Walker::new(dir.path(), WalkerConfig::default()).with_shutdown_flag(flag);

        assert_eq!(walker.walk().count(), 0);
    }
}
