//! Reading candidate paths from arguments and standard input.
//!
//! Paths can be given on the command line or piped in, one per line or
//! NUL-delimited (as produced by `find -print0`). Every source goes through
//! [`filter_paths`]: items that do not exist are dropped, repeated mentions of
//! the same file are dropped, and the rest are lexically cleaned.
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::scanner::path_reader::read_paths_from_null_delimited;
//!
//! let stdin = std::io::stdin();
//! let paths = read_paths_from_null_delimited(stdin.lock()).unwrap();
//! println!("{} paths", paths.len());
//! ```

use std::collections::HashSet;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use super::path_utils::{clean_path, dedup_key};

/// Split `reader` on `delimiter`.
///
/// A trailing delimiter does not produce an empty final item.
fn read_items<R: BufRead>(reader: R, delimiter: u8) -> io::Result<Vec<PathBuf>> {
    let mut items = Vec::new();
    for item in reader.split(delimiter) {
        let mut bytes = item?;
        if delimiter == b'\n' && bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        items.push(path_from_bytes(bytes));
    }
    Ok(items)
}

/// File names on Unix are arbitrary bytes; keep them as given.
#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(std::ffi::OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}

/// Keep existing, not yet seen paths, cleaned, in first-seen order.
///
/// Existence means "stat succeeds", so directories pass and are expanded
/// later by the walker.
pub fn filter_paths<I, S>(items: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<Path>,
{
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for item in items {
        let path = item.as_ref();
        if path.as_os_str().is_empty() {
            continue;
        }
        if std::fs::metadata(path).is_err() {
            log::debug!("Skipping nonexistent path: {}", path.display());
            continue;
        }
        if !seen.insert(dedup_key(path)) {
            log::trace!("Skipping repeated path: {}", path.display());
            continue;
        }
        paths.push(clean_path(path));
    }

    paths
}

/// Read newline-delimited paths and filter them.
///
/// # Errors
///
/// Returns any error from the underlying reader.
pub fn read_paths_from_lines<R: BufRead>(reader: R) -> io::Result<Vec<PathBuf>> {
    Ok(filter_paths(read_items(reader, b'\n')?))
}

/// Read NUL-delimited paths and filter them.
///
/// # Errors
///
/// Returns any error from the underlying reader.
pub fn read_paths_from_null_delimited<R: BufRead>(reader: R) -> io::Result<Vec<PathBuf>> {
    Ok(filter_paths(read_items(reader, 0)?))
}
