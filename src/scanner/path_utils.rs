//! Path cleaning and normalization helpers.
//!
//! Input paths arrive in many spellings (`./a//b`, `a/x/../b`, NFD vs NFC
//! Unicode on macOS). These helpers produce a stable key so the same file is
//! only considered once.
//!
//! # Example
//!
//! ```
//! use dupfinder::scanner::path_utils::{clean_path, normalize_path_str};
//! use std::path::{Path, PathBuf};
//!
//! assert_eq!(clean_path(Path::new("./a//b/../c")), PathBuf::from("a/c"));
//! assert_eq!(normalize_path_str("cafe\u{0301}.txt"), "café.txt");
//! ```

use std::path::{Component, Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC (Composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Normalize a path to NFC form.
///
/// Paths that are not valid UTF-8 are returned unchanged.
#[must_use]
pub fn normalize_pathbuf(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(normalize_path_str(s)),
        None => path.to_path_buf(),
    }
}

/// Lexically clean a path without touching the filesystem.
///
/// Removes `.` components and redundant separators, and resolves `..` against
/// preceding normal components. Leading `..` of a relative path are kept.
/// An empty result becomes `.`.
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Key used to detect repeated mentions of the same file.
///
/// Prefers the canonical path (resolving symlinks) and falls back to the
/// cleaned path when canonicalization fails. On macOS, where the file system
/// treats NFD and NFC spellings as one name, the key is NFC-normalized.
/// Elsewhere they are distinct files and the key is left as is.
#[must_use]
pub fn dedup_key(path: &Path) -> PathBuf {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| clean_path(path));
    if cfg!(target_os = "macos") {
        normalize_pathbuf(&resolved)
    } else {
        resolved
    }
}
