//! Pairwise file comparator.
//!
//! # Overview
//!
//! [`FileComparator::compare`] orders two files by size first and, for equal
//! sizes, by their content in lexicographic byte order. Two files compare
//! [`Ordering::Equal`] exactly when they are byte-identical, so the result is
//! a strict weak ordering the grouping driver can sort with.
//!
//! I/O problems never panic. They come back as
//! [`Comparison::FailedFirst`] or [`Comparison::FailedSecond`] so the caller
//! knows which side to blame.
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::duplicates::{Comparison, FileComparator};
//! use std::path::Path;
//!
//! let comparator = FileComparator::default();
//! match comparator.compare(Path::new("a.bin"), Path::new("b.bin")) {
//!     Comparison::Ordered(ord) if ord.is_eq() => println!("identical"),
//!     Comparison::Ordered(_) => println!("different"),
//!     Comparison::FailedFirst(e) | Comparison::FailedSecond(e) => eprintln!("{e}"),
//! }
//! ```

use std::cmp::Ordering;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use super::chunks::{Chunk, ChunkStream, DEFAULT_CHUNK_SIZE};
use crate::progress::ProgressCallback;

/// Errors that can occur while comparing two files.
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// The file metadata could not be read (missing, permission denied).
    #[error("Cannot stat {path}: {source}")]
    Stat {
        /// Path that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The file exists but could not be opened for reading.
    #[error("Cannot open {path}: {source}")]
    Open {
        /// Path that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Reading failed after the file was opened.
    #[error("Read failed for {path}: {source}")]
    Read {
        /// Path that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl CompareError {
    /// Path of the file that caused the error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Stat { path, .. } | Self::Open { path, .. } | Self::Read { path, .. } => path,
        }
    }

    /// The underlying I/O error.
    #[must_use]
    pub fn io_error(&self) -> &io::Error {
        match self {
            Self::Stat { source, .. } | Self::Open { source, .. } | Self::Read { source, .. } => {
                source
            }
        }
    }
}

/// Outcome of comparing two files.
#[derive(Debug)]
pub enum Comparison {
    /// Both files were readable; this is their relative order.
    Ordered(Ordering),
    /// The first file could not be stat'd, opened or read.
    FailedFirst(CompareError),
    /// The second file could not be stat'd, opened or read.
    FailedSecond(CompareError),
}

impl Comparison {
    /// The ordering, if the comparison succeeded.
    #[must_use]
    pub fn ordering(&self) -> Option<Ordering> {
        match self {
            Self::Ordered(ord) => Some(*ord),
            _ => None,
        }
    }

    /// Whether both files were read and found identical.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Ordered(Ordering::Equal))
    }
}

/// Compares files by size, then by streamed content.
pub struct FileComparator {
    chunk_size: usize,
    bytes_read: AtomicU64,
    comparisons: AtomicU64,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FileComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileComparator")
            .field("chunk_size", &self.chunk_size)
            .field("bytes_read", &self.bytes_read)
            .field("comparisons", &self.comparisons)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FileComparator {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl FileComparator {
    /// Create a comparator reading `chunk_size` bytes per step (minimum 1).
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            bytes_read: AtomicU64::new(0),
            comparisons: AtomicU64::new(0),
            progress_callback: None,
        }
    }

    /// Report bytes read to `callback`.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Configured chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Total content bytes read by this comparator so far (both sides).
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(AtomicOrdering::Relaxed)
    }

    /// Number of `compare` calls made so far.
    #[must_use]
    pub fn comparisons(&self) -> u64 {
        self.comparisons.load(AtomicOrdering::Relaxed)
    }

    /// Compare two files.
    ///
    /// Files of different sizes are ordered by size without reading them.
    /// Files of equal size are streamed chunk by chunk in lockstep and ordered
    /// by the first differing chunk.
    pub fn compare(&self, first: &Path, second: &Path) -> Comparison {
        self.comparisons.fetch_add(1, AtomicOrdering::Relaxed);

        let size_first = match std::fs::metadata(first) {
            Ok(m) => m.len(),
            Err(source) => {
                return Comparison::FailedFirst(CompareError::Stat {
                    path: first.to_path_buf(),
                    source,
                })
            }
        };
        let size_second = match std::fs::metadata(second) {
            Ok(m) => m.len(),
            Err(source) => {
                return Comparison::FailedSecond(CompareError::Stat {
                    path: second.to_path_buf(),
                    source,
                })
            }
        };

        if size_first != size_second {
            return Comparison::Ordered(size_first.cmp(&size_second));
        }

        self.compare_content(first, second)
    }

    fn compare_content(&self, first: &Path, second: &Path) -> Comparison {
        let file_first = match File::open(first) {
            Ok(f) => f,
            Err(source) => {
                return Comparison::FailedFirst(CompareError::Open {
                    path: first.to_path_buf(),
                    source,
                })
            }
        };
        let file_second = match File::open(second) {
            Ok(f) => f,
            Err(source) => {
                return Comparison::FailedSecond(CompareError::Open {
                    path: second.to_path_buf(),
                    source,
                })
            }
        };

        std::thread::scope(|s| {
            let stream_first = ChunkStream::spawn(s, file_first, self.chunk_size);
            let stream_second = ChunkStream::spawn(s, file_second, self.chunk_size);

            loop {
                let chunk_first = stream_first.next_chunk();
                let chunk_second = stream_second.next_chunk();

                match (chunk_first, chunk_second) {
                    (Chunk::Failed(source), _) => {
                        return Comparison::FailedFirst(CompareError::Read {
                            path: first.to_path_buf(),
                            source,
                        })
                    }
                    (_, Chunk::Failed(source)) => {
                        return Comparison::FailedSecond(CompareError::Read {
                            path: second.to_path_buf(),
                            source,
                        })
                    }
                    (Chunk::Eof, Chunk::Eof) => return Comparison::Ordered(Ordering::Equal),
                    // Sizes matched at stat time; a file changed underneath us.
                    (Chunk::Eof, Chunk::Data(_)) => return Comparison::Ordered(Ordering::Less),
                    (Chunk::Data(_), Chunk::Eof) => {
                        return Comparison::Ordered(Ordering::Greater)
                    }
                    (Chunk::Data(a), Chunk::Data(b)) => {
                        self.record_bytes((a.len() + b.len()) as u64);
                        match a.cmp(&b) {
                            Ordering::Equal => continue,
                            ord => return Comparison::Ordered(ord),
                        }
                    }
                }
            }
        })
    }

    fn record_bytes(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, AtomicOrdering::Relaxed);
        if let Some(ref callback) = self.progress_callback {
            callback.on_bytes_read(bytes);
        }
    }
}
