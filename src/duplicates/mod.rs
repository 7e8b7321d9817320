//! Duplicate detection module.
//!
//! This module provides:
//! - [`compare`]: size-then-content ordering of two files
//! - [`chunks`]: the lockstep chunk readers behind content comparison
//! - [`tracker`]: pools of files declared identical
//! - [`groups`]: the ordered result of a search
//! - [`finder`]: the merge sort that drives it all

pub mod chunks;
pub mod compare;
pub mod finder;
pub mod groups;
pub mod tracker;

pub use chunks::DEFAULT_CHUNK_SIZE;
pub use compare::{CompareError, Comparison, FileComparator};
pub use finder::{find_duplicates, DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{assemble, DuplicateGroup, Failure, FindResult};
pub use tracker::{Declared, Pool, PoolTracker};
