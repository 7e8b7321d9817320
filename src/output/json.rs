//! JSON output formatter for duplicate search results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     { "size": 1024, "files": ["/data/a.txt", "/data/b.txt"] }
//!   ],
//!   "failures": [
//!     { "path": "/data/locked.bin", "error": "Cannot open /data/locked.bin: Permission denied (os error 13)" }
//!   ],
//!   "summary": {
//!     "input_files": 3,
//!     "comparisons": 3,
//!     "bytes_compared": 2048,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "failures": 1,
//!     "scan_errors": 0,
//!     "reclaimable_space": 1024,
//!     "scan_duration_ms": 4,
//!     "exit_code": 3,
//!     "exit_code_name": "DF003"
//!   }
//! }
//! ```
//!
//! Paths are written as given to the finder, lossily converted to UTF-8.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, Failure, FindResult, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// File size in bytes
    pub size: u64,
    /// Paths of the identical files, sorted
    pub files: Vec<String>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            size: group.size,
            files: group.files.iter().map(|p| path_string(p)).collect(),
        }
    }
}

/// A failed file in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    /// The path that failed
    pub path: String,
    /// Human-readable cause
    pub error: String,
}

impl From<&Failure> for JsonFailure {
    fn from(failure: &Failure) -> Self {
        Self {
            path: path_string(&failure.path),
            error: failure.error.to_string(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of distinct input paths
    pub input_files: usize,
    /// Pairwise comparisons made
    pub comparisons: u64,
    /// Content bytes read while comparing
    pub bytes_compared: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Duplicate files, excluding one original per group
    pub duplicate_files: usize,
    /// Files that could not be compared
    pub failures: usize,
    /// Entries the directory walk could not read
    pub scan_errors: usize,
    /// Bytes that removing the duplicates would free
    pub reclaimable_space: u64,
    /// Duration of the search in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DF000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            input_files: summary.input_files,
            comparisons: summary.comparisons,
            bytes_compared: summary.bytes_compared,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            failures: summary.failures,
            scan_errors: summary.scan_errors,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON document.
///
/// ```
/// use dupfinder::duplicates::{FindResult, ScanSummary};
/// use dupfinder::error::ExitCode;
/// use dupfinder::output::json::JsonOutput;
///
/// let output = JsonOutput::new(&FindResult::default(), &ScanSummary::default(), ExitCode::NoDuplicates);
/// let json = output.to_json().unwrap();
/// assert!(json.starts_with("{\"groups\":[]"));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate groups in output order
    pub groups: Vec<JsonDuplicateGroup>,
    /// Failed files in path order
    pub failures: Vec<JsonFailure>,
    /// Run statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document for a finished search.
    #[must_use]
    pub fn new(result: &FindResult, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            groups: result.groups.iter().map(JsonDuplicateGroup::from).collect(),
            failures: result.failures.iter().map(JsonFailure::from).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
