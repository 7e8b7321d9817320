//! Command-line interface definitions for dupfinder.
//!
//! # Example
//!
//! ```bash
//! # Compare everything under two directories
//! dupfinder ~/Pictures /mnt/backup/Pictures
//!
//! # Feed paths from find(1)
//! find . -name '*.iso' -print0 | dupfinder --stdin -0
//!
//! # JSON for scripts, skipping small files
//! dupfinder --min-size 1MiB --output json ~/Downloads
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Overrides;

/// Find duplicate files by comparing their content.
///
/// Files are ordered by size, then by content read chunk by chunk; files that
/// compare equal are reported together. Directories are walked recursively.
#[derive(Debug, Parser)]
#[command(name = "dupfinder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to search
    #[arg(value_name = "PATH", required_unless_present = "stdin")]
    pub paths: Vec<PathBuf>,

    /// Read paths from standard input, one per line
    #[arg(long)]
    pub stdin: bool,

    /// Input paths are NUL-delimited (with --stdin)
    #[arg(short = '0', long = "null", requires = "stdin")]
    pub null: bool,

    /// Minimum file size to consider (e.g., 1KB, 1MiB). Default: 1 byte
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Only consider paths matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub include: Vec<String>,

    /// Skip paths matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Follow symbolic links while walking directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Bytes read per file per comparison step (e.g., 64KiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_chunk_size)]
    pub chunk_size: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Do not draw progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Settings given on the command line, for the top config layer.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            chunk_size: self.chunk_size,
            min_size: self.min_size,
            max_size: self.max_size,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            follow_symlinks: self.follow_symlinks,
            skip_hidden: self.skip_hidden,
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One path per line, groups separated by blank lines
    Text,
    /// JSON document
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupfinder::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1.5MiB").unwrap(), 1_572_864);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse a chunk size: a [`parse_size`] value of at least one byte.
///
/// # Errors
///
/// Returns an error for invalid sizes, zero, or values beyond `usize`.
pub fn parse_chunk_size(s: &str) -> Result<usize, String> {
    let bytes = parse_size(s)?;
    if bytes == 0 {
        return Err("Chunk size must be at least 1 byte".to_string());
    }
    usize::try_from(bytes).map_err(|_| format!("Chunk size too large: {bytes}"))
}
