//! dupfinder - duplicate file finder
//!
//! Finds groups of byte-identical files by sorting the candidates with a
//! size-then-content comparison. There is no hashing: same-size files are
//! streamed chunk by chunk and compared directly, so a mismatch near the start
//! of two large files costs only a chunk of reading.
//!
//! ```no_run
//! use dupfinder::duplicates::find_duplicates;
//! use std::path::PathBuf;
//!
//! let result = find_duplicates(vec![PathBuf::from("a.iso"), PathBuf::from("b.iso")]);
//! for group in &result.groups {
//!     println!("{} identical files of {} bytes", group.len(), group.size);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Settings;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::path_reader::{filter_paths, read_paths_from_lines, read_paths_from_null_delimited};

/// Run the application for parsed arguments.
///
/// Results go to stdout; progress and logs go to stderr.
///
/// # Errors
///
/// Fails on invalid configuration, when no usable input path remains, when
/// writing the output fails, or when interrupted.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let settings = Settings::load(cli.config.as_deref(), &cli.overrides())?;
    log::debug!("Effective settings: {:?}", settings);
    let walker_config = settings.walker_config()?;

    let paths = collect_input_paths(&cli)?;
    if paths.is_empty() {
        bail!("No existing files or directories given");
    }

    let handler = signal::install_handler().context("Failed to set up Ctrl+C handling")?;
    let progress = Arc::new(Progress::new(cli.quiet || cli.no_progress));

    let config = FinderConfig::default()
        .with_chunk_size(settings.chunk_size)
        .with_walker_config(walker_config)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress);
    let finder = DuplicateFinder::new(config);

    let (result, summary) = finder.find_duplicates_in_paths(&paths)?;
    let exit_code = ExitCode::for_result(&result);

    log::info!(
        "{} duplicate groups, {} reclaimable, {} compared in {:.2?}",
        summary.duplicate_groups,
        summary.reclaimable_display(),
        summary.bytes_compared_display(),
        summary.scan_duration
    );
    if summary.failures > 0 {
        log::warn!("{} file(s) could not be read", summary.failures);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => TextOutput::new(&result)
            .write_to(&mut out)
            .context("Failed to write results")?,
        OutputFormat::Json => JsonOutput::new(&result, &summary, exit_code)
            .write_to(&mut out, true)
            .context("Failed to write results")?,
    }
    out.flush().context("Failed to write results")?;

    Ok(exit_code)
}

/// Paths from the command line or standard input, filtered and deduplicated.
fn collect_input_paths(cli: &Cli) -> Result<Vec<PathBuf>> {
    if !cli.stdin {
        return Ok(filter_paths(&cli.paths));
    }

    let stdin = io::stdin();
    let mut paths = if cli.null {
        read_paths_from_null_delimited(stdin.lock())
    } else {
        read_paths_from_lines(stdin.lock())
    }
    .context("Failed to read paths from stdin")?;

    if !cli.paths.is_empty() {
        let mut all = filter_paths(&cli.paths);
        all.append(&mut paths);
        paths = filter_paths(all);
    }
    Ok(paths)
}
