//! Ctrl+C handling.
//!
//! A single `AtomicBool` is shared between the signal handler, the walker and
//! the finder. The finder checks it between comparisons and stops with
//! [`FinderError::Interrupted`](crate::duplicates::FinderError::Interrupted),
//! which the binary maps to exit code 130.
//!
//! ```rust,no_run
//! use dupfinder::duplicates::FinderConfig;
//! use dupfinder::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether Ctrl+C was pressed or [`request_shutdown`](Self::request_shutdown) was called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clone of the flag for [`FinderConfig`](crate::duplicates::FinderConfig)
    /// and [`Walker`](crate::scanner::Walker).
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Lower the flag.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(String),
}

static GLOBAL_HANDLER: OnceLock<Result<ShutdownHandler, String>> = OnceLock::new();

/// Install the process-wide Ctrl+C handler.
///
/// The handler is installed once per process. Later calls reset and return
/// the same handler, so `run_app` can be called repeatedly (as the tests do).
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if another handler was installed
/// outside this module.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    let installed = GLOBAL_HANDLER.get_or_init(|| {
        let handler = ShutdownHandler::new();
        let flag = handler.get_flag();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\nInterrupted. Stopping comparisons...");
            let _ = stderr.flush();
            log::info!("Shutdown signal received");
        })
        .map(|()| {
            log::debug!("Ctrl+C handler installed");
            handler
        })
        .map_err(|e| e.to_string())
    });

    match installed {
        Ok(handler) => {
            handler.reset();
            Ok(handler.clone())
        }
        Err(msg) => Err(SignalError::InstallFailed(msg.clone())),
    }
}
