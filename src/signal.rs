//! Ctrl+C handling.
//!
//! A single `Arc<AtomicBool>` is raised on interrupt and shared with the
//! walker and the hashing pool. A raised flag makes the scan return
//! [`FinderError::Interrupted`](crate::duplicates::FinderError::Interrupted),
//! and consolidation never starts after that.
//!
//! ```rust,no_run
//! use asset_tidy::duplicates::FinderConfig;
//! use asset_tidy::signal::install_handler;
//!
//! let handler = install_handler().unwrap();
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared interrupt flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with the flag lowered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once Ctrl+C was pressed or [`request_shutdown`](Self::request_shutdown) called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Flag to hand to `FinderConfig`, `Walker` or `Hasher`.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Lower the flag again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C handler.
///
/// Only the first call registers with `ctrlc`; later calls (for example
/// several `run_app` invocations in one test binary) get the same handler
/// back with its flag lowered.
///
/// # Errors
///
/// Returns [`SignalError`] if the OS refuses the handler on first install.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let raised = handler.clone();

    let result = ctrlc::set_handler(move || {
        raised.request_shutdown();
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Stopping before any file is changed...");
        let _ = std::io::stderr().flush();
        log::info!("Shutdown signal received");
    });

    match result {
        Ok(()) => {
            let handler = GLOBAL_HANDLER.get_or_init(|| handler);
            Ok(handler.clone())
        }
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, using unregistered flag");
            Ok(GLOBAL_HANDLER.get_or_init(ShutdownHandler::new).clone())
        }
        Err(e) => Err(SignalError::InstallFailed(e)),
    }
}
