//! Cooperative stop handling for the read loop
//!
//! The loop checks a [`StopFlag`] between reads. On unix the flag can also
//! be tripped by SIGINT; elsewhere Ctrl+C keeps the platform default and
//! terminates the process.

use crate::error::{ReaderError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Set from the SIGINT handler. Only async-signal-safe work happens there.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Shared stop request for the monitor loop
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    requested: Arc<AtomicBool>,
    watch_signals: bool,
}

impl StopFlag {
    /// A flag that only stops when [`StopFlag::stop`] is called
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that also stops on Ctrl+C
    pub fn with_ctrlc() -> Result<Self> {
        install_sigint_handler().map_err(|source| ReaderError::Signal { source })?;

        Ok(Self {
            requested: Arc::new(AtomicBool::new(false)),
            watch_signals: cfg!(unix),
        })
    }

    pub fn stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
            || (self.watch_signals && INTERRUPTED.load(Ordering::SeqCst))
    }
}

#[cfg(unix)]
extern "C" fn handle_sigint(_: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

#[cfg(unix)]
fn install_sigint_handler() -> std::io::Result<()> {
    let handler = handle_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;

    // SAFETY: the handler only stores to a static atomic.
    let previous = unsafe { libc::signal(libc::SIGINT, handler) };
    if previous == libc::SIG_ERR {
        return Err(std::io::Error::last_os_error());
    }

    log::debug!("Ctrl+C handler installed");
    Ok(())
}

#[cfg(not(unix))]
fn install_sigint_handler() -> std::io::Result<()> {
    log::warn!("Ctrl+C handling not supported on this platform, the process will be killed instead");
    Ok(())
}
