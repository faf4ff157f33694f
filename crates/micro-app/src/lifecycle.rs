//! Termination signal handling.
//!
//! # Design
//! - SIGINT and SIGTERM both end the process with exit code 0.
//! - Handlers are registered before the listener task starts, so
//!   registration failures reach the caller.
//! - No cleanup runs on termination; open store connections are dropped by
//!   the OS.

use std::io;
use std::process;

use tokio::task::JoinHandle;
use tracing::{info, warn};

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// The signal that asked the process to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// SIGINT, usually Ctrl-C.
    Interrupt,
    /// SIGTERM, usually a supervisor stopping the service.
    Terminate,
}

impl Termination {
    /// Conventional POSIX signal number.
    #[must_use]
    pub const fn signal_number(self) -> i32 {
        match self {
            Self::Interrupt => 2,
            Self::Terminate => 15,
        }
    }

    /// Record the signal: interrupts at info, terminations at warn.
    pub fn log(self) {
        let signal = self.signal_number();
        match self {
            Self::Interrupt => info!("sigint received ({signal})"),
            Self::Terminate => warn!("sigterm received ({signal})"),
        }
    }
}

/// Registered SIGINT and SIGTERM streams.
#[derive(Debug)]
pub struct TerminationSignals {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
}

impl TerminationSignals {
    /// Register both handlers. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler cannot be registered.
    #[cfg(unix)]
    pub fn register() -> io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Register the Ctrl-C handler.
    ///
    /// # Errors
    ///
    /// Never fails on this platform; registration happens on first receive.
    #[cfg(not(unix))]
    pub fn register() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next termination signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal source fails.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> io::Result<Termination> {
        tokio::select! {
            _ = self.interrupt.recv() => Ok(Termination::Interrupt),
            _ = self.terminate.recv() => Ok(Termination::Terminate),
        }
    }

    /// Wait for Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the Ctrl-C handler cannot be installed.
    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> io::Result<Termination> {
        tokio::signal::ctrl_c().await?;
        Ok(Termination::Interrupt)
    }
}

/// Wait until SIGINT or SIGTERM arrives.
///
/// # Errors
///
/// Returns an error if the handlers cannot be registered.
pub async fn wait_for_termination() -> io::Result<Termination> {
    TerminationSignals::register()?.recv().await
}

/// Register termination handlers and spawn the task that logs the signal and
/// exits with code 0.
///
/// The task only finishes on its own when the signal source fails.
///
/// # Errors
///
/// Returns an error if the handlers cannot be registered.
pub fn install_signal_handlers() -> io::Result<JoinHandle<io::Result<()>>> {
    let signals = TerminationSignals::register()?;
    Ok(tokio::spawn(exit_on_termination(signals)))
}

async fn exit_on_termination(mut signals: TerminationSignals) -> io::Result<()> {
    let termination = signals.recv().await?;
    termination.log();
    process::exit(0)
}
