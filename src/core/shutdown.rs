//! # OS termination signals.
//!
//! [`wait_for_shutdown_signal`] completes with the name of the first
//! termination signal the process receives:
//! - Unix: `SIGINT`, `SIGTERM`, `SIGQUIT`
//! - elsewhere: Ctrl-C

use crate::error::WatchError;

/// Waits for a termination signal and returns its name.
///
/// Listeners are registered per call; registration failure is fatal.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> Result<&'static str, WatchError> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt()).map_err(WatchError::Signal)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(WatchError::Signal)?;
    let mut sigquit = signal(SignalKind::quit()).map_err(WatchError::Signal)?;

    let name = tokio::select! {
        _ = sigint.recv()  => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Waits for Ctrl-C and returns its name.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> Result<&'static str, WatchError> {
    tokio::signal::ctrl_c().await.map_err(WatchError::Signal)?;
    Ok("ctrl-c")
}
