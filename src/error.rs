//! Error types used by the watchvisor runtime.
//!
//! [`WatchError`] covers failures of the always-needed external channels
//! (notification source, display sink, signal handlers) and usage errors.
//! Per-invocation failures are never represented here: they are reported to
//! the sink as output lines and the supervisor keeps running.
//!
//! The type provides helper methods (`as_label`, `exit_code`) for logging and
//! for the binary's exit status.

use std::io;

use thiserror::Error;

/// # Errors produced by the watchvisor runtime.
///
/// Every variant is fatal: the core cannot keep supervising without the
/// channel that failed.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WatchError {
    /// Command line is unusable (no command, invalid pattern).
    #[error("usage: {reason}")]
    Usage {
        /// What was wrong with the invocation.
        reason: String,
    },

    /// Filesystem watcher could not be created or attached to the root.
    #[error("cannot watch {root}: {source}")]
    Watch {
        /// Root directory being watched.
        root: String,
        /// Underlying watcher error.
        #[source]
        source: notify::Error,
    },

    /// Notification stream closed while the supervisor was running.
    #[error("notification stream failed: {reason}")]
    Source {
        /// Failure description.
        reason: String,
    },

    /// Watcher reported an error while the supervisor was running.
    #[error("notification stream failed: {source}")]
    Notify {
        /// Underlying watcher error.
        #[source]
        source: notify::Error,
    },

    /// Display sink could not be created.
    #[error("cannot open display: {0}")]
    Display(#[source] io::Error),

    /// OS signal handlers could not be registered.
    #[error("cannot install signal handlers: {0}")]
    Signal(#[source] io::Error),
}

impl WatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use watchvisor::WatchError;
    ///
    /// let err = WatchError::Usage { reason: "no command".into() };
    /// assert_eq!(err.as_label(), "watch_usage");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WatchError::Usage { .. } => "watch_usage",
            WatchError::Watch { .. } => "watch_setup",
            WatchError::Source { .. } | WatchError::Notify { .. } => "watch_source",
            WatchError::Display(_) => "watch_display",
            WatchError::Signal(_) => "watch_signal",
        }
    }

    /// Process exit code for this error: `2` for usage errors, `1` otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            WatchError::Usage { .. } => 2,
            _ => 1,
        }
    }

    /// Notification stream ended for `reason`.
    pub fn stream(reason: impl Into<String>) -> Self {
        WatchError::Source {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_exit_with_two() {
        let err = WatchError::Usage {
            reason: "missing command".into(),
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "usage: missing command");
    }

    #[test]
    fn runtime_failures_exit_with_one() {
        let err = WatchError::stream("channel closed");
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.as_label(), "watch_source");

        let err = WatchError::Notify {
            source: notify::Error::generic("inotify queue overflow"),
        };
        assert_eq!(err.as_label(), "watch_source");
        assert!(err.to_string().contains("inotify queue overflow"));

        let err = WatchError::Display(io::Error::other("no tty"));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("no tty"));
    }
}
