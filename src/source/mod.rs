//! # Change notification sources.
//!
//! A [`NotificationSource`] yields one [`Notification`] per changed path. The
//! reader loop in [`Watch`](crate::Watch) is the only consumer; it filters
//! notifications and hands qualifying ones to the debouncer.
//!
//! [`FsSource`] is the filesystem implementation built on `notify`.

mod fs;

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::core::TriggerContext;
use crate::error::WatchError;

pub use fs::FsSource;

/// Operation reported for a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Content was committed (written, closed after write, created, renamed into place).
    Put,
    /// Anything else (metadata, reads, removals).
    Other,
}

/// One change to one path.
#[derive(Clone, Debug)]
pub struct Notification {
    pub path: PathBuf,
    pub op: Op,
    /// Window or session that produced the change. [`FsSource`] never knows
    /// it; editor-integrated sources set it with [`Notification::with_window`].
    pub window: Option<u64>,
    /// When the source received the change.
    pub at: Instant,
}

impl Notification {
    /// Notification stamped with the current time and no window.
    pub fn new(path: impl Into<PathBuf>, op: Op) -> Self {
        Self {
            path: path.into(),
            op,
            window: None,
            at: Instant::now(),
        }
    }

    /// Attributes the change to `window`.
    pub fn with_window(mut self, window: u64) -> Self {
        self.window = Some(window);
        self
    }

    /// Trigger context carried into the restart.
    pub fn context(&self) -> TriggerContext {
        let ctx = TriggerContext::for_subject(self.path.clone());
        match self.window {
            Some(window) => ctx.with_window(window),
            None => ctx,
        }
    }
}

/// Stream of change notifications.
///
/// An `Err` is fatal for the runtime: supervision cannot continue without the stream.
#[async_trait]
pub trait NotificationSource: Send {
    async fn next(&mut self) -> Result<Notification, WatchError>;
}
