//! # Runtime configuration.
//!
//! [`Config`] defines what is watched, what is run and how the runtime behaves:
//! debounce window, relay chunk size, output mode, event bus capacity and the
//! shutdown grace period.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use watchvisor::{Config, OutputMode};
//!
//! let mut cfg = Config::default();
//! cfg.command = vec!["go".into(), "test".into()];
//! cfg.quiescence = Duration::from_millis(250);
//! cfg.output = OutputMode::Terminal;
//!
//! assert!(cfg.validate().is_ok());
//! assert_eq!(cfg.command_line().unwrap().to_string(), "go test");
//! ```

use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;

use crate::core::{CommandLine, EventFilter};
use crate::error::WatchError;

/// Default exclusion: anything inside a hidden directory or a `target` directory.
pub const DEFAULT_EXCLUDE: &str = r"(^|/)(\.[^/]+|target)/";

/// Where run output goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Managed display: cleared per run, title, stale output discarded.
    #[default]
    Display,
    /// The command inherits the calling terminal (`-t`).
    Terminal,
}

impl OutputMode {
    /// Whether command output is piped through a relay.
    pub fn captures(self) -> bool {
        matches!(self, OutputMode::Display)
    }
}

/// Configuration for one watch session.
#[derive(Clone, Debug)]
pub struct Config {
    /// Program and arguments.
    pub command: Vec<String>,
    /// Inclusion pattern matched against the changed file's base name;
    /// `None` admits every name.
    pub pattern: Option<Regex>,
    /// Exclusion pattern matched against the root-relative `/`-separated path.
    pub exclude: Option<Regex>,
    /// Watched root directory.
    pub root: PathBuf,
    /// Debounce window.
    pub quiescence: Duration,
    /// Relay read buffer size.
    pub chunk_size: usize,
    /// Output mode.
    pub output: OutputMode,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
    /// How long shutdown waits for relays to finish.
    pub grace: Duration,
    /// Buffer between the filesystem watcher and the reader loop.
    pub source_capacity: usize,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `pattern = None` (every name), `exclude = DEFAULT_EXCLUDE`
    /// - `root = .`
    /// - `quiescence = 100ms`, `chunk_size = 4096`
    /// - `output = Display`
    /// - `bus_capacity = 1024`, `grace = 2s`, `source_capacity = 512`
    fn default() -> Self {
        Self {
            command: Vec::new(),
            pattern: None,
            exclude: Regex::new(DEFAULT_EXCLUDE).ok(),
            root: PathBuf::from("."),
            quiescence: Duration::from_millis(100),
            chunk_size: 4096,
            output: OutputMode::Display,
            bus_capacity: 1024,
            grace: Duration::from_secs(2),
            source_capacity: 512,
        }
    }
}

impl Config {
    /// Checks that the configuration can start a session.
    pub fn validate(&self) -> Result<(), WatchError> {
        if self.command.is_empty() {
            return Err(WatchError::Usage {
                reason: "no command given".into(),
            });
        }
        Ok(())
    }

    /// The command to supervise, if one was given.
    pub fn command_line(&self) -> Option<CommandLine> {
        CommandLine::new(self.command.clone())
    }

    /// Filter deciding which notifications qualify for a restart.
    pub fn event_filter(&self) -> EventFilter {
        EventFilter::new(self.root.clone(), self.pattern.clone(), self.exclude.clone())
    }

    /// Display title for this session.
    pub fn title(&self) -> String {
        format!("{}/+watch", self.root.display())
    }

    /// Relay chunk size, never zero.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}
