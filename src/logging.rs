//! Tracing subscriber initialisation for the `watch` binary.
//!
//! Logs go to stderr so they never mix with run output on stdout.
//!
//! # Priority (highest to lowest)
//!
//! 1. `WATCH_LOG` env var (per-target directives, e.g. `watchvisor::events=debug,warn`)
//! 2. `RUST_LOG` env var
//! 3. CLI flags (`-v` → debug, `-q` → error)
//! 4. Default level: `warn`

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Project-specific filter variable.
pub const LOG_ENV_VAR: &str = "WATCH_LOG";

/// Verbosity level derived from CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// `-q`: only errors.
    Quiet,
    /// Warnings and above.
    #[default]
    Normal,
    /// `-v`: debug-level output, lifecycle events included.
    Verbose,
}

impl Verbosity {
    #[must_use]
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub const fn default_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
        }
    }
}

/// Installs the global subscriber.
///
/// A second call is a no-op so tests and embedders may call it freely.
pub fn init_subscriber(verbosity: Verbosity) {
    let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(verbosity == Verbosity::Verbose)
        .without_time()
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter(verbosity, std::env::var(LOG_ENV_VAR).ok()))
        .with(fmt_layer)
        .try_init();
}

/// `WATCH_LOG` > `RUST_LOG` > flag-derived level.
///
/// Unparseable directives fall through to the next source.
fn env_filter(verbosity: Verbosity, project: Option<String>) -> EnvFilter {
    if let Some(directives) = project
        && let Ok(filter) = EnvFilter::try_new(&directives)
    {
        return filter;
    }
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(verbosity.default_level().as_str().to_ascii_lowercase())
}
