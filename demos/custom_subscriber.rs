//! # Example: custom_subscriber
//!
//! Demonstrates how to build and attach a custom event subscriber.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait.
//! - Inspect [`Event`] / [`EventKind`] for run lifecycle statistics.
//! - Wire the subscriber into [`Watch::with_subscriber`].
//!
//! ## Flow
//! ```text
//! FsSource ──► Watch::run()
//!     ├─► Debouncer ──► publish(TriggerQueued / TriggerCoalesced)
//!     ├─► ProcessSupervisor ──► publish(RunStarting / RunStarted / RunSuperseded / ...)
//!     ├─► OutputRelay ──► publish(RunExited)
//!     └─► subscriber_listener (in Watch)
//!           └─► SubscriberSet.emit() ──► RunTally.on_event()
//! ```
//!
//! ## Run
//! Edit any file under the current directory to trigger a rerun; Ctrl-C ends it.
//! ```bash
//! cargo run --example custom_subscriber -- ls -l
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use watchvisor::logging::{self, Verbosity};
use watchvisor::{Config, Event, EventKind, OutputMode, Subscribe, Watch};

/// Counts runs and prints a one-line summary after each current run exits.
///
/// Writes to stderr: in terminal mode stdout belongs to the command.
#[derive(Default)]
struct RunTally {
    started: AtomicU64,
    superseded: AtomicU64,
    failed: AtomicU64,
}

#[async_trait::async_trait]
impl Subscribe for RunTally {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            EventKind::RunStarting => {
                let why = ev
                    .subject
                    .as_deref()
                    .or(ev.reason.as_deref())
                    .unwrap_or("<unknown>");
                eprintln!("[tally] run #{} for {why}", ev.generation.unwrap_or(0));
            }
            EventKind::RunStarted => {
                self.started.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::RunStartFailed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                eprintln!(
                    "[tally] could not start: {}",
                    ev.reason.as_deref().unwrap_or("<none>")
                );
            }
            EventKind::RunSuperseded => {
                self.superseded.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::RunExited if ev.current == Some(true) => {
                eprintln!(
                    "[tally] {} ({} started, {} superseded, {} failed to start)",
                    ev.reason.as_deref().unwrap_or("exited"),
                    self.started.load(Ordering::Relaxed),
                    self.superseded.load(Ordering::Relaxed),
                    self.failed.load(Ordering::Relaxed),
                );
            }
            EventKind::ShutdownRequested => {
                eprintln!(
                    "[tally] shutdown ({})",
                    ev.reason.as_deref().unwrap_or("<none>")
                );
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "tally"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_subscriber(Verbosity::Normal);

    let mut command: Vec<String> = std::env::args().skip(1).collect();
    if command.is_empty() {
        command = vec!["ls".into(), "-l".into()];
    }

    let mut cfg = Config::default();
    cfg.command = command;
    cfg.root = std::env::current_dir()?.canonicalize()?;
    cfg.output = OutputMode::Terminal;

    Watch::new(cfg)?
        .with_subscriber(Arc::new(RunTally::default()))
        .run()
        .await?;

    eprintln!("[tally] finished");
    Ok(())
}
