//! # LogWriter: renders lifecycle events as tracing records
//!
//! ## Example output (`WATCH_LOG=debug`)
//! ```text
//! DEBUG watchvisor::events: trigger queued subject="/src/main.rs"
//! INFO  watchvisor::events: run starting generation=4
//! INFO  watchvisor::events: run started generation=4 pid=31337
//! DEBUG watchvisor::events: run superseded generation=3
//! INFO  watchvisor::events: run exited generation=3 status="signal: 9 (SIGKILL)" current=false discarded=512
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let subject = e.subject.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::TriggerQueued => {
                tracing::debug!(target: "watchvisor::events", subject, "trigger queued");
            }
            EventKind::TriggerCoalesced => {
                tracing::trace!(target: "watchvisor::events", subject, "trigger coalesced");
            }
            EventKind::RunStarting => {
                tracing::info!(target: "watchvisor::events", generation = e.generation, subject, trigger = reason, "run starting");
            }
            EventKind::RunStarted => {
                tracing::info!(target: "watchvisor::events", generation = e.generation, pid = e.pid, "run started");
            }
            EventKind::RunStartFailed => {
                tracing::warn!(target: "watchvisor::events", generation = e.generation, error = reason, "run failed to start");
            }
            EventKind::RunSuperseded => {
                tracing::debug!(target: "watchvisor::events", generation = e.generation, "run superseded");
            }
            EventKind::RunExited => {
                tracing::info!(
                    target: "watchvisor::events",
                    generation = e.generation,
                    status = reason,
                    current = e.current,
                    discarded = e.discarded,
                    "run exited"
                );
            }
            EventKind::ShutdownRequested => {
                tracing::info!(target: "watchvisor::events", reason, "shutdown requested");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(target: "watchvisor::events", subscriber = subject, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(target: "watchvisor::events", subscriber = subject, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
