//! # Debouncer: burst coalescing in front of the supervisor.
//!
//! ```text
//! notification ──► EventFilter::qualifies ──► Debouncer::notify ──► RestartSender::offer
//!                     (put? under root?          (inside quiet window?         │
//!                      name matches?)             → coalesce)                  ▼
//!                                                                    [ single slot ] ──► supervisor
//! ```
//!
//! ## Rules
//! - The restart channel holds **one** pending [`TriggerContext`]; `offer` never
//!   blocks and drops the new context when the slot is taken (first in burst wins).
//! - After a successful offer the caller pauses for the quiescence window.
//! - Notifications that **arrived** before the window closed are coalesced as
//!   well, even when the supervisor already took the pending signal. A burst
//!   shorter than the window therefore yields exactly one restart.

use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use super::context::TriggerContext;
use crate::events::{Bus, Event, EventKind};
use crate::source::{Notification, Op};

/// Creates the single-slot restart channel.
pub fn restart_channel(bus: Bus) -> (RestartSender, RestartReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (RestartSender { tx, bus }, RestartReceiver { rx })
}

/// Producer half of the restart channel. Cheap to clone.
#[derive(Clone)]
pub struct RestartSender {
    tx: mpsc::Sender<TriggerContext>,
    bus: Bus,
}

impl RestartSender {
    /// Offers a restart without blocking.
    ///
    /// Returns `false` when a restart is already pending (the new context is
    /// dropped) or the supervisor has gone away.
    pub fn offer(&self, ctx: TriggerContext) -> bool {
        let label = ctx.label();
        match self.tx.try_send(ctx) {
            Ok(()) => {
                self.bus
                    .publish(Event::new(EventKind::TriggerQueued).with_subject(label));
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.bus
                    .publish(Event::new(EventKind::TriggerCoalesced).with_subject(label));
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

/// Consumer half of the restart channel, owned by the supervisor.
pub struct RestartReceiver {
    rx: mpsc::Receiver<TriggerContext>,
}

impl RestartReceiver {
    /// Waits for the next restart; `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<TriggerContext> {
        self.rx.recv().await
    }
}

/// Coalesces bursts of qualifying notifications into single restart signals.
pub struct Debouncer {
    signals: RestartSender,
    quiescence: Duration,
    quiet_until: Option<Instant>,
}

impl Debouncer {
    pub fn new(signals: RestartSender, quiescence: Duration) -> Self {
        Self {
            signals,
            quiescence,
            quiet_until: None,
        }
    }

    /// Handles one qualifying notification that arrived at `arrived`.
    ///
    /// On a successful offer this sleeps for the quiescence window before
    /// returning, which holds back the caller's notification intake.
    /// Returns whether a restart signal was queued.
    pub async fn notify(&mut self, ctx: TriggerContext, arrived: Instant) -> bool {
        if self.quiet_until.is_some_and(|until| arrived < until) {
            self.signals
                .bus
                .publish(Event::new(EventKind::TriggerCoalesced).with_subject(ctx.label()));
            return false;
        }
        if !self.signals.offer(ctx) {
            return false;
        }
        let until = Instant::now() + self.quiescence;
        self.quiet_until = Some(until);
        time::sleep_until(until).await;
        true
    }
}

/// Decides which notifications qualify for a restart.
#[derive(Clone, Debug)]
pub struct EventFilter {
    root: PathBuf,
    pattern: Option<Regex>,
    exclude: Option<Regex>,
}

impl EventFilter {
    pub fn new(
        root: impl Into<PathBuf>,
        pattern: Option<Regex>,
        exclude: Option<Regex>,
    ) -> Self {
        Self {
            root: root.into(),
            pattern,
            exclude,
        }
    }

    /// A notification qualifies when it commits content, lies under the root,
    /// its base name matches the pattern (if any) and its relative path is not excluded.
    pub fn qualifies(&self, n: &Notification) -> bool {
        if n.op != Op::Put {
            return false;
        }
        let Ok(relative) = n.path.strip_prefix(&self.root) else {
            return false;
        };
        let Some(name) = n.path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        if self.pattern.as_ref().is_some_and(|p| !p.is_match(&name)) {
            return false;
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(&slash_path(relative)),
            None => true,
        }
    }
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
