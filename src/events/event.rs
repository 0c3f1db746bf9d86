//! # Runtime events emitted by the debouncer, supervisor and output relays.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Trigger events**: restart signals accepted or coalesced by the debouncer
//! - **Run events**: invocation lifecycle (starting, started, failed, superseded, exited)
//! - **Runtime events**: shutdown and subscriber health
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! generation of the invocation, its pid and a human-readable reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use watchvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RunStarted)
//!     .with_generation(3)
//!     .with_pid(4242);
//!
//! assert_eq!(ev.kind, EventKind::RunStarted);
//! assert_eq!(ev.generation, Some(3));
//! assert_eq!(ev.pid, Some(4242));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Trigger events ===
    /// A restart signal was placed on the restart channel.
    ///
    /// Sets:
    /// - `subject`: triggering path (absent for manual restarts)
    TriggerQueued,

    /// A trigger was folded into an already pending or recent restart.
    ///
    /// Sets:
    /// - `subject`: triggering path (absent for manual restarts)
    TriggerCoalesced,

    // === Run events ===
    /// A new generation was allocated and its command is about to start.
    ///
    /// Sets:
    /// - `generation`
    /// - `subject`: triggering path, if any
    /// - `reason`: `"manual"` for restarts without a subject or window
    RunStarting,

    /// The command process was spawned.
    ///
    /// Sets:
    /// - `generation`
    /// - `pid`: OS process id, when the platform reports one
    RunStarted,

    /// The command could not be spawned.
    ///
    /// Sets:
    /// - `generation`
    /// - `reason`: spawn error
    RunStartFailed,

    /// An older invocation was asked to terminate because a new one is starting.
    ///
    /// Sets:
    /// - `generation`: the superseded generation
    RunSuperseded,

    /// An invocation's output reached end-of-stream and its process exited.
    ///
    /// Sets:
    /// - `generation`
    /// - `reason`: exit status text
    /// - `discarded`: bytes dropped because the generation was stale
    /// - `current`: whether the generation was still current at exit
    RunExited,

    // === Shutdown events ===
    /// Shutdown requested (OS signal or close action).
    ///
    /// Sets:
    /// - `reason`: what requested the shutdown
    ShutdownRequested,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Generation of the invocation this event refers to.
    pub generation: Option<u64>,
    /// OS process id of the invocation.
    pub pid: Option<u32>,
    /// Triggering path or subscriber name.
    pub subject: Option<Arc<str>>,
    /// Human-readable reason (errors, exit status, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Bytes of output discarded as stale.
    pub discarded: Option<u64>,
    /// Whether the invocation was still current when the event was produced.
    pub current: Option<bool>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            generation: None,
            pid: None,
            subject: None,
            reason: None,
            discarded: None,
            current: None,
        }
    }

    /// Attaches a generation.
    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Attaches a process id.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches a subject (path or subscriber name).
    #[inline]
    pub fn with_subject(mut self, subject: impl Into<Arc<str>>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the number of discarded bytes.
    #[inline]
    pub fn with_discarded(mut self, bytes: u64) -> Self {
        self.discarded = Some(bytes);
        self
    }

    /// Marks whether the invocation was current.
    #[inline]
    pub fn with_current(mut self, current: bool) -> Self {
        self.current = Some(current);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subject(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subject(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TriggerQueued);
        let b = Event::new(EventKind::TriggerQueued);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn overflow_event_names_subscriber() {
        let ev = Event::subscriber_overflow("log", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.subject.as_deref(), Some("log"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=log reason=full"));
    }
}
