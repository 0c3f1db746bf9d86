//! # watchvisor
//!
//! **Watchvisor** runs a command and runs it again whenever files under a
//! directory change.
//!
//! Every run gets a new generation number. Output reaches the display only
//! while its run is the current one, so a superseded run that is still
//! shutting down can never scribble over the output of its successor.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌────────────────────┐      ┌──────────────────┐
//!   │ NotificationSource │      │ Console controls │
//!   │     (FsSource)     │      │ (Rerun / Close)  │
//!   └────────┬───────────┘      └────────┬─────────┘
//!            ▼                           │
//!   ┌──────────────────┐                 │
//!   │ EventFilter      │                 │
//!   │ Debouncer        │                 │
//!   └────────┬─────────┘                 │
//!            ▼                           ▼
//!   ┌──────────────────────────────────────────────┐
//!   │     restart slot (capacity 1, drop on full)  │
//!   └──────────────────────┬───────────────────────┘
//!                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ProcessSupervisor                                                │
//! │  - cancels the previous run (kill requested, not awaited)         │
//! │  - SupervisorState::advance → generation g, header on the sink    │
//! │  - build_env(ambient, ctx) → Invocation::start                    │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!   │ OutputRelay  │   │ OutputRelay  │   │ OutputRelay  │
//!   │   g = 1      │   │   g = 2      │   │   g = 3      │
//!   │ (stale: drop)│   │ (stale: drop)│   │ (current)    │
//!   └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!          └──────────► SupervisorState lock ◄────┘
//!                        (generation + Sink)
//!                               ▼
//!                    Display / Passthrough
//! ```
//!
//! ### Events
//! ```text
//! Debouncer, Supervisor, Relays ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                       ┌─────┴─────┐
//!                                                                       ▼           ▼
//!                                                                   LogWriter     custom
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                        |
//! |-------------------|----------------------------------------------------------|-------------------------------------------|
//! | **Session**       | Wire source, debouncer, supervisor and sink together.    | [`Watch`], [`Config`]                     |
//! | **Core**          | Generations, restart channel, process start, relays.     | [`ProcessSupervisor`], [`OutputRelay`]    |
//! | **Sources**       | Change notifications.                                    | [`NotificationSource`], [`FsSource`]      |
//! | **Sinks**         | Where run output goes.                                   | [`Sink`], [`Display`], [`Passthrough`]    |
//! | **Subscriber API**| Hook into lifecycle events.                              | [`Subscribe`], [`Event`], [`EventKind`]   |
//! | **Errors**        | Fatal runtime errors.                                    | [`WatchError`]                            |
//!
//! ## Example
//! ```no_run
//! use watchvisor::{Config, OutputMode, Watch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), watchvisor::WatchError> {
//!     let mut cfg = Config::default();
//!     cfg.command = vec!["cargo".into(), "test".into()];
//!     cfg.root = std::env::current_dir().unwrap();
//!     cfg.output = OutputMode::Terminal;
//!
//!     Watch::new(cfg)?.run().await
//! }
//! ```

mod app;
mod config;
mod core;
mod error;
mod events;
mod sink;
mod source;
mod subscribers;

pub mod cli;
pub mod logging;

// ---- Public re-exports ----

pub use app::Watch;
pub use config::{Config, DEFAULT_EXCLUDE, OutputMode};
pub use crate::core::{
    CommandLine, Debouncer, END_OF_RUN, EventFilter, Generation, Invocation, OutputRelay,
    OutputStream, ProcessSupervisor, RestartReceiver, RestartSender, SUBJECT_ALIAS_VAR,
    SUBJECT_FILE_VAR, SupervisorParams, SupervisorState, TriggerContext, WINDOW_ID_VAR, build_env,
    restart_channel, wait_for_shutdown_signal,
};
pub use error::WatchError;
pub use events::{Bus, Event, EventKind};
pub use sink::{Console, Control, Display, Passthrough, Sink};
pub use source::{FsSource, Notification, NotificationSource, Op};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
