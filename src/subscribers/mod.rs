//! # Event subscribers for the watchvisor runtime.
//!
//! ```text
//! Event flow:
//!   Supervisor/Relay ── publish(Event) ──► Bus ──► SubscriberSet
//!                                                    │
//!                                              ┌─────┴─────┐
//!                                              ▼           ▼
//!                                          LogWriter     Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use watchvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Bell;
//!
//! #[async_trait]
//! impl Subscribe for Bell {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::RunExited && event.current == Some(true) {
//!             print!("\x07");
//!         }
//!     }
//! }
//! ```

mod log;
mod subscribe;
mod subscriber_set;

pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
