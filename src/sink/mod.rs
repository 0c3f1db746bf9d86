//! # Output sinks and user controls.
//!
//! A [`Sink`] is the display that receives run output and lifecycle cues.
//! Every call is made while holding the supervisor lock (see
//! [`SupervisorState`](crate::core::SupervisorState)), so implementations do
//! not need their own synchronisation.
//!
//! - [`Display`]: managed terminal view (clears per run, title, modified marker).
//! - [`Passthrough`]: the `-t` mode; commands inherit the terminal, the sink only
//!   prints run headers and markers.
//! - [`Console`]: reads "run again" / "close" actions typed on stdin.

mod console;
mod display;
mod passthrough;

#[cfg(test)]
pub(crate) mod testing;

use std::io;

pub use console::{Console, Control};
pub use display::Display;
pub use passthrough::Passthrough;

/// Display operations used by the supervisor and the relays.
pub trait Sink: Send + 'static {
    /// Sets the window title.
    fn set_title(&mut self, title: &str) -> io::Result<()>;

    /// Marks the display as unmodified.
    fn mark_clean(&mut self) -> io::Result<()>;

    /// Replaces the whole body with `text`.
    fn replace_body(&mut self, text: &str) -> io::Result<()>;

    /// Appends raw output bytes to the body.
    fn append(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Moves the cursor/focus back to its resting position after a run.
    fn reset_cursor(&mut self) -> io::Result<()>;
}
