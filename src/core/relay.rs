//! # Output relay: one task per invocation.
//!
//! Drains the invocation's combined output stream and forwards every chunk to
//! the sink **only while its generation is current**. At end-of-stream it
//! awaits the exit status and closes the run under the same check.
//!
//! ```text
//! read chunk ──► if_current(g)? ──yes──► sink.append(chunk)
//!                      │
//!                      no ──► discard (counted)
//!
//! EOF + exit ──► if_current(g)? ──yes──► [failure line] + "$" + reset_cursor + mark_clean
//! ```
//!
//! ## Rules
//! - Chunks of one invocation reach the sink in read order.
//! - The relay owns the read end; it is closed when the relay returns.
//! - Nothing from a superseded generation is ever written, exit report included.
//! - Cancellation of the run token kills the process; the relay keeps draining
//!   until the stream closes so the read end is released cleanly.

use std::io;
use std::process::ExitStatus;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

use super::generation::{Generation, SupervisorState};
use super::invocation::{CommandLine, Invocation, wait_or_kill};
use crate::events::{Bus, Event, EventKind};

/// Marker written after the last output of a current run.
pub const END_OF_RUN: &[u8] = b"$\n";

/// Forwards one invocation's output to the shared sink.
pub struct OutputRelay {
    state: Arc<SupervisorState>,
    bus: Bus,
    command: Arc<CommandLine>,
    chunk_size: usize,
}

impl OutputRelay {
    pub fn new(
        state: Arc<SupervisorState>,
        bus: Bus,
        command: Arc<CommandLine>,
        chunk_size: usize,
    ) -> Self {
        Self {
            state,
            bus,
            command,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Drives `invocation` to completion.
    ///
    /// `cancel` is the run token: once it fires the process is killed.
    pub async fn run(self, invocation: Invocation, cancel: CancellationToken) {
        let Invocation {
            generation,
            mut child,
            output,
        } = invocation;

        let drain = async {
            match output {
                Some(stream) => self.drain(generation, stream).await,
                None => 0,
            }
        };
        let (discarded, status) = tokio::join!(drain, wait_or_kill(&mut child, &cancel));

        self.finish(generation, status, discarded).await;
    }

    /// Forwards chunks from `stream` until end-of-stream.
    ///
    /// Returns the number of bytes discarded as stale.
    pub(crate) async fn drain<R>(&self, generation: Generation, mut stream: R) -> u64
    where
        R: AsyncRead + Unpin,
    {
        let mut buf = vec![0u8; self.chunk_size];
        let mut discarded = 0u64;
        loop {
            let n = match stream.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    tracing::debug!(%generation, error = %err, "output stream failed");
                    break;
                }
            };
            let chunk = &buf[..n];
            if !self
                .state
                .if_current(generation, |sink| sink.append(chunk))
                .await
            {
                discarded += n as u64;
            }
        }
        discarded
    }

    /// Reports the exit of `generation` and publishes [`EventKind::RunExited`].
    pub(crate) async fn finish(
        &self,
        generation: Generation,
        status: io::Result<ExitStatus>,
        discarded: u64,
    ) {
        let outcome = match &status {
            Ok(status) => status.to_string(),
            Err(err) => err.to_string(),
        };
        let failure = match &status {
            Ok(status) if status.success() => None,
            _ => Some(format!("{}: {outcome}\n", self.command)),
        };

        let current = self
            .state
            .if_current(generation, |sink| {
                if let Some(line) = &failure {
                    sink.append(line.as_bytes())?;
                }
                sink.append(END_OF_RUN)?;
                sink.reset_cursor()?;
                sink.mark_clean()
            })
            .await;

        self.bus.publish(
            Event::new(EventKind::RunExited)
                .with_generation(generation.get())
                .with_reason(outcome)
                .with_discarded(discarded)
                .with_current(current),
        );
    }
}
