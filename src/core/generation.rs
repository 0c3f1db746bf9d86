//! # Generation counter and shared supervisor state.
//!
//! [`SupervisorState`] owns the one lock of the runtime. Behind it sit the
//! current [`Generation`] and the [`Sink`]. Holding both under one lock makes
//! "is `g` still current?" and "write to the sink" a single atomic step, so a
//! relay can never forward a chunk after its generation was superseded.
//!
//! ## Rules
//! - Only [`SupervisorState::advance`] changes the generation (`+1`, never reused).
//! - Every sink mutation goes through the lock.
//! - Sink write failures are logged and swallowed; they never abort a run.

use std::fmt;
use std::io;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::sink::Sink;

/// Identifier of one invocation of the target command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Shared {
    current: Generation,
    sink: Box<dyn Sink>,
}

/// Generation counter plus the sink it guards.
///
/// Passed explicitly (as `Arc`) to the supervisor and to every relay.
pub struct SupervisorState {
    inner: Mutex<Shared>,
}

impl SupervisorState {
    /// Creates the state at generation 0 (no invocation has started yet).
    pub fn new(sink: Box<dyn Sink>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Shared {
                current: Generation::default(),
                sink,
            }),
        })
    }

    /// Returns the current generation.
    pub async fn current(&self) -> Generation {
        self.inner.lock().await.current
    }

    /// Allocates the next generation and runs `f` on the sink under the same lock.
    pub async fn advance<F>(&self, f: F) -> Generation
    where
        F: FnOnce(&mut dyn Sink) -> io::Result<()>,
    {
        let mut shared = self.inner.lock().await;
        shared.current = shared.current.next();
        let generation = shared.current;
        if let Err(err) = f(shared.sink.as_mut()) {
            tracing::warn!(%generation, error = %err, "sink write failed");
        }
        generation
    }

    /// Runs `f` on the sink only if `generation` is still current.
    ///
    /// Returns whether `f` ran.
    pub async fn if_current<F>(&self, generation: Generation, f: F) -> bool
    where
        F: FnOnce(&mut dyn Sink) -> io::Result<()>,
    {
        let mut shared = self.inner.lock().await;
        if shared.current != generation {
            return false;
        }
        if let Err(err) = f(shared.sink.as_mut()) {
            tracing::warn!(%generation, error = %err, "sink write failed");
        }
        true
    }

    /// Runs `f` on the sink regardless of generation (title, startup housekeeping).
    pub async fn with_sink<F>(&self, f: F)
    where
        F: FnOnce(&mut dyn Sink) -> io::Result<()>,
    {
        let mut shared = self.inner.lock().await;
        if let Err(err) = f(shared.sink.as_mut()) {
            tracing::warn!(error = %err, "sink write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::testing::Recording;

    #[tokio::test]
    async fn generations_start_at_zero_and_increase() {
        let (sink, _log) = Recording::new();
        let state = SupervisorState::new(Box::new(sink));
        assert_eq!(state.current().await.get(), 0);

        let g1 = state.advance(|_| Ok(())).await;
        let g2 = state.advance(|_| Ok(())).await;
        assert_eq!(g1.get(), 1);
        assert!(g2 > g1);
        assert_eq!(state.current().await, g2);
    }

    #[tokio::test]
    async fn stale_generation_cannot_touch_the_sink() {
        let (sink, log) = Recording::new();
        let state = SupervisorState::new(Box::new(sink));
        let g1 = state.advance(|_| Ok(())).await;

        assert!(state.if_current(g1, |s| s.append(b"one")).await);
        let _g2 = state.advance(|_| Ok(())).await;
        assert!(!state.if_current(g1, |s| s.append(b"two")).await);

        assert_eq!(log.body(), "one");
    }

    #[tokio::test]
    async fn sink_errors_are_swallowed() {
        let (sink, _log) = Recording::new();
        let state = SupervisorState::new(Box::new(sink));
        let g = state
            .advance(|_| Err(io::Error::other("display went away")))
            .await;
        assert!(
            state
                .if_current(g, |_| Err(io::Error::other("still gone")))
                .await
        );
    }
}
