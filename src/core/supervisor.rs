//! # Process supervisor: one command invocation per restart signal.
//!
//! The [`ProcessSupervisor`] is the only consumer of the restart channel and the
//! only component that advances the generation counter.
//!
//! ## High-level architecture
//! ```text
//! RestartReceiver::recv() ──► TriggerContext
//!        │
//!        ├─► previous run token.cancel()            → relay kills old process (no wait)
//!        ├─► SupervisorState::advance(header)       → generation g, sink shows "$ <cmd>"
//!        ├─► build_env(ambient, ctx)
//!        ├─► Invocation::start(cmd, env, capture, g)
//!        │       ├─ Err → "<cmd>: <error>" line (gated on g), RunStartFailed
//!        │       └─ Ok  → RunStarted, relays.spawn(OutputRelay::run(inv, run token))
//!        └─► loop
//!
//! Shutdown (runtime token or closed channel):
//!   cancel last run token → wait relays up to `grace` → abort the rest
//! ```
//!
//! ## Rules
//! - Starts are totally ordered; generations strictly increase.
//! - Termination of the previous invocation is requested, never awaited: there is
//!   at most one *current* invocation, not at most one live process.
//! - Per-invocation failures are written to the sink and never end the loop.

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::debounce::RestartReceiver;
use super::env::build_env;
use super::generation::{Generation, SupervisorState};
use super::invocation::{CommandLine, Invocation};
use super::relay::OutputRelay;
use crate::core::TriggerContext;
use crate::events::{Bus, Event, EventKind};

/// Tunables for [`ProcessSupervisor`].
#[derive(Clone, Copy, Debug)]
pub struct SupervisorParams {
    /// Route combined output through a relay (`false` inherits the terminal).
    pub capture: bool,
    /// Relay read buffer size.
    pub chunk_size: usize,
    /// How long shutdown waits for relays to finish.
    pub grace: Duration,
}

/// Restarts the target command on every restart signal.
pub struct ProcessSupervisor {
    state: Arc<SupervisorState>,
    bus: Bus,
    command: Arc<CommandLine>,
    ambient: Vec<(OsString, OsString)>,
    params: SupervisorParams,
}

impl ProcessSupervisor {
    /// Creates a supervisor whose invocations inherit the current process environment.
    pub fn new(
        state: Arc<SupervisorState>,
        bus: Bus,
        command: CommandLine,
        params: SupervisorParams,
    ) -> Self {
        Self {
            state,
            bus,
            command: Arc::new(command),
            ambient: std::env::vars_os().collect(),
            params,
        }
    }

    /// Replaces the ambient environment handed to [`build_env`].
    pub fn with_ambient<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        self.ambient = vars.into_iter().collect();
        self
    }

    /// Consumes restart signals until `token` is cancelled or every sender is gone.
    pub async fn run(self, mut signals: RestartReceiver, token: CancellationToken) {
        let mut previous: Option<(Generation, CancellationToken)> = None;
        let mut relays = JoinSet::new();

        loop {
            let ctx = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                next = signals.recv() => match next {
                    Some(ctx) => ctx,
                    None => break,
                },
            };
            while relays.try_join_next().is_some() {}

            if let Some((old, cancel)) = previous.take() {
                cancel.cancel();
                self.bus.publish(
                    Event::new(EventKind::RunSuperseded).with_generation(old.get()),
                );
            }

            let run = token.child_token();
            if let Some(invocation) = self.start(&ctx).await {
                previous = Some((invocation.generation, run.clone()));
                let relay = OutputRelay::new(
                    Arc::clone(&self.state),
                    self.bus.clone(),
                    Arc::clone(&self.command),
                    self.params.chunk_size,
                );
                relays.spawn(relay.run(invocation, run));
            }
        }

        if let Some((_, cancel)) = previous.take() {
            cancel.cancel();
        }
        let drained = async { while relays.join_next().await.is_some() {} };
        if tokio::time::timeout(self.params.grace, drained).await.is_err() {
            tracing::warn!(
                grace = ?self.params.grace,
                remaining = relays.len(),
                "relays still running after grace, aborting"
            );
            relays.abort_all();
        }
        let last = self.state.current().await;
        tracing::debug!(last = %last, "supervisor stopped");
    }

    /// Allocates a generation and launches the command for `ctx`.
    async fn start(&self, ctx: &TriggerContext) -> Option<Invocation> {
        let header = format!("$ {}\n", self.command);
        let generation = self
            .state
            .advance(|sink| {
                sink.replace_body(&header)?;
                sink.mark_clean()
            })
            .await;

        let starting = Event::new(EventKind::RunStarting).with_generation(generation.get());
        self.bus.publish(match ctx.subject() {
            Some(path) => starting.with_subject(path.display().to_string()),
            None if ctx.is_manual() => starting.with_reason("manual"),
            None => starting,
        });

        let env = build_env(self.ambient.iter().cloned(), Some(ctx));
        match Invocation::start(&self.command, &env, self.params.capture, generation) {
            Ok(invocation) => {
                let started = Event::new(EventKind::RunStarted).with_generation(generation.get());
                self.bus.publish(match invocation.pid() {
                    Some(pid) => started.with_pid(pid),
                    None => started,
                });
                Some(invocation)
            }
            Err(err) => {
                let line = format!("{}: {err}\n", self.command);
                self.state
                    .if_current(generation, |sink| sink.append(line.as_bytes()))
                    .await;
                self.bus.publish(
                    Event::new(EventKind::RunStartFailed)
                        .with_generation(generation.get())
                        .with_reason(err.to_string()),
                );
                None
            }
        }
    }
}
