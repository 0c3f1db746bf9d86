//! # Watch: wires the source, debouncer, supervisor, relays and sink together.
//!
//! ```text
//! NotificationSource ──► EventFilter ──► Debouncer ──┐
//!                                                    ├──► [restart slot] ──► ProcessSupervisor ──► OutputRelay ──► Sink
//! Console (Rerun) ───────────────────────────────────┘
//!
//! Bus ──► listener ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ## Shutdown
//! An OS termination signal, a console close action or cancellation of
//! [`Watch::token`] cancels the runtime token. The supervisor then kills the
//! current invocation and gives relays `grace` to finish. A failure of the
//! notification source ends the session with an error.

use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, OutputMode};
use crate::core::{
    CommandLine, Debouncer, ProcessSupervisor, RestartSender, SupervisorParams, SupervisorState,
    TriggerContext, restart_channel, wait_for_shutdown_signal,
};
use crate::error::WatchError;
use crate::events::{Bus, Event, EventKind};
use crate::sink::{Console, Control, Display, Passthrough, Sink};
use crate::source::{FsSource, NotificationSource};
use crate::subscribers::{LogWriter, Subscribe, SubscriberSet};

/// One watch session.
pub struct Watch {
    cfg: Config,
    command: CommandLine,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    token: CancellationToken,
    handle_signals: bool,
}

impl Watch {
    /// Creates a session with the [`LogWriter`] subscriber installed.
    pub fn new(cfg: Config) -> Result<Self, WatchError> {
        cfg.validate()?;
        let command = cfg.command_line().ok_or_else(|| WatchError::Usage {
            reason: "no command given".into(),
        })?;
        Ok(Self {
            bus: Bus::new(cfg.bus_capacity),
            cfg,
            command,
            subscribers: vec![Arc::new(LogWriter::new())],
            token: CancellationToken::new(),
            handle_signals: true,
        })
    }

    /// Adds a subscriber for lifecycle events.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Leaves OS signals to the embedder; only [`Watch::token`] ends the session.
    pub fn without_signal_handlers(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    /// Lifecycle event bus of this session.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runtime token; cancelling it shuts the session down.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Runs with the filesystem source and the sink selected by [`Config::output`].
    pub async fn run(self) -> Result<(), WatchError> {
        let source = FsSource::watch(&self.cfg.root, self.cfg.source_capacity)?;
        match self.cfg.output {
            OutputMode::Display => {
                let sink = Display::open()?;
                self.run_with(source, Box::new(sink), Some(Console::stdin()))
                    .await
            }
            OutputMode::Terminal => {
                self.run_with(
                    source,
                    Box::new(Passthrough::stdout()),
                    None::<Console<tokio::io::Stdin>>,
                )
                .await
            }
        }
    }

    /// Runs until shutdown with explicit collaborators.
    ///
    /// The command runs once immediately, then again for every qualifying burst
    /// of notifications and every rerun action read from `controls`.
    pub async fn run_with<S, R>(
        self,
        source: S,
        sink: Box<dyn Sink>,
        controls: Option<Console<R>>,
    ) -> Result<(), WatchError>
    where
        S: NotificationSource,
        R: AsyncRead + Unpin + Send + 'static,
    {
        let listener_done = CancellationToken::new();
        let listener = self.subscriber_listener(listener_done.clone());

        let state = SupervisorState::new(sink);
        let title = self.cfg.title();
        state.with_sink(|sink| sink.set_title(&title)).await;

        let (signals, rx) = restart_channel(self.bus.clone());
        let supervisor = ProcessSupervisor::new(
            state,
            self.bus.clone(),
            self.command.clone(),
            SupervisorParams {
                capture: self.cfg.output.captures(),
                chunk_size: self.cfg.chunk_size(),
                grace: self.cfg.grace,
            },
        );
        let supervising = tokio::spawn(supervisor.run(rx, self.token.clone()));

        signals.offer(TriggerContext::manual());
        if let Some(console) = controls {
            tokio::spawn(control_loop(
                console,
                signals.clone(),
                self.token.clone(),
                self.bus.clone(),
            ));
        }

        let result = self.read_loop(source, signals).await;
        if let Err(err) = &result {
            tracing::error!(label = err.as_label(), error = %err, "watch failed");
        }

        self.token.cancel();
        if let Err(err) = supervising.await {
            tracing::warn!(error = %err, "supervisor task ended abnormally");
        }
        listener_done.cancel();
        let _ = listener.await;
        result
    }

    /// Feeds qualifying notifications to the debouncer until shutdown.
    async fn read_loop<S>(&self, mut source: S, signals: RestartSender) -> Result<(), WatchError>
    where
        S: NotificationSource,
    {
        let filter = self.cfg.event_filter();
        let mut debouncer = Debouncer::new(signals, self.cfg.quiescence);
        let handle_signals = self.handle_signals;
        let shutdown = async move {
            if handle_signals {
                wait_for_shutdown_signal().await
            } else {
                std::future::pending().await
            }
        };
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => return Ok(()),
                signal = &mut shutdown => {
                    let name = signal?;
                    self.bus.publish(Event::new(EventKind::ShutdownRequested).with_reason(name));
                    return Ok(());
                }
                next = source.next() => {
                    let notification = next?;
                    if filter.qualifies(&notification) {
                        debouncer.notify(notification.context(), notification.at).await;
                    } else {
                        tracing::trace!(path = %notification.path.display(), "notification ignored");
                    }
                }
            }
        }
    }

    /// Forwards bus events to the subscriber set until `done` fires.
    fn subscriber_listener(&self, done: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let set = SubscriberSet::new(self.subscribers.clone(), self.bus.clone());
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    ev = rx.recv() => match ev {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "event listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = done.cancelled() => break,
                }
            }
            while let Ok(ev) = rx.try_recv() {
                set.emit(&ev);
            }
            set.shutdown().await;
        })
    }
}

/// Translates console actions; never blocks on the restart channel.
async fn control_loop<R>(
    mut console: Console<R>,
    signals: RestartSender,
    token: CancellationToken,
    bus: Bus,
) where
    R: AsyncRead + Unpin,
{
    loop {
        let control = tokio::select! {
            _ = token.cancelled() => return,
            control = console.next() => control,
        };
        match control {
            Some(Control::Rerun) => {
                signals.offer(TriggerContext::manual());
            }
            Some(Control::Close) => {
                bus.publish(Event::new(EventKind::ShutdownRequested).with_reason("close"));
                token.cancel();
                return;
            }
            None => {
                tracing::debug!("control input closed");
                return;
            }
        }
    }
}
