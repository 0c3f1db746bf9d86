//! Restart-supervision core.
//!
//! Internal modules:
//! - [`context`]: what caused a restart;
//! - [`debounce`]: single-slot restart channel, burst coalescing and notification filter;
//! - [`generation`]: generation counter and the sink it guards;
//! - [`env`]: per-invocation environment;
//! - [`invocation`]: command line and process start;
//! - [`supervisor`]: the restart loop;
//! - [`relay`]: per-invocation output forwarding with stale discard;
//! - [`shutdown`]: OS termination signals.

mod context;
mod debounce;
mod env;
mod generation;
mod invocation;
mod relay;
mod shutdown;
mod supervisor;

pub use context::TriggerContext;
pub use debounce::{Debouncer, EventFilter, RestartReceiver, RestartSender, restart_channel};
pub use env::{SUBJECT_ALIAS_VAR, SUBJECT_FILE_VAR, WINDOW_ID_VAR, build_env};
pub use generation::{Generation, SupervisorState};
pub use invocation::{CommandLine, Invocation, OutputStream};
pub use relay::{END_OF_RUN, OutputRelay};
pub use shutdown::wait_for_shutdown_signal;
pub use supervisor::{ProcessSupervisor, SupervisorParams};
