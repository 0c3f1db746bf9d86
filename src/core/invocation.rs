//! # Invocation: one running execution of the target command.
//!
//! Combined stdout and stderr share a single OS pipe so the relay reads them
//! in the order the command wrote them. The parent's copies of the write end
//! are closed right after spawning; the read end reports end-of-data once the
//! command (and anything it forked that kept the descriptor) has exited.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::fs::File;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use super::generation::Generation;

/// Program and arguments of the supervised command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    argv: Vec<String>,
}

impl CommandLine {
    /// Returns `None` for an empty argument vector.
    pub fn new(argv: Vec<String>) -> Option<Self> {
        if argv.is_empty() {
            None
        } else {
            Some(Self { argv })
        }
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}

/// Read end of an invocation's combined output.
pub type OutputStream = File;

/// A started command bound to its generation.
pub struct Invocation {
    pub generation: Generation,
    pub(crate) child: Child,
    /// `None` when the command inherited the terminal.
    pub(crate) output: Option<OutputStream>,
}

impl Invocation {
    /// Spawns `command` with exactly `env` as its environment.
    ///
    /// With `capture` the command's stdout and stderr go into one pipe and its
    /// stdin is closed; otherwise all three are inherited from the supervisor.
    pub fn start(
        command: &CommandLine,
        env: &BTreeMap<OsString, OsString>,
        capture: bool,
        generation: Generation,
    ) -> io::Result<Self> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.args())
            .env_clear()
            .envs(env)
            .kill_on_drop(true);

        let reader = if capture {
            let (reader, writer) = os_pipe::pipe()?;
            let writer_err = writer.try_clone()?;
            cmd.stdin(Stdio::null()).stdout(writer).stderr(writer_err);
            Some(reader)
        } else {
            None
        };

        let child = cmd.spawn()?;
        // `cmd` still owns the write ends; the relay would never see EOF.
        drop(cmd);

        Ok(Self {
            generation,
            child,
            output: reader.map(into_async),
        })
    }

    /// OS process id, if the process has not been reaped yet.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

/// Waits for `child` to exit, killing it first once `cancel` fires.
///
/// The kill is a request: the status arrives whenever the OS reaps the process.
pub(crate) async fn wait_or_kill(
    child: &mut Child,
    cancel: &CancellationToken,
) -> io::Result<ExitStatus> {
    tokio::select! {
        status = child.wait() => status,
        _ = cancel.cancelled() => {
            if let Err(err) = child.start_kill() {
                tracing::debug!(error = %err, "kill failed, process already gone");
            }
            child.wait().await
        }
    }
}

#[cfg(unix)]
fn into_async(reader: os_pipe::PipeReader) -> OutputStream {
    let fd = std::os::fd::OwnedFd::from(reader);
    File::from_std(std::fs::File::from(fd))
}

#[cfg(windows)]
fn into_async(reader: os_pipe::PipeReader) -> OutputStream {
    let handle = std::os::windows::io::OwnedHandle::from(reader);
    File::from_std(std::fs::File::from(handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        assert!(CommandLine::new(Vec::new()).is_none());
    }

    #[test]
    fn command_line_renders_like_a_shell_prompt() {
        let cmd = CommandLine::new(vec!["go".into(), "test".into(), "./...".into()]).unwrap();
        assert_eq!(cmd.program(), "go");
        assert_eq!(cmd.args(), ["test", "./..."]);
        assert_eq!(cmd.to_string(), "go test ./...");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captured_output_combines_stdout_and_stderr() {
        use tokio::io::AsyncReadExt;

        let cmd = CommandLine::new(vec![
            "sh".into(),
            "-c".into(),
            "echo out; echo err >&2; echo \"$samfile\"".into(),
        ])
        .unwrap();
        let env = BTreeMap::from([
            (OsString::from("PATH"), std::env::var_os("PATH").unwrap_or_default()),
            (OsString::from("samfile"), OsString::from("/a/b.go")),
        ]);

        let mut inv = Invocation::start(&cmd, &env, true, Generation::default()).unwrap();
        let mut text = String::new();
        inv.output
            .take()
            .unwrap()
            .read_to_string(&mut text)
            .await
            .unwrap();
        let status = inv.child.wait().await.unwrap();

        assert!(status.success());
        assert_eq!(text, "out\nerr\n/a/b.go\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancellation_kills_the_process() {
        let cmd = CommandLine::new(vec!["sleep".into(), "30".into()]).unwrap();
        let env = BTreeMap::from([(
            OsString::from("PATH"),
            std::env::var_os("PATH").unwrap_or_default(),
        )]);
        let mut inv = Invocation::start(&cmd, &env, false, Generation::default()).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let status = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            wait_or_kill(&mut inv.child, &cancel),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(!status.success());
    }

    #[test]
    fn missing_program_fails_to_start() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = rt.enter();
        let cmd = CommandLine::new(vec!["/nonexistent/watch-no-such-binary".into()]).unwrap();
        let err = Invocation::start(&cmd, &BTreeMap::new(), true, Generation::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
