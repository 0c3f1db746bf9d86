//! Command-line interface of the `watch` binary.
//!
//! ```text
//! watch [-only <pattern>] [-t] [--exclude <pattern>] [--delay <ms>] [-v|-q] <command> [args...]
//! ```
//!
//! Long options also accept a single dash (`-only '\.go$'`). Everything from
//! the first positional word on belongs to the command, so `watch go test -v`
//! hands `-v` to `go`.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use regex::Regex;

use crate::config::{Config, OutputMode};
use crate::error::WatchError;
use crate::logging::Verbosity;

/// Long options that may be spelled with one dash.
const LONG_OPTIONS: [&str; 5] = ["only", "exclude", "delay", "verbose", "quiet"];
/// Options that consume the following word as their value.
const VALUE_OPTIONS: [&str; 3] = ["--only", "--exclude", "--delay"];

#[derive(Parser, Debug)]
#[command(name = "watch")]
#[command(about = "Run a command, and run it again whenever files under the current directory change")]
#[command(version)]
pub struct Cli {
    /// Only react to files whose base name matches this regex
    #[arg(long, value_name = "PATTERN")]
    pub only: Option<String>,

    /// Run the command in this terminal instead of a managed display
    #[arg(short = 't')]
    pub terminal: bool,

    /// Ignore changes whose path (relative to the root) matches this regex; '' disables
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Option<String>,

    /// Quiescence window in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay: Option<u64>,

    /// Log lifecycle events at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to run, with its arguments
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl Cli {
    /// Parses `args` (binary name first) after rewriting single-dash long options.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args.into_iter().map(Into::into)))
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    /// Builds the runtime configuration rooted at the current directory.
    pub fn into_config(self) -> Result<Config, WatchError> {
        let root = std::env::current_dir()
            .and_then(|dir| dir.canonicalize())
            .map_err(|err| WatchError::Usage {
                reason: format!("cannot resolve current directory: {err}"),
            })?;
        self.into_config_at(root)
    }

    pub(crate) fn into_config_at(self, root: PathBuf) -> Result<Config, WatchError> {
        let mut cfg = Config {
            command: self.command,
            root,
            ..Config::default()
        };
        if let Some(only) = self.only {
            cfg.pattern = Some(compile("-only", &only)?);
        }
        match self.exclude.as_deref() {
            Some("") => cfg.exclude = None,
            Some(exclude) => cfg.exclude = Some(compile("--exclude", exclude)?),
            None => {}
        }
        if let Some(ms) = self.delay {
            cfg.quiescence = Duration::from_millis(ms);
        }
        if self.terminal {
            cfg.output = OutputMode::Terminal;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn compile(option: &str, pattern: &str) -> Result<Regex, WatchError> {
    Regex::new(pattern).map_err(|err| WatchError::Usage {
        reason: format!("invalid {option} pattern: {err}"),
    })
}

/// Rewrites `-only x` / `-only=x` style options to `--only` before the first
/// positional word; the command's own arguments are left untouched.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let mut out: Vec<OsString> = iter.next().into_iter().collect();
    let mut value_next = false;

    while let Some(arg) = iter.next() {
        if value_next {
            out.push(arg);
            value_next = false;
            continue;
        }
        let Some(word) = arg.to_str() else {
            out.push(arg);
            out.extend(iter);
            break;
        };
        if word == "--" || word == "-" || !word.starts_with('-') {
            out.push(arg);
            out.extend(iter);
            break;
        }

        let word = match word.strip_prefix('-') {
            Some(rest)
                if !rest.starts_with('-')
                    && LONG_OPTIONS.contains(&rest.split('=').next().unwrap_or(rest)) =>
            {
                format!("-{word}")
            }
            _ => word.to_string(),
        };
        value_next = !word.contains('=') && VALUE_OPTIONS.contains(&word.as_str());
        out.push(word.into());
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn normalized(args: &[&str]) -> Vec<String> {
        normalize_args(args.iter().map(OsString::from))
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_args(args).unwrap()
    }

    #[test]
    fn single_dash_long_options_are_rewritten() {
        assert_eq!(
            normalized(&["watch", "-only", r"\.go$", "-t", "go", "test"]),
            ["watch", "--only", r"\.go$", "-t", "go", "test"]
        );
        assert_eq!(
            normalized(&["watch", "-delay=50", "make"]),
            ["watch", "--delay=50", "make"]
        );
    }

    #[test]
    fn command_arguments_are_left_alone() {
        assert_eq!(
            normalized(&["watch", "grep", "-only", "x"]),
            ["watch", "grep", "-only", "x"]
        );
        // A value that looks like an option is still a value.
        assert_eq!(
            normalized(&["watch", "-exclude", "-only", "ls"]),
            ["watch", "--exclude", "-only", "ls"]
        );
    }

    #[test]
    fn trailing_flags_belong_to_the_command() {
        let cli = parse(&["watch", "-v", "go", "test", "-v", "./..."]);
        assert!(cli.verbose);
        assert_eq!(cli.command, ["go", "test", "-v", "./..."]);
    }

    #[test]
    fn options_map_into_config() {
        let cli = parse(&["watch", "-only", r"\.go$", "-t", "--delay", "250", "--exclude", "", "go", "vet"]);
        let cfg = cli.into_config_at(PathBuf::from("/src/proj")).unwrap();

        assert_eq!(cfg.command, ["go", "vet"]);
        let pattern = cfg.pattern.as_ref().unwrap();
        assert!(pattern.is_match("main.go"));
        assert!(!pattern.is_match("main.rs"));
        assert!(cfg.exclude.is_none());
        assert_eq!(cfg.quiescence, Duration::from_millis(250));
        assert_eq!(cfg.output, OutputMode::Terminal);
        assert_eq!(cfg.root, PathBuf::from("/src/proj"));
    }

    #[test]
    fn missing_command_is_a_usage_error() {
        let err = Cli::try_parse_args(["watch", "-t"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn invalid_pattern_is_a_usage_error() {
        let err = parse(&["watch", "-only", "(", "make"])
            .into_config_at(PathBuf::from("/"))
            .unwrap_err();
        assert_eq!(err.as_label(), "watch_usage");
        assert_eq!(err.exit_code(), 2);
    }
}
