//! Per-invocation environment.
//!
//! The command sees the supervisor's environment with three reserved keys
//! replaced by values derived from the trigger:
//!
//! | key         | value                    |
//! |-------------|--------------------------|
//! | `samfile`   | subject path             |
//! | `%`         | subject path (short alias) |
//! | `winid`     | source window id         |
//!
//! The reserved keys are always stripped from the ambient environment first,
//! so a value inherited by the supervisor never reaches a run it did not cause.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

use super::context::TriggerContext;

/// Key holding the full subject path.
pub const SUBJECT_FILE_VAR: &str = "samfile";
/// Short alias of [`SUBJECT_FILE_VAR`].
pub const SUBJECT_ALIAS_VAR: &str = "%";
/// Key holding the source window id.
pub const WINDOW_ID_VAR: &str = "winid";

const RESERVED: [&str; 3] = [SUBJECT_FILE_VAR, SUBJECT_ALIAS_VAR, WINDOW_ID_VAR];

/// Builds the environment for one invocation from `ambient` and `ctx`.
pub fn build_env<I, K, V>(ambient: I, ctx: Option<&TriggerContext>) -> BTreeMap<OsString, OsString>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
{
    let mut env: BTreeMap<OsString, OsString> = ambient
        .into_iter()
        .map(|(k, v)| -> (OsString, OsString) { (k.into(), v.into()) })
        .filter(|(k, _)| !RESERVED.iter().any(|r| k.as_os_str() == OsStr::new(r)))
        .collect();

    let Some(ctx) = ctx else {
        return env;
    };
    if let Some(subject) = ctx.subject() {
        env.insert(SUBJECT_FILE_VAR.into(), subject.as_os_str().to_owned());
        env.insert(SUBJECT_ALIAS_VAR.into(), subject.as_os_str().to_owned());
    }
    if let Some(window) = ctx.window() {
        env.insert(WINDOW_ID_VAR.into(), window.to_string().into());
    }
    env
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ambient() -> Vec<(&'static str, &'static str)> {
        vec![
            ("HOME", "/home/gopher"),
            ("PATH", "/usr/bin"),
            ("samfile", "/stale/file.go"),
            ("winid", "99"),
        ]
    }

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<OsString, OsString> {
        pairs.iter().map(|(k, v)| ((*k).into(), (*v).into())).collect()
    }

    #[test]
    fn context_overwrites_reserved_keys() {
        let ctx = TriggerContext::for_subject("/a/b.go").with_window(7);
        let env = build_env(ambient(), Some(&ctx));
        assert_eq!(
            env,
            map(&[
                ("%", "/a/b.go"),
                ("HOME", "/home/gopher"),
                ("PATH", "/usr/bin"),
                ("samfile", "/a/b.go"),
                ("winid", "7"),
            ])
        );
    }

    #[test]
    fn no_context_strips_reserved_keys() {
        let env = build_env(ambient(), None);
        assert_eq!(env, map(&[("HOME", "/home/gopher"), ("PATH", "/usr/bin")]));
    }

    #[test]
    fn manual_context_adds_nothing() {
        let env = build_env(ambient(), Some(&TriggerContext::manual()));
        assert_eq!(env, map(&[("HOME", "/home/gopher"), ("PATH", "/usr/bin")]));
    }

    #[test]
    fn subject_without_window_leaves_winid_absent() {
        let ctx = TriggerContext::for_subject("/a/b.go");
        let env = build_env(Vec::<(String, String)>::new(), Some(&ctx));
        assert_eq!(env, map(&[("%", "/a/b.go"), ("samfile", "/a/b.go")]));
    }
}
