//! Trigger context: the reason one coalesced restart happened.

use std::path::{Path, PathBuf};

/// Subject and source window of a restart.
///
/// Empty for manual restarts ("run again" from the display). Immutable once
/// built; ownership moves from the debouncer to the supervisor with the signal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerContext {
    subject: Option<PathBuf>,
    window: Option<u64>,
}

impl TriggerContext {
    /// Context of a user-initiated restart with no specific subject.
    pub fn manual() -> Self {
        Self::default()
    }

    /// Context for a change to `subject`.
    pub fn for_subject(subject: impl Into<PathBuf>) -> Self {
        Self {
            subject: Some(subject.into()),
            window: None,
        }
    }

    /// Attaches the identifier of the window or session that produced the change.
    pub fn with_window(mut self, window: u64) -> Self {
        self.window = Some(window);
        self
    }

    pub fn subject(&self) -> Option<&Path> {
        self.subject.as_deref()
    }

    pub fn window(&self) -> Option<u64> {
        self.window
    }

    /// True when the context carries neither a subject nor a window.
    pub fn is_manual(&self) -> bool {
        self.subject.is_none() && self.window.is_none()
    }

    /// Subject rendered for logs; empty for manual restarts.
    pub(crate) fn label(&self) -> String {
        self.subject
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_context_is_empty() {
        let ctx = TriggerContext::manual();
        assert!(ctx.is_manual());
        assert_eq!(ctx.subject(), None);
        assert_eq!(ctx.label(), "");
    }

    #[test]
    fn subject_and_window_are_kept() {
        let ctx = TriggerContext::for_subject("/a/b.go").with_window(7);
        assert!(!ctx.is_manual());
        assert_eq!(ctx.subject(), Some(Path::new("/a/b.go")));
        assert_eq!(ctx.window(), Some(7));
    }
}
