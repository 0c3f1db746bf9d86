//! Filesystem notifications from a recursive `notify` watcher.
//!
//! The watcher callback runs on notify's own thread and bridges into tokio
//! through a bounded channel with `try_send`: a flood of events is dropped at
//! the bridge instead of growing memory, which the debouncer tolerates because
//! one qualifying notification per burst is enough.

use std::path::Path;

use async_trait::async_trait;
use notify::event::{AccessKind, AccessMode, CreateKind, ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::{Notification, NotificationSource, Op};
use crate::error::WatchError;

type Item = Result<Notification, notify::Error>;

/// Recursive watcher over one root directory.
pub struct FsSource {
    rx: mpsc::Receiver<Item>,
    // Dropping the watcher stops the callback.
    _watcher: RecommendedWatcher,
}

impl FsSource {
    /// Starts watching `root` recursively.
    pub fn watch(root: &Path, capacity: usize) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel::<Item>(capacity.max(1));
        let setup = |source| WatchError::Watch {
            root: root.display().to_string(),
            source,
        };

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let items: Vec<Item> = match res {
                Ok(event) => notifications(event).into_iter().map(Ok).collect(),
                Err(err) => vec![Err(err)],
            };
            for item in items {
                if tx.try_send(item).is_err() {
                    tracing::trace!("notification bridge full, dropping event");
                }
            }
        })
        .map_err(setup)?;
        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(setup)?;

        tracing::debug!(root = %root.display(), "watching");
        Ok(Self {
            rx,
            _watcher: watcher,
        })
    }
}

#[async_trait]
impl NotificationSource for FsSource {
    async fn next(&mut self) -> Result<Notification, WatchError> {
        match self.rx.recv().await {
            Some(Ok(n)) => Ok(n),
            Some(Err(source)) => Err(WatchError::Notify { source }),
            None => Err(WatchError::stream("watcher closed")),
        }
    }
}

/// Splits one notify event into per-path notifications.
///
/// For a two-path rename only the destination commits content.
fn notifications(event: notify::Event) -> Vec<Notification> {
    let op = classify(&event.kind);
    let both = matches!(
        event.kind,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both))
    );
    let last = event.paths.len().saturating_sub(1);
    event
        .paths
        .into_iter()
        .enumerate()
        .map(|(i, path)| {
            let op = if both && i != last { Op::Other } else { op };
            Notification::new(path, op)
        })
        .collect()
}

fn classify(kind: &EventKind) -> Op {
    match kind {
        EventKind::Create(CreateKind::File | CreateKind::Any)
        | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both))
        | EventKind::Access(AccessKind::Close(AccessMode::Write)) => Op::Put,
        _ => Op::Other,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use notify::event::{DataChange, MetadataKind, RemoveKind};

    use super::*;

    fn event(kind: EventKind, paths: &[&str]) -> notify::Event {
        paths
            .iter()
            .fold(notify::Event::new(kind), |ev, p| ev.add_path(PathBuf::from(p)))
    }

    #[test]
    fn content_changes_are_puts() {
        let kinds = [
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            EventKind::Access(AccessKind::Close(AccessMode::Write)),
            EventKind::Create(CreateKind::File),
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
        ];
        for kind in kinds {
            let ns = notifications(event(kind, &["/r/a.go"]));
            assert_eq!(ns.len(), 1);
            assert_eq!(ns[0].op, Op::Put, "{kind:?}");
        }
    }

    #[test]
    fn metadata_and_removal_are_other() {
        for kind in [
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            EventKind::Remove(RemoveKind::File),
            EventKind::Access(AccessKind::Read),
        ] {
            let ns = notifications(event(kind, &["/r/a.go"]));
            assert_eq!(ns[0].op, Op::Other, "{kind:?}");
        }
    }

    #[test]
    fn rename_commits_only_the_destination() {
        let ns = notifications(event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/r/.a.go.swp", "/r/a.go"],
        ));
        assert_eq!(ns[0].op, Op::Other);
        assert_eq!(ns[1].op, Op::Put);
        assert_eq!(ns[1].path, PathBuf::from("/r/a.go"));
    }

    #[tokio::test]
    async fn watcher_errors_keep_their_cause() {
        use std::error::Error as _;

        let (tx, rx) = mpsc::channel::<Item>(1);
        let dir = tempfile::tempdir().unwrap();
        let mut source = FsSource::watch(dir.path(), 1).unwrap();
        source.rx = rx;
        tx.send(Err(notify::Error::generic("queue overflow")))
            .await
            .unwrap();

        let err = source.next().await.unwrap_err();
        assert_eq!(err.as_label(), "watch_source");
        let cause = err.source().unwrap();
        assert!(cause.downcast_ref::<notify::Error>().is_some());
        assert_eq!(cause.to_string(), "queue overflow");

        drop(tx);
        let err = source.next().await.unwrap_err();
        assert!(err.to_string().contains("watcher closed"));
    }

    #[tokio::test]
    async fn writes_under_the_root_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let mut source = FsSource::watch(&root, 64).unwrap();

        std::fs::write(root.join("main.go"), "package main\n").unwrap();

        let found = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let n = source.next().await.unwrap();
                if n.op == Op::Put && n.path.ends_with("main.go") {
                    return n;
                }
            }
        })
        .await
        .expect("no put notification for main.go");
        assert!(found.path.starts_with(&root));
    }
}
