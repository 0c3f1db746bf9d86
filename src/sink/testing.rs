//! Recording sink for tests.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::Sink;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    Title(String),
    Clean,
    Replace(String),
    Append(Vec<u8>),
    ResetCursor,
}

#[derive(Default)]
struct Transcript {
    ops: Vec<Op>,
    body: Vec<u8>,
}

/// Sink half; moves into the supervisor state.
pub(crate) struct Recording {
    shared: Arc<Mutex<Transcript>>,
}

/// Inspection half; stays with the test.
#[derive(Clone)]
pub(crate) struct RecordingLog {
    shared: Arc<Mutex<Transcript>>,
}

impl Recording {
    pub(crate) fn new() -> (Self, RecordingLog) {
        let shared = Arc::new(Mutex::new(Transcript::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            RecordingLog { shared },
        )
    }

    fn push(&self, op: Op) {
        let mut t = self.shared.lock().unwrap();
        match &op {
            Op::Replace(text) => t.body = text.as_bytes().to_vec(),
            Op::Append(bytes) => t.body.extend_from_slice(bytes),
            _ => {}
        }
        t.ops.push(op);
    }
}

impl Sink for Recording {
    fn set_title(&mut self, title: &str) -> io::Result<()> {
        self.push(Op::Title(title.to_string()));
        Ok(())
    }

    fn mark_clean(&mut self) -> io::Result<()> {
        self.push(Op::Clean);
        Ok(())
    }

    fn replace_body(&mut self, text: &str) -> io::Result<()> {
        self.push(Op::Replace(text.to_string()));
        Ok(())
    }

    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.push(Op::Append(bytes.to_vec()));
        Ok(())
    }

    fn reset_cursor(&mut self) -> io::Result<()> {
        self.push(Op::ResetCursor);
        Ok(())
    }
}

impl RecordingLog {
    pub(crate) fn body(&self) -> String {
        String::from_utf8_lossy(&self.shared.lock().unwrap().body).into_owned()
    }

    pub(crate) fn ops(&self) -> Vec<Op> {
        self.shared.lock().unwrap().ops.clone()
    }

    /// Number of times `needle` has been appended or printed as a header.
    pub(crate) fn count(&self, needle: &str) -> usize {
        self.ops()
            .iter()
            .map(|op| match op {
                Op::Replace(text) => text.matches(needle).count(),
                Op::Append(bytes) => String::from_utf8_lossy(bytes).matches(needle).count(),
                _ => 0,
            })
            .sum()
    }

    /// Polls until the body contains `needle` or five seconds pass.
    pub(crate) async fn wait_for(&self, needle: &str) -> bool {
        for _ in 0..500 {
            if self.body().contains(needle) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}
