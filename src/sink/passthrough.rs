use std::io::{self, Stdout, Write};

use super::Sink;

/// Sink for terminal mode: commands write straight to the inherited
/// descriptors, so only headers, error lines and end-of-run markers pass here.
pub struct Passthrough<W: Write + Send + 'static = Stdout> {
    out: W,
}

impl Passthrough<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + 'static> Passthrough<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send + 'static> Sink for Passthrough<W> {
    fn set_title(&mut self, _title: &str) -> io::Result<()> {
        Ok(())
    }

    fn mark_clean(&mut self) -> io::Result<()> {
        Ok(())
    }

    // The terminal keeps its scrollback; the new header is just printed.
    fn replace_body(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.out.flush()
    }

    fn reset_cursor(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::{END_OF_RUN, SupervisorState};

    #[test]
    fn header_output_and_marker_are_printed_in_order() {
        let mut sink = Passthrough::new(Vec::new());
        sink.set_title("/src/proj/+watch").unwrap();
        sink.replace_body("$ make\n").unwrap();
        sink.mark_clean().unwrap();
        sink.append(b"make: nothing to be done\n").unwrap();
        sink.append(END_OF_RUN).unwrap();
        sink.reset_cursor().unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "$ make\nmake: nothing to be done\n$\n");
    }

    #[test]
    fn headers_accumulate_instead_of_clearing() {
        let mut sink = Passthrough::new(Vec::new());
        sink.replace_body("$ make\n").unwrap();
        sink.append(END_OF_RUN).unwrap();
        sink.replace_body("$ make\n").unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "$ make\n$\n$ make\n");
    }

    #[tokio::test]
    async fn stale_generations_do_not_reach_the_terminal() {
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Shared(Arc<Mutex<Vec<u8>>>);

        impl Write for Shared {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let out = Shared::default();
        let state = SupervisorState::new(Box::new(Passthrough::new(out.clone())));
        let first = state.advance(|sink| sink.replace_body("$ go test\n")).await;
        let second = state.advance(|sink| sink.replace_body("$ go test\n")).await;
        assert_eq!(second.get(), 2);

        assert!(!state.if_current(first, |sink| sink.append(END_OF_RUN)).await);
        assert!(state.if_current(second, |sink| sink.append(END_OF_RUN)).await);

        let printed = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert_eq!(printed, "$ go test\n$ go test\n$\n");
    }
}
