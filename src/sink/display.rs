use std::io::{self, IsTerminal, Stdout, Write};

use crossterm::{
    cursor::{MoveTo, Show},
    queue,
    style::Print,
    terminal::{Clear, ClearType, SetTitle},
};

use super::Sink;
use crate::error::WatchError;

/// Managed terminal view.
///
/// Each run starts on a cleared screen. The terminal title carries the
/// display name with a `*` suffix while the body holds unacknowledged output.
pub struct Display<W: Write + Send + 'static> {
    out: W,
    title: String,
    modified: bool,
}

impl Display<Stdout> {
    /// Opens the display on stdout, which must be a terminal.
    pub fn open() -> Result<Self, WatchError> {
        let out = io::stdout();
        if !out.is_terminal() {
            return Err(WatchError::Display(io::Error::other(
                "stdout is not a terminal (use -t to write output directly)",
            )));
        }
        Ok(Self::new(out))
    }
}

impl<W: Write + Send + 'static> Display<W> {
    /// Wraps an arbitrary writer.
    pub fn new(out: W) -> Self {
        Self {
            out,
            title: String::new(),
            modified: false,
        }
    }

    fn render_title(&mut self) -> io::Result<()> {
        let marker = if self.modified { " *" } else { "" };
        queue!(self.out, SetTitle(format!("{}{marker}", self.title)))
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send + 'static> Sink for Display<W> {
    fn set_title(&mut self, title: &str) -> io::Result<()> {
        self.title = title.to_string();
        self.render_title()?;
        self.out.flush()
    }

    fn mark_clean(&mut self) -> io::Result<()> {
        if self.modified {
            self.modified = false;
            self.render_title()?;
        }
        self.out.flush()
    }

    fn replace_body(&mut self, text: &str) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0), Print(text))?;
        self.out.flush()
    }

    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        if !self.modified {
            self.modified = true;
            self.render_title()?;
        }
        self.out.write_all(bytes)?;
        self.out.flush()
    }

    fn reset_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, Show)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn body_text_is_written_after_clearing() {
        let mut display = Display::new(Vec::new());
        display.replace_body("$ make\n").unwrap();
        display.append(b"ok\n").unwrap();

        let out = text(&display.into_inner());
        let header = out.find("$ make\n").unwrap();
        let body = out.find("ok\n").unwrap();
        assert!(header < body);
    }

    #[test]
    fn modified_marker_follows_appends_and_clean() {
        let mut display = Display::new(Vec::new());
        display.set_title("/src/+watch").unwrap();
        display.append(b"x").unwrap();
        assert!(display.modified);
        display.mark_clean().unwrap();
        assert!(!display.modified);

        let out = text(&display.into_inner());
        assert!(out.contains("/src/+watch *"));
    }
}
