//! User actions typed on the controlling terminal.
//!
//! | line              | action          |
//! |-------------------|-----------------|
//! | empty, `r`, `get` | [`Control::Rerun`] |
//! | `q`, `del`        | [`Control::Close`] |
//!
//! Anything else is ignored.

use tokio::io::{self, AsyncBufReadExt, AsyncRead, BufReader, Lines, Stdin};

/// An action requested from the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Run the command again with an empty trigger context.
    Rerun,
    /// Close the display and end the process.
    Close,
}

impl Control {
    /// Parses one input line.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "r" | "get" => Some(Control::Rerun),
            "q" | "del" => Some(Control::Close),
            _ => None,
        }
    }
}

/// Line-oriented reader of [`Control`] actions.
pub struct Console<R> {
    lines: Lines<BufReader<R>>,
}

impl Console<Stdin> {
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }
}

impl<R: AsyncRead + Unpin> Console<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }

    /// Waits for the next recognised action; `None` once input is exhausted.
    pub async fn next(&mut self) -> Option<Control> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => match Control::parse(&line) {
                    Some(control) => return Some(control),
                    None => tracing::debug!(input = %line, "ignoring unknown control"),
                },
                Ok(None) => return None,
                Err(err) => {
                    tracing::warn!(error = %err, "control input failed");
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_actions() {
        assert_eq!(Control::parse(""), Some(Control::Rerun));
        assert_eq!(Control::parse(" Get "), Some(Control::Rerun));
        assert_eq!(Control::parse("q"), Some(Control::Close));
        assert_eq!(Control::parse("Del"), Some(Control::Close));
        assert_eq!(Control::parse("make"), None);
    }

    #[tokio::test]
    async fn skips_unknown_lines_and_ends_at_eof() {
        let input: &[u8] = b"hello\nr\nq\n";
        let mut console = Console::new(input);
        assert_eq!(console.next().await, Some(Control::Rerun));
        assert_eq!(console.next().await, Some(Control::Close));
        assert_eq!(console.next().await, None);
    }
}
