//! Streaming reply rendering for a plain terminal.

use std::io::Write;
use tracing::debug;

use crate::core::stream_assembler::{RenderSink, RenderUpdate, STREAMING_MARKER};

const ERASE_MARKER: &str = "\x08 \x08";

/// Writes a reply to `out` as it streams in.
///
/// Only the newly received suffix is printed on each update, followed by the
/// streaming marker, which is backspaced over before the next write.
pub struct TerminalSink<W: Write> {
    out: W,
    interactive: bool,
    printed: usize,
    marker_shown: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            interactive: true,
            printed: 0,
            marker_shown: false,
        }
    }

    /// Sink for piped output: no marker, and failures are left to the caller.
    pub fn plain(out: W) -> Self {
        Self {
            interactive: false,
            ..Self::new(out)
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_update(&mut self, update: RenderUpdate<'_>) -> std::io::Result<()> {
        if self.marker_shown {
            self.out.write_all(ERASE_MARKER.as_bytes())?;
            self.marker_shown = false;
        }

        match update {
            RenderUpdate::InProgress(text) => {
                self.write_suffix(text)?;
                if self.interactive {
                    self.out.write_all(STREAMING_MARKER.as_bytes())?;
                    self.marker_shown = true;
                }
            }
            RenderUpdate::Final(text) => {
                self.write_suffix(text)?;
                writeln!(self.out)?;
            }
            RenderUpdate::Failed(_) => {
                if self.printed > 0 {
                    writeln!(self.out)?;
                }
                if self.interactive {
                    writeln!(self.out, "❌ {}", update.display_text())?;
                }
                self.printed = 0;
            }
        }
        self.out.flush()
    }

    fn write_suffix(&mut self, text: &str) -> std::io::Result<()> {
        match text.get(self.printed..) {
            Some(suffix) => self.out.write_all(suffix.as_bytes())?,
            None => {
                // Text is expected to only grow; start over on a new line.
                writeln!(self.out)?;
                self.out.write_all(text.as_bytes())?;
            }
        }
        self.printed = text.len();
        Ok(())
    }
}

impl<W: Write> RenderSink for TerminalSink<W> {
    fn render(&mut self, update: RenderUpdate<'_>) {
        if let Err(err) = self.write_update(update) {
            debug!(error = %err, "terminal write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat_stream::CompletionError;

    fn output(sink: TerminalSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn prints_suffixes_and_erases_marker() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.render(RenderUpdate::InProgress("Hi"));
        sink.render(RenderUpdate::InProgress("Hi there"));
        sink.render(RenderUpdate::Final("Hi there"));

        assert_eq!(output(sink), "Hi▌\x08 \x08 there▌\x08 \x08\n");
    }

    #[test]
    fn empty_reply_prints_a_newline() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.render(RenderUpdate::Final(""));
        assert_eq!(output(sink), "\n");
    }

    #[test]
    fn failure_moves_to_a_new_line() {
        let err = CompletionError::Transport("reset".to_string());
        let mut sink = TerminalSink::new(Vec::new());
        sink.render(RenderUpdate::InProgress("Partial"));
        sink.render(RenderUpdate::Failed(&err));

        assert_eq!(
            output(sink),
            "Partial▌\x08 \x08\n❌ Error: Request failed: reset\n"
        );
    }

    #[test]
    fn plain_sink_skips_marker_and_error_text() {
        let err = CompletionError::Transport("reset".to_string());
        let mut sink = TerminalSink::plain(Vec::new());
        sink.render(RenderUpdate::InProgress("Ahoy"));
        sink.render(RenderUpdate::InProgress("Ahoy, matey"));
        sink.render(RenderUpdate::Failed(&err));
        assert_eq!(output(sink), "Ahoy, matey\n");

        let mut sink = TerminalSink::plain(Vec::new());
        sink.render(RenderUpdate::InProgress("Ahoy"));
        sink.render(RenderUpdate::Final("Ahoy"));
        assert_eq!(output(sink), "Ahoy\n");
    }

    #[test]
    fn failure_before_any_text() {
        let err = CompletionError::Api("API Error: Invalid API key".to_string());
        let mut sink = TerminalSink::new(Vec::new());
        sink.render(RenderUpdate::Failed(&err));
        assert_eq!(output(sink), format!("❌ Error: {err}\n"));
    }
}
