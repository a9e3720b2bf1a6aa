//! Assembly of one streamed assistant reply.
//!
//! A [`StreamAssembler`] lives for exactly one turn and moves through
//! `Idle -> Streaming -> {Completed, Failed}`. Every fragment is appended to
//! the accumulated text and pushed to a [`RenderSink`] with the in-progress
//! marker; the final render drops the marker. On failure the accumulated
//! text is discarded so partial output is never committed.

use futures_util::StreamExt;
use std::error::Error;
use std::fmt;
use tracing::debug;

use crate::core::chat_stream::{CompletionError, FragmentStream};

/// Transient cursor appended to a reply while it is still streaming.
pub const STREAMING_MARKER: &str = "▌";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    Idle,
    Streaming,
    Completed,
    Failed,
}

impl AssemblerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AssemblerState::Completed | AssemblerState::Failed)
    }
}

/// Display update emitted while a reply is assembled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderUpdate<'a> {
    /// Text received so far; more is expected.
    InProgress(&'a str),
    /// The complete reply.
    Final(&'a str),
    /// The stream failed; anything shown as in-progress is void.
    Failed(&'a CompletionError),
}

impl RenderUpdate<'_> {
    /// Text as it should appear on screen, including the streaming marker.
    pub fn display_text(&self) -> String {
        match self {
            RenderUpdate::InProgress(text) => format!("{text}{STREAMING_MARKER}"),
            RenderUpdate::Final(text) => text.to_string(),
            RenderUpdate::Failed(err) => format!("Error: {err}"),
        }
    }
}

/// Receives display updates for the reply being assembled.
pub trait RenderSink {
    fn render(&mut self, update: RenderUpdate<'_>);
}

/// Sink that ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn render(&mut self, _update: RenderUpdate<'_>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: AssemblerState,
    pub to: AssemblerState,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stream assembler cannot move from {:?} to {:?}",
            self.from, self.to
        )
    }
}

impl Error for InvalidTransition {}

#[derive(Debug)]
pub struct StreamAssembler {
    state: AssemblerState,
    accumulated_text: String,
    error: Option<CompletionError>,
}

impl Default for StreamAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self {
            state: AssemblerState::Idle,
            accumulated_text: String::new(),
            error: None,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    pub fn accumulated_text(&self) -> &str {
        &self.accumulated_text
    }

    pub fn error(&self) -> Option<&CompletionError> {
        self.error.as_ref()
    }

    fn expect_state(
        &self,
        expected: AssemblerState,
        to: AssemblerState,
    ) -> Result<(), InvalidTransition> {
        if self.state == expected {
            Ok(())
        } else {
            Err(InvalidTransition {
                from: self.state,
                to,
            })
        }
    }

    /// The adapter handed over a stream.
    pub fn start(&mut self) -> Result<(), InvalidTransition> {
        self.expect_state(AssemblerState::Idle, AssemblerState::Streaming)?;
        self.state = AssemblerState::Streaming;
        Ok(())
    }

    pub fn push_fragment(
        &mut self,
        fragment: &str,
        sink: &mut dyn RenderSink,
    ) -> Result<(), InvalidTransition> {
        self.expect_state(AssemblerState::Streaming, AssemblerState::Streaming)?;
        self.accumulated_text.push_str(fragment);
        sink.render(RenderUpdate::InProgress(&self.accumulated_text));
        Ok(())
    }

    pub fn complete(&mut self, sink: &mut dyn RenderSink) -> Result<(), InvalidTransition> {
        self.expect_state(AssemblerState::Streaming, AssemblerState::Completed)?;
        self.state = AssemblerState::Completed;
        sink.render(RenderUpdate::Final(&self.accumulated_text));
        Ok(())
    }

    /// Abort the reply. Text accumulated so far is dropped.
    pub fn fail(
        &mut self,
        error: CompletionError,
        sink: &mut dyn RenderSink,
    ) -> Result<(), InvalidTransition> {
        self.expect_state(AssemblerState::Streaming, AssemblerState::Failed)?;
        self.state = AssemblerState::Failed;
        self.accumulated_text.clear();
        sink.render(RenderUpdate::Failed(&error));
        self.error = Some(error);
        Ok(())
    }

    /// The adapter failed before handing over a stream. Renders exactly like
    /// a failure after zero fragments.
    pub fn fail_to_start(
        &mut self,
        error: CompletionError,
        sink: &mut dyn RenderSink,
    ) -> Result<(), InvalidTransition> {
        self.start()?;
        self.fail(error, sink)
    }

    /// Drive `stream` to its end, returning the full reply or the error that
    /// stopped it.
    pub async fn run(
        mut self,
        mut stream: FragmentStream,
        sink: &mut dyn RenderSink,
    ) -> Result<String, CompletionError> {
        self.start().map_err(invalid_transition)?;

        let mut fragments = 0usize;
        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    fragments += 1;
                    self.push_fragment(&fragment, sink)
                        .map_err(invalid_transition)?;
                }
                Err(err) => {
                    debug!(fragments, error = %err, "completion stream failed");
                    self.fail(err.clone(), sink).map_err(invalid_transition)?;
                    return Err(err);
                }
            }
        }

        self.complete(sink).map_err(invalid_transition)?;
        debug!(
            fragments,
            chars = self.accumulated_text.chars().count(),
            "completion stream assembled"
        );
        Ok(self.accumulated_text)
    }
}

fn invalid_transition(err: InvalidTransition) -> CompletionError {
    CompletionError::InvalidData(err.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures_util::stream;

    /// Sink that keeps the on-screen text of every update.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub renders: Vec<String>,
    }

    impl RenderSink for RecordingSink {
        fn render(&mut self, update: RenderUpdate<'_>) {
            self.renders.push(update.display_text());
        }
    }

    fn scripted(items: Vec<Result<&str, CompletionError>>) -> FragmentStream {
        let owned: Vec<Result<String, CompletionError>> = items
            .into_iter()
            .map(|item| item.map(str::to_string))
            .collect();
        Box::pin(stream::iter(owned))
    }

    #[tokio::test]
    async fn run_renders_incrementally_then_final() {
        let mut sink = RecordingSink::default();
        let text = StreamAssembler::new()
            .run(scripted(vec![Ok("Hi"), Ok(" there")]), &mut sink)
            .await
            .expect("completed");

        assert_eq!(text, "Hi there");
        assert_eq!(sink.renders, vec!["Hi▌", "Hi there▌", "Hi there"]);
    }

    #[tokio::test]
    async fn run_with_empty_stream_completes_with_empty_text() {
        let mut sink = RecordingSink::default();
        let text = StreamAssembler::new()
            .run(scripted(vec![]), &mut sink)
            .await
            .expect("completed");
        assert_eq!(text, "");
        assert_eq!(sink.renders, vec![""]);
    }

    #[tokio::test]
    async fn run_discards_partial_text_on_error() {
        let mut sink = RecordingSink::default();
        let err = CompletionError::Transport("reset".to_string());
        let result = StreamAssembler::new()
            .run(scripted(vec![Ok("Partial"), Err(err.clone())]), &mut sink)
            .await;

        assert_eq!(result, Err(err));
        assert_eq!(sink.renders.len(), 2);
        assert_eq!(sink.renders[0], "Partial▌");
        assert_eq!(sink.renders[1], "Error: Request failed: reset");
    }

    #[test]
    fn transitions_follow_the_state_machine() {
        let mut sink = NullSink;
        let mut assembler = StreamAssembler::new();
        assert_eq!(assembler.state(), AssemblerState::Idle);
        assert!(assembler.push_fragment("x", &mut sink).is_err());
        assert!(assembler.complete(&mut sink).is_err());

        assembler.start().unwrap();
        assert_eq!(assembler.state(), AssemblerState::Streaming);
        assembler.push_fragment("a", &mut sink).unwrap();
        assembler.push_fragment("b", &mut sink).unwrap();
        assert_eq!(assembler.accumulated_text(), "ab");

        assembler.complete(&mut sink).unwrap();
        assert!(assembler.state().is_terminal());
        assert_eq!(
            assembler.start(),
            Err(InvalidTransition {
                from: AssemblerState::Completed,
                to: AssemblerState::Streaming
            })
        );
        assert!(assembler.push_fragment("c", &mut sink).is_err());
        assert_eq!(assembler.accumulated_text(), "ab");
    }

    #[test]
    fn fail_to_start_renders_failure_from_idle() {
        let mut sink = RecordingSink::default();
        let mut assembler = StreamAssembler::new();
        let err = CompletionError::Status {
            status: 401,
            message: "API Error: Invalid API Key".to_string(),
        };

        assembler.fail_to_start(err.clone(), &mut sink).unwrap();

        assert_eq!(assembler.state(), AssemblerState::Failed);
        assert_eq!(assembler.error(), Some(&err));
        assert_eq!(sink.renders, vec!["Error: HTTP 401: API Error: Invalid API Key"]);
        assert!(assembler.fail_to_start(err, &mut sink).is_err());
        assert_eq!(sink.renders.len(), 1);
    }

    #[test]
    fn failed_state_is_terminal_and_clears_text() {
        let mut sink = NullSink;
        let mut assembler = StreamAssembler::new();
        assembler.start().unwrap();
        assembler.push_fragment("Partial", &mut sink).unwrap();
        assembler
            .fail(CompletionError::Api("API Error: boom".into()), &mut sink)
            .unwrap();

        assert_eq!(assembler.state(), AssemblerState::Failed);
        assert_eq!(assembler.accumulated_text(), "");
        assert!(assembler.error().is_some());
        assert!(assembler.complete(&mut sink).is_err());
        assert!(assembler
            .fail(CompletionError::Api("again".into()), &mut sink)
            .is_err());
    }
}
