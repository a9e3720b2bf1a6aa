//! Completion client adapter.
//!
//! Sends the persona prompt plus history to an OpenAI-compatible
//! `chat/completions` endpoint and exposes the server-sent event body as a
//! lazy stream of non-empty text fragments.

use async_trait::async_trait;
use futures_util::stream::{self, Stream, StreamExt};
use memchr::memchr;
use std::error::Error;
use std::fmt;
use std::pin::Pin;
use tracing::debug;

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::core::message::Message;
use crate::core::providers::ProviderSession;
use crate::utils::url::construct_api_url;

/// Fragments of assistant text, ending normally or with a single error.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, CompletionError>> + Send>>;

/// Any failure reported while requesting or reading a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The request could not be sent or the body could not be read.
    Transport(String),
    /// The service answered with a non-success status.
    Status { status: u16, message: String },
    /// The service reported an error inside the event stream.
    Api(String),
    /// The event stream contained data that is not a completion chunk.
    InvalidData(String),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Transport(message) => write!(f, "Request failed: {message}"),
            CompletionError::Status { status, message } => {
                write!(f, "HTTP {status}: {message}")
            }
            CompletionError::Api(message) => write!(f, "{message}"),
            CompletionError::InvalidData(message) => {
                write!(f, "Malformed response from API: {message}")
            }
        }
    }
}

impl Error for CompletionError {}

/// Seam between the session controller and the hosted completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Open a streamed completion. `context` is sent as-is, in order, and
    /// `temperature` is passed through without validation.
    async fn stream_completion(
        &self,
        model: &str,
        context: &[Message],
        temperature: f32,
    ) -> Result<FragmentStream, CompletionError>;
}

/// [`CompletionClient`] speaking the OpenAI-compatible HTTP protocol.
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpCompletionClient {
    pub fn new(session: ProviderSession) -> Self {
        Self::with_client(reqwest::Client::new(), session)
    }

    pub fn with_client(client: reqwest::Client, session: ProviderSession) -> Self {
        Self {
            client,
            base_url: session.base_url,
            api_key: session.api_key,
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn stream_completion(
        &self,
        model: &str,
        context: &[Message],
        temperature: f32,
    ) -> Result<FragmentStream, CompletionError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: context.iter().map(ChatMessage::from).collect(),
            temperature,
            stream: true,
        };

        let chat_url = construct_api_url(&self.base_url, "chat/completions");
        debug!(
            url = %chat_url,
            model,
            temperature,
            messages = request.messages.len(),
            "opening completion stream"
        );

        let response = self
            .client
            .post(chat_url)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Transport(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    CompletionError::Transport(format!("connection error: {e}"))
                } else {
                    CompletionError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            debug!(status = status.as_u16(), "completion request rejected");
            return Err(CompletionError::Status {
                status: status.as_u16(),
                message: format_api_error(&error_text),
            });
        }

        Ok(fragment_stream(response.bytes_stream()))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Fragment(String),
    Skip,
    Done,
    Error(CompletionError),
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

fn handle_data_payload(payload: &str) -> SseEvent {
    if payload == "[DONE]" {
        return SseEvent::Done;
    }
    if payload.trim().is_empty() {
        return SseEvent::Skip;
    }

    match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
            .map(SseEvent::Fragment)
            .unwrap_or(SseEvent::Skip),
        Err(_) => {
            let is_error_payload = serde_json::from_str::<serde_json::Value>(payload)
                .map(|value| value.get("error").is_some())
                .unwrap_or(false);
            if is_error_payload {
                SseEvent::Error(CompletionError::Api(format_api_error(payload)))
            } else {
                SseEvent::Error(CompletionError::InvalidData(payload.trim().to_string()))
            }
        }
    }
}

/// Classify one SSE line. Comments, `event:` lines and blank keep-alives are
/// skipped.
fn process_sse_line(line: &str) -> SseEvent {
    extract_data_payload(line.trim())
        .map(handle_data_payload)
        .unwrap_or(SseEvent::Skip)
}

fn decode_line(raw: &[u8]) -> SseEvent {
    match std::str::from_utf8(raw) {
        Ok(line) => process_sse_line(line),
        Err(e) => SseEvent::Error(CompletionError::InvalidData(format!(
            "invalid UTF-8 in stream: {e}"
        ))),
    }
}

struct SseState<S> {
    body: Pin<Box<S>>,
    buffer: Vec<u8>,
    finished: bool,
}

/// Turn a chunked SSE body into a stream of text fragments.
///
/// The stream ends on `[DONE]` or when the body closes, and yields at most
/// one error, after which it is exhausted.
pub(crate) fn fragment_stream<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let state = SseState {
        body: Box::pin(body),
        buffer: Vec::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        loop {
            while let Some(newline_pos) = memchr(b'\n', &state.buffer) {
                let line: Vec<u8> = state.buffer.drain(..=newline_pos).collect();
                match decode_line(&line) {
                    SseEvent::Fragment(text) => return Some((Ok(text), state)),
                    SseEvent::Skip => continue,
                    SseEvent::Done => {
                        debug!("completion stream finished");
                        return None;
                    }
                    SseEvent::Error(err) => {
                        state.finished = true;
                        return Some((Err(err), state));
                    }
                }
            }

            match state.body.next().await {
                Some(Ok(chunk)) => state.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(CompletionError::Transport(e.to_string())), state));
                }
                None => {
                    // Body closed; a final line may lack its newline.
                    state.finished = true;
                    let trailing = std::mem::take(&mut state.buffer);
                    return match decode_line(&trailing) {
                        SseEvent::Fragment(text) => Some((Ok(text), state)),
                        SseEvent::Error(err) => Some((Err(err), state)),
                        SseEvent::Skip | SseEvent::Done => None,
                    };
                }
            }
        }
    }))
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Render an error body for display, preferring the service's own message.
pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "API Error: <empty>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value) {
            if !summary.is_empty() {
                return format!("API Error: {summary}");
            }
        }
        if let Ok(compact) = serde_json::to_string(&json_value) {
            return format!("API Error: {compact}");
        }
    }

    format!("API Error: {trimmed}")
}
