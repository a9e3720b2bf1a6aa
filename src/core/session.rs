//! Session controller: one conversation, its settings, and the turn loop.

use chrono::Local;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::chat_stream::{CompletionClient, CompletionError};
use crate::core::conversation::{ConversationExport, ConversationStore, ExportError};
use crate::core::message::Message;
use crate::core::persona::{Persona, PersonaRegistry, UnknownPersonaError};
use crate::core::stream_assembler::{RenderSink, StreamAssembler};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Values of the user-facing controls.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub model: String,
    pub temperature: f32,
    pub persona: String,
}

/// Clamp a creativity level into the range the completion service accepts.
pub fn clamp_temperature(value: f32) -> f32 {
    if value.is_nan() {
        DEFAULT_TEMPERATURE
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// How a submitted turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// Another turn of this session is still streaming.
    Busy,
    /// The assistant reply was committed to the conversation.
    Completed(String),
    /// The completion failed; only the user message was kept.
    Failed(CompletionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    UnknownPersona(UnknownPersonaError),
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::UnknownPersona(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for TurnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TurnError::UnknownPersona(err) => Some(err),
        }
    }
}

impl From<UnknownPersonaError> for TurnError {
    fn from(err: UnknownPersonaError) -> Self {
        TurnError::UnknownPersona(err)
    }
}

/// Label used when an export is not given an explicit name.
pub fn timestamped_export_label() -> String {
    format!("gyaan_ai_chat_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Owns one user's conversation and drives its turns against a
/// [`CompletionClient`].
pub struct SessionController {
    store: ConversationStore,
    settings: SessionSettings,
    personas: Arc<PersonaRegistry>,
    client: Arc<dyn CompletionClient>,
    is_streaming: bool,
}

impl SessionController {
    /// Create a session. The persona in `settings` must exist in `personas`.
    pub fn new(
        client: Arc<dyn CompletionClient>,
        personas: Arc<PersonaRegistry>,
        mut settings: SessionSettings,
    ) -> Result<Self, UnknownPersonaError> {
        settings.persona = personas.get(&settings.persona)?.name.clone();
        settings.temperature = clamp_temperature(settings.temperature);
        Ok(Self {
            store: ConversationStore::new(),
            settings,
            personas,
            client,
            is_streaming: false,
        })
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn history(&self) -> &[Message] {
        self.store.snapshot()
    }

    pub fn personas(&self) -> &PersonaRegistry {
        &self.personas
    }

    pub fn active_persona(&self) -> &Persona {
        self.personas
            .find(&self.settings.persona)
            .unwrap_or_else(|| self.personas.default_persona())
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.settings.model = model.into();
    }

    /// Store the temperature, clamped to `[0.0, 1.0]`. Returns the stored value.
    pub fn set_temperature(&mut self, temperature: f32) -> f32 {
        self.settings.temperature = clamp_temperature(temperature);
        self.settings.temperature
    }

    /// Switch persona for subsequent turns. Past messages are untouched.
    pub fn set_persona(&mut self, name: &str) -> Result<&Persona, UnknownPersonaError> {
        let persona = self.personas.get(name)?;
        self.settings.persona = persona.name.clone();
        Ok(persona)
    }

    /// Request context: the persona prompt followed by the stored history.
    pub fn build_context(&self) -> Result<Vec<Message>, UnknownPersonaError> {
        let (system_prompt, _) = self.personas.resolve(&self.settings.persona)?;
        let mut context = Vec::with_capacity(self.store.len() + 1);
        context.push(Message::system(system_prompt));
        context.extend(self.store.snapshot().iter().cloned());
        Ok(context)
    }

    /// Run one turn: record `input`, stream the reply into `sink`, and commit
    /// the reply if the stream completes.
    pub async fn submit(
        &mut self,
        input: &str,
        sink: &mut dyn RenderSink,
    ) -> Result<TurnOutcome, TurnError> {
        if input.trim().is_empty() {
            return Ok(TurnOutcome::Ignored);
        }
        if self.is_streaming {
            return Ok(TurnOutcome::Busy);
        }

        // Resolve before touching the store so a bad persona leaves no trace.
        self.personas.resolve(&self.settings.persona)?;

        self.store.push_user(input);
        let context = self.build_context()?;

        let result = {
            let _streaming = StreamingFlag::raise(&mut self.is_streaming);
            stream_reply(
                self.client.as_ref(),
                &self.settings,
                self.store.len(),
                &context,
                sink,
            )
            .await
        };

        match result {
            Ok(reply) => {
                self.store.push_assistant(reply.clone());
                Ok(TurnOutcome::Completed(reply))
            }
            Err(err) => {
                warn!(error = %err, model = %self.settings.model, "turn failed");
                Ok(TurnOutcome::Failed(err))
            }
        }
    }

    pub fn clear(&mut self) {
        debug!(messages = self.store.len(), "clearing conversation");
        self.store.clear();
    }

    /// Serialize the history under `label`, or a timestamped label if none.
    pub fn export(&self, label: Option<&str>) -> Result<ConversationExport, ExportError> {
        let label = label
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .unwrap_or_else(timestamped_export_label);
        Ok(ConversationExport {
            label,
            json: self.store.export()?,
            message_count: self.store.len(),
        })
    }

    /// Export and write to `dir/label`.
    pub fn export_to_dir(
        &self,
        dir: &Path,
        label: Option<&str>,
        overwrite: bool,
    ) -> Result<std::path::PathBuf, ExportError> {
        let export = self.export(label)?;
        let path = dir.join(&export.label);
        export.write_to(&path, overwrite)?;
        Ok(path)
    }
}

/// Holds the streaming flag up for one turn. Dropping the guard lowers it,
/// including when the turn's future is dropped mid-stream.
struct StreamingFlag<'a>(&'a mut bool);

impl<'a> StreamingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for StreamingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

async fn stream_reply(
    client: &dyn CompletionClient,
    settings: &SessionSettings,
    history: usize,
    context: &[Message],
    sink: &mut dyn RenderSink,
) -> Result<String, CompletionError> {
    debug!(
        model = %settings.model,
        temperature = settings.temperature,
        persona = %settings.persona,
        history,
        "starting turn"
    );
    let mut assembler = StreamAssembler::new();
    match client
        .stream_completion(&settings.model, context, settings.temperature)
        .await
    {
        Ok(stream) => assembler.run(stream, sink).await,
        Err(err) => {
            let rendered = assembler.fail_to_start(err.clone(), sink);
            debug_assert!(rendered.is_ok(), "a new assembler accepts fail_to_start");
            Err(err)
        }
    }
}
