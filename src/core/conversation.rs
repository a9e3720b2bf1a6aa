//! Per-session conversation history and its JSON export.

use crate::core::message::{Message, Role};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Errors raised when mutating the conversation store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// Only user and assistant messages may be stored.
    InvalidRole(Role),
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationError::InvalidRole(role) => write!(
                f,
                "cannot store a '{}' message in the conversation",
                role.as_str()
            ),
        }
    }
}

impl Error for ConversationError {}

/// Errors raised when writing an export to disk.
#[derive(Debug)]
pub enum ExportError {
    /// There is nothing to export.
    Empty,
    /// The target file exists and overwriting was not requested.
    AlreadyExists(PathBuf),
    Serialize(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Empty => {
                write!(f, "No conversation to export - the chat history is empty.")
            }
            ExportError::AlreadyExists(path) => write!(
                f,
                "File '{}' already exists. Please specify a different filename with /export <filename>.",
                path.display()
            ),
            ExportError::Serialize(err) => write!(f, "Failed to serialize conversation: {err}"),
            ExportError::Io(err) => write!(f, "Failed to write export: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExportError::Serialize(err) => Some(err),
            ExportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialize(err)
    }
}

/// Serialized history ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationExport {
    /// Identifying label, used as the default file name.
    pub label: String,
    /// JSON list of `{ "role", "content" }` records.
    pub json: String,
    pub message_count: usize,
}

impl ConversationExport {
    /// Write the export atomically to `path`.
    pub fn write_to(&self, path: &Path, overwrite: bool) -> Result<(), ExportError> {
        if self.message_count == 0 {
            return Err(ExportError::Empty);
        }
        if !overwrite && path.exists() {
            return Err(ExportError::AlreadyExists(path.to_path_buf()));
        }

        let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new_in(".")?,
        };
        temp_file.write_all(self.json.as_bytes())?;
        temp_file.write_all(b"\n")?;
        temp_file.as_file_mut().sync_all()?;
        temp_file.persist(path).map_err(|err| ExportError::Io(err.error))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ExportRecord<'a> {
    role: &'a str,
    content: &'a str,
}

/// Ordered chat history for one session.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) -> Result<(), ConversationError> {
        if !message.role.is_transcript_role() {
            return Err(ConversationError::InvalidRole(message.role));
        }
        self.messages.push(message);
        Ok(())
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Serialize the history as a JSON list of role/content records,
    /// indented with four spaces.
    pub fn export(&self) -> Result<String, serde_json::Error> {
        let records: Vec<ExportRecord<'_>> = self
            .messages
            .iter()
            .map(|msg| ExportRecord {
                role: msg.role.as_str(),
                content: &msg.content,
            })
            .collect();

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        records.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
