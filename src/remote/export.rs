//! Chat client backed by a desktop-client chat export (`result.json`).
//!
//! Both export shapes are understood:
//! - single chat: `{ "id", "name", "messages": [...] }`
//! - full account: `{ "chats": { "list": [ { "id", "name", "messages" } ] } }`
//!
//! Attachments are referenced by paths relative to the export directory and
//! are copied out by [`ChatClient::transfer`].

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{
    AudioPayload, ChatClient, ChatSummary, Connector, Credentials, MessageRecord, MessageStream,
    RemoteError, VoicePayload,
};

/// File name of the export index inside an export directory.
pub const EXPORT_FILE_NAME: &str = "result.json";

const EXPORT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const MEDIA_AUDIO_FILE: &str = "audio_file";
const MEDIA_VOICE_MESSAGE: &str = "voice_message";
const PARTIAL_SUFFIX: &str = ".part";

#[derive(Debug, Deserialize)]
struct ExportRoot {
    id: Option<i64>,
    name: Option<String>,
    messages: Option<Vec<ExportMessage>>,
    chats: Option<ExportChatList>,
}

#[derive(Debug, Deserialize)]
struct ExportChatList {
    #[serde(default)]
    list: Vec<ExportChat>,
}

#[derive(Debug, Deserialize)]
struct ExportChat {
    id: i64,
    name: Option<String>,
    #[serde(default)]
    messages: Vec<ExportMessage>,
}

#[derive(Debug, Deserialize)]
struct ExportMessage {
    id: i64,
    date: Option<String>,
    file: Option<String>,
    file_name: Option<String>,
    file_size: Option<u64>,
    media_type: Option<String>,
    mime_type: Option<String>,
    duration_seconds: Option<u32>,
}

impl ExportMessage {
    fn into_record(self) -> MessageRecord {
        let date = self
            .date
            .as_deref()
            .and_then(|d| NaiveDateTime::parse_from_str(d, EXPORT_DATE_FORMAT).ok());
        let mut record = match self.media_type.as_deref() {
            Some(MEDIA_AUDIO_FILE) => MessageRecord::with_audio(
                self.id,
                AudioPayload {
                    mime_type: self.mime_type,
                    file_name: self.file_name,
                    duration: self.duration_seconds,
                    file_size: self.file_size,
                    file_id: self.file,
                },
            ),
            Some(MEDIA_VOICE_MESSAGE) => MessageRecord::with_voice(
                self.id,
                VoicePayload {
                    duration: self.duration_seconds,
                    file_id: self.file,
                },
            ),
            _ => MessageRecord::text(self.id),
        };
        record.date = date;
        record
    }
}

#[derive(Debug)]
struct ExportedChat {
    summary: ChatSummary,
    messages: Arc<Vec<MessageRecord>>,
}

impl ExportedChat {
    fn from_parts(id: i64, name: Option<String>, messages: Vec<ExportMessage>) -> Self {
        let title = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("chat_{id}"));
        Self {
            summary: ChatSummary {
                id,
                title,
                username: None,
            },
            messages: Arc::new(messages.into_iter().map(ExportMessage::into_record).collect()),
        }
    }
}

/// Opens [`ExportClient`]s for an export directory.
#[derive(Debug, Clone)]
pub struct ExportConnector {
    export_dir: PathBuf,
}

impl ExportConnector {
    /// Creates a connector for the export rooted at `export_dir`.
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Returns the export directory.
    #[must_use]
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

#[async_trait]
impl Connector for ExportConnector {
    #[instrument(skip(self, credentials), fields(export_dir = %self.export_dir.display()))]
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn ChatClient>, RemoteError> {
        debug!(session = %credentials.session_name, "opening chat export");
        let client = ExportClient::open(&self.export_dir).await?;
        Ok(Box::new(client))
    }

    // An export is read from disk; no session is opened.
    fn requires_login(&self) -> bool {
        false
    }
}

/// Read-only chat client over an export directory.
#[derive(Debug)]
pub struct ExportClient {
    root: PathBuf,
    chats: Vec<ExportedChat>,
}

impl ExportClient {
    /// Reads and parses `<export_dir>/result.json`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Auth`] if the export is missing or is not a
    /// valid export index.
    pub async fn open(export_dir: &Path) -> Result<Self, RemoteError> {
        let index = export_dir.join(EXPORT_FILE_NAME);
        let raw = tokio::fs::read_to_string(&index).await.map_err(|e| {
            RemoteError::auth(format!("cannot open chat export {}: {e}", index.display()))
        })?;
        Self::from_json(export_dir, &raw)
    }

    /// Builds a client from an export index already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Auth`] if `raw` is not a valid export index.
    pub fn from_json(export_dir: &Path, raw: &str) -> Result<Self, RemoteError> {
        let parsed: ExportRoot = serde_json::from_str(raw)
            .map_err(|e| RemoteError::auth(format!("invalid chat export: {e}")))?;

        let mut chats = Vec::new();
        if let (Some(id), Some(messages)) = (parsed.id, parsed.messages) {
            chats.push(ExportedChat::from_parts(id, parsed.name, messages));
        }
        if let Some(list) = parsed.chats {
            chats.extend(
                list.list
                    .into_iter()
                    .map(|c| ExportedChat::from_parts(c.id, c.name, c.messages)),
            );
        }
        debug!(chats = chats.len(), "chat export loaded");

        Ok(Self {
            root: export_dir.to_path_buf(),
            chats,
        })
    }

    fn find_chat(&self, chat_id: &str) -> Result<&ExportedChat, RemoteError> {
        let id: i64 = chat_id
            .trim()
            .parse()
            .map_err(|_| RemoteError::chat_not_found(chat_id))?;
        self.chats
            .iter()
            .find(|c| c.summary.id == id)
            .ok_or_else(|| RemoteError::chat_not_found(chat_id))
    }

    fn resolve_file(&self, message_id: i64, file_ref: &str) -> Result<PathBuf, RemoteError> {
        let relative = Path::new(file_ref);
        let is_contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if file_ref.starts_with('(') || !is_contained {
            return Err(RemoteError::transfer(
                message_id,
                format!("file not available in export: {file_ref}"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ChatClient for ExportClient {
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, RemoteError> {
        Ok(self.chats.iter().map(|c| c.summary.clone()).collect())
    }

    async fn resolve_chat_label(&self, chat_id: &str) -> Result<String, RemoteError> {
        self.find_chat(chat_id).map(|c| c.summary.label())
    }

    async fn history_size_hint(&self, chat_id: &str) -> Option<usize> {
        self.find_chat(chat_id).ok().map(|c| c.messages.len())
    }

    async fn stream_history(&self, chat_id: &str) -> Result<MessageStream, RemoteError> {
        let messages = Arc::clone(&self.find_chat(chat_id)?.messages);
        let len = messages.len();
        let stream = futures_util::stream::iter(0..len)
            .map(move |index| Ok::<_, RemoteError>(messages[index].clone()))
            .boxed();
        Ok(stream)
    }

    #[instrument(skip(self, record), fields(message_id = record.id, dest = %destination.display()))]
    async fn transfer(
        &self,
        record: &MessageRecord,
        destination: &Path,
    ) -> Result<(), RemoteError> {
        let file_ref = record
            .file_id()
            .ok_or_else(|| RemoteError::transfer(record.id, "message has no attached file"))?;
        let source = self.resolve_file(record.id, file_ref)?;
        if tokio::fs::metadata(&source).await.is_err() {
            return Err(RemoteError::transfer(
                record.id,
                format!("file missing from export: {file_ref}"),
            ));
        }

        let partial = partial_path(destination);
        if let Err(e) = tokio::fs::copy(&source, &partial).await {
            debug!(path = %partial.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(RemoteError::io(partial, e));
        }
        if let Err(e) = tokio::fs::rename(&partial, destination).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(RemoteError::io(destination, e));
        }
        Ok(())
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(PARTIAL_SUFFIX);
    destination.with_file_name(name)
}
