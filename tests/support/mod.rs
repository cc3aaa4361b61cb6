//! Scripted remote side for driving runs without a network.
//!
//! A [`ScriptedConnector`] hands out clients that replay a fixed message list
//! and record every transfer they were asked to make.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use audio_downloader_core::download::CancellationToken;
use audio_downloader_core::remote::{
    AudioPayload, ChatClient, ChatSummary, Connector, Credentials, MessageRecord, MessageStream,
    RemoteError, VoicePayload,
};
use futures_util::StreamExt;

pub const CHAT_ID: &str = "42";
pub const CHAT_LABEL: &str = "Band (42)";
pub const TRANSFER_BODY: &[u8] = b"scripted audio bytes";

/// Builds an audio message with a declared file name.
pub fn audio(id: i64, file_name: &str) -> MessageRecord {
    MessageRecord::with_audio(
        id,
        AudioPayload {
            mime_type: Some("audio/mpeg".to_string()),
            file_name: Some(file_name.to_string()),
            duration: Some(180),
            file_size: Some(TRANSFER_BODY.len() as u64),
            file_id: Some(format!("file-{id}")),
        },
    )
}

pub fn voice(id: i64) -> MessageRecord {
    MessageRecord::with_voice(
        id,
        VoicePayload {
            duration: Some(7),
            file_id: Some(format!("voice-{id}")),
        },
    )
}

#[derive(Debug, Default)]
struct Script {
    messages: Vec<MessageRecord>,
    connect_error: Option<String>,
    hanging_connect: bool,
    requires_login: bool,
    connects: AtomicUsize,
    label_error: bool,
    stream_error_after: Option<usize>,
    stream_pending_after: Option<usize>,
    hanging_stream_open: bool,
    no_size_hint: bool,
    failing_transfers: HashSet<i64>,
    transfer_delay: Option<Duration>,
    cancel_after_transfers: Option<(usize, CancellationToken)>,
}

/// Connector whose clients replay a scripted history.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    script: Arc<Script>,
    transfers: Arc<Mutex<Vec<i64>>>,
}

impl ScriptedConnector {
    pub fn new(messages: Vec<MessageRecord>) -> Self {
        Self {
            script: Arc::new(Script {
                messages,
                ..Script::default()
            }),
            transfers: Arc::default(),
        }
    }

    fn edit(mut self, f: impl FnOnce(&mut Script)) -> Self {
        let script = Arc::get_mut(&mut self.script).expect("script not shared yet");
        f(script);
        self
    }

    pub fn failing_connect(self, reason: &str) -> Self {
        self.edit(|s| s.connect_error = Some(reason.to_string()))
    }

    /// `connect` never resolves.
    pub fn hanging_connect(self) -> Self {
        self.edit(|s| s.hanging_connect = true)
    }

    /// The connector asks for credential validation before connecting.
    pub fn requiring_login(self) -> Self {
        self.edit(|s| s.requires_login = true)
    }

    pub fn failing_label(self) -> Self {
        self.edit(|s| s.label_error = true)
    }

    /// The stream yields `count` records, then an error.
    pub fn stream_error_after(self, count: usize) -> Self {
        self.edit(|s| s.stream_error_after = Some(count))
    }

    /// The stream yields `count` records, then never yields again.
    pub fn stream_pending_after(self, count: usize) -> Self {
        self.edit(|s| s.stream_pending_after = Some(count))
    }

    /// `stream_history` never resolves.
    pub fn hanging_stream_open(self) -> Self {
        self.edit(|s| s.hanging_stream_open = true)
    }

    pub fn without_size_hint(self) -> Self {
        self.edit(|s| s.no_size_hint = true)
    }

    pub fn failing_transfer(self, message_id: i64) -> Self {
        self.edit(|s| {
            s.failing_transfers.insert(message_id);
        })
    }

    pub fn transfer_delay(self, delay: Duration) -> Self {
        self.edit(|s| s.transfer_delay = Some(delay))
    }

    /// Cancels `token` once `count` transfers have finished.
    pub fn cancel_after_transfers(self, count: usize, token: CancellationToken) -> Self {
        self.edit(|s| s.cancel_after_transfers = Some((count, token)))
    }

    /// Number of `connect` calls so far.
    pub fn connects(&self) -> usize {
        self.script.connects.load(Ordering::SeqCst)
    }

    /// Message ids passed to `transfer`, in call order.
    pub fn transfers(&self) -> Vec<i64> {
        self.transfers.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _credentials: &Credentials) -> Result<Box<dyn ChatClient>, RemoteError> {
        self.script.connects.fetch_add(1, Ordering::SeqCst);
        if self.script.hanging_connect {
            std::future::pending::<()>().await;
        }
        if let Some(reason) = &self.script.connect_error {
            return Err(RemoteError::auth(reason.clone()));
        }
        Ok(Box::new(ScriptedClient {
            script: Arc::clone(&self.script),
            transfers: Arc::clone(&self.transfers),
        }))
    }

    fn requires_login(&self) -> bool {
        self.script.requires_login
    }
}

struct ScriptedClient {
    script: Arc<Script>,
    transfers: Arc<Mutex<Vec<i64>>>,
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, RemoteError> {
        Ok(vec![ChatSummary {
            id: 42,
            title: "Band".to_string(),
            username: None,
        }])
    }

    async fn resolve_chat_label(&self, chat_id: &str) -> Result<String, RemoteError> {
        if self.script.label_error || chat_id != CHAT_ID {
            return Err(RemoteError::chat_not_found(chat_id));
        }
        Ok(CHAT_LABEL.to_string())
    }

    async fn history_size_hint(&self, _chat_id: &str) -> Option<usize> {
        if self.script.no_size_hint {
            return None;
        }
        Some(self.script.messages.len())
    }

    async fn stream_history(&self, chat_id: &str) -> Result<MessageStream, RemoteError> {
        let mut items: Vec<Result<MessageRecord, RemoteError>> =
            self.script.messages.iter().cloned().map(Ok).collect();
        if let Some(count) = self.script.stream_error_after {
            items.truncate(count);
            items.push(Err(RemoteError::stream(chat_id, "connection reset")));
        }
        if self.script.hanging_stream_open {
            std::future::pending::<()>().await;
        }
        if let Some(count) = self.script.stream_pending_after {
            items.truncate(count);
            let stream = futures_util::stream::iter(items).chain(futures_util::stream::pending());
            return Ok(stream.boxed());
        }
        Ok(futures_util::stream::iter(items).boxed())
    }

    async fn transfer(&self, record: &MessageRecord, destination: &Path) -> Result<(), RemoteError> {
        if let Some(delay) = self.script.transfer_delay {
            tokio::time::sleep(delay).await;
        }
        let done = {
            let mut transfers = self.transfers.lock().unwrap();
            transfers.push(record.id);
            transfers.len()
        };
        let result = if self.script.failing_transfers.contains(&record.id) {
            Err(RemoteError::transfer(record.id, "file reference expired"))
        } else {
            tokio::fs::write(destination, TRANSFER_BODY)
                .await
                .map_err(|e| RemoteError::io(destination, e))
        };
        if let Some((count, token)) = &self.script.cancel_after_transfers
            && done == *count
        {
            token.cancel();
        }
        result
    }
}

/// Folder downloads of the scripted chat land in.
pub fn chat_dir(output_dir: &Path) -> PathBuf {
    output_dir.join(CHAT_LABEL)
}
