//! Remote chat access consumed by the scan/download runs.
//!
//! The core never talks a wire protocol itself. It drives two traits:
//!
//! - [`Connector`] - opens an authenticated [`ChatClient`] from [`Credentials`]
//! - [`ChatClient`] - label lookup, lazy history streaming, per-message transfer
//!
//! [`ExportConnector`] is the bundled implementation, backed by a chat export
//! archive on disk.

mod credentials;
mod error;
mod export;
mod record;

pub use credentials::{
    AUTH_FILE_TEMPLATE, AuthFileValues, Credentials, DEFAULT_SESSION_NAME, parse_auth_file,
};
pub use error::RemoteError;
pub use export::{EXPORT_FILE_NAME, ExportClient, ExportConnector};
pub use record::{AudioPayload, ChatSummary, MessageRecord, VoicePayload};

use std::path::Path;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// Lazy, finite sequence of message records for one chat.
///
/// Streams are restartable only by calling [`ChatClient::stream_history`]
/// again; they cannot be rewound.
pub type MessageStream = BoxStream<'static, Result<MessageRecord, RemoteError>>;

/// Opens authenticated sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Authenticates and returns a client bound to the session.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Auth`] when the credentials are refused.
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn ChatClient>, RemoteError>;

    /// Whether [`connect`](Self::connect) performs a remote login.
    ///
    /// When true, callers run [`Credentials::validate`] before connecting.
    fn requires_login(&self) -> bool {
        true
    }
}

/// Access to chats of one authenticated session.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Lists chats visible to the session.
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, RemoteError>;

    /// Resolves a chat id to a human readable label.
    async fn resolve_chat_label(&self, chat_id: &str) -> Result<String, RemoteError>;

    /// Number of messages in the chat, if cheaply known.
    async fn history_size_hint(&self, _chat_id: &str) -> Option<usize> {
        None
    }

    /// Opens the message history of a chat.
    async fn stream_history(&self, chat_id: &str) -> Result<MessageStream, RemoteError>;

    /// Downloads the attachment of `record` to `destination`.
    async fn transfer(&self, record: &MessageRecord, destination: &Path)
    -> Result<(), RemoteError>;
}
