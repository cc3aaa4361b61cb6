//! Error types for remote chat access.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a chat client or connector.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Credentials were rejected or the session could not be opened.
    #[error("authentication failed: {reason}")]
    Auth {
        /// Why the session was refused.
        reason: String,
    },

    /// The requested chat does not exist or is not accessible.
    #[error("chat {chat_id} not found")]
    ChatNotFound {
        /// The chat identifier that failed to resolve.
        chat_id: String,
    },

    /// The history stream could not be opened or broke mid-iteration.
    #[error("history stream failed for chat {chat_id}: {reason}")]
    Stream {
        /// The chat whose history was being read.
        chat_id: String,
        /// Description of the failure.
        reason: String,
    },

    /// The attachment of a message could not be transferred.
    #[error("transfer of message {message_id} failed: {reason}")]
    Transfer {
        /// Source message id.
        message_id: i64,
        /// Description of the failure.
        reason: String,
    },

    /// Local file system error while writing a transfer.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// Path being written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl RemoteError {
    /// Creates an authentication error.
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }

    /// Creates a chat-not-found error.
    pub fn chat_not_found(chat_id: impl Into<String>) -> Self {
        Self::ChatNotFound {
            chat_id: chat_id.into(),
        }
    }

    /// Creates a stream error.
    pub fn stream(chat_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Stream {
            chat_id: chat_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a transfer error.
    pub fn transfer(message_id: i64, reason: impl Into<String>) -> Self {
        Self::Transfer {
            message_id,
            reason: reason.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
