//! Message records yielded by a chat history stream.

use chrono::NaiveDateTime;

/// Audio attachment metadata carried by a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioPayload {
    /// Declared MIME type (e.g. `audio/mpeg`).
    pub mime_type: Option<String>,
    /// Filename declared by the sender, if any.
    pub file_name: Option<String>,
    /// Duration in seconds.
    pub duration: Option<u32>,
    /// Size in bytes as reported by the remote side.
    pub file_size: Option<u64>,
    /// Remote handle the client uses to fetch the file.
    pub file_id: Option<String>,
}

/// Voice note metadata carried by a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoicePayload {
    /// Duration in seconds.
    pub duration: Option<u32>,
    /// Remote handle the client uses to fetch the file.
    pub file_id: Option<String>,
}

/// One remote message as seen by the scanner.
///
/// Records are supplied by a [`ChatClient`](super::ChatClient) and are never
/// mutated by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub id: i64,
    pub date: Option<NaiveDateTime>,
    pub audio: Option<AudioPayload>,
    pub voice: Option<VoicePayload>,
}

impl MessageRecord {
    /// Creates a record with no media attached.
    #[must_use]
    pub fn text(id: i64) -> Self {
        Self {
            id,
            date: None,
            audio: None,
            voice: None,
        }
    }

    /// Creates a record carrying an audio attachment.
    #[must_use]
    pub fn with_audio(id: i64, audio: AudioPayload) -> Self {
        Self {
            audio: Some(audio),
            ..Self::text(id)
        }
    }

    /// Creates a record carrying a voice note.
    #[must_use]
    pub fn with_voice(id: i64, voice: VoicePayload) -> Self {
        Self {
            voice: Some(voice),
            ..Self::text(id)
        }
    }

    /// Sets the message timestamp.
    #[must_use]
    pub fn dated(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    /// Remote file handle of the attachment, audio first.
    #[must_use]
    pub fn file_id(&self) -> Option<&str> {
        self.audio
            .as_ref()
            .and_then(|a| a.file_id.as_deref())
            .or_else(|| self.voice.as_ref().and_then(|v| v.file_id.as_deref()))
    }

    /// Returns true if the record carries an audio or voice attachment.
    #[must_use]
    pub fn has_audio_media(&self) -> bool {
        self.audio.is_some() || self.voice.is_some()
    }
}

/// A chat that can be targeted by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: i64,
    pub title: String,
    pub username: Option<String>,
}

impl ChatSummary {
    /// Display label used in reports and folder names: `Title (id) [@user]`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => format!("{} ({}) [@{username}]", self.title, self.id),
            None => format!("{} ({})", self.title, self.id),
        }
    }
}
