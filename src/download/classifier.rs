//! Message classification: which records are downloadable and what they
//! resolve to on disk.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use super::filename::{DEFAULT_AUDIO_EXTENSION, extension_from_mime_type, sanitize_filename};
use crate::remote::MessageRecord;

/// Attachment kind of a classified message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Voice,
}

/// Metadata of an accepted record, independent of any output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedMessage {
    pub message_id: i64,
    pub kind: MediaKind,
    /// Sanitized filename.
    pub filename: String,
    pub duration: Option<u32>,
    pub date: Option<NaiveDateTime>,
}

impl ClassifiedMessage {
    /// Resolves the item against a target directory.
    #[must_use]
    pub fn into_download_item(self, target_dir: &Path) -> DownloadItem {
        DownloadItem {
            path: target_dir.join(&self.filename),
            filename: self.filename,
            duration: self.duration,
            message_id: self.message_id,
        }
    }
}

/// A unit of download work derived from one accepted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadItem {
    pub filename: String,
    pub path: PathBuf,
    pub duration: Option<u32>,
    pub message_id: i64,
}

/// Classifies a record.
///
/// A record is accepted iff it carries an audio or voice attachment; audio
/// wins when both are present. Audio files keep their declared name, or get
/// `audio_<id><ext>` with the extension taken from the MIME type
/// (`.mp3` when unknown). Voice notes are always `voice_<id>.ogg`.
#[must_use]
pub fn classify(record: &MessageRecord) -> Option<ClassifiedMessage> {
    let (kind, raw_name, duration) = if let Some(audio) = &record.audio {
        let name = audio
            .file_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                let ext = audio
                    .mime_type
                    .as_deref()
                    .and_then(extension_from_mime_type)
                    .unwrap_or(DEFAULT_AUDIO_EXTENSION);
                format!("audio_{}{ext}", record.id)
            });
        (MediaKind::Audio, name, audio.duration)
    } else if let Some(voice) = &record.voice {
        (
            MediaKind::Voice,
            format!("voice_{}.ogg", record.id),
            voice.duration,
        )
    } else {
        return None;
    };

    Some(ClassifiedMessage {
        message_id: record.id,
        kind,
        filename: sanitize_filename(&raw_name),
        duration,
        date: record.date,
    })
}
