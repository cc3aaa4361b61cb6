//! Filename sanitization and extension lookup for downloaded attachments.

/// Name used when sanitization leaves nothing behind.
pub const FALLBACK_FILENAME: &str = "file";

/// Extension used when the MIME type does not map to a known audio format.
pub const DEFAULT_AUDIO_EXTENSION: &str = ".mp3";

/// Sanitizes a filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems
/// (`\ / : * ? " < > |`) with `_`, trims surrounding whitespace and falls
/// back to [`FALLBACK_FILENAME`] if the result is empty or only dots. The
/// function is idempotent.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim();
    // "." and ".." would resolve outside the target folder.
    if trimmed.chars().all(|c| c == '.') {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Guess a file extension (with leading dot) from an audio MIME type.
///
/// Parameters after `;` are ignored. Returns `None` for unknown types.
#[must_use]
pub fn extension_from_mime_type(mime_type: &str) -> Option<&'static str> {
    let mime = mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    let ext = match mime.as_str() {
        "audio/mpeg" | "audio/mp3" | "audio/mpeg3" | "audio/x-mpeg-3" => ".mp3",
        "audio/ogg" | "application/ogg" => ".ogg",
        "audio/opus" => ".opus",
        "audio/flac" | "audio/x-flac" => ".flac",
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => ".wav",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => ".m4a",
        "audio/aac" | "audio/x-aac" => ".aac",
        "audio/webm" => ".weba",
        "audio/amr" => ".amr",
        "audio/x-ms-wma" => ".wma",
        "audio/aiff" | "audio/x-aiff" => ".aiff",
        _ => return None,
    };
    Some(ext)
}
