//! Run reports: a summary file for every run and an error log when needed.
//!
//! Both are UTF-8, newline separated text. File names are
//! `<timestamp>_<scan|downloaded>_<label>.txt` and
//! `<timestamp>_<scan|download>_errors_<label>.txt`.
//!
//! Writing is best-effort: failures are logged and reported as `None`,
//! never as a run failure.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::download::{ClassifiedMessage, ErrorEntry, RunMode, StatsSnapshot, sanitize_filename};

/// Timestamp format used in report file names.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y.%m.%d - %H_%M";

/// Timestamp format used inside reports.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HEADER_RULE_WIDTH: usize = 30;

/// Identity of the run a report describes.
#[derive(Debug, Clone)]
pub struct ReportMetadata {
    pub mode: RunMode,
    pub chat_id: String,
    pub chat_label: String,
    pub generated_at: NaiveDateTime,
}

/// Writes the report files of one run into a fixed directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
    mode: RunMode,
    stem_timestamp: String,
    safe_label: String,
}

impl ReportWriter {
    /// Creates a writer for a run started at `started_at` against `chat_label`.
    #[must_use]
    pub fn new(dir: &Path, mode: RunMode, started_at: NaiveDateTime, chat_label: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            mode,
            stem_timestamp: started_at.format(FILE_TIMESTAMP_FORMAT).to_string(),
            safe_label: sanitize_filename(chat_label),
        }
    }

    /// Path of the summary report.
    #[must_use]
    pub fn summary_path(&self) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_{}.txt",
            self.stem_timestamp,
            self.mode.report_tag(),
            self.safe_label
        ))
    }

    /// Path of the error report.
    #[must_use]
    pub fn error_path(&self) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_errors_{}.txt",
            self.stem_timestamp,
            self.mode.error_tag(),
            self.safe_label
        ))
    }

    /// Writes the summary report. Returns its path, or `None` if writing failed.
    pub async fn write_summary(
        &self,
        metadata: &ReportMetadata,
        stats: StatsSnapshot,
        items: &[ClassifiedMessage],
    ) -> Option<PathBuf> {
        let body = render_summary(metadata, stats, items);
        let path = self.summary_path();
        write_text(&path, &body).await.then_some(path)
    }

    /// Writes the error report if `entries` is non-empty.
    pub async fn write_errors(&self, entries: &[ErrorEntry]) -> Option<PathBuf> {
        if entries.is_empty() {
            return None;
        }
        let body = render_errors(entries);
        let path = self.error_path();
        write_text(&path, &body).await.then_some(path)
    }
}

/// Renders the summary report body.
#[must_use]
pub fn render_summary(
    metadata: &ReportMetadata,
    stats: StatsSnapshot,
    items: &[ClassifiedMessage],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} report ===", metadata.mode.label());
    let _ = writeln!(out, "Chat: {}", metadata.chat_label);
    let _ = writeln!(out, "Chat ID: {}", metadata.chat_id);
    let _ = writeln!(
        out,
        "Generated: {}",
        metadata.generated_at.format(DISPLAY_TIMESTAMP_FORMAT)
    );
    let _ = writeln!(out, "Found: {}", stats.found);
    let _ = writeln!(out, "Downloaded: {}", stats.downloaded);
    let _ = writeln!(out, "Skipped: {}", stats.skipped);
    let _ = writeln!(out, "Duplicates: {}", stats.duplicates);
    let _ = writeln!(out, "{}", "=".repeat(HEADER_RULE_WIDTH));
    for item in items {
        let _ = writeln!(out, "{}", render_item_line(item));
    }
    out
}

/// Renders one scan line:
/// `<filename> | message_id: <id> | duration: <n>s | date: <YYYY-MM-DD HH:MM:SS|N/A>`.
#[must_use]
pub fn render_item_line(item: &ClassifiedMessage) -> String {
    let duration = item
        .duration
        .map_or_else(|| "N/A".to_string(), |d| format!("{d}s"));
    let date = item.date.map_or_else(
        || "N/A".to_string(),
        |d| d.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
    );
    format!(
        "{} | message_id: {} | duration: {duration} | date: {date}",
        item.filename, item.message_id
    )
}

/// Renders the error report body, one entry per line.
#[must_use]
pub fn render_errors(entries: &[ErrorEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{entry}");
    }
    out
}

async fn write_text(path: &Path, body: &str) -> bool {
    if let Some(parent) = path.parent()
        && let Err(e) = tokio::fs::create_dir_all(parent).await
    {
        warn!(path = %path.display(), error = %e, "failed to create report directory");
        return false;
    }
    match tokio::fs::write(path, body).await {
        Ok(()) => {
            debug!(path = %path.display(), "report written");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to write report");
            false
        }
    }
}
