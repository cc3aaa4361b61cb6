//! Run parameters and results.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use super::classifier::ClassifiedMessage;
use super::errors::ErrorEntry;
use super::stats::StatsSnapshot;

/// What a run does with the messages it finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Classify and list audio messages without transferring them.
    Scan,
    /// Transfer every audio message not already on disk.
    Download,
}

impl RunMode {
    /// Human readable operation name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Scan => "Scan",
            Self::Download => "Download",
        }
    }

    /// Tag used in summary report file names.
    #[must_use]
    pub fn report_tag(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Download => "downloaded",
        }
    }

    /// Tag used in error report file names.
    #[must_use]
    pub fn error_tag(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Download => "download",
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// The whole history was processed.
    Completed,
    /// The user stopped the run.
    Cancelled,
    /// A run-level error stopped the run.
    Failed { message: String },
}

impl RunState {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub mode: RunMode,
    pub chat_id: String,
    pub chat_label: String,
    pub started_at: NaiveDateTime,
    pub state: RunState,
    pub stats: StatsSnapshot,
    pub errors: Vec<ErrorEntry>,
    /// Accepted items, in stream order (scan runs only).
    pub items: Vec<ClassifiedMessage>,
    /// Path of the summary report, if it was written.
    pub report_path: Option<PathBuf>,
    /// Path of the error report, if one was written.
    pub error_report_path: Option<PathBuf>,
}

impl RunOutcome {
    /// Number of downloadable items found.
    #[must_use]
    pub fn found(&self) -> usize {
        self.stats.found
    }
}
