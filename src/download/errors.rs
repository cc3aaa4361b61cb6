//! Per-run error collection.

use std::fmt;

use super::RunMode;

/// Severity of an [`ErrorEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A single item failed; the run continued.
    Item,
    /// The run itself failed and stopped.
    Critical,
    /// The user cancelled the run. Recorded for audit, not an error.
    Cancelled,
}

/// One line of the error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub kind: EntryKind,
    pub message_id: Option<i64>,
    pub message: String,
}

impl ErrorEntry {
    /// Failure of one message.
    pub fn item(message_id: i64, message: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Item,
            message_id: Some(message_id),
            message: message.into(),
        }
    }

    /// Run-level failure.
    pub fn critical(message: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Critical,
            message_id: None,
            message: message.into(),
        }
    }

    /// Cancellation marker.
    #[must_use]
    pub fn cancelled(mode: RunMode) -> Self {
        Self {
            kind: EntryKind::Cancelled,
            message_id: None,
            message: format!("{} cancelled by user", mode.label()),
        }
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.message_id) {
            (EntryKind::Critical, _) => write!(f, "Critical: {}", self.message),
            (EntryKind::Cancelled, _) => f.write_str(&self.message),
            (EntryKind::Item, Some(id)) => write!(f, "Error msg_id {id}: {}", self.message),
            (EntryKind::Item, None) => write!(f, "Error msg_id N/A: {}", self.message),
        }
    }
}

/// Append-only, ordered list of [`ErrorEntry`] values for one run.
#[derive(Debug, Default, Clone)]
pub struct ErrorCollector {
    entries: Vec<ErrorEntry>,
}

impl ErrorCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ErrorEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<ErrorEntry> {
        self.entries
    }
}
