//! Audio Downloader Core Library
//!
//! Scans a chat's message history for audio attachments, downloads them
//! into a local folder and writes a report for every run.
//!
//! # Architecture
//!
//! - [`remote`] - Connector and chat client seams, plus the bundled chat export backend
//! - [`download`] - Classification, duplicate checks, run coordination and the background worker
//! - [`report`] - Summary and error report files

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod remote;
pub mod report;

// Re-export commonly used types
pub use download::{
    CancellationToken, ErrorEntry, PROGRESS_CHANNEL_CAPACITY, ProgressEvent, RunCoordinator,
    RunHandle, RunMode, RunOutcome, RunRequest, RunState, RunWorker, StatsSnapshot, WorkerError,
};
pub use remote::{ChatClient, Connector, Credentials, ExportConnector, RemoteError};
pub use report::ReportWriter;
