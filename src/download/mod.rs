//! Scan and download runs over a chat's message history.
//!
//! # Overview
//!
//! - [`classify`] decides which messages carry downloadable audio and names them
//! - [`should_skip`] is the duplicate check against the target folder
//! - [`RunCoordinator`] drives one run and produces a [`RunOutcome`]
//! - [`RunWorker`] starts a run on a background thread and returns a
//!   [`RunHandle`] for progress, counters and cancellation
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use audio_downloader_core::download::{
//!     PROGRESS_CHANNEL_CAPACITY, RunCoordinator, RunRequest, RunWorker,
//! };
//! use audio_downloader_core::remote::{Credentials, ExportConnector};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = Arc::new(ExportConnector::new("./export"));
//! let coordinator = Arc::new(RunCoordinator::new(connector, Credentials::default()));
//! let worker = RunWorker::new(coordinator, PROGRESS_CHANNEL_CAPACITY);
//!
//! let mut handle = worker.spawn(RunRequest::scan("4242", "./reports"))?;
//! if let Some(mut progress) = handle.take_progress() {
//!     while let Some(event) = progress.recv().await {
//!         println!("{event:?}");
//!     }
//! }
//! let outcome = handle.wait().await?;
//! println!("found {}", outcome.found());
//! # Ok(())
//! # }
//! ```

mod cancel;
mod classifier;
mod coordinator;
mod dedup;
mod errors;
mod filename;
mod progress;
mod run;
mod stats;
mod worker;

pub use cancel::CancellationToken;
pub use classifier::{ClassifiedMessage, DownloadItem, MediaKind, classify};
pub use coordinator::{RunContext, RunCoordinator, RunError};
pub use dedup::should_skip;
pub use errors::{EntryKind, ErrorCollector, ErrorEntry};
pub use filename::{
    DEFAULT_AUDIO_EXTENSION, FALLBACK_FILENAME, extension_from_mime_type, sanitize_filename,
};
pub use progress::{
    PROGRESS_CHANNEL_CAPACITY, ProgressEvent, ProgressReceiver, ProgressReporter, fraction,
};
pub use run::{RunMode, RunOutcome, RunState};
pub use stats::{RunStats, StatsSnapshot};
pub use worker::{RunHandle, RunRequest, RunWorker, WorkerError};
