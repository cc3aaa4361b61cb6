//! Run coordinator: drives one scan or download run end to end.
//!
//! # Overview
//!
//! A run connects through a [`Connector`], resolves the chat label, reads
//! the history stream exactly once and then:
//!
//! - **scan**: classifies every record and lists the accepted ones
//! - **download**: buffers the accepted records as [`DownloadItem`]s, then
//!   processes them in stream order through the duplicate check and the
//!   transfer primitive
//!
//! Per-item failures are recorded and the run continues. A failure to
//! connect or to read the stream ends the run with a `Critical` entry and
//! whatever was counted so far. Either way the summary report is written.
//!
//! # Cancellation
//!
//! The [`CancellationToken`] is checked before connecting and before every
//! item. Every remote wait except a transfer (connect, label lookup, size
//! hint, opening and reading the stream) is raced against it. A transfer
//! already in flight always finishes first.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use futures_util::StreamExt;
use tracing::{debug, error, info, instrument, warn};

use super::cancel::CancellationToken;
use super::classifier::{ClassifiedMessage, DownloadItem, classify};
use super::dedup::should_skip;
use super::errors::{ErrorCollector, ErrorEntry};
use super::filename::sanitize_filename;
use super::progress::{ProgressReporter, fraction};
use super::run::{RunMode, RunOutcome, RunState};
use super::stats::RunStats;
use crate::remote::{ChatClient, Connector, Credentials, MessageRecord, MessageStream, RemoteError};
use crate::report::{ReportMetadata, ReportWriter};

/// Error that ends a run early.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Connecting, label lookup or streaming failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The per-chat download folder could not be created.
    #[error("cannot create folder {path}: {source}")]
    Io {
        /// Folder being created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// State of one run, owned by the coordinator for the run's lifetime.
///
/// The foreground keeps clones of [`stats`](Self::stats) and the
/// cancellation token; everything else is private to the worker.
#[derive(Debug)]
pub struct RunContext {
    stats: Arc<RunStats>,
    cancel: CancellationToken,
    progress: ProgressReporter,
    errors: ErrorCollector,
}

impl RunContext {
    /// Creates a context with zeroed stats and an empty error log.
    #[must_use]
    pub fn new(cancel: CancellationToken, progress: ProgressReporter) -> Self {
        Self {
            stats: Arc::new(RunStats::new()),
            cancel,
            progress,
            errors: ErrorCollector::new(),
        }
    }

    /// Shared handle to the run's counters.
    #[must_use]
    pub fn stats(&self) -> Arc<RunStats> {
        Arc::clone(&self.stats)
    }

    /// The run's cancellation token.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

enum Pull {
    Record(MessageRecord),
    Exhausted,
    Cancelled,
}

/// Orchestrates scan and download runs against a remote chat.
pub struct RunCoordinator {
    connector: Arc<dyn Connector>,
    credentials: Credentials,
}

impl std::fmt::Debug for RunCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunCoordinator")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl RunCoordinator {
    /// Creates a coordinator that opens sessions through `connector`.
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>, credentials: Credentials) -> Self {
        Self {
            connector,
            credentials,
        }
    }

    /// Scans `chat_id` and writes the scan report into `output_dir`.
    pub async fn run_scan(&self, chat_id: &str, output_dir: &Path, ctx: RunContext) -> RunOutcome {
        self.run(RunMode::Scan, chat_id, output_dir, ctx).await
    }

    /// Downloads the audio of `chat_id` into `<output_dir>/<chat label>/`.
    pub async fn run_download(
        &self,
        chat_id: &str,
        output_dir: &Path,
        ctx: RunContext,
    ) -> RunOutcome {
        self.run(RunMode::Download, chat_id, output_dir, ctx).await
    }

    /// Runs `mode` against `chat_id`.
    ///
    /// Never fails: run-level errors are reported through
    /// [`RunOutcome::state`] and a `Critical` error entry.
    #[instrument(skip_all, fields(mode = mode.label(), chat_id = %chat_id, output_dir = %output_dir.display()))]
    pub async fn run(
        &self,
        mode: RunMode,
        chat_id: &str,
        output_dir: &Path,
        mut ctx: RunContext,
    ) -> RunOutcome {
        let started_at = now();
        let mut chat_label = fallback_label(chat_id);
        let mut items = Vec::new();

        info!("run started");

        let state = match self
            .execute(mode, chat_id, output_dir, &mut ctx, &mut chat_label, &mut items)
            .await
        {
            Ok(state) => state,
            Err(e) => {
                error!(error = %e, "run failed");
                ctx.errors.push(ErrorEntry::critical(e.to_string()));
                RunState::Failed {
                    message: e.to_string(),
                }
            }
        };

        ctx.progress.flush().await;
        if ctx.progress.coalesced() > 0 {
            debug!(
                coalesced = ctx.progress.coalesced(),
                "progress updates coalesced"
            );
        }

        let stats = ctx.stats.snapshot();
        let report_dir = match mode {
            RunMode::Scan => output_dir.to_path_buf(),
            RunMode::Download => chat_folder(output_dir, &chat_label),
        };
        let writer = ReportWriter::new(&report_dir, mode, started_at, &chat_label);
        let metadata = ReportMetadata {
            mode,
            chat_id: chat_id.to_string(),
            chat_label: chat_label.clone(),
            generated_at: now(),
        };
        let report_path = writer.write_summary(&metadata, stats, &items).await;
        let errors = ctx.errors.into_entries();
        let error_report_path = writer.write_errors(&errors).await;

        info!(
            state = ?state,
            found = stats.found,
            downloaded = stats.downloaded,
            skipped = stats.skipped,
            duplicates = stats.duplicates,
            errors = errors.len(),
            "run finished"
        );

        RunOutcome {
            mode,
            chat_id: chat_id.to_string(),
            chat_label,
            started_at,
            state,
            stats,
            errors,
            items,
            report_path,
            error_report_path,
        }
    }

    async fn execute(
        &self,
        mode: RunMode,
        chat_id: &str,
        output_dir: &Path,
        ctx: &mut RunContext,
        chat_label: &mut String,
        items: &mut Vec<ClassifiedMessage>,
    ) -> Result<RunState, RunError> {
        if ctx.cancel.is_cancelled() {
            return Ok(cancelled(ctx, mode));
        }
        if self.connector.requires_login() {
            self.credentials.validate()?;
        }

        let Some(client) =
            until_cancelled(self.connector.connect(&self.credentials), &ctx.cancel).await
        else {
            return Ok(cancelled(ctx, mode));
        };
        let client = client?;

        let Some(label) = until_cancelled(resolve_label(client.as_ref(), chat_id), &ctx.cancel).await
        else {
            return Ok(cancelled(ctx, mode));
        };
        *chat_label = label;
        ctx.progress.started(mode, chat_label);

        match mode {
            RunMode::Scan => scan(client.as_ref(), chat_id, ctx, items).await,
            RunMode::Download => {
                let target_dir = chat_folder(output_dir, chat_label);
                tokio::fs::create_dir_all(&target_dir)
                    .await
                    .map_err(|source| RunError::Io {
                        path: target_dir.clone(),
                        source,
                    })?;
                download(client.as_ref(), chat_id, &target_dir, ctx).await
            }
        }
    }
}

async fn scan(
    client: &dyn ChatClient,
    chat_id: &str,
    ctx: &mut RunContext,
    items: &mut Vec<ClassifiedMessage>,
) -> Result<RunState, RunError> {
    let Some(total) = until_cancelled(client.history_size_hint(chat_id), &ctx.cancel).await else {
        return Ok(cancelled(ctx, RunMode::Scan));
    };
    let Some(stream) = until_cancelled(client.stream_history(chat_id), &ctx.cancel).await else {
        return Ok(cancelled(ctx, RunMode::Scan));
    };
    let mut stream = stream?;
    let mut visited = 0usize;

    loop {
        let record = match pull(&mut stream, &ctx.cancel).await? {
            Pull::Record(record) => record,
            Pull::Exhausted => break,
            Pull::Cancelled => return Ok(cancelled(ctx, RunMode::Scan)),
        };
        visited += 1;

        if let Some(classified) = classify(&record) {
            debug!(
                message_id = classified.message_id,
                filename = %classified.filename,
                "audio message found"
            );
            ctx.stats.increment_found();
            items.push(classified);
        }

        // Without a size hint the bar stays at zero but the counts still move.
        let done = total.map_or(0.0, |total| fraction(visited, total));
        ctx.progress.report(done, ctx.stats.snapshot());
    }

    ctx.progress.report(1.0, ctx.stats.snapshot());
    Ok(RunState::Completed)
}

async fn download(
    client: &dyn ChatClient,
    chat_id: &str,
    target_dir: &Path,
    ctx: &mut RunContext,
) -> Result<RunState, RunError> {
    let Some(stream) = until_cancelled(client.stream_history(chat_id), &ctx.cancel).await else {
        return Ok(cancelled(ctx, RunMode::Download));
    };
    let mut stream = stream?;
    let mut candidates: Vec<(MessageRecord, DownloadItem)> = Vec::new();

    loop {
        let record = match pull(&mut stream, &ctx.cancel).await? {
            Pull::Record(record) => record,
            Pull::Exhausted => break,
            Pull::Cancelled => return Ok(cancelled(ctx, RunMode::Download)),
        };
        if let Some(classified) = classify(&record) {
            ctx.stats.increment_found();
            candidates.push((record, classified.into_download_item(target_dir)));
            ctx.progress.report(0.0, ctx.stats.snapshot());
        }
    }
    drop(stream);

    let total = candidates.len();
    info!(found = total, "download candidates collected");

    for (index, (record, item)) in candidates.iter().enumerate() {
        if ctx.cancel.is_cancelled() {
            return Ok(cancelled(ctx, RunMode::Download));
        }
        process_item(client, record, item, ctx).await;
        ctx.progress
            .report(fraction(index + 1, total), ctx.stats.snapshot());
    }

    Ok(RunState::Completed)
}

async fn process_item(
    client: &dyn ChatClient,
    record: &MessageRecord,
    item: &DownloadItem,
    ctx: &mut RunContext,
) {
    if should_skip(&item.path).await {
        ctx.stats.increment_duplicates();
        info!(path = %item.path.display(), "skipped duplicate");
        return;
    }

    match client.transfer(record, &item.path).await {
        Ok(()) => {
            ctx.stats.increment_downloaded();
            info!(path = %item.path.display(), "downloaded");
        }
        Err(e) => {
            ctx.stats.increment_skipped();
            warn!(message_id = item.message_id, error = %e, "transfer failed");
            ctx.errors.push(ErrorEntry::item(item.message_id, e.to_string()));
        }
    }
}

/// Takes the next record, giving up early if the run is cancelled.
async fn pull(stream: &mut MessageStream, cancel: &CancellationToken) -> Result<Pull, RemoteError> {
    if cancel.is_cancelled() {
        return Ok(Pull::Cancelled);
    }
    tokio::select! {
        biased;
        () = cancel.cancelled() => Ok(Pull::Cancelled),
        next = stream.next() => match next {
            Some(Ok(record)) => Ok(Pull::Record(record)),
            Some(Err(e)) => Err(e),
            None => Ok(Pull::Exhausted),
        },
    }
}

/// Awaits `fut` unless the run is cancelled first, in which case `fut` is
/// dropped and `None` is returned.
async fn until_cancelled<F: Future>(fut: F, cancel: &CancellationToken) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

fn cancelled(ctx: &mut RunContext, mode: RunMode) -> RunState {
    info!(
        processed = ctx.stats.processed(),
        found = ctx.stats.found(),
        "run cancelled by user"
    );
    ctx.errors.push(ErrorEntry::cancelled(mode));
    RunState::Cancelled
}

async fn resolve_label(client: &dyn ChatClient, chat_id: &str) -> String {
    match client.resolve_chat_label(chat_id).await {
        Ok(label) if !label.trim().is_empty() => label,
        Ok(_) => fallback_label(chat_id),
        Err(e) => {
            debug!(chat_id, error = %e, "chat label lookup failed; using fallback");
            fallback_label(chat_id)
        }
    }
}

fn fallback_label(chat_id: &str) -> String {
    format!("chat_{}", chat_id.trim())
}

fn chat_folder(output_dir: &Path, chat_label: &str) -> PathBuf {
    output_dir.join(sanitize_filename(chat_label))
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
