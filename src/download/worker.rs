//! Background worker: runs one scan or download off the caller's thread.
//!
//! Each run gets a dedicated OS thread with its own current-thread tokio
//! runtime, so remote I/O never competes with the foreground's executor.
//! The foreground keeps a [`RunHandle`]: it drains progress events, reads
//! the shared counters, requests cancellation and finally collects the
//! [`RunOutcome`].

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, info_span};

use super::cancel::CancellationToken;
use super::coordinator::{RunContext, RunCoordinator};
use super::progress::{ProgressReceiver, ProgressReporter};
use super::run::{RunMode, RunOutcome};
use super::stats::RunStats;

/// Errors from starting or joining a worker.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The OS refused to start the worker thread.
    #[error("failed to start worker thread: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    /// The worker could not build its event loop.
    #[error("failed to build worker runtime: {source}")]
    Runtime {
        #[source]
        source: std::io::Error,
    },

    /// The worker thread panicked before producing an outcome.
    #[error("worker thread panicked")]
    Panicked,
}

/// What a worker should run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub mode: RunMode,
    pub chat_id: String,
    pub output_dir: PathBuf,
}

impl RunRequest {
    #[must_use]
    pub fn scan(chat_id: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: RunMode::Scan,
            chat_id: chat_id.into(),
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn download(chat_id: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: RunMode::Download,
            chat_id: chat_id.into(),
            output_dir: output_dir.into(),
        }
    }
}

/// Starts runs on background threads.
#[derive(Debug, Clone)]
pub struct RunWorker {
    coordinator: Arc<RunCoordinator>,
    progress_capacity: usize,
}

impl RunWorker {
    #[must_use]
    pub fn new(coordinator: Arc<RunCoordinator>, progress_capacity: usize) -> Self {
        Self {
            coordinator,
            progress_capacity,
        }
    }

    /// Starts `request` on a new thread.
    ///
    /// Every call builds fresh stats, a fresh cancellation token and a fresh
    /// progress channel. Nothing prevents two runs against the same output
    /// folder from overlapping.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Spawn`] if the thread cannot be started.
    pub fn spawn(&self, request: RunRequest) -> Result<RunHandle, WorkerError> {
        let cancel = CancellationToken::new();
        let (reporter, progress) = ProgressReporter::channel(self.progress_capacity);
        let ctx = RunContext::new(cancel.clone(), reporter);
        let stats = ctx.stats();
        let coordinator = Arc::clone(&self.coordinator);
        let mode = request.mode;

        let join = std::thread::Builder::new()
            .name(format!("{}-worker", mode.error_tag()))
            .spawn(move || run_on_thread(&coordinator, &request, ctx))
            .map_err(|source| WorkerError::Spawn { source })?;

        debug!(mode = mode.label(), "worker started");
        Ok(RunHandle {
            mode,
            cancel,
            stats,
            progress: Some(progress),
            join,
        })
    }
}

fn run_on_thread(
    coordinator: &RunCoordinator,
    request: &RunRequest,
    ctx: RunContext,
) -> Result<RunOutcome, WorkerError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| WorkerError::Runtime { source })?;

    let span = info_span!("worker", mode = request.mode.label(), chat_id = %request.chat_id);
    let _entered = span.enter();
    Ok(runtime.block_on(coordinator.run(
        request.mode,
        &request.chat_id,
        &request.output_dir,
        ctx,
    )))
}

/// Foreground side of a running worker.
#[derive(Debug)]
pub struct RunHandle {
    mode: RunMode,
    cancel: CancellationToken,
    stats: Arc<RunStats>,
    progress: Option<ProgressReceiver>,
    join: JoinHandle<Result<RunOutcome, WorkerError>>,
}

impl RunHandle {
    #[must_use]
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Asks the run to stop before its next item.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Live counters of the run, for display only.
    #[must_use]
    pub fn stats(&self) -> Arc<RunStats> {
        Arc::clone(&self.stats)
    }

    /// Takes the progress receiver. Returns `None` after the first call.
    pub fn take_progress(&mut self) -> Option<ProgressReceiver> {
        self.progress.take()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Blocks until the run finishes.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker could not run or panicked.
    pub fn join(self) -> Result<RunOutcome, WorkerError> {
        self.join.join().map_err(|_| WorkerError::Panicked)?
    }

    /// Waits for the run without blocking the caller's async runtime.
    ///
    /// # Errors
    ///
    /// Same as [`join`](Self::join).
    pub async fn wait(self) -> Result<RunOutcome, WorkerError> {
        tokio::task::spawn_blocking(move || self.join())
            .await
            .map_err(|_| WorkerError::Panicked)?
    }
}
