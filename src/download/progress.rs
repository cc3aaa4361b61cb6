//! Progress delivery from the worker to the foreground.
//!
//! The worker owns a [`ProgressReporter`]; the foreground owns the matching
//! [`ProgressReceiver`] and drains it from its own loop. Sending never waits
//! on the foreground during a run: when the channel is full the newest
//! update is parked and replaces any update parked before it. The parked
//! update is flushed when the run finishes.

use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use super::RunMode;
use super::stats::StatsSnapshot;

/// Default capacity of the progress channel.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 64;

/// Upper bound on how long the final flush waits for channel room.
///
/// A foreground that stops draining must not keep the run from writing its
/// reports; the summary carries the final counts either way.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Event delivered to the foreground.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The run resolved its target and started enumerating.
    Started { mode: RunMode, chat_label: String },
    /// Progress through the run, `fraction` in `[0, 1]`.
    Progress { fraction: f64, stats: StatsSnapshot },
}

/// Receiving half handed to the foreground.
pub type ProgressReceiver = mpsc::Receiver<ProgressEvent>;

/// Sending half used by the run coordinator.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: Option<mpsc::Sender<ProgressEvent>>,
    pending: Option<ProgressEvent>,
    coalesced: usize,
}

impl ProgressReporter {
    /// Creates a reporter and the receiver the foreground should drain.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, ProgressReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx: Some(tx),
                pending: None,
                coalesced: 0,
            },
            rx,
        )
    }

    /// A reporter that discards every update.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            tx: None,
            pending: None,
            coalesced: 0,
        }
    }

    /// Announces the start of a run.
    pub fn started(&mut self, mode: RunMode, chat_label: &str) {
        self.offer(ProgressEvent::Started {
            mode,
            chat_label: chat_label.to_string(),
        });
    }

    /// Reports progress. `fraction` is clamped to `[0, 1]`; NaN becomes 0.
    pub fn report(&mut self, fraction: f64, stats: StatsSnapshot) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.offer(ProgressEvent::Progress { fraction, stats });
    }

    /// Number of updates replaced by a newer one before delivery.
    #[must_use]
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }

    /// Delivers the parked update, if any, waiting up to five seconds for
    /// channel room. After that the update is dropped with a warning.
    pub async fn flush(&mut self) {
        let (Some(tx), Some(event)) = (self.tx.as_ref(), self.pending.take()) else {
            return;
        };
        match tokio::time::timeout(FLUSH_TIMEOUT, tx.send(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                debug!("progress receiver dropped before final update");
                self.tx = None;
            }
            Err(_) => warn!(
                timeout_secs = FLUSH_TIMEOUT.as_secs(),
                "foreground did not drain progress channel; final update dropped"
            ),
        }
    }

    fn offer(&mut self, event: ProgressEvent) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {
                if self.pending.take().is_some() {
                    self.coalesced += 1;
                }
            }
            Err(TrySendError::Full(event)) => {
                if self.pending.replace(event).is_some() {
                    self.coalesced += 1;
                }
            }
            Err(TrySendError::Closed(_)) => {
                debug!("progress receiver dropped; further updates discarded");
                self.tx = None;
                self.pending = None;
            }
        }
    }
}

/// Fraction of `done` over `total`, 0 when `total` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64
    }
}
