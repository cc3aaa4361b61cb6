//! Exit code logic for the downloader process.
//!
//! Single responsibility: map how a run ended to the process exit outcome.

use audio_downloader_core::RunState;

use crate::ProcessExit;

/// Determines the process exit outcome from the final run state.
///
/// Per-item failures do not fail the process; they are listed in the error
/// report.
pub(crate) fn determine_exit_outcome(state: &RunState) -> ProcessExit {
    match state {
        RunState::Completed => ProcessExit::Success,
        RunState::Cancelled => ProcessExit::Cancelled,
        RunState::Failed { .. } => ProcessExit::Failure,
    }
}
