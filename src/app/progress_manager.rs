//! Progress UI (bar) for scan and download runs.

use audio_downloader_core::download::{ProgressEvent, ProgressReceiver, StatsSnapshot};
use indicatif::{ProgressBar, ProgressStyle};

const BAR_LENGTH: u64 = 1000;

/// Drains `events` until the run drops its sender.
///
/// The channel is always drained so the worker never sees a full channel
/// for long; the bar is only drawn when `use_bar` is set.
pub(crate) fn spawn_progress_ui(
    use_bar: bool,
    mut events: ProgressReceiver,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let bar = if use_bar {
            let bar = ProgressBar::new(BAR_LENGTH);
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{bar:30}] {percent:>3}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            Some(bar)
        } else {
            None
        };

        while let Some(event) = events.recv().await {
            let Some(bar) = bar.as_ref() else {
                continue;
            };
            match event {
                ProgressEvent::Started { mode, chat_label } => {
                    bar.set_message(format!("{} {chat_label}", mode.label()));
                }
                ProgressEvent::Progress { fraction, stats } => {
                    bar.set_position(bar_position(fraction));
                    bar.set_message(counters_message(stats));
                }
            }
        }

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn bar_position(fraction: f64) -> u64 {
    (fraction.clamp(0.0, 1.0) * BAR_LENGTH as f64).round() as u64
}

fn counters_message(stats: StatsSnapshot) -> String {
    format!(
        "found {} | downloaded {} | skipped {} | duplicates {}",
        stats.found, stats.downloaded, stats.skipped, stats.duplicates
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use audio_downloader_core::download::ProgressReporter;

    #[test]
    fn test_bar_position_scales_fraction() {
        assert_eq!(bar_position(0.0), 0);
        assert_eq!(bar_position(0.5), 500);
        assert_eq!(bar_position(1.0), BAR_LENGTH);
    }

    #[tokio::test]
    async fn test_progress_ui_ends_when_sender_dropped() {
        let (mut reporter, events) = ProgressReporter::channel(4);
        let handle = spawn_progress_ui(false, events);

        reporter.report(0.5, StatsSnapshot::default());
        drop(reporter);

        let joined = tokio::time::timeout(std::time::Duration::from_secs(2), handle).await;
        assert!(joined.is_ok(), "progress task should exit once the run ends");
    }
}
