//! User-facing terminal output.

use audio_downloader_core::download::{RunMode, RunOutcome, RunState};
use audio_downloader_core::remote::ChatSummary;

/// Builds the end-of-run summary lines.
pub(crate) fn run_summary_lines(outcome: &RunOutcome) -> Vec<String> {
    let stats = outcome.stats;
    let verb = match &outcome.state {
        RunState::Completed => "finished",
        RunState::Cancelled => "cancelled",
        RunState::Failed { .. } => "failed",
    };
    let counters = match outcome.mode {
        RunMode::Scan => format!("found {}", stats.found),
        RunMode::Download => format!(
            "found {}, downloaded {}, skipped {}, duplicates {}",
            stats.found, stats.downloaded, stats.skipped, stats.duplicates
        ),
    };

    let mut lines = vec![format!(
        "{} {verb} for {}: {counters}",
        outcome.mode.label(),
        outcome.chat_label
    )];
    if let RunState::Failed { message } = &outcome.state {
        lines.push(format!("  Reason: {message}"));
    }
    if let Some(path) = &outcome.report_path {
        lines.push(format!("  Report: {}", path.display()));
    }
    if let Some(path) = &outcome.error_report_path {
        lines.push(format!(
            "  Errors ({}): {}",
            outcome.errors.len(),
            path.display()
        ));
    }
    lines
}

pub(crate) fn print_run_summary(outcome: &RunOutcome) {
    for line in run_summary_lines(outcome) {
        println!("{line}");
    }
}

pub(crate) fn print_chats(chats: &[ChatSummary]) {
    if chats.is_empty() {
        println!("No chats found");
        return;
    }
    for chat in chats {
        println!("{}", chat.label());
    }
}

#[cfg(test)]
mod tests {
    use super::run_summary_lines;
    use audio_downloader_core::download::{ErrorEntry, RunMode, RunOutcome, RunState, StatsSnapshot};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn outcome(mode: RunMode, state: RunState) -> RunOutcome {
        RunOutcome {
            mode,
            chat_id: "42".to_string(),
            chat_label: "Band (42)".to_string(),
            started_at: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
            state,
            stats: StatsSnapshot {
                found: 3,
                downloaded: 1,
                skipped: 1,
                duplicates: 1,
            },
            errors: Vec::new(),
            items: Vec::new(),
            report_path: Some(PathBuf::from("/out/report.txt")),
            error_report_path: None,
        }
    }

    #[test]
    fn test_download_summary_lists_all_counters() {
        let lines = run_summary_lines(&outcome(RunMode::Download, RunState::Completed));
        assert_eq!(
            lines[0],
            "Download finished for Band (42): found 3, downloaded 1, skipped 1, duplicates 1"
        );
        assert_eq!(lines[1], "  Report: /out/report.txt");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_scan_summary_only_counts_found() {
        let lines = run_summary_lines(&outcome(RunMode::Scan, RunState::Cancelled));
        assert_eq!(lines[0], "Scan cancelled for Band (42): found 3");
    }

    #[test]
    fn test_failed_summary_includes_reason_and_error_report() {
        let mut failed = outcome(
            RunMode::Download,
            RunState::Failed {
                message: "authentication failed: bad hash".to_string(),
            },
        );
        failed.errors.push(ErrorEntry::critical("authentication failed: bad hash"));
        failed.error_report_path = Some(PathBuf::from("/out/errors.txt"));

        let lines = run_summary_lines(&failed);

        assert!(lines[0].starts_with("Download failed"));
        assert_eq!(lines[1], "  Reason: authentication failed: bad hash");
        assert_eq!(lines[3], "  Errors (1): /out/errors.txt");
    }
}
