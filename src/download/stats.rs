//! Per-run counters shared between the worker and the foreground.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters of one run.
///
/// Written only by the run coordinator on the worker thread; the
/// foreground reads them through an `Arc` while the run is in flight.
/// Atomics keep those cross-thread reads well defined without a lock.
#[derive(Debug, Default)]
pub struct RunStats {
    found: AtomicUsize,
    downloaded: AtomicUsize,
    skipped: AtomicUsize,
    duplicates: AtomicUsize,
}

impl RunStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of downloadable items found.
    #[must_use]
    pub fn found(&self) -> usize {
        self.found.load(Ordering::SeqCst)
    }

    /// Number of items transferred successfully.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded.load(Ordering::SeqCst)
    }

    /// Number of items whose transfer failed.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Number of items already present on disk.
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates.load(Ordering::SeqCst)
    }

    /// Items that reached a per-item decision (`downloaded + skipped + duplicates`).
    #[must_use]
    pub fn processed(&self) -> usize {
        self.downloaded() + self.skipped() + self.duplicates()
    }

    /// Copies the counters into a plain value.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            found: self.found(),
            downloaded: self.downloaded(),
            skipped: self.skipped(),
            duplicates: self.duplicates(),
        }
    }

    pub(crate) fn increment_found(&self) {
        self.found.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_downloaded(&self) {
        self.downloaded.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_duplicates(&self) {
        self.duplicates.fetch_add(1, Ordering::SeqCst);
    }
}

/// Point-in-time copy of [`RunStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub found: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

impl StatsSnapshot {
    /// `downloaded + skipped + duplicates`.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.downloaded + self.skipped + self.duplicates
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_run_stats_default() {
        let stats = RunStats::default();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
        assert_eq!(stats.processed(), 0);
    }

    #[test]
    fn test_run_stats_increment() {
        let stats = RunStats::new();

        stats.increment_found();
        stats.increment_found();
        stats.increment_found();
        stats.increment_downloaded();
        stats.increment_skipped();
        stats.increment_duplicates();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.found, 3);
        assert_eq!(snapshot.downloaded, 1);
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.duplicates, 1);
        assert_eq!(snapshot.processed(), 3);
    }

    #[test]
    fn test_run_stats_readable_from_other_thread() {
        let stats = Arc::new(RunStats::new());
        let writer = {
            let stats = Arc::clone(&stats);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    stats.increment_found();
                    stats.increment_downloaded();
                }
            })
        };
        writer.join().unwrap();

        assert_eq!(stats.found(), 100);
        assert_eq!(stats.downloaded(), 100);
    }
}
