use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::source::Source;

/// Tracks per-run counting statistics.
///
/// Cloning shares the underlying counters, so every worker can hold its own
/// handle.
#[derive(Debug, Clone)]
pub struct CountMetrics {
    files_counted: Arc<AtomicU64>,
    urls_counted: Arc<AtomicU64>,
    bytes_scanned: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
}

impl CountMetrics {
    pub fn new() -> Self {
        Self {
            files_counted: Arc::new(AtomicU64::new(0)),
            urls_counted: Arc::new(AtomicU64::new(0)),
            bytes_scanned: Arc::new(AtomicU64::new(0)),
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a successfully counted source
    pub fn record_success(&self, source: &Source, bytes: u64) {
        match source {
            Source::Url(_) => self.urls_counted.fetch_add(1, Ordering::Relaxed),
            Source::File(_) => self.files_counted.fetch_add(1, Ordering::Relaxed),
        };
        let total = self.bytes_scanned.fetch_add(bytes, Ordering::Relaxed) + bytes;
        debug!("Scanned {} bytes from {}, total: {} bytes", bytes, source, total);
    }

    /// Records an item that produced no result
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> CountStats {
        CountStats {
            files_counted: self.files_counted.load(Ordering::Relaxed),
            urls_counted: self.urls_counted.load(Ordering::Relaxed),
            bytes_scanned: self.bytes_scanned.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Count stats:\n\
             Sources counted (file/url): {}/{}\n\
             Bytes scanned: {}\n\
             Failures: {}",
            stats.files_counted, stats.urls_counted, stats.bytes_scanned, stats.failures
        );
    }
}

impl Default for CountMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`CountMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountStats {
    pub files_counted: u64,
    pub urls_counted: u64,
    pub bytes_scanned: u64,
    pub failures: u64,
}
