use std::io::{self, Write};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::warn;

use crate::errors::CountError;
use crate::results::WorkItem;

/// Where workers send their per-item report lines
pub trait Reporter: Send + Sync + 'static {
    /// An item was counted successfully
    fn report_count(&self, item: &WorkItem, count: usize);

    /// An item failed and contributes nothing to the total
    fn report_error(&self, item: &WorkItem, error: &CountError);
}

/// Formats the success line for an item
pub fn count_line(item: &WorkItem, count: usize) -> String {
    format!("Count for {}: {}", item, count)
}

/// Formats the error line for an item
pub fn error_line(item: &WorkItem, error: &CountError) -> String {
    format!("Error for {}: {}", item, error)
}

/// Writes success lines to stdout and error lines to stderr.
///
/// Writes block while the stream is full. On a multi-threaded runtime the
/// worker thread is handed over first so other tasks keep running.
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamReporter;

impl StreamReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for StreamReporter {
    fn report_count(&self, item: &WorkItem, count: usize) {
        let line = count_line(item, count);
        if let Err(e) = off_runtime(|| writeln!(io::stdout().lock(), "{}", line)) {
            warn!("Failed to write count for {}: {}", item, e);
        }
    }

    fn report_error(&self, item: &WorkItem, error: &CountError) {
        let line = error_line(item, error);
        if let Err(e) = off_runtime(|| writeln!(io::stderr().lock(), "{}", line)) {
            warn!("Failed to write error for {}: {}", item, e);
        }
    }
}

/// Runs a blocking write without starving other tasks on this worker thread.
/// `block_in_place` is unavailable on a current-thread runtime, where the
/// write runs inline.
fn off_runtime<T>(write: impl FnOnce() -> T) -> T {
    match Handle::try_current().map(|h| h.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(write),
        _ => write(),
    }
}
