/// Result types for a counting run.
///
/// A run produces one [`ItemOutcome`] per work item and a single
/// [`RunSummary`] at the end. Outcomes are owned values that move out of the
/// worker that produced them:
///
/// ```rust,ignore
/// match outcome {
///     ItemOutcome::Counted(n) => aggregator.add(n).await?,
///     ItemOutcome::Failed(e) => reporter.report_error(&item, &e),
/// }
/// ```
///
/// Only `Counted` values ever reach the aggregator; a `Failed` outcome is
/// reported and then dropped, so the summary's `total` reflects successful
/// items only.
use std::fmt;

use crate::errors::CountError;

/// One input line: a file path or a URL, kept exactly as read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem(String);

impl WorkItem {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happened to a single work item
#[derive(Debug)]
pub enum ItemOutcome {
    /// The term was found this many times
    Counted(usize),
    /// Counting failed; the item contributes nothing to the total
    Failed(CountError),
}

impl ItemOutcome {
    pub fn is_counted(&self) -> bool {
        matches!(self, ItemOutcome::Counted(_))
    }

    /// The count, if the item succeeded
    pub fn count(&self) -> Option<usize> {
        match self {
            ItemOutcome::Counted(n) => Some(*n),
            ItemOutcome::Failed(_) => None,
        }
    }
}

/// The aggregator's answer to the shutdown request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalTally {
    /// Sum of every result received
    pub total: usize,
    /// Number of results received
    pub results: usize,
}

/// Everything known about a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Work items read from the input
    pub items: usize,
    /// Items whose count reached the aggregator
    pub counted: usize,
    /// Items that produced no result
    pub failed: usize,
    /// Grand total of occurrences
    pub total: usize,
    /// Highest number of workers observed running at once
    pub peak_concurrency: usize,
}

impl RunSummary {
    /// `failed` covers both reported failures and workers that never
    /// returned an outcome
    pub fn new(items: usize, failed: usize, tally: FinalTally, peak_concurrency: usize) -> Self {
        Self {
            items,
            counted: tally.results,
            failed,
            total: tally.total,
            peak_concurrency,
        }
    }
}
