use std::sync::Arc;
use tracing::debug;

use super::aggregator::AggregatorHandle;
use super::limiter::ConcurrencySlot;
use super::report::Reporter;
use crate::count::SourceCounter;
use crate::errors::CountResult;
use crate::metrics::CountMetrics;
use crate::results::{ItemOutcome, WorkItem};
use crate::source::Source;

/// Everything a worker needs besides its item and slot
pub struct WorkerContext<C, R> {
    counter: Arc<C>,
    reporter: Arc<R>,
    aggregator: AggregatorHandle,
    metrics: CountMetrics,
}

impl<C, R> WorkerContext<C, R>
where
    C: SourceCounter,
    R: Reporter,
{
    pub fn new(
        counter: Arc<C>,
        reporter: Arc<R>,
        aggregator: AggregatorHandle,
        metrics: CountMetrics,
    ) -> Self {
        Self {
            counter,
            reporter,
            aggregator,
            metrics,
        }
    }

    /// Counts one item and reports the outcome.
    ///
    /// A successful count is queued with the aggregator before this returns,
    /// so a joined worker never has a result still in flight. The slot is
    /// held for the whole call and freed when it returns or unwinds.
    ///
    /// Item failures are reported and returned as [`ItemOutcome::Failed`];
    /// the only `Err` is a closed aggregator inbox.
    pub async fn process(
        &self,
        item: WorkItem,
        slot: ConcurrencySlot,
    ) -> CountResult<ItemOutcome> {
        let _slot = slot;
        let source = Source::classify(item.as_str());
        debug!("Worker started for {} ({})", item, source.kind());

        match self.counter.count(&source).await {
            Ok(found) => {
                self.metrics.record_success(&source, found.bytes_scanned);
                self.reporter.report_count(&item, found.occurrences);
                self.aggregator.add(found.occurrences).await?;
                Ok(ItemOutcome::Counted(found.occurrences))
            }
            Err(e) => {
                debug!("Worker failed for {}: {}", item, e);
                self.metrics.record_failure();
                self.reporter.report_error(&item, &e);
                Ok(ItemOutcome::Failed(e))
            }
        }
    }
}

impl<C, R> Clone for WorkerContext<C, R> {
    fn clone(&self) -> Self {
        Self {
            counter: Arc::clone(&self.counter),
            reporter: Arc::clone(&self.reporter),
            aggregator: self.aggregator.clone(),
            metrics: self.metrics.clone(),
        }
    }
}
