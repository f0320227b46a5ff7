use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use super::limiter::ConcurrencyLimiter;
use super::report::Reporter;
use super::worker::WorkerContext;
use crate::count::file::strip_line_ending;
use crate::count::SourceCounter;
use crate::errors::{CountError, CountResult};
use crate::results::{ItemOutcome, WorkItem};

/// Reads work items and fans them out to workers under the concurrency cap
pub struct Dispatcher<C, R> {
    limiter: ConcurrencyLimiter,
    context: WorkerContext<C, R>,
    workers: JoinSet<CountResult<ItemOutcome>>,
    ledger: DispatchLedger,
}

/// Bookkeeping for one dispatch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchLedger {
    /// Items read from the input and handed to a worker
    pub dispatched: usize,
    /// Workers that have finished, however they ended
    pub completed: usize,
    /// Workers whose item failed and was reported as an error
    pub failed: usize,
    /// Workers that panicked instead of returning an outcome
    pub panicked: usize,
}

impl DispatchLedger {
    pub fn in_flight(&self) -> usize {
        self.dispatched - self.completed
    }

    /// Items that did not contribute to the total
    pub fn not_counted(&self) -> usize {
        self.failed + self.panicked
    }
}

impl<C, R> Dispatcher<C, R>
where
    C: SourceCounter,
    R: Reporter,
{
    pub fn new(limiter: ConcurrencyLimiter, context: WorkerContext<C, R>) -> Self {
        Self {
            limiter,
            context,
            workers: JoinSet::new(),
            ledger: DispatchLedger::default(),
        }
    }

    /// Reads `input` to the end, spawning one worker per line, then waits for
    /// every spawned worker to finish.
    ///
    /// Returns only once nothing is in flight. Dropping the dispatcher on the
    /// way out also drops its aggregator handle, so the caller may ask the
    /// aggregator for its total as soon as this returns.
    ///
    /// A read error is fatal: the remaining workers are aborted and the error
    /// is returned as [`CountError::Input`].
    pub async fn dispatch<I>(mut self, mut input: I) -> CountResult<DispatchLedger>
    where
        I: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::with_capacity(256);

        while let Some(item) = read_item(&mut input, &mut buf)
            .await
            .map_err(CountError::input)?
        {
            let slot = self.limiter.acquire().await?;
            debug!(
                "Dispatching {} ({} of {} slots in use)",
                item,
                self.limiter.in_flight(),
                self.limiter.max_concurrent()
            );

            let context = self.context.clone();
            self.workers
                .spawn(async move { context.process(item, slot).await });
            self.ledger.dispatched += 1;

            // Reap anything already done so finished handles don't pile up
            while let Some(joined) = self.workers.try_join_next() {
                self.settle(joined)?;
            }
        }

        debug!(
            "Input exhausted after {} items, waiting for {} workers",
            self.ledger.dispatched,
            self.ledger.in_flight()
        );

        while let Some(joined) = self.workers.join_next().await {
            self.settle(joined)?;
        }

        debug_assert_eq!(self.ledger.in_flight(), 0);
        Ok(self.ledger)
    }

    fn settle(
        &mut self,
        joined: Result<CountResult<ItemOutcome>, tokio::task::JoinError>,
    ) -> CountResult<()> {
        self.ledger.completed += 1;
        match joined {
            Ok(Ok(ItemOutcome::Counted(_))) => Ok(()),
            Ok(Ok(ItemOutcome::Failed(_))) => {
                self.ledger.failed += 1;
                Ok(())
            }
            Ok(Err(e)) if e.is_fatal() => {
                error!("Worker could not deliver its result: {}", e);
                Err(e)
            }
            Ok(Err(e)) => {
                warn!("Worker returned an unreported error: {}", e);
                Ok(())
            }
            Err(e) => {
                warn!("Worker panicked: {}", e);
                self.ledger.panicked += 1;
                Ok(())
            }
        }
    }
}

/// Reads the next line as a work item. `None` at end of input.
///
/// Lines end at `\n` with an optional `\r` before it; a last line without a
/// terminator still counts. Invalid UTF-8 is replaced rather than rejected.
async fn read_item<I>(input: &mut I, buf: &mut Vec<u8>) -> std::io::Result<Option<WorkItem>>
where
    I: AsyncBufRead + Unpin,
{
    buf.clear();
    if input.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(strip_line_ending(buf));
    Ok(Some(WorkItem::new(line.into_owned())))
}
