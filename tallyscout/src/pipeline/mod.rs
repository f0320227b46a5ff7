/// This module implements the bounded fan-out/fan-in counting pipeline.
///
/// # Shape of a run
///
/// ```text
/// input lines ──► Dispatcher ──(slot)──► Worker ─┐
///                     │          (slot)──► Worker ─┼──► Aggregator inbox ──► total
///                     │          (slot)──► Worker ─┘
///                     └── join all workers ──► shutdown request ──────────┘
/// ```
///
/// 1. **Dispatcher** reads one item per line. Before spawning a worker it waits
///    for a free slot from the [`ConcurrencyLimiter`], which is what bounds
///    parallelism and pushes back on the reader.
/// 2. **Workers** classify and count their item, print a report line, and
///    send a successful count to the aggregator before finishing.
/// 3. **Aggregator** is the only owner of the running total. It is reached
///    through a single inbox, so no locks are needed.
/// 4. **Shutdown** happens strictly after the dispatcher has joined every
///    worker. Because each worker queued its result before finishing, and the
///    shutdown request uses the same FIFO inbox, the aggregator has seen every
///    result by the time it answers.
///
/// # Compared to a shared counter
///
/// A global `AtomicUsize` or `Mutex<usize>` would also work for a sum, but
/// then "all results are in" has to be inferred from timing. Here it falls out
/// of the join-then-signal ordering:
/// ```rust,ignore
/// let ledger = dispatcher.dispatch(input).await?; // every worker joined
/// let tally = aggregator.finish().await?;         // only now ask for the total
/// ```
pub mod aggregator;
pub mod dispatcher;
pub mod limiter;
pub mod report;
pub mod worker;

pub use aggregator::{Aggregator, AggregatorHandle, AggregatorState};
pub use dispatcher::{DispatchLedger, Dispatcher};
pub use limiter::{ConcurrencyLimiter, ConcurrencySlot};
pub use report::{Reporter, StreamReporter};
pub use worker::WorkerContext;

use std::sync::Arc;
use tokio::io::AsyncBufRead;
use tracing::{info, warn};

use crate::config::CountConfig;
use crate::count::SourceCounter;
use crate::errors::CountResult;
use crate::metrics::CountMetrics;
use crate::results::RunSummary;

/// Counts the configured term across every item in `input`.
///
/// Per-item failures are reported through `reporter` and left out of the
/// total. Only a failure to read `input` itself ends the run early.
pub async fn run<I, C, R>(
    input: I,
    counter: Arc<C>,
    reporter: Arc<R>,
    config: &CountConfig,
) -> CountResult<RunSummary>
where
    I: AsyncBufRead + Unpin,
    C: SourceCounter,
    R: Reporter,
{
    info!(
        "Starting count of {:?} with concurrency {}",
        config.search_term, config.concurrency
    );

    let limiter = ConcurrencyLimiter::new(config.concurrency);
    let metrics = CountMetrics::new();
    let (aggregator, aggregator_task) = Aggregator::spawn(config.concurrency.get());

    let context = WorkerContext::new(counter, reporter, aggregator.clone(), metrics.clone());
    let ledger = Dispatcher::new(limiter.clone(), context)
        .dispatch(input)
        .await?;

    if ledger.panicked > 0 {
        warn!("{} workers panicked and were not counted", ledger.panicked);
    }

    // Every worker is joined; nothing else can reach the inbox now.
    let tally = aggregator.finish().await?;
    if let Err(e) = aggregator_task.await {
        warn!("Aggregator task ended abnormally: {}", e);
    }

    metrics.log_stats();

    let summary = RunSummary::new(
        ledger.dispatched,
        ledger.not_counted(),
        tally,
        limiter.peak_in_flight(),
    );
    info!(
        "Count complete. Total {} across {} of {} items (peak concurrency {})",
        summary.total, summary.counted, summary.items, summary.peak_concurrency
    );

    Ok(summary)
}
