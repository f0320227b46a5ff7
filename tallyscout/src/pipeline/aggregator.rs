use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::errors::{CountError, CountResult};
use crate::results::FinalTally;

/// Messages accepted by the aggregator task.
///
/// Results and the shutdown request travel through the same inbox, so the
/// aggregator sees every result sent before the request ahead of it.
#[derive(Debug)]
pub enum AggregatorMessage {
    /// One successful item's count
    Add(usize),
    /// No more results will arrive; answer with the final tally
    Finish { reply: oneshot::Sender<FinalTally> },
}

/// Lifecycle of the aggregator task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorState {
    Accepting,
    Finalized,
}

/// Owns the running total. Only reachable through its inbox.
#[derive(Debug)]
pub struct Aggregator {
    inbox: mpsc::Receiver<AggregatorMessage>,
    tally: FinalTally,
    state: AggregatorState,
}

impl Aggregator {
    /// Spawns the aggregator task and returns a handle to its inbox.
    ///
    /// `capacity` bounds the inbox; senders wait when it is full.
    pub fn spawn(capacity: usize) -> (AggregatorHandle, JoinHandle<AggregatorState>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let aggregator = Aggregator {
            inbox: rx,
            tally: FinalTally::default(),
            state: AggregatorState::Accepting,
        };
        let task = tokio::spawn(aggregator.run());
        (AggregatorHandle { tx }, task)
    }

    async fn run(mut self) -> AggregatorState {
        while self.state == AggregatorState::Accepting {
            match self.inbox.recv().await {
                Some(AggregatorMessage::Add(count)) => {
                    self.tally.total += count;
                    self.tally.results += 1;
                }
                Some(AggregatorMessage::Finish { reply }) => {
                    debug!(
                        "Aggregator finalizing: total {} from {} results",
                        self.tally.total, self.tally.results
                    );
                    self.state = AggregatorState::Finalized;
                    // The requester may have gone away; there is nobody left to tell.
                    let _ = reply.send(self.tally);
                }
                None => {
                    debug!("Aggregator inbox closed without a shutdown request");
                    break;
                }
            }
        }
        self.state
    }
}

/// Sending side of the aggregator inbox. Cheap to clone, one per worker.
#[derive(Debug, Clone)]
pub struct AggregatorHandle {
    tx: mpsc::Sender<AggregatorMessage>,
}

impl AggregatorHandle {
    /// Queues one result for the running total
    pub async fn add(&self, count: usize) -> CountResult<()> {
        self.tx
            .send(AggregatorMessage::Add(count))
            .await
            .map_err(|_| CountError::AggregatorUnavailable)
    }

    /// Asks for the final tally.
    ///
    /// Must only be called once every worker holding a handle has finished;
    /// results sent after this request are never counted.
    pub async fn finish(self) -> CountResult<FinalTally> {
        let (reply, answer) = oneshot::channel();
        self.tx
            .send(AggregatorMessage::Finish { reply })
            .await
            .map_err(|_| CountError::AggregatorUnavailable)?;
        answer.await.map_err(|_| CountError::AggregatorUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sums_results() {
        let (handle, task) = Aggregator::spawn(4);
        for n in [3, 0, 7, 1] {
            handle.add(n).await.unwrap();
        }

        let tally = handle.finish().await.unwrap();
        assert_eq!(tally, FinalTally { total: 11, results: 4 });
        assert_eq!(task.await.unwrap(), AggregatorState::Finalized);
    }

    #[tokio::test]
    async fn test_finish_without_results() {
        let (handle, _task) = Aggregator::spawn(1);
        let tally = handle.finish().await.unwrap();
        assert_eq!(tally, FinalTally::default());
    }

    #[tokio::test]
    async fn test_results_from_many_senders() {
        let (handle, _task) = Aggregator::spawn(2);

        let senders: Vec<_> = (1..=50)
            .map(|n| {
                let handle = handle.clone();
                tokio::spawn(async move { handle.add(n).await })
            })
            .collect();
        for sender in senders {
            sender.await.unwrap().unwrap();
        }

        let tally = handle.finish().await.unwrap();
        assert_eq!(tally.total, (1..=50).sum::<usize>());
        assert_eq!(tally.results, 50);
    }

    #[tokio::test]
    async fn test_second_finish_is_rejected() {
        let (handle, task) = Aggregator::spawn(1);
        let late = handle.clone();

        handle.finish().await.unwrap();
        task.await.unwrap();

        assert!(matches!(
            late.finish().await,
            Err(CountError::AggregatorUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_inbox_closed_without_finish() {
        let (handle, task) = Aggregator::spawn(1);
        handle.add(5).await.unwrap();
        drop(handle);

        assert_eq!(task.await.unwrap(), AggregatorState::Accepting);
    }
}
