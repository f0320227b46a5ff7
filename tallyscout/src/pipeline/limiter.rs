//! Concurrency slot pool for workers.
//!
//! A thin wrapper around a Tokio semaphore. The dispatcher acquires a slot
//! before spawning each worker and moves it into the worker task; the slot is
//! released when it is dropped, whichever way the task ends.
//!
//! ```ignore
//! let limiter = ConcurrencyLimiter::new(NonZeroUsize::new(5).unwrap());
//! let slot = limiter.acquire().await?;
//! tokio::spawn(async move {
//!     let _slot = slot;
//!     // count one item...
//! });
//! ```

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::errors::{CountError, CountResult};

/// Bounds the number of workers running at once.
///
/// Besides the semaphore it tracks how many slots are held right now and the
/// highest number ever held at the same time.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max_permits: usize,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl ConcurrencyLimiter {
    pub fn new(max_concurrent: NonZeroUsize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.get())),
            max_permits: max_concurrent.get(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Waits until a slot is free and takes it.
    pub async fn acquire(&self) -> CountResult<ConcurrencySlot> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| CountError::SlotPoolClosed)?;

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.update_peak(current);

        Ok(ConcurrencySlot {
            _permit: permit,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    fn update_peak(&self, current: usize) {
        let mut peak = self.peak_in_flight.load(Ordering::SeqCst);
        while current > peak {
            match self.peak_in_flight.compare_exchange_weak(
                peak,
                current,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_permits
    }

    /// Slots currently held
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Most slots ever held at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

/// One held slot. Dropping it frees the slot.
#[derive(Debug)]
pub struct ConcurrencySlot {
    _permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
}

impl Drop for ConcurrencySlot {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
