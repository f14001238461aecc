//! Batch pool - bounded free/full queues
//!
//! A pair of bounded MPMC queues of equal capacity recycles batches between
//! admission and the workers. `free` starts full; `full` starts empty. The
//! capacity equals the worker count, so a producer can never seal batches
//! faster than the workers hand used ones back - that bound is the
//! backpressure mechanism.

use crossfire::{MAsyncRx, MAsyncTx};

use crate::batch::{Batch, BatchLimits};

/// Recycling pool endpoints shared by admission and the workers
#[derive(Clone)]
pub(crate) struct BatchPool {
    free_tx: MAsyncTx<Batch>,
    free_rx: MAsyncRx<Batch>,
    full_rx: MAsyncRx<Batch>,
}

impl BatchPool {
    /// Create both queues and fill `free` with `workers` fresh batches
    ///
    /// The `full` sender is handed back separately: admission owns it, and
    /// dropping it during shutdown is what closes the queue to the workers.
    pub(crate) fn new(workers: usize, limits: BatchLimits) -> (Self, MAsyncTx<Batch>) {
        let (free_tx, free_rx) = crossfire::mpmc::bounded_async(workers);
        let (full_tx, full_rx) = crossfire::mpmc::bounded_async(workers);

        for _ in 0..workers {
            // capacity equals the fill count; this cannot overflow
            let _ = free_tx.try_send(Batch::new(limits));
        }

        (
            Self {
                free_tx,
                free_rx,
                full_rx,
            },
            full_tx,
        )
    }

    /// Take a free batch, awaiting one while every batch is in flight
    ///
    /// Returns `None` once the queue is closed.
    pub(crate) async fn take_free(&self) -> Option<Batch> {
        self.free_rx.recv().await.ok()
    }

    /// Return a drained batch to the free queue
    pub(crate) async fn recycle(&self, batch: Batch) {
        let _ = self.free_tx.send(batch).await;
    }

    /// Return a batch without awaiting
    ///
    /// Valid only while the caller holds a pooled batch, which keeps the
    /// free queue below capacity.
    pub(crate) fn recycle_now(&self, batch: Batch) {
        let _ = self.free_tx.try_send(batch);
    }

    /// Receive the next sealed batch
    ///
    /// Returns `None` once the full queue is closed and drained - the worker
    /// shutdown signal.
    pub(crate) async fn next_full(&self) -> Option<Batch> {
        self.full_rx.recv().await.ok()
    }
}
