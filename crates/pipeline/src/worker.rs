//! Batch worker
//!
//! Each worker consumes sealed batches from the `full` queue, hands them to
//! the output, then performs the sequenced commit and recycles the batch.
//! Workers exit when the queue is closed and drained.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::batch::Batch;
use crate::commit::{CommitController, CommitGate};
use crate::metrics::BatcherMetrics;
use crate::output::Output;
use crate::pool::BatchPool;

/// One parallel consumer of sealed batches
pub(crate) struct Worker<O: Output> {
    pub(crate) id: usize,
    pub(crate) output: Arc<O>,
    pub(crate) controller: Arc<dyn CommitController>,
    pub(crate) pool: BatchPool,
    pub(crate) gate: Arc<CommitGate>,
    pub(crate) maintenance_interval: Duration,
    pub(crate) metrics: Arc<BatcherMetrics>,
}

impl<O: Output> Worker<O> {
    pub(crate) async fn run(self) {
        tracing::debug!(worker = self.id, "batch worker starting");

        let mut data: Option<O::WorkerData> = None;
        let mut gate_rx = self.gate.subscribe();
        let mut last_maintenance = Instant::now();

        while let Some(batch) = self.pool.next_full().await {
            self.output.write(&mut data, &batch).await;
            self.commit(&mut gate_rx, batch).await;

            let maintenance_due = !self.maintenance_interval.is_zero()
                && last_maintenance.elapsed() >= self.maintenance_interval;
            if maintenance_due {
                last_maintenance = Instant::now();
                self.output.maintenance(&mut data).await;
                self.metrics.record_maintenance();
            }
        }

        tracing::debug!(worker = self.id, "batch worker stopping");
    }

    /// Acknowledge the batch's events in sealed order, then recycle it
    ///
    /// Structural entries were invisible to the output but are committed
    /// like any other event - the input side is owed an acknowledgement for
    /// everything it handed over.
    async fn commit(&self, gate_rx: &mut watch::Receiver<u64>, mut batch: Batch) {
        let seq = batch.seq();

        if !self.gate.is_turn(seq) {
            self.metrics.record_commit_wait();
        }
        if !self.gate.wait_turn(gate_rx, seq).await {
            return;
        }

        for event in batch.events() {
            self.controller.commit(event);
        }
        self.gate.advance();

        self.metrics
            .record_committed(batch.len() as u64, batch.bytes() as u64);

        batch.reset();
        self.pool.recycle(batch).await;
    }
}
