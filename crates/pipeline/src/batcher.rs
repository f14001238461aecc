//! Batcher - admission, flush ticker, lifecycle
//!
//! The batcher owns the single open batch behind an async mutex. `add`
//! appends to it and seals it when a trigger fires; a background ticker
//! seals idle batches on timeout. Sealing assigns a dense, monotonically
//! increasing sequence number under the same lock, so sequence order equals
//! admission order even though the handoff to the `full` queue happens after
//! the lock is released.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossfire::MAsyncTx;
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use muster_event::Event;

use crate::FLUSH_TICK_INTERVAL;
use crate::batch::{Batch, SealReason};
use crate::commit::{CommitController, CommitGate};
use crate::config::BatcherConfig;
use crate::error::{PipelineError, Result};
use crate::metrics::BatcherMetrics;
use crate::output::Output;
use crate::pool::BatchPool;
use crate::worker::Worker;

/// Admission state guarded by the slot mutex
struct Admission {
    /// The batch currently accepting appends, if any
    open: Option<Batch>,

    /// Next sequence number to assign at seal
    out_seq: u64,

    /// Sender side of the `full` queue
    ///
    /// Kept under the slot mutex so shutdown can take it out without racing
    /// a concurrent seal; once it is gone the queue closes and the workers
    /// drain what remains and exit.
    full_tx: Option<MAsyncTx<Batch>>,
}

struct Inner<O: Output> {
    config: BatcherConfig,
    output: Arc<O>,
    controller: Arc<dyn CommitController>,
    slot: AsyncMutex<Admission>,
    pool: BatchPool,
    gate: Arc<CommitGate>,
    metrics: Arc<BatcherMetrics>,
    shutdown: CancellationToken,
    started: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Concurrent batching stage
///
/// Producers call [`add`](Batcher::add) from any number of tasks; sealed
/// batches are written by `workers` parallel [`Output`] workers and their
/// events committed back to the [`CommitController`] in sealed order.
///
/// The batcher is a cheap handle: clone it freely across producer tasks.
///
/// # Example
///
/// ```ignore
/// let batcher = Batcher::new(config, output, controller)?;
/// batcher.start();
///
/// batcher.add(event).await?;
/// // ...
/// batcher.stop().await;
/// ```
pub struct Batcher<O: Output> {
    inner: Arc<Inner<O>>,
}

impl<O: Output> Clone for Batcher<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O: Output> Batcher<O> {
    /// Create a batcher
    ///
    /// Validates the configuration and builds the batch pool: both bounded
    /// queues get capacity `workers` and the free queue is filled with
    /// `workers` fresh batches. Events may be added before [`start`]; they
    /// accumulate in the pool until the workers come up.
    ///
    /// [`start`]: Batcher::start
    pub fn new(
        config: BatcherConfig,
        output: O,
        controller: Arc<dyn CommitController>,
    ) -> Result<Self> {
        config.validate()?;

        let (pool, full_tx) = BatchPool::new(config.workers, config.limits());

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                output: Arc::new(output),
                controller,
                slot: AsyncMutex::new(Admission {
                    open: None,
                    out_seq: 0,
                    full_tx: Some(full_tx),
                }),
                pool,
                gate: Arc::new(CommitGate::new()),
                metrics: Arc::new(BatcherMetrics::new()),
                shutdown: CancellationToken::new(),
                started: AtomicBool::new(false),
                tasks: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Spawn the worker tasks and the flush ticker
    ///
    /// Calling `start` a second time is a no-op (logged at warn level).
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            tracing::warn!(
                pipeline = %self.inner.config.pipeline_name,
                "batcher already started"
            );
            return;
        }

        tracing::info!(
            pipeline = %self.inner.config.pipeline_name,
            output = %self.inner.config.output_type,
            workers = self.inner.config.workers,
            batch_size_count = self.inner.config.batch_size_count,
            batch_size_bytes = self.inner.config.batch_size_bytes,
            flush_timeout = ?self.inner.config.flush_timeout,
            "batcher starting"
        );

        let mut tasks = self.inner.tasks.lock();
        for id in 0..self.inner.config.workers {
            let worker = Worker {
                id,
                output: Arc::clone(&self.inner.output),
                controller: Arc::clone(&self.inner.controller),
                pool: self.inner.pool.clone(),
                gate: Arc::clone(&self.inner.gate),
                maintenance_interval: self.inner.config.maintenance_interval,
                metrics: Arc::clone(&self.inner.metrics),
            };
            tasks.push(tokio::spawn(worker.run()));
        }

        let ticker = self.clone();
        tasks.push(tokio::spawn(async move { ticker.flush_ticker().await }));
    }

    /// Admit one event
    ///
    /// Callable from any number of producer tasks; admission is serialised
    /// internally. When every batch is in flight this awaits a free one -
    /// that is the backpressure point throttling producers to the output's
    /// pace. Fails only once [`stop`](Batcher::stop) has begun.
    pub async fn add(&self, event: Event) -> Result<()> {
        let mut slot = self.inner.slot.lock().await;

        if slot.open.is_none() {
            let mut batch = self.take_free().await?;
            batch.reset();
            slot.open = Some(batch);
        }
        if let Some(open) = slot.open.as_mut() {
            self.inner.metrics.record_added(event.size() as u64);
            open.append(event);
        }

        self.try_seal(slot).await;
        Ok(())
    }

    /// Batcher metrics
    pub fn metrics(&self) -> &BatcherMetrics {
        &self.inner.metrics
    }

    /// Configuration the batcher was built with
    pub fn config(&self) -> &BatcherConfig {
        &self.inner.config
    }

    /// Receive a free batch, bailing out if shutdown begins while waiting
    async fn take_free(&self) -> Result<Batch> {
        tokio::select! {
            biased;
            _ = self.inner.shutdown.cancelled() => Err(PipelineError::ShuttingDown),
            batch = self.inner.pool.take_free() => batch.ok_or(PipelineError::ShuttingDown),
        }
    }

    /// Seal and hand off the open batch if a trigger fired
    ///
    /// The slot lock is held on entry and released on every path. The send
    /// to the `full` queue happens after release, so a lagging queue blocks
    /// only the sealer, not every producer waiting on the lock.
    async fn try_seal(&self, mut slot: MutexGuard<'_, Admission>) {
        let Some(reason) = slot.open.as_ref().and_then(|b| b.ready_reason()) else {
            return;
        };
        let Some(full_tx) = slot.full_tx.clone() else {
            return;
        };
        let Some(mut batch) = slot.open.take() else {
            return;
        };

        batch.seal(slot.out_seq);
        slot.out_seq += 1;
        drop(slot);

        tracing::trace!(
            pipeline = %self.inner.config.pipeline_name,
            seq = batch.seq(),
            events = batch.len(),
            bytes = batch.bytes(),
            reason = reason.as_str(),
            "batch sealed"
        );
        self.inner.metrics.record_sealed(reason);

        let _ = full_tx.send(batch).await;
    }

    /// Enforce the idle timeout independently of arrivals
    ///
    /// Ticks at [`FLUSH_TICK_INTERVAL`]; each tick makes sure an open batch
    /// exists (drawing a fresh one if needed) and runs the seal check. A
    /// drawn batch with no events is not ready and simply stays open for the
    /// next `add`.
    async fn flush_ticker(&self) {
        let mut ticker = tokio::time::interval(FLUSH_TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.inner.shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let mut slot = self.inner.slot.lock().await;
            if slot.open.is_none() {
                let Ok(mut batch) = self.take_free().await else {
                    break;
                };
                batch.reset();
                slot.open = Some(batch);
            }
            self.try_seal(slot).await;
        }

        tracing::debug!(
            pipeline = %self.inner.config.pipeline_name,
            "flush ticker stopping"
        );
    }

    /// Stop the batcher: flush the open batch, drain the workers, join tasks
    ///
    /// Events admitted before `stop` are flushed and committed; `add` calls
    /// racing or following it get [`PipelineError::ShuttingDown`]. Safe to
    /// call more than once.
    pub async fn stop(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        self.inner.shutdown.cancel();

        // Close the full queue, flushing whatever the open slot holds.
        let (flush, full_tx, target) = {
            let mut slot = self.inner.slot.lock().await;
            let full_tx = slot.full_tx.take();
            let flush = match slot.open.take() {
                Some(mut batch) if !batch.is_empty() => {
                    batch.seal(slot.out_seq);
                    slot.out_seq += 1;
                    Some(batch)
                }
                Some(batch) => {
                    // an empty open batch just goes back to the pool
                    self.inner.pool.recycle_now(batch);
                    None
                }
                None => None,
            };
            (flush, full_tx, slot.out_seq)
        };

        if let Some(full_tx) = full_tx {
            if let Some(batch) = flush {
                tracing::debug!(
                    pipeline = %self.inner.config.pipeline_name,
                    seq = batch.seq(),
                    events = batch.len(),
                    "flushing open batch on stop"
                );
                self.inner.metrics.record_sealed(SealReason::Shutdown);
                let _ = full_tx.send(batch).await;
            }
            // last long-lived sender: dropping it closes the queue, the
            // workers drain what remains and exit
            drop(full_tx);
        }

        // Every sealed batch is held by exactly one worker; wait for the
        // commit gate to pass the last assigned sequence, then join.
        if self.inner.started.load(Ordering::SeqCst) {
            self.inner.gate.wait_drained(target).await;
        }

        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.inner.tasks.lock());
        for task in tasks {
            if let Err(err) = task.await {
                tracing::error!(
                    pipeline = %self.inner.config.pipeline_name,
                    error = %err,
                    "batcher task terminated abnormally"
                );
            }
        }

        let snapshot = self.inner.metrics.snapshot();
        tracing::info!(
            pipeline = %self.inner.config.pipeline_name,
            output = %self.inner.config.output_type,
            events_added = snapshot.events_added,
            batches_sealed = snapshot.batches_sealed,
            batches_committed = snapshot.batches_committed,
            events_committed = snapshot.events_committed,
            commit_waits = snapshot.commit_waits,
            "batcher stopped"
        );
    }
}

impl<O: Output> std::fmt::Debug for Batcher<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batcher")
            .field("pipeline", &self.inner.config.pipeline_name)
            .field("workers", &self.inner.config.workers)
            .field("started", &self.inner.started.load(Ordering::SeqCst))
            .finish()
    }
}
