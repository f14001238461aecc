//! Output seam
//!
//! The batcher is generic over an [`Output`]: the user-supplied destination
//! that receives each sealed batch on one of the worker tasks. The batcher
//! holds no expectations about the output's side effects beyond that `write`
//! returns.

use async_trait::async_trait;

use crate::batch::Batch;

/// Destination for sealed batches
///
/// `write` runs on a worker task with exclusive access to that worker's
/// state cell. The cell starts as `None` and is stable for the worker's
/// lifetime, so outputs can lazily open connections or buffers on first use
/// and keep them across batches.
#[async_trait]
pub trait Output: Send + Sync + 'static {
    /// Per-worker state carried between calls (connections, buffers)
    type WorkerData: Send + 'static;

    /// Deliver one sealed batch
    ///
    /// The batcher treats this as total: once it returns, the batch is
    /// committed. Retries, dead-lettering, and circuit breaking are the
    /// output's own concern; the batcher inspects nothing.
    async fn write(&self, data: &mut Option<Self::WorkerData>, batch: &Batch);

    /// Periodic per-worker upkeep
    ///
    /// Called on the worker task between batches, at least
    /// `maintenance_interval` apart and never concurrently for the same
    /// worker. The default does nothing.
    async fn maintenance(&self, data: &mut Option<Self::WorkerData>) {
        let _ = data;
    }
}

/// Output that discards every batch
///
/// Useful for benchmarks and tests where only admission, sealing, and
/// commit ordering matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutput;

#[async_trait]
impl Output for NullOutput {
    type WorkerData = ();

    async fn write(&self, _data: &mut Option<()>, _batch: &Batch) {}
}
