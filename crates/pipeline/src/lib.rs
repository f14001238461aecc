//! Muster - Batching stage
//!
//! Groups individual events into bounded batches, fans the sealed batches
//! out to N parallel workers, and acknowledges every event back to the input
//! side in the exact order the batches were sealed - regardless of the order
//! in which the workers finish their output work.
//!
//! # Architecture
//!
//! ```text
//! [Producers]          [Admission]                        [Workers]
//!    add() ──┬──→ open batch ──(count/bytes/timeout)──→ full ──→ Output::write
//!    add() ──┼──→    ▲                                   queue       │
//!    add() ──┘       │                                          commit gate
//!                    │                                       (sealed order)
//!        flush ticker (100 ms)                                       │
//!                    ▲                                    CommitController::commit
//!                    └────── free queue ←── reset ←──────────────────┘
//! ```
//!
//! # Key Design
//!
//! - **Bounded recycling pool**: the `free`/`full` queues each hold at most
//!   `workers` batches; producers stall inside [`Batcher::add`] when every
//!   batch is in flight, which is the backpressure mechanism
//! - **Parallel output, ordered commit**: workers run concurrently for
//!   throughput; a watch-channel gate serialises commits by seal sequence so
//!   the input side can advance its offsets monotonically
//! - **Timeout enforcement**: a fixed-cadence ticker seals idle non-empty
//!   batches even when no new events arrive
//! - **Per-worker state**: the output carries an opaque state cell per worker
//!   (connections, buffers) and gets periodic maintenance calls
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use muster_pipeline::{Batcher, BatcherConfig, Event, NullOutput};
//!
//! let config = BatcherConfig::default()
//!     .with_pipeline_name("app-logs")
//!     .with_workers(4)
//!     .with_batch_size_count(500);
//!
//! let batcher = Batcher::new(config, NullOutput, controller)?;
//! batcher.start();
//!
//! batcher.add(Event::data("payload").with_offset(0)).await?;
//! // ...
//! batcher.stop().await;
//! ```

mod batch;
mod batcher;
mod commit;
mod config;
mod error;
mod metrics;
mod output;
mod pool;
mod worker;

pub use batch::{Batch, BatchLimits, SealReason};
pub use batcher::Batcher;
pub use commit::CommitController;
pub use config::BatcherConfig;
pub use error::{PipelineError, Result};
pub use metrics::{BatcherMetrics, MetricsSnapshot};
pub use output::{NullOutput, Output};

// Re-export key types from dependencies for convenience
pub use muster_event::{Event, EventKind};

use std::time::Duration;

/// Cadence of the background flush ticker
///
/// Bounds the extra latency added on top of the configured `flush_timeout`.
/// Deliberately a fixed constant, not derived from the timeout.
pub const FLUSH_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[cfg(test)]
mod batch_test;
