//! Batcher configuration
//!
//! Sizing, timeout, and identification settings for a batching stage.
//! Deserializable from TOML with humantime durations:
//!
//! ```toml
//! [output.batcher]
//! workers = 8
//! batch_size_count = 1000
//! batch_size_bytes = 1048576
//! flush_timeout = "250ms"
//! maintenance_interval = "10s"
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::batch::BatchLimits;
use crate::error::{PipelineError, Result};

/// Configuration for a [`Batcher`](crate::Batcher)
///
/// At least one of `batch_size_count` and `batch_size_bytes` must be
/// positive; a zero value disables that trigger. `workers` fixes both the
/// parallelism and the batch pool size, so it also bounds how far producers
/// can run ahead of the output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatcherConfig {
    /// Pipeline this batcher belongs to (diagnostics only)
    pub pipeline_name: String,

    /// Output destination type, e.g. "clickhouse" (diagnostics only)
    pub output_type: String,

    /// Number of parallel workers; also the batch pool size
    pub workers: usize,

    /// Maximum events per batch; 0 disables the count trigger
    pub batch_size_count: usize,

    /// Maximum payload bytes per batch; 0 disables the byte trigger
    pub batch_size_bytes: usize,

    /// Maximum idle age of a non-empty open batch before it is flushed
    #[serde(with = "humantime_serde")]
    pub flush_timeout: Duration,

    /// Minimum spacing of per-worker maintenance calls; 0 disables them
    #[serde(with = "humantime_serde")]
    pub maintenance_interval: Duration,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            pipeline_name: "default".into(),
            output_type: "unknown".into(),
            workers: 4,
            batch_size_count: 1000,
            batch_size_bytes: 0,
            flush_timeout: Duration::from_secs(1),
            maintenance_interval: Duration::ZERO,
        }
    }
}

impl BatcherConfig {
    /// Set the pipeline name
    #[must_use]
    pub fn with_pipeline_name(mut self, name: impl Into<String>) -> Self {
        self.pipeline_name = name.into();
        self
    }

    /// Set the output type label
    #[must_use]
    pub fn with_output_type(mut self, output_type: impl Into<String>) -> Self {
        self.output_type = output_type.into();
        self
    }

    /// Set the worker count
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the event-count limit (0 disables)
    #[must_use]
    pub fn with_batch_size_count(mut self, count: usize) -> Self {
        self.batch_size_count = count;
        self
    }

    /// Set the payload-bytes limit (0 disables)
    #[must_use]
    pub fn with_batch_size_bytes(mut self, bytes: usize) -> Self {
        self.batch_size_bytes = bytes;
        self
    }

    /// Set the idle flush timeout
    #[must_use]
    pub fn with_flush_timeout(mut self, timeout: Duration) -> Self {
        self.flush_timeout = timeout;
        self
    }

    /// Set the per-worker maintenance interval (0 disables)
    #[must_use]
    pub fn with_maintenance_interval(mut self, interval: Duration) -> Self {
        self.maintenance_interval = interval;
        self
    }

    /// Validate the configuration
    ///
    /// Rejects a zero worker count, a zero flush timeout, and the absence of
    /// both batch limits. These values cannot produce correct behaviour, so
    /// they fail construction rather than being papered over at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(PipelineError::invalid_config(
                &self.pipeline_name,
                "workers",
                "must be at least 1",
            ));
        }
        if self.batch_size_count == 0 && self.batch_size_bytes == 0 {
            return Err(PipelineError::no_batch_limits(&self.pipeline_name));
        }
        if self.flush_timeout.is_zero() {
            return Err(PipelineError::invalid_config(
                &self.pipeline_name,
                "flush_timeout",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Per-batch limits derived from this configuration
    pub(crate) fn limits(&self) -> BatchLimits {
        BatchLimits {
            max_count: self.batch_size_count,
            max_bytes: self.batch_size_bytes,
            timeout: self.flush_timeout,
        }
    }
}
