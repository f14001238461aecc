//! Pipeline error types
//!
//! Errors surfaced by the batching stage. Misconfiguration is rejected at
//! construction; at runtime the only failure producers can observe is the
//! batcher shutting down.

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Batching stage errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration value rejected at construction
    #[error("batcher '{pipeline}' has invalid {field}: {message}")]
    InvalidConfig {
        /// Pipeline the batcher belongs to
        pipeline: String,
        /// Offending field name
        field: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// Neither a count limit nor a byte limit is configured
    #[error("batcher '{pipeline}' has no batch limits: set batch_size_count or batch_size_bytes")]
    NoBatchLimits {
        /// Pipeline the batcher belongs to
        pipeline: String,
    },

    /// The batcher is shutting down and no longer accepts events
    #[error("batcher is shutting down")]
    ShuttingDown,
}

impl PipelineError {
    /// Create an InvalidConfig error
    pub fn invalid_config(
        pipeline: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            pipeline: pipeline.into(),
            field,
            message: message.into(),
        }
    }

    /// Create a NoBatchLimits error
    pub fn no_batch_limits(pipeline: impl Into<String>) -> Self {
        Self::NoBatchLimits {
            pipeline: pipeline.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = PipelineError::invalid_config("app-logs", "workers", "must be at least 1");
        assert!(err.to_string().contains("app-logs"));
        assert!(err.to_string().contains("workers"));
        assert!(err.to_string().contains("must be at least 1"));
    }

    #[test]
    fn test_no_batch_limits_display() {
        let err = PipelineError::no_batch_limits("app-logs");
        assert!(err.to_string().contains("no batch limits"));
        assert!(err.to_string().contains("app-logs"));
    }

    #[test]
    fn test_shutting_down_display() {
        let err = PipelineError::ShuttingDown;
        assert!(err.to_string().contains("shutting down"));
    }
}
