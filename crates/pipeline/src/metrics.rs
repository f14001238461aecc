//! Batcher metrics
//!
//! Atomic counters for the batching stage. All operations use relaxed
//! ordering; values are eventually consistent, not real-time.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::batch::SealReason;

/// Metrics for a batching stage
///
/// # Thread Safety
///
/// All methods are safe to call from multiple tasks concurrently. Values
/// may be slightly stale when read.
#[derive(Debug, Default)]
pub struct BatcherMetrics {
    /// Events admitted via `add`
    events_added: AtomicU64,

    /// Payload bytes admitted via `add`
    bytes_added: AtomicU64,

    /// Batches sealed (all triggers)
    batches_sealed: AtomicU64,

    /// Batches sealed by the event-count limit
    sealed_on_count: AtomicU64,

    /// Batches sealed by the payload-byte limit
    sealed_on_bytes: AtomicU64,

    /// Batches sealed by the idle timeout
    sealed_on_timeout: AtomicU64,

    /// Batches flushed by shutdown
    sealed_on_shutdown: AtomicU64,

    /// Batches fully committed back to the input side
    batches_committed: AtomicU64,

    /// Events committed back to the input side
    events_committed: AtomicU64,

    /// Payload bytes committed back to the input side
    bytes_committed: AtomicU64,

    /// Times a worker reached the commit gate before its turn
    commit_waits: AtomicU64,

    /// Per-worker maintenance invocations
    maintenance_runs: AtomicU64,
}

impl BatcherMetrics {
    /// Create new metrics with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            events_added: AtomicU64::new(0),
            bytes_added: AtomicU64::new(0),
            batches_sealed: AtomicU64::new(0),
            sealed_on_count: AtomicU64::new(0),
            sealed_on_bytes: AtomicU64::new(0),
            sealed_on_timeout: AtomicU64::new(0),
            sealed_on_shutdown: AtomicU64::new(0),
            batches_committed: AtomicU64::new(0),
            events_committed: AtomicU64::new(0),
            bytes_committed: AtomicU64::new(0),
            commit_waits: AtomicU64::new(0),
            maintenance_runs: AtomicU64::new(0),
        }
    }

    /// Record one admitted event
    #[inline]
    pub fn record_added(&self, bytes: u64) {
        self.events_added.fetch_add(1, Ordering::Relaxed);
        self.bytes_added.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a sealed batch and the trigger that fired
    #[inline]
    pub fn record_sealed(&self, reason: SealReason) {
        self.batches_sealed.fetch_add(1, Ordering::Relaxed);
        let counter = match reason {
            SealReason::Count => &self.sealed_on_count,
            SealReason::Bytes => &self.sealed_on_bytes,
            SealReason::Timeout => &self.sealed_on_timeout,
            SealReason::Shutdown => &self.sealed_on_shutdown,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a committed batch
    #[inline]
    pub fn record_committed(&self, events: u64, bytes: u64) {
        self.batches_committed.fetch_add(1, Ordering::Relaxed);
        self.events_committed.fetch_add(events, Ordering::Relaxed);
        self.bytes_committed.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a worker arriving at the commit gate out of turn
    #[inline]
    pub fn record_commit_wait(&self) {
        self.commit_waits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a maintenance invocation
    #[inline]
    pub fn record_maintenance(&self) {
        self.maintenance_runs.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_added: self.events_added.load(Ordering::Relaxed),
            bytes_added: self.bytes_added.load(Ordering::Relaxed),
            batches_sealed: self.batches_sealed.load(Ordering::Relaxed),
            sealed_on_count: self.sealed_on_count.load(Ordering::Relaxed),
            sealed_on_bytes: self.sealed_on_bytes.load(Ordering::Relaxed),
            sealed_on_timeout: self.sealed_on_timeout.load(Ordering::Relaxed),
            sealed_on_shutdown: self.sealed_on_shutdown.load(Ordering::Relaxed),
            batches_committed: self.batches_committed.load(Ordering::Relaxed),
            events_committed: self.events_committed.load(Ordering::Relaxed),
            bytes_committed: self.bytes_committed.load(Ordering::Relaxed),
            commit_waits: self.commit_waits.load(Ordering::Relaxed),
            maintenance_runs: self.maintenance_runs.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.events_added.store(0, Ordering::Relaxed);
        self.bytes_added.store(0, Ordering::Relaxed);
        self.batches_sealed.store(0, Ordering::Relaxed);
        self.sealed_on_count.store(0, Ordering::Relaxed);
        self.sealed_on_bytes.store(0, Ordering::Relaxed);
        self.sealed_on_timeout.store(0, Ordering::Relaxed);
        self.sealed_on_shutdown.store(0, Ordering::Relaxed);
        self.batches_committed.store(0, Ordering::Relaxed);
        self.events_committed.store(0, Ordering::Relaxed);
        self.bytes_committed.store(0, Ordering::Relaxed);
        self.commit_waits.store(0, Ordering::Relaxed);
        self.maintenance_runs.store(0, Ordering::Relaxed);
    }

    // Direct accessors for individual counters (for logging and tests)

    /// Get events admitted count
    #[inline]
    pub fn events_added(&self) -> u64 {
        self.events_added.load(Ordering::Relaxed)
    }

    /// Get batches sealed count
    #[inline]
    pub fn batches_sealed(&self) -> u64 {
        self.batches_sealed.load(Ordering::Relaxed)
    }

    /// Get batches committed count
    #[inline]
    pub fn batches_committed(&self) -> u64 {
        self.batches_committed.load(Ordering::Relaxed)
    }

    /// Get events committed count
    #[inline]
    pub fn events_committed(&self) -> u64 {
        self.events_committed.load(Ordering::Relaxed)
    }

    /// Get out-of-turn gate arrivals count
    #[inline]
    pub fn commit_waits(&self) -> u64 {
        self.commit_waits.load(Ordering::Relaxed)
    }

    /// Get maintenance invocation count
    #[inline]
    pub fn maintenance_runs(&self) -> u64 {
        self.maintenance_runs.load(Ordering::Relaxed)
    }
}

/// Point-in-time snapshot of batcher metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Events admitted via `add`
    pub events_added: u64,
    /// Payload bytes admitted via `add`
    pub bytes_added: u64,
    /// Batches sealed (all triggers)
    pub batches_sealed: u64,
    /// Batches sealed by the event-count limit
    pub sealed_on_count: u64,
    /// Batches sealed by the payload-byte limit
    pub sealed_on_bytes: u64,
    /// Batches sealed by the idle timeout
    pub sealed_on_timeout: u64,
    /// Batches flushed by shutdown
    pub sealed_on_shutdown: u64,
    /// Batches fully committed
    pub batches_committed: u64,
    /// Events committed
    pub events_committed: u64,
    /// Payload bytes committed
    pub bytes_committed: u64,
    /// Out-of-turn gate arrivals
    pub commit_waits: u64,
    /// Maintenance invocations
    pub maintenance_runs: u64,
}

impl MetricsSnapshot {
    /// Sealed batches not yet committed
    #[inline]
    pub fn in_flight_batches(&self) -> u64 {
        self.batches_sealed.saturating_sub(self.batches_committed)
    }

    /// Average events per committed batch
    ///
    /// Returns `None` before the first commit.
    #[inline]
    pub fn events_per_batch(&self) -> Option<f64> {
        if self.batches_committed == 0 {
            None
        } else {
            Some(self.events_committed as f64 / self.batches_committed as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = BatcherMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_record_added() {
        let metrics = BatcherMetrics::new();

        metrics.record_added(100);
        metrics.record_added(50);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.events_added, 2);
        assert_eq!(snapshot.bytes_added, 150);
    }

    #[test]
    fn test_record_sealed_by_reason() {
        let metrics = BatcherMetrics::new();

        metrics.record_sealed(SealReason::Count);
        metrics.record_sealed(SealReason::Count);
        metrics.record_sealed(SealReason::Bytes);
        metrics.record_sealed(SealReason::Timeout);
        metrics.record_sealed(SealReason::Shutdown);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_sealed, 5);
        assert_eq!(snapshot.sealed_on_count, 2);
        assert_eq!(snapshot.sealed_on_bytes, 1);
        assert_eq!(snapshot.sealed_on_timeout, 1);
        assert_eq!(snapshot.sealed_on_shutdown, 1);
    }

    #[test]
    fn test_record_committed() {
        let metrics = BatcherMetrics::new();

        metrics.record_committed(10, 4096);
        metrics.record_committed(5, 2048);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_committed, 2);
        assert_eq!(snapshot.events_committed, 15);
        assert_eq!(snapshot.bytes_committed, 6144);
    }

    #[test]
    fn test_in_flight_batches() {
        let metrics = BatcherMetrics::new();

        metrics.record_sealed(SealReason::Count);
        metrics.record_sealed(SealReason::Count);
        metrics.record_committed(3, 30);

        assert_eq!(metrics.snapshot().in_flight_batches(), 1);
    }

    #[test]
    fn test_events_per_batch() {
        let metrics = BatcherMetrics::new();
        assert_eq!(metrics.snapshot().events_per_batch(), None);

        metrics.record_committed(10, 100);
        metrics.record_committed(20, 200);

        assert_eq!(metrics.snapshot().events_per_batch(), Some(15.0));
    }

    #[test]
    fn test_reset() {
        let metrics = BatcherMetrics::new();

        metrics.record_added(64);
        metrics.record_sealed(SealReason::Bytes);
        metrics.record_committed(1, 64);
        metrics.record_commit_wait();
        metrics.record_maintenance();
        metrics.reset();

        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let metrics = Arc::new(BatcherMetrics::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let m = Arc::clone(&metrics);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    m.record_added(8);
                    m.record_commit_wait();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.events_added, 4000);
        assert_eq!(snapshot.bytes_added, 32000);
        assert_eq!(snapshot.commit_waits, 4000);
    }
}
