//! Batch - bounded, resettable container of events
//!
//! Batches are created once when the pool is built and recycled for the
//! lifetime of the batcher: `reset` truncates the event list while keeping
//! its allocation, so the steady state allocates nothing per batch.
//!
//! # Lifecycle
//!
//! ```text
//! fresh → open (accepting appends) → sealed (seq assigned, queued)
//!       → draining (worker writing) → committed → reset → open
//! ```
//!
//! Ownership moves the batch between the open slot, the pool queues, and a
//! worker; it is in exactly one of those places at any moment.

use std::time::Duration;

use muster_event::Event;
use tokio::time::Instant;

/// Immutable sizing and timeout limits applied to every batch
#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    /// Maximum events per batch; 0 disables the count trigger
    pub max_count: usize,

    /// Maximum payload bytes per batch; 0 disables the byte trigger
    ///
    /// Checked after each append, so a sealed batch may exceed this by at
    /// most the size of its last event.
    pub max_bytes: usize,

    /// Maximum idle age of a non-empty batch
    pub timeout: Duration,
}

/// Why a batch was sealed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SealReason {
    /// Event-count limit reached
    Count,

    /// Payload-byte limit reached
    Bytes,

    /// Idle timeout exceeded with events pending
    Timeout,

    /// Flushed by shutdown
    Shutdown,
}

impl SealReason {
    /// Static label for logging and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            SealReason::Count => "count",
            SealReason::Bytes => "bytes",
            SealReason::Timeout => "timeout",
            SealReason::Shutdown => "shutdown",
        }
    }
}

/// Bounded group of events processed as a unit
pub struct Batch {
    /// Events in append order, structural entries included
    events: Vec<Event>,

    /// Running sum of event payload sizes
    bytes: usize,

    /// Instant of the most recent reset; the idle clock
    start: Instant,

    /// Sequence number assigned at seal; meaningful only after seal
    seq: u64,

    /// Sizing and timeout limits, fixed at pool construction
    limits: BatchLimits,
}

impl Batch {
    /// Create a fresh batch with the given limits
    pub(crate) fn new(limits: BatchLimits) -> Self {
        Self {
            events: Vec::with_capacity(limits.max_count),
            bytes: 0,
            start: Instant::now(),
            seq: 0,
            limits,
        }
    }

    /// Truncate the batch for reuse, keeping the event list's allocation
    ///
    /// Restarts the idle clock. Does not touch `seq` or the limits.
    pub(crate) fn reset(&mut self) {
        self.events.clear();
        self.bytes = 0;
        self.start = Instant::now();
    }

    /// Append one event, accounting its payload size
    ///
    /// No limit check happens here; admission decides sealing.
    pub(crate) fn append(&mut self, event: Event) {
        self.bytes += event.size();
        self.events.push(event);
    }

    /// Report which seal trigger fired, if any
    ///
    /// An empty batch is never ready: the count and byte limits cannot be
    /// met and the timeout path requires at least one event.
    pub(crate) fn ready_reason(&self) -> Option<SealReason> {
        let len = self.events.len();
        if self.limits.max_count > 0 && len >= self.limits.max_count {
            return Some(SealReason::Count);
        }
        if self.limits.max_bytes > 0 && self.bytes >= self.limits.max_bytes {
            return Some(SealReason::Bytes);
        }
        if len > 0 && self.start.elapsed() > self.limits.timeout {
            return Some(SealReason::Timeout);
        }
        None
    }

    /// Assign the seal sequence number
    pub(crate) fn seal(&mut self, seq: u64) {
        self.seq = seq;
    }

    /// Sequence number assigned at seal time
    ///
    /// The global ordering key for commits. Meaningful only once the batch
    /// has been handed to a worker.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Number of events, structural entries included
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the batch holds no events
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total payload bytes of the appended events
    #[inline]
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Time since the last reset
    #[inline]
    pub fn age(&self) -> Duration {
        self.start.elapsed()
    }

    /// All events in append order, structural entries included
    ///
    /// This is the slice the commit path walks: every admitted event is
    /// acknowledged, whether or not iteration exposes it to the output.
    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Iterate the data events in append order, skipping structural entries
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| !e.is_structural())
    }
}

impl std::fmt::Debug for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("seq", &self.seq)
            .field("events", &self.events.len())
            .field("bytes", &self.bytes)
            .finish()
    }
}
