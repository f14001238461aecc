//! Event - the atomic unit moving through the pipeline
//!
//! Events are cheap to clone: the payload is reference-counted `Bytes`, so
//! cloning increments a refcount rather than copying the body.

use bytes::Bytes;

/// Kind of a pipeline event
///
/// `Structural` events are bookkeeping entries produced by the input side
/// (container boundaries, parent records). They occupy a slot in a batch and
/// are acknowledged back to the input like any other event, but outputs do
/// not see them when iterating a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventKind {
    /// Ordinary data event, visible to outputs
    #[default]
    Data,

    /// Bookkeeping entry, skipped by batch iteration but still committed
    Structural,
}

impl EventKind {
    /// Check whether this kind is skipped by batch iteration
    #[inline]
    pub fn is_structural(self) -> bool {
        matches!(self, EventKind::Structural)
    }
}

/// One unit of work moving through the pipeline
///
/// # Example
///
/// ```
/// use muster_event::Event;
///
/// let event = Event::data("user logged in").with_offset(42);
/// assert_eq!(event.size(), 14);
/// assert_eq!(event.offset(), 42);
/// assert!(!event.is_structural());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event body - zero-copy via Bytes
    payload: Bytes,

    /// Data or structural bookkeeping
    kind: EventKind,

    /// Input offset this event was read from
    ///
    /// Carried so the input side can advance its offsets when the event is
    /// committed back to it.
    offset: u64,
}

impl Event {
    /// Create an event of the given kind
    #[inline]
    pub fn new(kind: EventKind, payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            kind,
            offset: 0,
        }
    }

    /// Create an ordinary data event
    #[inline]
    pub fn data(payload: impl Into<Bytes>) -> Self {
        Self::new(EventKind::Data, payload)
    }

    /// Create a structural bookkeeping event
    #[inline]
    pub fn structural(payload: impl Into<Bytes>) -> Self {
        Self::new(EventKind::Structural, payload)
    }

    /// Set the input offset
    #[must_use]
    #[inline]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Get the event payload
    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Get the payload size in bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// Get the event kind
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Check whether this event is a structural bookkeeping entry
    #[inline]
    pub fn is_structural(&self) -> bool {
        self.kind.is_structural()
    }

    /// Get the input offset
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }
}
