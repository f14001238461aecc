//! Muster - Event types
//!
//! Foundational data types for the muster batching pipeline. An [`Event`] is
//! the atomic unit of work: a payload carried as reference-counted
//! [`bytes::Bytes`], a kind marking structural bookkeeping entries, and the
//! input offset it was read from.
//!
//! This crate holds no machinery; batching, dispatch, and commit ordering
//! live in `muster-pipeline`.

mod event;

pub use event::{Event, EventKind};

#[cfg(test)]
mod event_test;
