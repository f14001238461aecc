//! Batch container tests

use std::time::Duration;

use muster_event::Event;

use crate::batch::{Batch, BatchLimits, SealReason};

fn limits(max_count: usize, max_bytes: usize) -> BatchLimits {
    BatchLimits {
        max_count,
        max_bytes,
        timeout: Duration::from_millis(200),
    }
}

fn event(size: usize) -> Event {
    Event::data(vec![b'x'; size])
}

#[test]
fn test_new_batch_is_empty() {
    let batch = Batch::new(limits(4, 0));

    assert!(batch.is_empty());
    assert_eq!(batch.len(), 0);
    assert_eq!(batch.bytes(), 0);
    assert_eq!(batch.ready_reason(), None);
}

#[test]
fn test_append_accounts_bytes() {
    let mut batch = Batch::new(limits(10, 0));

    batch.append(event(3));
    batch.append(event(5));

    assert_eq!(batch.len(), 2);
    assert_eq!(batch.bytes(), 8);
    assert!(!batch.is_empty());
}

#[test]
fn test_count_trigger() {
    let mut batch = Batch::new(limits(2, 0));

    batch.append(event(1));
    assert_eq!(batch.ready_reason(), None);

    batch.append(event(1));
    assert_eq!(batch.ready_reason(), Some(SealReason::Count));
}

#[test]
fn test_bytes_trigger_allows_overshoot() {
    let mut batch = Batch::new(limits(0, 10));

    batch.append(event(4));
    batch.append(event(4));
    assert_eq!(batch.ready_reason(), None);

    // the last event pushes past the limit; the batch seals at 12 bytes
    batch.append(event(4));
    assert_eq!(batch.ready_reason(), Some(SealReason::Bytes));
    assert_eq!(batch.bytes(), 12);
}

#[test]
fn test_zero_limit_disables_trigger() {
    // only the byte limit is set; count can grow past anything
    let mut batch = Batch::new(limits(0, 1_000_000));
    for _ in 0..100 {
        batch.append(event(1));
    }
    assert_eq!(batch.ready_reason(), None);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_trigger_requires_events() {
    let mut batch = Batch::new(limits(100, 0));

    // an empty batch never times out
    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(batch.ready_reason(), None);

    // a single event makes the (already expired) idle clock count
    batch.append(event(1));
    assert_eq!(batch.ready_reason(), Some(SealReason::Timeout));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_trigger_after_idle() {
    let mut batch = Batch::new(limits(100, 0));

    batch.append(event(1));
    assert_eq!(batch.ready_reason(), None);

    tokio::time::advance(Duration::from_millis(150)).await;
    assert_eq!(batch.ready_reason(), None);

    tokio::time::advance(Duration::from_millis(100)).await;
    assert_eq!(batch.ready_reason(), Some(SealReason::Timeout));
}

#[tokio::test(start_paused = true)]
async fn test_reset_restarts_idle_clock() {
    let mut batch = Batch::new(limits(100, 0));

    batch.append(event(1));
    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(batch.ready_reason(), Some(SealReason::Timeout));

    batch.reset();
    assert!(batch.is_empty());
    assert_eq!(batch.bytes(), 0);

    batch.append(event(1));
    assert_eq!(batch.ready_reason(), None);
}

#[test]
fn test_count_trigger_checked_before_bytes() {
    let mut batch = Batch::new(limits(1, 1));

    batch.append(event(8));
    assert_eq!(batch.ready_reason(), Some(SealReason::Count));
}

#[test]
fn test_seal_assigns_seq() {
    let mut batch = Batch::new(limits(1, 0));

    batch.seal(42);
    assert_eq!(batch.seq(), 42);

    // reset keeps the sequence number; only a new seal changes it
    batch.reset();
    assert_eq!(batch.seq(), 42);
}

#[test]
fn test_iter_skips_structural_events() {
    let mut batch = Batch::new(limits(10, 0));

    batch.append(Event::data("a").with_offset(0));
    batch.append(Event::structural("boundary").with_offset(1));
    batch.append(Event::data("b").with_offset(2));

    let visible: Vec<u64> = batch.iter().map(|e| e.offset()).collect();
    assert_eq!(visible, vec![0, 2]);

    // the full slice still carries all three for commit
    assert_eq!(batch.events().len(), 3);
}

#[test]
fn test_structural_events_count_toward_limits() {
    let mut batch = Batch::new(limits(2, 0));

    batch.append(Event::structural("boundary"));
    batch.append(Event::structural("boundary"));

    assert_eq!(batch.ready_reason(), Some(SealReason::Count));
    assert_eq!(batch.iter().count(), 0);
}

#[test]
fn test_seal_reason_labels() {
    assert_eq!(SealReason::Count.as_str(), "count");
    assert_eq!(SealReason::Bytes.as_str(), "bytes");
    assert_eq!(SealReason::Timeout.as_str(), "timeout");
    assert_eq!(SealReason::Shutdown.as_str(), "shutdown");
}
