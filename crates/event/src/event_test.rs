//! Event type tests

use bytes::Bytes;

use crate::{Event, EventKind};

#[test]
fn test_data_event() {
    let event = Event::data("hello");

    assert_eq!(event.kind(), EventKind::Data);
    assert_eq!(event.size(), 5);
    assert_eq!(event.payload(), &Bytes::from("hello"));
    assert!(!event.is_structural());
}

#[test]
fn test_structural_event() {
    let event = Event::structural("container-end");

    assert_eq!(event.kind(), EventKind::Structural);
    assert!(event.is_structural());
}

#[test]
fn test_empty_payload_size() {
    let event = Event::data("");
    assert_eq!(event.size(), 0);
}

#[test]
fn test_offset_defaults_to_zero() {
    let event = Event::data("x");
    assert_eq!(event.offset(), 0);
}

#[test]
fn test_with_offset() {
    let event = Event::data("x").with_offset(1234);
    assert_eq!(event.offset(), 1234);
}

#[test]
fn test_clone_shares_payload() {
    let event = Event::data(Bytes::from(vec![0u8; 1024]));
    let clone = event.clone();

    // Bytes is reference-counted: both point at the same buffer
    assert_eq!(event.payload().as_ptr(), clone.payload().as_ptr());
    assert_eq!(event, clone);
}

#[test]
fn test_kind_default_is_data() {
    assert_eq!(EventKind::default(), EventKind::Data);
    assert!(!EventKind::default().is_structural());
}
