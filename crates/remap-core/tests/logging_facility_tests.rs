#![allow(clippy::unwrap_used, clippy::expect_used)]

use remap_core::errors::RemapError;
use remap_core::logging_facility::test_capture::init_test_capture;
use remap_core::{log_op_end, log_op_error, log_op_start};
use remap_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_COMPONENT, FIELD_CREATED, FIELD_DURATION_MS,
    FIELD_ERR_CODE, FIELD_ERR_KIND,
};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1, "Should have captured one start event");
    assert_eq!(events[0].event(), Some(EVENT_START));
    assert!(events[0]
        .field(FIELD_COMPONENT)
        .is_some_and(|c| c.starts_with("logging_facility_tests")));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one end event");
    assert_eq!(events[0].event(), Some(EVENT_END));
    assert_eq!(events[0].field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = RemapError::KeyNotFound {
        key: "k1".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for_op(op_name);
    let error_event = events
        .iter()
        .find(|e| e.event() == Some(EVENT_END_ERROR))
        .expect("Should have error event");

    assert_eq!(error_event.field(FIELD_ERR_CODE), Some("ERR_NOT_FOUND"));
    assert_eq!(error_event.field(FIELD_ERR_KIND), Some("NotFound"));
    assert_eq!(error_event.level, tracing::Level::ERROR);
}

#[test]
fn test_log_macros_with_key_field() {
    let capture = init_test_capture();
    let op_name = "test_log_key_field_unique_4";

    log_op_start!(op_name, key = "cool");
    log_op_end!(op_name, duration_ms = 1, key = "cool", created = true);
    log_op_start!(op_name, key = "other");

    let events = capture.events_for_key(op_name, "cool");
    assert_eq!(events.len(), 2);

    let end = events
        .iter()
        .find(|e| e.event() == Some(EVENT_END))
        .expect("Should have end event");
    assert_eq!(end.field(FIELD_CREATED), Some("true"));
}
