//! In-memory log capture for tests
//!
//! Installs a layer that records every event's fields so tests can assert
//! on the lifecycle events an operation emitted. The subscriber is global,
//! so tests filter by operation and key instead of clearing between runs.

use crate::core_types::schema::{FIELD_EVENT, FIELD_KEY, FIELD_OP};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    /// Field value as text; debug-formatted fields keep their `Debug` form
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }
}

#[derive(Default)]
struct FieldRecorder(HashMap<String, String>);

impl FieldRecorder {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }
}

type EventLog = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    events: EventLog,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);

        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedEvent {
                level: *event.metadata().level(),
                fields: recorder.0,
            });
    }
}

/// Read handle over the captured events
#[derive(Clone)]
pub struct TestCapture {
    events: EventLog,
}

impl TestCapture {
    /// Snapshot of every event captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events emitted for operation `op`, in order
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op() == Some(op))
            .collect()
    }

    /// Events emitted for operation `op` on `key`, in order
    pub fn events_for_key(&self, op: &str, key: &str) -> Vec<CapturedEvent> {
        self.events_for_op(op)
            .into_iter()
            .filter(|e| e.field(FIELD_KEY) == Some(key))
            .collect()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer (first call only) and return its handle
///
/// # Example
///
/// ```
/// use remap_core::logging_facility::test_capture::init_test_capture;
/// use remap_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_example_op", key = "cool");
/// assert_eq!(capture.events_for_key("doc_example_op", "cool").len(), 1);
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let events = EventLog::default();
            let layer = CaptureLayer {
                events: events.clone(),
            };
            let _ = tracing_subscriber::registry().with(layer).try_init();
            TestCapture { events }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_filtered_by_op_and_key() {
        // Scoped subscriber: other unit tests may own the global one
        let events = EventLog::default();
        let subscriber = tracing_subscriber::registry().with(CaptureLayer {
            events: events.clone(),
        });
        let capture = TestCapture { events };

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(op = "capture_unit_op", key = "a", event = "start");
            tracing::info!(op = "capture_unit_op", key = "b", event = "start");
            tracing::info!(op = "capture_unit_other", key = "a", event = "start");
        });

        assert_eq!(capture.events_for_op("capture_unit_op").len(), 2);
        let for_a = capture.events_for_key("capture_unit_op", "a");
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].event(), Some("start"));
        assert_eq!(for_a[0].level, Level::INFO);
    }
}
