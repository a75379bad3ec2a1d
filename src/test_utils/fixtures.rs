use super::Recorder;
use crate::ObservedProperty;
use crate::Observable;

/// Observable test type. Accessor calls are written to `trace` so tests can
/// check where they happen relative to observers.
#[derive(Debug, Default)]
pub struct Counter {
    pub value: i64,
    pub label: String,
    pub trace: Option<Recorder>,
}

impl Counter {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            ..Default::default()
        }
    }

    pub fn traced(
        value: i64,
        trace: &Recorder,
    ) -> Self {
        Self {
            value,
            trace: Some(trace.clone()),
            ..Default::default()
        }
    }

    fn record(
        &self,
        line: &str,
    ) {
        if let Some(trace) = &self.trace {
            trace.push(line);
        }
    }
}

impl Observable for Counter {}

/// Readable, writable and deletable; deleting resets to zero.
pub fn value_property() -> ObservedProperty<Counter, i64> {
    ObservedProperty::<Counter, i64>::new("value", |c| {
        c.record("getter");
        c.value
    })
    .with_setter(|c, value| {
        c.record("setter");
        c.value = value;
    })
    .with_deleter(|c| {
        c.record("deleter");
        c.value = 0;
    })
}

/// Read only.
pub fn label_property() -> ObservedProperty<Counter, String> {
    ObservedProperty::<Counter, String>::new("label", |c| c.label.clone())
}
