use std::sync::Arc;

use parking_lot::Mutex;

use crate::Callback;
use crate::Error;
use crate::Observatory;
use crate::ObserverConfig;

/// A fresh observatory, isolated from the global one.
pub fn observatory() -> Observatory {
    Observatory::new(ObserverConfig::default())
}

/// A distinct callback that accepts every event.
pub fn noop_callback() -> Callback {
    Callback::from_fn(|_| Ok(()))
}

/// A distinct callback that rejects every event with `message`.
pub fn failing_callback(message: &'static str) -> Callback {
    Callback::from_fn(move |_| Err(Error::callback(message)))
}

/// Shared log of observed events and accessor calls, in call order.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &self,
        line: impl Into<String>,
    ) {
        self.log.lock().push(line.into());
    }

    /// Callback logging `"{tag} {kind} {property}"`, with `={value}` appended
    /// when the event carries an `i64`.
    pub fn callback(
        &self,
        tag: &'static str,
    ) -> Callback {
        let recorder = self.clone();
        Callback::from_fn(move |event| {
            let mut line = format!("{} {} {}", tag, event.kind(), event.property());
            if let Some(value) = event.value::<i64>() {
                line.push_str(&format!("={value}"));
            }
            recorder.push(line);
            Ok(())
        })
    }

    pub fn lines(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.log.lock().len()
    }
}

