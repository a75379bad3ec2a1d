use std::sync::Arc;
use std::sync::Mutex;

use observed::Callback;
use observed::Observable;
use observed::Observatory;
use observed::ObservedProperty;
use observed::ObserverConfig;

/// Observable type used across the integration suites.
pub struct Cheese {
    pub length: i64,
    pub log: Option<EventLog>,
}

impl Cheese {
    pub fn new(length: i64) -> Self {
        Self { length, log: None }
    }

    pub fn logged(
        length: i64,
        log: &EventLog,
    ) -> Self {
        Self {
            length,
            log: Some(log.clone()),
        }
    }

    fn note(
        &self,
        line: &str,
    ) {
        if let Some(log) = &self.log {
            log.push(line);
        }
    }
}

impl Observable for Cheese {
    fn observed_name() -> Option<String> {
        Some("pkg.Foo".into())
    }
}

pub fn length() -> ObservedProperty<Cheese, i64> {
    ObservedProperty::<Cheese, i64>::new("length", |c| {
        c.note("getter");
        c.length
    })
    .with_setter(|c, length| {
        c.note("setter");
        c.length = length;
    })
    .with_deleter(|c| {
        c.note("deleter");
        c.length = 0;
    })
}

pub fn observatory() -> Observatory {
    crate::enable_logger();
    Observatory::new(ObserverConfig::default())
}

/// Ordered log shared between observers, accessors and assertions.
#[derive(Clone, Default)]
pub struct EventLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn push(
        &self,
        line: impl Into<String>,
    ) {
        self.lines.lock().unwrap().push(line.into());
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Callback logging `"{tag} {kind}"` plus `={value}` for i64 payloads.
    pub fn observer(
        &self,
        tag: &'static str,
    ) -> Callback {
        let log = self.clone();
        Callback::from_fn(move |event| {
            match event.value::<i64>() {
                Some(value) => log.push(format!("{} {}={}", tag, event.kind(), value)),
                None => log.push(format!("{} {}", tag, event.kind())),
            }
            Ok(())
        })
    }
}
