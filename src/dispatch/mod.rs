//! Resolution and invocation of observers for one access event.
//!
//! Synchronous observers run in the accessing thread; the first failure
//! aborts the access and is returned to the caller unchanged. Background
//! observers each get a fresh detached task; their failures are reported on
//! the failure channel and never reach the caller.

mod background;
pub(crate) use background::*;


use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::AccessKind;
use crate::CallbackEntry;
use crate::DispatchConfig;
use crate::Instance;
use crate::InstanceInner;
use crate::ObjectId;
use crate::Observable;
use crate::Registry;
use crate::Result;

/// Type-erased observed value.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Payload of one access, in the shape fixed per access kind.
#[derive(Clone)]
pub enum Access {
    /// Value the getter returned
    Get(Value),
    /// Value about to be handed to the setter
    Set(Value),
    Del,
}

impl Access {
    pub fn kind(&self) -> AccessKind {
        match self {
            Access::Get(_) => AccessKind::Get,
            Access::Set(_) => AccessKind::Set,
            Access::Del => AccessKind::Del,
        }
    }
}

/// The instance an access happened on.
#[derive(Clone)]
pub(crate) struct Subject {
    pub(crate) id: ObjectId,
    pub(crate) class: ObjectId,
    pub(crate) object: Arc<dyn Any + Send + Sync>,
}

/// What an observer is called with: `(property, target, value)` for get,
/// `(property, target, new_value)` for set and `(property, target)` for del.
#[derive(Clone)]
pub struct Event {
    property: Arc<str>,
    target: Subject,
    access: Access,
}

impl Event {
    pub(crate) fn new(
        property: &str,
        target: Subject,
        access: Access,
    ) -> Self {
        Self {
            property: Arc::from(property),
            target,
            access,
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn kind(&self) -> AccessKind {
        self.access.kind()
    }

    pub fn access(&self) -> &Access {
        &self.access
    }

    /// Value read (get) or about to be written (set), if it is a `V`.
    pub fn value<V: Any>(&self) -> Option<&V> {
        match &self.access {
            Access::Get(value) | Access::Set(value) => value.downcast_ref::<V>(),
            Access::Del => None,
        }
    }

    pub fn target_id(&self) -> ObjectId {
        self.target.id
    }

    pub fn class_id(&self) -> ObjectId {
        self.target.class
    }

    /// The instance accessed, if it is an instance of `T`.
    pub fn instance<T: Observable>(&self) -> Option<Instance<T>> {
        self.target
            .object
            .clone()
            .downcast::<InstanceInner<T>>()
            .ok()
            .map(Instance::from_inner)
    }
}

impl fmt::Debug for Event {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Event")
            .field("property", &self.property)
            .field("kind", &self.kind())
            .field("target", &self.target_id())
            .finish()
    }
}

/// A background observer that returned an error or panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundFailure {
    pub property: String,
    pub access: AccessKind,
    pub target: ObjectId,
    pub reason: String,
}

pub(crate) struct Dispatcher {
    executor: Executor,
    reporter: FailureReporter,
}

impl Dispatcher {
    pub(crate) fn new(config: &DispatchConfig) -> Self {
        let (failures, _) = broadcast::channel(config.failure_channel_capacity.max(1));
        Self {
            executor: Executor::new(config.executor),
            reporter: FailureReporter::new(failures, config.log_background_failures),
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<BackgroundFailure> {
        self.reporter.subscribe()
    }

    /// Notifies every observer applicable to this access.
    ///
    /// `access` is only built when at least one observer matches.
    pub(crate) fn dispatch(
        &self,
        registry: &Registry,
        target: Subject,
        property: &str,
        kind: AccessKind,
        access: impl FnOnce() -> Access,
    ) -> Result<()> {
        let entries = registry.resolve(Some(target.id), target.class, kind, property);
        if entries.is_empty() {
            return Ok(());
        }

        let event = Event::new(property, target, access());
        for entry in &entries {
            self.invoke(entry, &event)?;
        }
        Ok(())
    }

    pub(crate) fn invoke(
        &self,
        entry: &CallbackEntry,
        event: &Event,
    ) -> Result<()> {
        if !entry.use_background_task() {
            return entry.callback().notify(event);
        }

        let job = BackgroundJob {
            callback: entry.callback().clone(),
            event: event.clone(),
            reporter: self.reporter.clone(),
        };
        let name = format!("{}_{}_observer", event.property(), event.kind());
        self.executor.spawn(name, job);
        Ok(())
    }
}
