//! Public entry point: one registry, one dispatcher, one configuration.
//!
//! Most programs use the process-wide [`global()`] observatory through the
//! free functions of this module. Independent observatories are useful to
//! isolate subsystems (and tests) from each other.

mod global;
mod observe;
mod target;
pub use global::*;
pub use observe::*;
pub use target::*;


use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::AccessFilter;
use crate::BackgroundFailure;
use crate::Callback;
use crate::Class;
use crate::ClassBuilder;
use crate::Dispatcher;
use crate::EntryInfo;
use crate::Error;
use crate::ObjectModel;
use crate::ObserverConfig;
use crate::Observable;
use crate::Registry;
use crate::Result;
use crate::Scope;

pub(crate) struct Shared {
    pub(crate) id: u64,
    pub(crate) config: ObserverConfig,
    pub(crate) registry: Registry,
    pub(crate) dispatcher: Dispatcher,
}

#[derive(Clone)]
pub struct Observatory {
    shared: Arc<Shared>,
}

impl Observatory {
    pub fn new(config: ObserverConfig) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        let dispatcher = Dispatcher::new(&config.dispatch);
        Self {
            shared: Arc::new(Shared {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                config,
                registry: Registry::new(),
                dispatcher,
            }),
        }
    }

    /// Observatory configured from `OBSERVER_CONFIG_PATH` and `OBSERVER__*`
    /// environment variables.
    pub fn from_env() -> Result<Self> {
        let config = ObserverConfig::new()?.validate()?;
        Ok(Self::new(config))
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.shared.config
    }

    /// Opts `T` in with its default or self-declared qualified name.
    pub fn define<T: Observable>(&self) -> Result<Class<T>> {
        self.class::<T>().define()
    }

    pub fn class<T: Observable>(&self) -> ClassBuilder<T> {
        ClassBuilder::new(self.shared.clone())
    }

    /// Starts a registration of `callback` for accesses of `property` on
    /// `target`. Defaults: `get` accesses, anonymous group, synchronous.
    pub fn observe(
        &self,
        target: impl Into<Target>,
        property: impl Into<String>,
        callback: Callback,
    ) -> ObserveBuilder<'_> {
        ObserveBuilder::new(self, target.into(), property.into(), callback)
    }

    /// Removes every registration made under `group` for the kinds matching
    /// `filter`, on names, classes and instances alike. The anonymous group
    /// is unaffected. Returns the number of removed entry sets.
    pub fn unregister_group(
        &self,
        group: &str,
        filter: AccessFilter,
    ) -> Result<usize> {
        if group.is_empty() {
            return Err(Error::Validation("group name must not be empty".into()));
        }
        Ok(self.shared.registry.remove_group(group, filter))
    }

    /// Receiver of failures raised by background observers.
    pub fn subscribe_failures(&self) -> broadcast::Receiver<BackgroundFailure> {
        self.shared.dispatcher.subscribe()
    }

    /// Snapshot of the registry entry of `target`, if it has one.
    ///
    /// A type target resolves to the most recently defined live class.
    pub fn entry(
        &self,
        target: impl Into<Target>,
    ) -> Result<Option<EntryInfo>> {
        let scopes = self.scopes(&target.into())?;
        Ok(scopes
            .last()
            .and_then(|scope| self.shared.registry.lookup(scope)))
    }

    pub fn tracked_classes(&self) -> usize {
        self.shared.registry.tracked_classes()
    }

    pub fn tracked_instances(&self) -> usize {
        self.shared.registry.tracked_instances()
    }

    /// Registry scopes a target refers to.
    pub(crate) fn scopes(
        &self,
        target: &Target,
    ) -> Result<Vec<Scope>> {
        let scopes = match target {
            Target::Name(name) => {
                if name.is_empty() {
                    return Err(Error::Validation("name pattern must not be empty".into()));
                }
                vec![Scope::Name(name.clone())]
            }
            Target::Class(handle) => {
                let scope = Scope::Class(handle.id);
                self.check_owner(handle, &scope)?;
                vec![scope]
            }
            Target::Instance(handle) => {
                let scope = Scope::Instance(handle.id);
                self.check_owner(handle, &scope)?;
                vec![scope]
            }
            Target::Type(target) => {
                if target.model == ObjectModel::Legacy {
                    return Err(Error::UnsupportedTarget(format!(
                        "{} uses the legacy object model and cannot be observed",
                        target.type_name
                    )));
                }
                let classes = self.shared.registry.classes_of_type(target.type_id);
                if classes.is_empty() {
                    return Err(Error::NotObservable(format!(
                        "type {} (no class defined)",
                        target.type_name
                    )));
                }
                classes.into_iter().map(Scope::Class).collect()
            }
        };
        Ok(scopes)
    }

    fn check_owner(
        &self,
        handle: &TargetHandle,
        scope: &Scope,
    ) -> Result<()> {
        if handle.observatory != self.shared.id {
            return Err(Error::NotObservable(format!(
                "{scope} of {} (defined on another observatory)",
                handle.type_name
            )));
        }
        if !self.shared.registry.is_tracked(scope) {
            return Err(Error::NotObservable(format!("{scope} of {}", handle.type_name)));
        }
        Ok(())
    }
}
