//! Observed properties.
//!
//! Notification order relative to the real accessor differs per access kind
//! and is part of the contract:
//! - get: getter first, then observers see the value it returned
//! - set: observers first, then the setter
//! - del: observers first, then the deleter
//!
//! A failing synchronous observer aborts the access. For set and del that
//! means the accessor never runs.


use std::fmt;
use std::sync::Arc;

use crate::Access;
use crate::AccessKind;
use crate::Error;
use crate::Instance;
use crate::Observable;
use crate::Result;

/// One observed attribute of `T` with values of type `V`.
pub struct ObservedProperty<T, V> {
    name: &'static str,
    getter: fn(&T) -> V,
    setter: Option<fn(&mut T, V)>,
    deleter: Option<fn(&mut T)>,
}

impl<T, V> ObservedProperty<T, V>
where
    T: Observable,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(
        name: &'static str,
        getter: fn(&T) -> V,
    ) -> Self {
        Self {
            name,
            getter,
            setter: None,
            deleter: None,
        }
    }

    pub fn with_setter(
        mut self,
        setter: fn(&mut T, V),
    ) -> Self {
        self.setter = Some(setter);
        self
    }

    pub fn with_deleter(
        mut self,
        deleter: fn(&mut T),
    ) -> Self {
        self.deleter = Some(deleter);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_settable(&self) -> bool {
        self.setter.is_some()
    }

    pub fn is_deletable(&self) -> bool {
        self.deleter.is_some()
    }

    /// Runs the getter, then notifies `get` observers with its value.
    pub fn read(
        &self,
        target: &Instance<T>,
    ) -> Result<V> {
        let value = target.read(self.getter);
        target.notify(self.name, AccessKind::Get, || {
            Access::Get(Arc::new(value.clone()))
        })?;
        Ok(value)
    }

    /// Notifies `set` observers with `value`, then runs the setter.
    pub fn write(
        &self,
        target: &Instance<T>,
        value: V,
    ) -> Result<()> {
        let setter = self.setter.ok_or_else(|| Error::cannot_set(self.name))?;
        target.notify(self.name, AccessKind::Set, || {
            Access::Set(Arc::new(value.clone()))
        })?;
        target.write(|state| setter(state, value));
        Ok(())
    }

    /// Notifies `del` observers, then runs the deleter.
    pub fn delete(
        &self,
        target: &Instance<T>,
    ) -> Result<()> {
        let deleter = self.deleter.ok_or_else(|| Error::cannot_delete(self.name))?;
        target.notify(self.name, AccessKind::Del, || Access::Del)?;
        target.write(deleter);
        Ok(())
    }
}

impl<T, V> Clone for ObservedProperty<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for ObservedProperty<T, V> {}

impl<T, V> fmt::Debug for ObservedProperty<T, V> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "<observed property {:?}>", self.name)
    }
}
