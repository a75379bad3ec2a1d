use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;
use std::sync::Weak;

use parking_lot::RwLock;

use super::Class;
use super::Observable;
use crate::Access;
use crate::AccessKind;
use crate::EntryInfo;
use crate::ObjectId;
use crate::ObservedProperty;
use crate::Result;
use crate::Scope;
use crate::Subject;

pub(crate) struct InstanceInner<T: Observable> {
    pub(crate) id: ObjectId,
    pub(crate) class: Class<T>,
    pub(crate) state: RwLock<T>,
}

impl<T: Observable> Drop for InstanceInner<T> {
    fn drop(&mut self) {
        self.class.shared().registry.evict_instance(self.id);
    }
}

/// Shared handle to one instance of an observable class.
///
/// Equality and hashing are identity based; mutating the state never changes
/// either.
pub struct Instance<T: Observable> {
    inner: Arc<InstanceInner<T>>,
}

impl<T: Observable> Instance<T> {
    pub(crate) fn from_inner(inner: Arc<InstanceInner<T>>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    pub fn class(&self) -> &Class<T> {
        &self.inner.class
    }

    /// Unobserved shared access to the state.
    ///
    /// Do not access observed properties of the same instance from `f`.
    pub fn read<R>(
        &self,
        f: impl FnOnce(&T) -> R,
    ) -> R {
        let guard = self.inner.state.read();
        f(&guard)
    }

    /// Unobserved exclusive access to the state.
    ///
    /// Do not access observed properties of the same instance from `f`.
    pub fn write<R>(
        &self,
        f: impl FnOnce(&mut T) -> R,
    ) -> R {
        let mut guard = self.inner.state.write();
        f(&mut guard)
    }

    pub fn get<V>(
        &self,
        property: &ObservedProperty<T, V>,
    ) -> Result<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        property.read(self)
    }

    pub fn set<V>(
        &self,
        property: &ObservedProperty<T, V>,
        value: V,
    ) -> Result<()>
    where
        V: Clone + Send + Sync + 'static,
    {
        property.write(self, value)
    }

    pub fn delete<V>(
        &self,
        property: &ObservedProperty<T, V>,
    ) -> Result<()>
    where
        V: Clone + Send + Sync + 'static,
    {
        property.delete(self)
    }

    /// Snapshot of the instance-level observers.
    pub fn entry(&self) -> Option<EntryInfo> {
        self.class().shared().registry.lookup(&Scope::Instance(self.id()))
    }

    pub fn downgrade(&self) -> WeakInstance<T> {
        WeakInstance {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn notify(
        &self,
        property: &str,
        kind: AccessKind,
        access: impl FnOnce() -> Access,
    ) -> Result<()> {
        let shared = self.class().shared();
        let subject = Subject {
            id: self.id(),
            class: self.class().id(),
            object: self.inner.clone(),
        };
        shared
            .dispatcher
            .dispatch(&shared.registry, subject, property, kind, access)
    }
}

impl<T: Observable> Clone for Instance<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Observable> PartialEq for Instance<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Observable> Eq for Instance<T> {}

impl<T: Observable> Hash for Instance<T> {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.id().hash(state);
    }
}

impl<T: Observable> fmt::Debug for Instance<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id())
            .field("class", &self.class().name())
            .finish()
    }
}

/// Non-owning handle to an [`Instance`].
pub struct WeakInstance<T: Observable> {
    inner: Weak<InstanceInner<T>>,
}

impl<T: Observable> WeakInstance<T> {
    pub fn upgrade(&self) -> Option<Instance<T>> {
        self.inner.upgrade().map(Instance::from_inner)
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl<T: Observable> Clone for WeakInstance<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
