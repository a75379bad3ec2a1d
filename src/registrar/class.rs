use std::any::type_name;
use std::any::Any;
use std::any::TypeId;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;
use std::sync::Weak;

use parking_lot::RwLock;
use tracing::debug;

use super::ClassExtension;
use super::Instance;
use super::InstanceInner;
use super::ObjectModel;
use super::Observable;
use crate::EntryInfo;
use crate::Error;
use crate::ObjectId;
use crate::Observatory;
use crate::Result;
use crate::Scope;
use crate::Shared;

pub(crate) struct ClassInner {
    pub(crate) id: ObjectId,
    pub(crate) name: String,
    pub(crate) type_name: &'static str,
    pub(crate) shared: Arc<Shared>,
}

impl Drop for ClassInner {
    fn drop(&mut self) {
        self.shared.registry.evict_class(self.id);
    }
}

/// Runtime class of an observable type.
///
/// Clones share one identity. The class entry is evicted once every clone
/// and every instance of the class is gone.
pub struct Class<T: Observable> {
    pub(crate) inner: Arc<ClassInner>,
    extensions: Arc<[Arc<dyn ClassExtension<T>>]>,
}

impl<T: Observable> Class<T> {
    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// Qualified name used for by-name matching.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn type_name(&self) -> &'static str {
        self.inner.type_name
    }

    pub fn observatory(&self) -> Observatory {
        Observatory::from_shared(self.inner.shared.clone())
    }

    /// Snapshot of the class-level observers.
    pub fn entry(&self) -> Option<EntryInfo> {
        self.inner.shared.registry.lookup(&Scope::Class(self.id()))
    }

    /// Creates an instance holding `state`.
    ///
    /// The instance is registered first, seeded from the by-name and
    /// class-level observers existing right now. Extensions and
    /// [`Observable::initialize`] run afterwards; if any of them fails the
    /// half-built instance is dropped and its entry evicted.
    pub fn construct(
        &self,
        state: T,
    ) -> Result<Instance<T>> {
        let inner = Arc::new(InstanceInner {
            id: ObjectId::next(),
            class: self.clone(),
            state: RwLock::new(state),
        });
        let handle: Weak<dyn Any + Send + Sync> = Arc::downgrade(&inner) as Weak<_>;
        self.inner
            .shared
            .registry
            .track_instance(inner.id, self.id(), handle, self.name());
        let instance = Instance::from_inner(inner);

        for extension in self.extensions.iter() {
            extension.on_construct(&instance)?;
        }
        T::initialize(&instance)?;
        Ok(instance)
    }

    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.inner.shared
    }
}

impl<T: Observable> Clone for Class<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            extensions: self.extensions.clone(),
        }
    }
}

impl<T: Observable> PartialEq for Class<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Observable> Eq for Class<T> {}

impl<T: Observable> Hash for Class<T> {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.id().hash(state);
    }
}

impl<T: Observable> fmt::Debug for Class<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

/// Defines a [`Class`], optionally renamed or layered over extensions.
pub struct ClassBuilder<T: Observable> {
    shared: Arc<Shared>,
    name: Option<String>,
    extensions: Vec<Arc<dyn ClassExtension<T>>>,
}

impl<T: Observable> ClassBuilder<T> {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            name: None,
            extensions: Vec::new(),
        }
    }

    /// Qualified name for this class, taking precedence over
    /// [`Observable::observed_name`].
    pub fn named(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Layers the observable opt-in over another extension. Extensions run
    /// in the order they were added.
    pub fn extend<E: ClassExtension<T>>(
        mut self,
        extension: E,
    ) -> Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    pub fn define(self) -> Result<Class<T>> {
        if T::object_model() == ObjectModel::Legacy {
            return Err(Error::UnsupportedTarget(format!(
                "{} uses the legacy object model and cannot be observed",
                type_name::<T>()
            )));
        }

        let name = self
            .name
            .or_else(T::observed_name)
            .unwrap_or_else(|| self.shared.config.naming.qualify(type_name::<T>()));
        if name.is_empty() {
            return Err(Error::Validation(format!(
                "observed name of {} must not be empty",
                type_name::<T>()
            )));
        }

        let inner = Arc::new(ClassInner {
            id: ObjectId::next(),
            name,
            type_name: type_name::<T>(),
            shared: self.shared,
        });
        let handle: Weak<dyn Any + Send + Sync> = Arc::downgrade(&inner) as Weak<_>;
        inner
            .shared
            .registry
            .track_class(inner.id, handle, &inner.name, TypeId::of::<T>());

        let class = Class {
            inner,
            extensions: self.extensions.into(),
        };
        for extension in class.extensions.iter() {
            extension.on_define(&class)?;
        }

        debug!("defined observable class {} as {:?}", class.id(), class.name());
        Ok(class)
    }
}
