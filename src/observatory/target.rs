use std::any::type_name;
use std::any::TypeId;

use crate::Class;
use crate::Instance;
use crate::ObjectId;
use crate::ObjectModel;
use crate::Observable;

/// Identity of a class or instance as seen by a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetHandle {
    pub(crate) id: ObjectId,
    pub(crate) observatory: u64,
    pub(crate) type_name: &'static str,
}

/// A Rust type whose defined classes are the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTarget {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) model: ObjectModel,
}

/// What an observer is registered against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Qualified name of classes that may not exist yet
    Name(String),
    /// One class, and through it every instance of the class
    Class(TargetHandle),
    /// One live instance
    Instance(TargetHandle),
    /// Every live class defined for a Rust type
    Type(TypeTarget),
}

impl Target {
    pub fn of_type<T: Observable>() -> Self {
        Target::Type(TypeTarget {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            model: T::object_model(),
        })
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Name(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target::Name(name)
    }
}

impl<T: Observable> From<&Class<T>> for Target {
    fn from(class: &Class<T>) -> Self {
        Target::Class(TargetHandle {
            id: class.id(),
            observatory: class.shared().id,
            type_name: class.type_name(),
        })
    }
}

impl<T: Observable> From<&Instance<T>> for Target {
    fn from(instance: &Instance<T>) -> Self {
        Target::Instance(TargetHandle {
            id: instance.id(),
            observatory: instance.class().shared().id,
            type_name: instance.class().type_name(),
        })
    }
}
