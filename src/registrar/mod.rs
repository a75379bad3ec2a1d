//! Class opt-in and instance registration.
//!
//! A Rust type becomes observable by implementing [`Observable`] and being
//! defined on an [`Observatory`](crate::Observatory), which yields a runtime
//! [`Class`]. Defining a class creates its registry entry; constructing an
//! instance creates the instance entry before any user initializer runs.

mod class;
mod instance;
pub use class::*;
pub use instance::*;


use crate::Result;

/// Object model of an observable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectModel {
    /// Stable identity and intercepted construction
    #[default]
    Tracked,
    /// Legacy model without stable identity; cannot be observed
    Legacy,
}

/// Opt-in capability of an observable type.
///
/// ```ignore
/// struct Cheese {
///     length: i64,
/// }
///
/// impl Observable for Cheese {
///     fn observed_name() -> Option<String> {
///         Some("shop.Cheese".into())
///     }
/// }
///
/// let class = observatory.define::<Cheese>()?;
/// let cheese = class.construct(Cheese { length: 0 })?;
/// ```
pub trait Observable: Sized + Send + Sync + 'static {
    /// Overrides the qualified name used to match by-name registrations.
    ///
    /// Defaults to the path of the type, see
    /// [`NamingConfig`](crate::NamingConfig).
    fn observed_name() -> Option<String> {
        None
    }

    fn object_model() -> ObjectModel {
        ObjectModel::Tracked
    }

    /// User initializer. Runs once per instance, after the instance is
    /// registered, so observed accesses made here already notify.
    fn initialize(_this: &Instance<Self>) -> Result<()> {
        Ok(())
    }
}

/// Another extension mechanism layered under the observable opt-in, see
/// [`ClassBuilder::extend`].
///
/// Composition is best-effort: extensions run after the observable
/// bookkeeping of each step and nothing guarantees that an arbitrary
/// extension behaves well next to it.
pub trait ClassExtension<T: Observable>: Send + Sync + 'static {
    /// Runs once the class entry exists.
    fn on_define(
        &self,
        _class: &Class<T>,
    ) -> Result<()> {
        Ok(())
    }

    /// Runs once the instance entry exists, before
    /// [`Observable::initialize`].
    fn on_construct(
        &self,
        _instance: &Instance<T>,
    ) -> Result<()> {
        Ok(())
    }
}
