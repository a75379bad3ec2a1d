use lazy_static::lazy_static;
use tracing::warn;

use super::ObserveBuilder;
use super::Observatory;
use super::Target;
use crate::AccessFilter;
use crate::Callback;
use crate::Class;
use crate::Observable;
use crate::ObserverConfig;
use crate::Result;

lazy_static! {
    static ref GLOBAL: Observatory = Observatory::from_env().unwrap_or_else(|e| {
        warn!("falling back to default observer config: {}", e);
        Observatory::new(ObserverConfig::default())
    });
}

/// Process-wide observatory, configured from the environment on first use.
pub fn global() -> &'static Observatory {
    &GLOBAL
}

/// [`Observatory::observe`] on the [`global()`] observatory.
pub fn observe(
    target: impl Into<Target>,
    property: impl Into<String>,
    callback: Callback,
) -> ObserveBuilder<'static> {
    global().observe(target, property, callback)
}

/// [`Observatory::unregister_group`] on the [`global()`] observatory.
pub fn unregister_group(
    group: &str,
    filter: AccessFilter,
) -> Result<usize> {
    global().unregister_group(group, filter)
}

/// [`Observatory::define`] on the [`global()`] observatory.
pub fn define<T: Observable>() -> Result<Class<T>> {
    global().define::<T>()
}
