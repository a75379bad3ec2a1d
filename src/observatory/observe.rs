use tracing::debug;
use tracing::trace;

use super::Observatory;
use super::Target;
use crate::AccessKind;
use crate::Callback;
use crate::CallbackEntry;
use crate::Error;
use crate::Group;
use crate::Registry;
use crate::Result;
use crate::Scope;

/// Pending registration, see [`Observatory::observe`].
///
/// ```ignore
/// observatory
///     .observe("shop.Cheese", "length", Callback::new(on_length))
///     .access(AccessKind::Set)
///     .group("audit")
///     .in_background()
///     .register()?;
/// ```
#[must_use = "nothing is registered until `register` is called"]
pub struct ObserveBuilder<'a> {
    observatory: &'a Observatory,
    target: Target,
    property: String,
    callback: Callback,
    access: AccessKind,
    group: Group,
    background: bool,
}

impl<'a> ObserveBuilder<'a> {
    pub(crate) fn new(
        observatory: &'a Observatory,
        target: Target,
        property: String,
        callback: Callback,
    ) -> Self {
        Self {
            observatory,
            target,
            property,
            callback,
            access: AccessKind::Get,
            group: Group::Anonymous,
            background: false,
        }
    }

    pub fn access(
        mut self,
        access: AccessKind,
    ) -> Self {
        self.access = access;
        self
    }

    /// Places the registration in a named group, removable with
    /// [`Observatory::unregister_group`].
    pub fn group(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.group = Group::named(name);
        self
    }

    /// Runs the callback in a detached task instead of the accessing thread.
    pub fn in_background(self) -> Self {
        self.use_background_task(true)
    }

    pub fn use_background_task(
        mut self,
        background: bool,
    ) -> Self {
        self.background = background;
        self
    }

    /// Registers the callback. Registering the same callback for the same
    /// property on the same target twice has no further effect.
    pub fn register(self) -> Result<()> {
        if self.property.is_empty() || self.property.chars().any(char::is_whitespace) {
            return Err(Error::Validation(format!(
                "property name must be non-empty and free of whitespace, got {:?}",
                self.property
            )));
        }
        if let Group::Named(name) = &self.group {
            if name.is_empty() {
                return Err(Error::Validation("group name must not be empty".into()));
            }
        }

        let scopes = self.observatory.scopes(&self.target)?;
        let entry = CallbackEntry::new(self.property, self.access, self.background, self.callback);
        register_scopes(
            &self.observatory.shared.registry,
            &scopes,
            matches!(self.target, Target::Type(_)),
            &self.group,
            &entry,
        )?;

        debug!(
            "observing {} accesses of {:?} on {:?} (group {:?}, background {})",
            entry.access(),
            entry.property(),
            self.target,
            self.group,
            entry.use_background_task()
        );
        Ok(())
    }
}

/// Registers `entry` on every scope. With `skip_vanished`, scopes evicted
/// since they were listed are passed over, as long as one of them is left.
pub(crate) fn register_scopes(
    registry: &Registry,
    scopes: &[Scope],
    skip_vanished: bool,
    group: &Group,
    entry: &CallbackEntry,
) -> Result<usize> {
    let mut registered = 0;
    let mut vanished = None;
    for scope in scopes {
        match registry.register(scope, group.clone(), entry.clone()) {
            Ok(_) => registered += 1,
            Err(Error::NotObservable(what)) if skip_vanished => {
                trace!("skipping {}: evicted before registration", what);
                vanished = Some(what);
            }
            Err(e) => return Err(e),
        }
    }
    match vanished {
        Some(what) if registered == 0 => Err(Error::NotObservable(what)),
        _ => Ok(registered),
    }
}
