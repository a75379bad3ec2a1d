//! Registry store: who observes what.
//!
//! Three independent tables:
//! - by name: keyed by an arbitrary string, lives for the whole process
//! - by class: keyed by class identity, evicted when the class is dropped
//! - by instance: keyed by instance identity, evicted when the instance is
//!   dropped
//!
//! Each table maps access kind -> group -> set of [`CallbackEntry`].
//!
//! Lock order is always names -> classes -> instances. Observer code never
//! runs under any of these locks: dispatch resolves a snapshot first.

mod callback;
mod table;
mod tracker;
pub use callback::*;
pub(crate) use table::*;
pub use tracker::*;


use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Weak;

use parking_lot::RwLock;
use tracing::debug;
use tracing::trace;

use crate::Error;
use crate::Result;

/// Where a registration lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scope {
    Name(String),
    Class(ObjectId),
    Instance(ObjectId),
}

impl fmt::Display for Scope {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Scope::Name(name) => write!(f, "name {name:?}"),
            Scope::Class(id) => write!(f, "class {id}"),
            Scope::Instance(id) => write!(f, "instance {id}"),
        }
    }
}

pub(crate) struct Registry {
    names: RwLock<HashMap<String, ObserverTable>>,
    classes: Tracker,
    instances: Tracker,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            names: RwLock::new(HashMap::new()),
            classes: Tracker::new(TrackedKind::Class),
            instances: Tracker::new(TrackedKind::Instance),
        }
    }

    /// Creates the entry of a newly defined class, seeded with copies of the
    /// by-name entries registered under `name` so far. Idempotent.
    pub(crate) fn track_class(
        &self,
        id: ObjectId,
        handle: Weak<dyn Any + Send + Sync>,
        name: &str,
        type_id: TypeId,
    ) {
        let names = self.names.read();
        let created = self.classes.blocking_write(|classes| {
            if classes.contains_key(&id) {
                return false;
            }
            let mut seed = ObserverTable::default();
            if let Some(table) = names.get(name) {
                seed.merge_from(table);
            }
            classes.insert(id, TrackedEntry::new(handle, name, Some(type_id), seed));
            true
        });
        drop(names);

        if created {
            debug!("tracking class {} as {:?}", id, name);
        }
    }

    /// Creates the entry of a newly constructed instance, seeded with copies
    /// of the by-name entries under `name` and of its class entry. Idempotent.
    pub(crate) fn track_instance(
        &self,
        id: ObjectId,
        class: ObjectId,
        handle: Weak<dyn Any + Send + Sync>,
        name: &str,
    ) {
        let names = self.names.read();
        let created = self.classes.blocking_read(|classes| {
            self.instances.blocking_write(|instances| {
                if instances.contains_key(&id) {
                    return false;
                }
                let mut seed = ObserverTable::default();
                if let Some(table) = names.get(name) {
                    seed.merge_from(table);
                }
                if let Some(entry) = classes.get(&class) {
                    seed.merge_from(&entry.observers);
                }
                instances.insert(id, TrackedEntry::new(handle, name, None, seed));
                true
            })
        });
        drop(names);

        if created {
            debug!("tracking instance {} of class {}", id, class);
        }
    }

    /// Adds `entry` to `group` of the target in `scope`.
    ///
    /// Name registrations are never applied retroactively to classes or
    /// instances that already exist.
    pub(crate) fn register(
        &self,
        scope: &Scope,
        group: Group,
        entry: CallbackEntry,
    ) -> Result<bool> {
        let inserted = match scope {
            Scope::Name(name) => self
                .names
                .write()
                .entry(name.clone())
                .or_default()
                .insert(group, entry),
            Scope::Class(id) => Self::register_tracked(&self.classes, *id, group, entry)
                .ok_or_else(|| Error::NotObservable(scope.to_string()))?,
            Scope::Instance(id) => Self::register_tracked(&self.instances, *id, group, entry)
                .ok_or_else(|| Error::NotObservable(scope.to_string()))?,
        };
        if inserted {
            debug!("registered observer on {}", scope);
        }
        Ok(inserted)
    }

    fn register_tracked(
        tracker: &Tracker,
        id: ObjectId,
        group: Group,
        entry: CallbackEntry,
    ) -> Option<bool> {
        tracker.blocking_write(|entries| {
            entries
                .get_mut(&id)
                .filter(|tracked| tracked.is_alive())
                .map(|tracked| tracked.observers.insert(group, entry))
        })
    }

    /// Live classes defined for the Rust type `type_id`, oldest first.
    pub(crate) fn classes_of_type(
        &self,
        type_id: TypeId,
    ) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.classes.blocking_read(|classes| {
            classes
                .iter()
                .filter(|(_, entry)| entry.type_id == Some(type_id) && entry.is_alive())
                .map(|(id, _)| *id)
                .collect()
        });
        ids.sort();
        ids
    }

    /// Removes `group` from every table for the kinds matching `filter`.
    /// Returns how many entry sets were removed.
    pub(crate) fn remove_group(
        &self,
        group: &str,
        filter: AccessFilter,
    ) -> usize {
        let mut detached = Vec::new();
        {
            let mut names = self.names.write();
            for table in names.values_mut() {
                detached.extend(table.remove_group(group, filter));
            }
        }
        for tracker in [&self.classes, &self.instances] {
            tracker.blocking_write(|entries| {
                for entry in entries.values_mut() {
                    detached.extend(entry.observers.remove_group(group, filter));
                }
            });
        }

        let removed = detached.len();
        debug!("removed group {:?} ({:?}): {} entry sets", group, filter, removed);
        removed
    }

    /// Every entry observing `kind` accesses of `property` on an instance
    /// (when given) and on its class, each callback at most once.
    pub(crate) fn resolve(
        &self,
        instance: Option<ObjectId>,
        class: ObjectId,
        kind: AccessKind,
        property: &str,
    ) -> Vec<CallbackEntry> {
        let mut resolved: HashSet<CallbackEntry> = HashSet::new();
        if let Some(id) = instance {
            self.instances.blocking_read(|instances| {
                if let Some(entry) = instances.get(&id).filter(|e| e.is_alive()) {
                    absorb(&mut resolved, entry.observers.matching(kind, property));
                }
            });
        }
        self.classes.blocking_read(|classes| {
            if let Some(entry) = classes.get(&class).filter(|e| e.is_alive()) {
                absorb(&mut resolved, entry.observers.matching(kind, property));
            }
        });

        trace!(
            "resolved {} {} observers of {:?} on {:?}/{}",
            resolved.len(),
            kind,
            property,
            instance,
            class
        );
        resolved.into_iter().collect()
    }

    pub(crate) fn evict_class(
        &self,
        id: ObjectId,
    ) -> bool {
        self.classes.evict(id)
    }

    pub(crate) fn evict_instance(
        &self,
        id: ObjectId,
    ) -> bool {
        self.instances.evict(id)
    }

    pub(crate) fn lookup(
        &self,
        scope: &Scope,
    ) -> Option<EntryInfo> {
        match scope {
            Scope::Name(name) => self
                .names
                .read()
                .get(name)
                .map(|table| EntryInfo::from_table(name, table)),
            Scope::Class(id) => self.classes.lookup(*id),
            Scope::Instance(id) => self.instances.lookup(*id),
        }
    }

    pub(crate) fn is_tracked(
        &self,
        scope: &Scope,
    ) -> bool {
        match scope {
            Scope::Name(name) => self.names.read().contains_key(name),
            Scope::Class(id) => self.classes.contains(*id),
            Scope::Instance(id) => self.instances.contains(*id),
        }
    }

    pub(crate) fn tracked_classes(&self) -> usize {
        self.classes.live_count()
    }

    pub(crate) fn tracked_instances(&self) -> usize {
        self.instances.live_count()
    }
}

/// Collapses duplicates of one callback into a single entry. A synchronous
/// registration wins over a background one in any group.
fn absorb<'a>(
    resolved: &mut HashSet<CallbackEntry>,
    entries: impl Iterator<Item = &'a CallbackEntry>,
) {
    for entry in entries {
        let upgrade = match resolved.get(entry) {
            Some(existing) => existing.use_background_task() && !entry.use_background_task(),
            None => true,
        };
        if upgrade {
            resolved.replace(entry.clone());
        }
    }
}
