//! Lifecycle tracking of observable classes and instances.
//!
//! Entries hold only a [`Weak`] handle to their target. The owner of the
//! target calls [`Tracker::evict`] exactly once from its `Drop`; until that
//! runs, an entry whose target has no strong handles left is treated as
//! absent. Weak handles are never upgraded while a table lock is held, so a
//! target can never be destroyed (and re-enter the tracker) under the lock.

use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Weak;

use parking_lot::RwLock;
use tracing::debug;

use super::ObserverTable;
use crate::AccessKind;

/// Mixed into identity hashes of observable objects.
pub const IDENTITY_MASK: u64 = 0xa5cf8347;

/// Process-unique identity of an observable class or instance.
///
/// Hashing uses the identity alone (XOR [`IDENTITY_MASK`]), never object
/// state, so identity-keyed maps stay valid across mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        ObjectId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn identity_hash(&self) -> u64 {
        self.0 ^ IDENTITY_MASK
    }
}

impl Hash for ObjectId {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        state.write_u64(self.identity_hash());
    }
}

impl fmt::Display for ObjectId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrackedKind {
    Class,
    Instance,
}

impl TrackedKind {
    fn as_str(&self) -> &'static str {
        match self {
            TrackedKind::Class => "class",
            TrackedKind::Instance => "instance",
        }
    }
}

pub(crate) struct TrackedEntry {
    handle: Weak<dyn Any + Send + Sync>,
    pub(crate) name: String,
    /// Rust type a class was defined for
    pub(crate) type_id: Option<TypeId>,
    pub(crate) observers: ObserverTable,
}

impl TrackedEntry {
    pub(crate) fn new(
        handle: Weak<dyn Any + Send + Sync>,
        name: &str,
        type_id: Option<TypeId>,
        observers: ObserverTable,
    ) -> Self {
        Self {
            handle,
            name: name.to_string(),
            type_id,
            observers,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.handle.strong_count() > 0
    }

    fn info(&self) -> EntryInfo {
        EntryInfo {
            name: self.name.clone(),
            get: self.observers.len(AccessKind::Get),
            set: self.observers.len(AccessKind::Set),
            del: self.observers.len(AccessKind::Del),
            groups: self.observers.group_names(),
        }
    }
}

/// Point-in-time summary of one registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Name pattern, or qualified name of the tracked class/instance
    pub name: String,
    pub get: usize,
    pub set: usize,
    pub del: usize,
    /// Named groups with at least one entry, sorted
    pub groups: Vec<String>,
}

impl EntryInfo {
    pub(crate) fn from_table(
        name: &str,
        table: &ObserverTable,
    ) -> Self {
        Self {
            name: name.to_string(),
            get: table.len(AccessKind::Get),
            set: table.len(AccessKind::Set),
            del: table.len(AccessKind::Del),
            groups: table.group_names(),
        }
    }

    pub fn count(
        &self,
        kind: AccessKind,
    ) -> usize {
        match kind {
            AccessKind::Get => self.get,
            AccessKind::Set => self.set,
            AccessKind::Del => self.del,
        }
    }

    pub fn total(&self) -> usize {
        self.get + self.set + self.del
    }
}

/// Identity-keyed table of tracked targets.
pub(crate) struct Tracker {
    kind: TrackedKind,
    entries: RwLock<HashMap<ObjectId, TrackedEntry>>,
}

impl Tracker {
    pub(crate) fn new(kind: TrackedKind) -> Self {
        Self {
            kind,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Provides read access to the entries
    pub(crate) fn blocking_read<R>(
        &self,
        f: impl FnOnce(&HashMap<ObjectId, TrackedEntry>) -> R,
    ) -> R {
        let guard = self.entries.read();
        f(&guard)
    }

    /// Provides write access to the entries
    pub(crate) fn blocking_write<R>(
        &self,
        f: impl FnOnce(&mut HashMap<ObjectId, TrackedEntry>) -> R,
    ) -> R {
        let mut guard = self.entries.write();
        f(&mut guard)
    }

    /// Summary of a live entry.
    pub(crate) fn lookup(
        &self,
        id: ObjectId,
    ) -> Option<EntryInfo> {
        self.blocking_read(|entries| entries.get(&id).filter(|e| e.is_alive()).map(TrackedEntry::info))
    }

    pub(crate) fn contains(
        &self,
        id: ObjectId,
    ) -> bool {
        self.blocking_read(|entries| entries.get(&id).is_some_and(TrackedEntry::is_alive))
    }

    /// Removes the entry of a destroyed target.
    ///
    /// Detached observers are dropped after the lock is released.
    pub(crate) fn evict(
        &self,
        id: ObjectId,
    ) -> bool {
        let removed = self.blocking_write(|entries| entries.remove(&id));
        match removed {
            Some(entry) => {
                debug!(
                    "evicted {} {} ({}) with {} observers",
                    self.kind.as_str(),
                    id,
                    entry.name,
                    entry.info().total()
                );
                true
            }
            None => false,
        }
    }

    pub(crate) fn live_count(&self) -> usize {
        self.blocking_read(|entries| entries.values().filter(|e| e.is_alive()).count())
    }
}
