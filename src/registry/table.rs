use std::collections::HashMap;
use std::collections::HashSet;

use crate::AccessFilter;
use crate::AccessKind;
use crate::CallbackEntry;
use crate::Group;

type GroupSets = HashMap<Group, HashSet<CallbackEntry>>;

/// Observers of one target: access kind -> group -> entries.
#[derive(Clone, Default, Debug)]
pub(crate) struct ObserverTable {
    kinds: [GroupSets; 3],
}

impl ObserverTable {
    /// Returns false if an equal entry was already present in the group.
    pub(crate) fn insert(
        &mut self,
        group: Group,
        entry: CallbackEntry,
    ) -> bool {
        self.kinds[entry.access().index()]
            .entry(group)
            .or_default()
            .insert(entry)
    }

    /// Copies every entry of `other` into this table. The copies are
    /// independent of `other` afterwards.
    pub(crate) fn merge_from(
        &mut self,
        other: &ObserverTable,
    ) {
        for (mine, theirs) in self.kinds.iter_mut().zip(other.kinds.iter()) {
            for (group, entries) in theirs {
                mine.entry(group.clone())
                    .or_default()
                    .extend(entries.iter().cloned());
            }
        }
    }

    /// Detaches the named group's entry sets for every kind matching
    /// `filter`. The caller decides where the detached sets are dropped.
    pub(crate) fn remove_group(
        &mut self,
        group: &str,
        filter: AccessFilter,
    ) -> Vec<HashSet<CallbackEntry>> {
        let key = Group::named(group);
        AccessKind::ALL
            .iter()
            .filter(|kind| filter.matches(**kind))
            .filter_map(|kind| self.kinds[kind.index()].remove(&key))
            .collect()
    }

    /// Entries of `kind` observing `property`, across all groups.
    pub(crate) fn matching<'a>(
        &'a self,
        kind: AccessKind,
        property: &'a str,
    ) -> impl Iterator<Item = &'a CallbackEntry> + 'a {
        self.kinds[kind.index()]
            .values()
            .flatten()
            .filter(move |entry| entry.property() == property)
    }

    pub(crate) fn len(
        &self,
        kind: AccessKind,
    ) -> usize {
        self.kinds[kind.index()].values().map(HashSet::len).sum()
    }

    pub(crate) fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .kinds
            .iter()
            .flat_map(|groups| groups.keys())
            .filter_map(|group| group.name().map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
