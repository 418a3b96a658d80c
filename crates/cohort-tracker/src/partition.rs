//! Group partitions in canonical form.

use std::collections::BTreeSet;

/// A set of disjoint groups.
///
/// Groups are kept sorted with empty groups and duplicates removed, so two
/// partitions compare equal exactly when they hold the same groups,
/// regardless of the order they were built in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition<K> {
    groups: Vec<BTreeSet<K>>,
}

impl<K: Ord> Partition<K> {
    /// Build a partition from groups in any order.
    pub fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = BTreeSet<K>>,
    {
        let canonical: BTreeSet<BTreeSet<K>> = groups
            .into_iter()
            .filter(|group| !group.is_empty())
            .collect();

        Self {
            groups: canonical.into_iter().collect(),
        }
    }

    /// One singleton group per entity.
    pub fn singletons<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        Self::from_groups(ids.into_iter().map(|id| BTreeSet::from([id])))
    }

    /// The groups, in canonical order.
    pub fn groups(&self) -> &[BTreeSet<K>] {
        &self.groups
    }

    /// Consume the partition into its groups.
    pub fn into_groups(self) -> Vec<BTreeSet<K>> {
        self.groups
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of entities across all groups.
    pub fn entity_count(&self) -> usize {
        self.groups.iter().map(BTreeSet::len).sum()
    }

    /// The group holding an entity.
    pub fn group_of(&self, id: &K) -> Option<&BTreeSet<K>> {
        self.groups.iter().find(|group| group.contains(id))
    }

    /// Check if two entities share a group.
    pub fn together(&self, a: &K, b: &K) -> bool {
        self.group_of(a).is_some_and(|group| group.contains(b))
    }

    /// Check that every id sits in exactly one group and nothing else does.
    pub fn is_partition_of<'a, I>(&self, ids: I) -> bool
    where
        K: 'a,
        I: IntoIterator<Item = &'a K>,
    {
        let expected: BTreeSet<&K> = ids.into_iter().collect();
        let mut seen = BTreeSet::new();

        for id in self.groups.iter().flatten() {
            if !seen.insert(id) {
                return false;
            }
        }

        seen == expected
    }
}

impl<K: Ord + Clone> Partition<K> {
    /// Keep only the listed entities, dropping groups that end up empty.
    pub fn restricted_to(&self, ids: &BTreeSet<K>) -> Self {
        Self::from_groups(
            self.groups
                .iter()
                .map(|group| group.intersection(ids).cloned().collect()),
        )
    }
}

impl<K> Default for Partition<K> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<K: Ord> FromIterator<BTreeSet<K>> for Partition<K> {
    fn from_iter<I: IntoIterator<Item = BTreeSet<K>>>(iter: I) -> Self {
        Self::from_groups(iter)
    }
}
