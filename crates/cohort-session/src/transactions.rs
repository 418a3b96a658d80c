//! The group transaction log.

use std::collections::{BTreeMap, BTreeSet};

use cohort_tracker::Partition;
use serde::{Deserialize, Serialize};

use crate::model::ActorId;

/// Groups of actor ids as recorded in a transaction.
pub type Groups = Vec<Vec<ActorId>>;

/// How the tick-0 transaction of a fresh model groups its actors.
///
/// Only the opening record follows this policy. Every later transaction
/// comes from proximity grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bootstrap {
    /// Every actor starts alone
    #[default]
    Singletons,
    /// Every actor starts in one shared group
    SingleGroup,
}

impl Bootstrap {
    /// The opening groups for a set of actors.
    pub fn initial_groups<I>(&self, ids: I) -> Groups
    where
        I: IntoIterator<Item = ActorId>,
    {
        match self {
            Bootstrap::Singletons => ids.into_iter().map(|id| vec![id]).collect(),
            Bootstrap::SingleGroup => {
                let all: Vec<ActorId> = ids.into_iter().collect();
                if all.is_empty() {
                    Vec::new()
                } else {
                    vec![all]
                }
            }
        }
    }
}

/// Recorded group partitions keyed by tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionLog {
    entries: BTreeMap<u64, Groups>,
}

impl TransactionLog {
    /// Record groups at a tick, returning what was there before.
    pub fn record(&mut self, tick: u64, groups: Groups) -> Option<Groups> {
        self.entries.insert(tick, groups)
    }

    /// Groups recorded at a tick.
    pub fn get(&self, tick: u64) -> Option<&Groups> {
        self.entries.get(&tick)
    }

    /// The earliest transaction.
    pub fn first(&self) -> Option<(u64, &Groups)> {
        self.entries.iter().next().map(|(tick, groups)| (*tick, groups))
    }

    /// The latest transaction.
    pub fn last(&self) -> Option<(u64, &Groups)> {
        self.entries.iter().next_back().map(|(tick, groups)| (*tick, groups))
    }

    /// All transactions in tick order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Groups)> {
        self.entries.iter().map(|(tick, groups)| (*tick, groups))
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flatten a partition into recordable groups.
pub fn groups_from_partition(partition: Partition<ActorId>) -> Groups {
    partition
        .into_groups()
        .into_iter()
        .map(|group| group.into_iter().collect())
        .collect()
}

/// Read recorded groups back as a partition.
pub fn partition_from_groups(groups: &[Vec<ActorId>]) -> Partition<ActorId> {
    Partition::from_groups(
        groups
            .iter()
            .map(|group| group.iter().copied().collect::<BTreeSet<_>>()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(count: usize) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = (0..count).map(|_| ActorId::new()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn singletons_bootstrap() {
        let ids = ids(3);
        let groups = Bootstrap::Singletons.initial_groups(ids.clone());
        assert_eq!(groups, vec![vec![ids[0]], vec![ids[1]], vec![ids[2]]]);
    }

    #[test]
    fn single_group_bootstrap() {
        let ids = ids(3);
        assert_eq!(Bootstrap::SingleGroup.initial_groups(ids.clone()), vec![ids]);
        assert!(Bootstrap::SingleGroup.initial_groups(Vec::new()).is_empty());
    }

    #[test]
    fn record_replaces_same_tick() {
        let ids = ids(2);
        let mut log = TransactionLog::default();

        assert_eq!(log.record(5, vec![vec![ids[0]]]), None);
        assert_eq!(log.record(5, vec![vec![ids[1]]]), Some(vec![vec![ids[0]]]));
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(5), Some(&vec![vec![ids[1]]]));
    }

    #[test]
    fn first_and_last_follow_ticks() {
        let ids = ids(1);
        let mut log = TransactionLog::default();
        log.record(10, vec![vec![ids[0]]]);
        log.record(2, vec![]);
        log.record(7, vec![]);

        assert_eq!(log.first().map(|(t, _)| t), Some(2));
        assert_eq!(log.last().map(|(t, _)| t), Some(10));
        let ticks: Vec<u64> = log.iter().map(|(t, _)| t).collect();
        assert_eq!(ticks, vec![2, 7, 10]);
    }

    #[test]
    fn partition_conversion_preserves_grouping() {
        let ids = ids(3);
        let groups = vec![vec![ids[2]], vec![ids[0], ids[1]]];
        let partition = partition_from_groups(&groups);

        assert_eq!(partition.len(), 2);
        assert!(partition.together(&ids[0], &ids[1]));

        let back = groups_from_partition(partition);
        assert_eq!(partition_from_groups(&back), partition_from_groups(&groups));
    }

    #[test]
    fn log_serializes_with_tick_keys() {
        let ids = ids(1);
        let mut log = TransactionLog::default();
        log.record(3, vec![vec![ids[0]]]);

        let json = serde_json::to_string(&log).unwrap();
        assert!(json.starts_with("{\"3\":"));

        let parsed: TransactionLog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, log);
    }
}
