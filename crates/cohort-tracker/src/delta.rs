//! Connection changes produced by a single move.

use std::collections::BTreeSet;

use cohort_proximity::Edge;

/// What happened to the moved entity's connections.
///
/// Only edges touching the moved entity appear here. Edges between other
/// entities cannot change when one entity moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDelta<K> {
    /// Newly proximate pairs that need a line drawn
    pub added: BTreeSet<Edge<K>>,
    /// Pairs that drifted apart and need their line removed
    pub removed: BTreeSet<Edge<K>>,
    /// Pairs still connected whose line only needs a new path
    pub unchanged: BTreeSet<Edge<K>>,
}

impl<K> EdgeDelta<K> {
    /// Check if the delta carries no instructions at all.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.unchanged.is_empty()
    }

    /// Check if any connection appeared or disappeared.
    ///
    /// This is the moment for a selection haptic.
    pub fn is_connection_change(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

impl<K> Default for EdgeDelta<K> {
    fn default() -> Self {
        Self {
            added: BTreeSet::new(),
            removed: BTreeSet::new(),
            unchanged: BTreeSet::new(),
        }
    }
}
