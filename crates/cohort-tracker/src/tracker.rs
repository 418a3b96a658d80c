//! The stateful group tracker.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use cohort_proximity::{connected_components, edges, neighbors, Edge, Entity, Position, ProximityRadius};
use tracing::{debug, warn};

use crate::{EdgeDelta, Partition};

/// Tracks connections and groups for one scene.
///
/// The tracker keeps its own snapshot of entity positions, refreshed by
/// [`on_entity_moved`](Self::on_entity_moved). The caller's model stays the
/// owner of record; the snapshot only lets [`commit`](Self::commit) run
/// without the full roster being handed in again.
///
/// Not meant for concurrent use. Callers serialize access.
#[derive(Debug, Clone)]
pub struct GroupTracker<K> {
    radius: ProximityRadius,
    positions: BTreeMap<K, Position>,
    previous: Partition<K>,
    rendered: BTreeSet<Edge<K>>,
}

impl<K> GroupTracker<K>
where
    K: Ord + Clone + Debug,
{
    /// Start tracking a scene, committing its current proximity groups.
    ///
    /// No change is reported for the initial state.
    pub fn new(radius: ProximityRadius, entities: &[Entity<K>]) -> Self {
        let mut tracker = Self::empty(radius);
        tracker.reload(entities);
        tracker
    }

    /// Start tracking a scene whose last recorded groups are already known.
    ///
    /// The seed is restricted to the supplied entities, so groups recorded
    /// before an entity was removed do not leak into the comparison.
    pub fn with_seed(radius: ProximityRadius, entities: &[Entity<K>], seed: &Partition<K>) -> Self {
        let mut tracker = Self::empty(radius);
        tracker.reseed(entities, seed);
        tracker
    }

    fn empty(radius: ProximityRadius) -> Self {
        Self {
            radius,
            positions: BTreeMap::new(),
            previous: Partition::default(),
            rendered: BTreeSet::new(),
        }
    }

    /// Rebuild from a fresh snapshot, committing its proximity groups.
    pub fn reload(&mut self, entities: &[Entity<K>]) {
        self.load_positions(entities);
        self.previous = self.current_partition();
    }

    /// Rebuild from a fresh snapshot with known committed groups.
    pub fn reseed(&mut self, entities: &[Entity<K>], seed: &Partition<K>) {
        self.load_positions(entities);
        let ids: BTreeSet<K> = self.positions.keys().cloned().collect();
        self.previous = seed.restricted_to(&ids);
    }

    fn load_positions(&mut self, entities: &[Entity<K>]) {
        self.positions = entities
            .iter()
            .map(|entity| (entity.id.clone(), entity.position))
            .collect();
        self.rendered = edges(&self.entities(), self.radius);
        debug!(
            entities = self.positions.len(),
            connections = self.rendered.len(),
            "tracker loaded"
        );
    }

    /// Record a move and report the moved entity's connection changes.
    ///
    /// Groups are not re-evaluated here; see [`commit`](Self::commit).
    /// A move for an entity outside the last snapshot is ignored.
    pub fn on_entity_moved(&mut self, id: &K, position: Position) -> EdgeDelta<K> {
        let Some(slot) = self.positions.get_mut(id) else {
            warn!(?id, "ignoring move for untracked entity");
            return EdgeDelta::default();
        };
        *slot = position;

        let close = neighbors(&Entity::new(id.clone(), position), &self.entities(), self.radius);
        let mut delta = EdgeDelta::default();

        for edge in self.rendered.iter().filter(|edge| edge.touches(id)) {
            match edge.other(id) {
                Some(other) if close.contains(other) => {
                    delta.unchanged.insert(edge.clone());
                }
                _ => {
                    delta.removed.insert(edge.clone());
                }
            }
        }

        for other in close {
            let edge = Edge::new(id.clone(), other);
            if !self.rendered.contains(&edge) {
                delta.added.insert(edge);
            }
        }

        for edge in &delta.removed {
            self.rendered.remove(edge);
        }
        self.rendered.extend(delta.added.iter().cloned());

        if delta.is_connection_change() {
            debug!(
                ?id,
                %position,
                added = delta.added.len(),
                removed = delta.removed.len(),
                "connections changed"
            );
        }

        delta
    }

    /// Re-evaluate groups, reporting the new partition if it changed.
    ///
    /// Calling this again without an intervening move returns `None`.
    pub fn commit(&mut self) -> Option<Partition<K>> {
        let current = self.current_partition();
        if current == self.previous {
            return None;
        }

        debug!(
            before = self.previous.len(),
            after = current.len(),
            "group partition changed"
        );
        self.previous = current.clone();
        Some(current)
    }

    /// Final move of a gesture followed by a commit.
    pub fn settle(&mut self, id: &K, position: Position) -> (EdgeDelta<K>, Option<Partition<K>>) {
        let delta = self.on_entity_moved(id, position);
        (delta, self.commit())
    }

    /// Groups as they stand right now, without committing them.
    pub fn current_partition(&self) -> Partition<K> {
        Partition::from_groups(connected_components(&self.entities(), self.radius))
    }

    /// The last committed partition.
    pub fn committed(&self) -> &Partition<K> {
        &self.previous
    }

    /// Connections currently rendered.
    pub fn connections(&self) -> &BTreeSet<Edge<K>> {
        &self.rendered
    }

    /// The tracker's view of an entity's position.
    pub fn position(&self, id: &K) -> Option<Position> {
        self.positions.get(id).copied()
    }

    /// Check if an entity is tracked.
    pub fn contains(&self, id: &K) -> bool {
        self.positions.contains_key(id)
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if no entities are tracked.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The proximity radius in use.
    pub fn radius(&self) -> ProximityRadius {
        self.radius
    }

    fn entities(&self) -> Vec<Entity<K>> {
        self.positions
            .iter()
            .map(|(id, position)| Entity::new(id.clone(), *position))
            .collect()
    }
}
