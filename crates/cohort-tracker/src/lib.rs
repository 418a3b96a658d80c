//! Group Tracking for Proximity Scenes
//!
//! A [`GroupTracker`] follows one interactive scene. It keeps two pieces of
//! state between calls:
//!
//! - the **rendered connections**: edges currently drawn between entities
//! - the **committed partition**: the groups last handed to the transaction log
//!
//! # Two Cadences
//!
//! Connections change continuously while an entity is dragged. Every move
//! yields an [`EdgeDelta`] restricted to the moved entity, so the renderer
//! only adds, removes, or refreshes the lines that changed.
//!
//! Groups are checked once per finished gesture. [`GroupTracker::commit`]
//! recomputes the full partition and reports it only if it differs from the
//! committed one, compared as a set of sets. Intermediate drag positions never
//! reach the transaction log.
//!
//! # Roster Changes
//!
//! The tracker is not patched when entities are added or removed. Callers
//! rebuild it with [`GroupTracker::reload`] from a fresh snapshot.

mod delta;
mod partition;
mod tracker;

pub use delta::EdgeDelta;
pub use partition::Partition;
pub use tracker::GroupTracker;

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_proximity::{Entity, Position, ProximityRadius};

    #[test]
    fn merge_then_split_records_two_transactions() {
        let radius = ProximityRadius::new(75.0).unwrap();
        let scene = [
            Entity::new('a', Position::new(0.0, 0.0)),
            Entity::new('b', Position::new(10.0, 0.0)),
            Entity::new('c', Position::new(200.0, 0.0)),
        ];
        let mut tracker = GroupTracker::new(radius, &scene);

        let (_, merged) = tracker.settle(&'c', Position::new(15.0, 0.0));
        assert_eq!(merged.map(|p| p.len()), Some(1));

        let (_, split) = tracker.settle(&'c', Position::new(200.0, 0.0));
        assert_eq!(split.map(|p| p.len()), Some(2));
    }
}
