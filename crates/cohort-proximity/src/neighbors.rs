//! Proximity neighborhoods and edges.
//!
//! Every query is a linear scan over the supplied entities. Batch forms are
//! O(n²) and recompute from scratch; nothing is cached between calls.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Entity, Position, ProximityRadius};

/// An unordered pair of proximate entities.
///
/// Endpoints are stored in ascending order, so `Edge::new(a, b)` and
/// `Edge::new(b, a)` are the same edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge<K> {
    a: K,
    b: K,
}

impl<K: Ord> Edge<K> {
    /// Create an edge between two entities.
    pub fn new(x: K, y: K) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// Both endpoints, lower key first.
    pub fn endpoints(&self) -> (&K, &K) {
        (&self.a, &self.b)
    }

    /// Check if the edge touches an entity.
    pub fn touches(&self, id: &K) -> bool {
        &self.a == id || &self.b == id
    }

    /// The endpoint opposite `id`, if the edge touches it.
    pub fn other(&self, id: &K) -> Option<&K> {
        if &self.a == id {
            Some(&self.b)
        } else if &self.b == id {
            Some(&self.a)
        } else {
            None
        }
    }
}

/// Check if two positions are within the radius (strictly).
#[inline]
pub fn are_proximate(a: &Position, b: &Position, radius: ProximityRadius) -> bool {
    radius.admits(a.distance(b))
}

/// Every other entity strictly within `radius` of `of`.
///
/// `of` itself is excluded by key, so it need not be a member of `among`.
pub fn neighbors<K>(of: &Entity<K>, among: &[Entity<K>], radius: ProximityRadius) -> BTreeSet<K>
where
    K: Ord + Clone,
{
    among
        .iter()
        .filter(|other| other.id != of.id)
        .filter(|other| are_proximate(&of.position, &other.position, radius))
        .map(|other| other.id.clone())
        .collect()
}

/// The open neighborhood of every entity.
///
/// Every entity in `among` gets an entry, with an empty set when it has no
/// neighbors.
pub fn all_neighborhoods<K>(among: &[Entity<K>], radius: ProximityRadius) -> BTreeMap<K, BTreeSet<K>>
where
    K: Ord + Clone,
{
    among
        .iter()
        .map(|entity| (entity.id.clone(), neighbors(entity, among, radius)))
        .collect()
}

/// Every proximate pair among the entities.
pub fn edges<K>(among: &[Entity<K>], radius: ProximityRadius) -> BTreeSet<Edge<K>>
where
    K: Ord + Clone,
{
    let mut result = BTreeSet::new();
    for (i, first) in among.iter().enumerate() {
        for second in &among[i + 1..] {
            if first.id != second.id && are_proximate(&first.position, &second.position, radius) {
                result.insert(Edge::new(first.id.clone(), second.id.clone()));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radius(r: f64) -> ProximityRadius {
        ProximityRadius::new(r).unwrap()
    }

    fn at(id: u32, x: f64, y: f64) -> Entity<u32> {
        Entity::new(id, Position::new(x, y))
    }

    #[test]
    fn edge_is_unordered() {
        assert_eq!(Edge::new(3, 1), Edge::new(1, 3));
        assert_eq!(Edge::new(3, 1).endpoints(), (&1, &3));
    }

    #[test]
    fn edge_other_endpoint() {
        let edge = Edge::new('a', 'b');
        assert_eq!(edge.other(&'a'), Some(&'b'));
        assert_eq!(edge.other(&'b'), Some(&'a'));
        assert_eq!(edge.other(&'c'), None);
        assert!(edge.touches(&'a'));
        assert!(!edge.touches(&'c'));
    }

    #[test]
    fn boundary_is_exclusive() {
        let r = radius(75.0);
        let scene = [at(0, 0.0, 0.0), at(1, 75.0, 0.0)];
        assert!(neighbors(&scene[0], &scene, r).is_empty());

        let scene = [at(0, 0.0, 0.0), at(1, 74.999, 0.0)];
        assert_eq!(neighbors(&scene[0], &scene, r), BTreeSet::from([1]));
    }

    #[test]
    fn excludes_self() {
        let scene = [at(0, 0.0, 0.0), at(1, 1.0, 1.0)];
        let found = neighbors(&scene[0], &scene, radius(10.0));
        assert!(!found.contains(&0));
        assert!(found.contains(&1));
    }

    #[test]
    fn identical_positions_are_connected() {
        let scene = [at(0, 5.0, 5.0), at(1, 5.0, 5.0)];
        assert!(are_proximate(&scene[0].position, &scene[1].position, radius(0.001)));
        assert_eq!(edges(&scene, radius(0.001)).len(), 1);
    }

    #[test]
    fn empty_and_single_inputs() {
        let empty: [Entity<u32>; 0] = [];
        assert!(all_neighborhoods(&empty, radius(75.0)).is_empty());
        assert!(edges(&empty, radius(75.0)).is_empty());

        let single = [at(7, 0.0, 0.0)];
        let hoods = all_neighborhoods(&single, radius(75.0));
        assert_eq!(hoods.len(), 1);
        assert!(hoods[&7].is_empty());
    }

    #[test]
    fn neighborhoods_are_symmetric() {
        let scene = [
            at(0, 0.0, 0.0),
            at(1, 50.0, 0.0),
            at(2, 100.0, 0.0),
            at(3, 100.0, 60.0),
            at(4, 400.0, 400.0),
        ];
        let hoods = all_neighborhoods(&scene, radius(75.0));

        for (id, hood) in &hoods {
            for other in hood {
                assert!(
                    hoods[other].contains(id),
                    "{} sees {} but not the reverse",
                    id,
                    other
                );
            }
        }
    }

    #[test]
    fn edges_match_neighborhoods() {
        let scene = [at(0, 0.0, 0.0), at(1, 50.0, 0.0), at(2, 100.0, 0.0)];
        let found = edges(&scene, radius(75.0));

        assert_eq!(found, BTreeSet::from([Edge::new(0, 1), Edge::new(1, 2)]));
    }
}
