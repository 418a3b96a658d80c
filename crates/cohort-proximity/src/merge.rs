//! Set-merge folding.
//!
//! A lightweight stand-in for union-find: a base set absorbs every candidate
//! it intersects, and repeating that over every closed neighborhood yields the
//! connected components. Quadratic, which is fine at scene sizes.

use std::collections::BTreeSet;

use crate::{all_neighborhoods, Entity, ProximityRadius};

/// Grow `base` by every candidate that intersects it.
///
/// Candidates are tested in order against the set grown so far, not the
/// original `base`, so a candidate can be absorbed through an earlier one.
/// Candidates disjoint from the grown set pass through in their original
/// order. The grown set is appended last. An empty base intersects nothing and is not appended,
/// so the candidates come back unchanged.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use cohort_proximity::merge_one;
///
/// let base = BTreeSet::from([1, 2]);
/// let candidates = vec![
///     BTreeSet::from([3, 4]),
///     BTreeSet::from([2, 5]),
///     BTreeSet::from([6]),
/// ];
///
/// assert_eq!(
///     merge_one(base, candidates),
///     vec![BTreeSet::from([3, 4]), BTreeSet::from([6]), BTreeSet::from([1, 2, 5])],
/// );
/// ```
pub fn merge_one<T: Ord>(base: BTreeSet<T>, candidates: Vec<BTreeSet<T>>) -> Vec<BTreeSet<T>> {
    if base.is_empty() {
        return candidates;
    }

    let mut merged = base;
    let mut result = Vec::with_capacity(candidates.len() + 1);

    for candidate in candidates {
        if merged.is_disjoint(&candidate) {
            result.push(candidate);
        } else {
            merged.extend(candidate);
        }
    }

    result.push(merged);
    result
}

/// Fold sets together until no two results intersect.
///
/// Each set in turn becomes the base of a [`merge_one`] over everything
/// folded so far.
pub fn fold_groups<T, I>(sets: I) -> Vec<BTreeSet<T>>
where
    T: Ord,
    I: IntoIterator<Item = BTreeSet<T>>,
{
    sets.into_iter()
        .fold(Vec::new(), |folded, set| merge_one(set, folded))
}

/// Connected components of the proximity graph.
///
/// Every entity lands in exactly one component; isolated entities form
/// singletons.
pub fn connected_components<K>(among: &[Entity<K>], radius: ProximityRadius) -> Vec<BTreeSet<K>>
where
    K: Ord + Clone,
{
    let closed = all_neighborhoods(among, radius)
        .into_iter()
        .map(|(id, mut hood)| {
            hood.insert(id);
            hood
        });

    fold_groups(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    fn set(items: &[u32]) -> BTreeSet<u32> {
        items.iter().copied().collect()
    }

    fn elements(sets: &[BTreeSet<u32>]) -> Vec<u32> {
        let mut all: Vec<u32> = sets.iter().flatten().copied().collect();
        all.sort_unstable();
        all
    }

    #[test]
    fn merges_intersecting_and_keeps_order() {
        let result = merge_one(set(&[1, 2]), vec![set(&[3, 4]), set(&[2, 5]), set(&[6])]);
        assert_eq!(result, vec![set(&[3, 4]), set(&[6]), set(&[1, 2, 5])]);
    }

    #[test]
    fn merged_set_is_always_last() {
        let result = merge_one(set(&[9]), vec![set(&[1]), set(&[2])]);
        assert_eq!(result.last(), Some(&set(&[9])));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn chains_through_multiple_candidates() {
        let result = merge_one(set(&[1, 5]), vec![set(&[1, 2]), set(&[3]), set(&[5, 6])]);
        assert_eq!(result, vec![set(&[3]), set(&[1, 2, 5, 6])]);
    }

    #[test]
    fn later_candidates_meet_the_grown_set() {
        // {33} misses the base but meets {33, 43} once that was absorbed
        let result = merge_one(set(&[43]), vec![set(&[33, 43]), set(&[33])]);
        assert_eq!(result, vec![set(&[33, 43])]);
    }

    #[test]
    fn empty_base_is_noop() {
        let candidates = vec![set(&[1]), set(&[2, 3])];
        assert_eq!(merge_one(BTreeSet::new(), candidates.clone()), candidates);
    }

    #[test]
    fn conserves_elements() {
        let base = set(&[1, 2]);
        let candidates = vec![set(&[3, 4]), set(&[2, 5]), set(&[6]), set(&[5, 7])];
        let result = merge_one(base, candidates);

        // 2 and 5 appear twice across the inputs but are folded into one set
        assert_eq!(elements(&result), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn fold_produces_disjoint_sets() {
        let folded = fold_groups(vec![set(&[1, 2]), set(&[3]), set(&[2, 3]), set(&[4])]);

        for (i, a) in folded.iter().enumerate() {
            for b in &folded[i + 1..] {
                assert!(a.is_disjoint(b), "{:?} overlaps {:?}", a, b);
            }
        }
        assert_eq!(elements(&folded), vec![1, 2, 3, 4]);
        assert!(folded.contains(&set(&[1, 2, 3])));
        assert!(folded.contains(&set(&[4])));
    }

    #[test]
    fn fold_of_nothing_is_empty() {
        let folded: Vec<BTreeSet<u32>> = fold_groups(Vec::new());
        assert!(folded.is_empty());
    }

    #[test]
    fn components_follow_chains() {
        // 0-1 and 1-2 are close, 0-2 are not: still one component
        let radius = ProximityRadius::new(75.0).unwrap();
        let scene = [
            Entity::new(0, Position::new(0.0, 0.0)),
            Entity::new(1, Position::new(60.0, 0.0)),
            Entity::new(2, Position::new(120.0, 0.0)),
            Entity::new(3, Position::new(500.0, 0.0)),
        ];

        let components = connected_components(&scene, radius);
        assert_eq!(components.len(), 2);
        assert!(components.contains(&set(&[0, 1, 2])));
        assert!(components.contains(&set(&[3])));
    }
}
