//! Cohort Proximity Graph
//!
//! Distance-based connectivity for positioned entities on a 2-D canvas.
//!
//! # Proximity
//!
//! Two entities are *proximate* when the Euclidean distance between their
//! positions is strictly less than the [`ProximityRadius`]. An entity at
//! exactly the radius is not connected. Proximity is symmetric and never
//! reflexive: an entity is not its own neighbor.
//!
//! # Groups
//!
//! Groups are the connected components of the proximity graph. They are
//! derived by folding every entity's closed neighborhood (the entity plus its
//! neighbors) with [`merge_one`]: each neighborhood absorbs every previously
//! folded set it intersects. The result is a partition of the entity set,
//! singletons included.
//!
//! The whole graph is recomputed on demand in O(n²). Scenes hold a few dozen
//! entities at most.

mod error;
mod merge;
mod neighbors;
mod position;
mod radius;

pub use error::{Error, Result};
pub use merge::{connected_components, fold_groups, merge_one};
pub use neighbors::{all_neighborhoods, are_proximate, edges, neighbors, Edge};
pub use position::{Entity, Position};
pub use radius::{DeviceClass, ProximityRadius};

/// Proximity radius for phone-class canvases, in points.
pub const PHONE_RADIUS: f64 = 75.0;

/// Proximity radius for tablet-class canvases, in points.
pub const TABLET_RADIUS: f64 = 150.0;

// Larger screens always get the wider radius
const _: () = assert!(TABLET_RADIUS > PHONE_RADIUS);
