//! Canvas geometry and the tracker behind it.
//!
//! Actors store normalized centers so a layout survives a resize. The
//! tracker works in absolute canvas units, where the proximity radius means
//! something. [`Scene`] converts between the two and keeps dragged actors
//! inside the drawable area.

use cohort_proximity::{Entity, Position, ProximityRadius};
use cohort_tracker::{EdgeDelta, GroupTracker, Partition};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Actor, ActorId};
use crate::transactions::partition_from_groups;

/// Horizontal and bottom margin an actor center keeps from the canvas edge.
pub const EDGE_INSET: f64 = 25.0;

/// Top margin, leaving room for the name label.
pub const LABEL_INSET: f64 = 40.0;

/// Canvas dimensions in absolute units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanvasSize {
    width: f64,
    height: f64,
}

impl CanvasSize {
    /// Validate and wrap canvas dimensions.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) {
            Ok(Self { width, height })
        } else {
            Err(Error::InvalidCanvas { width, height })
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Convert a normalized center into canvas units.
    pub fn to_absolute(&self, center: (f32, f32)) -> Position {
        Position::new(
            f64::from(center.0) * self.width,
            f64::from(center.1) * self.height,
        )
    }

    /// Convert canvas units into a normalized center.
    pub fn to_normalized(&self, position: Position) -> (f32, f32) {
        (
            (position.x / self.width) as f32,
            (position.y / self.height) as f32,
        )
    }

    /// Keep a point inside the drawable area.
    pub fn clamp(&self, position: Position) -> Position {
        position.clamp(
            Position::new(EDGE_INSET, LABEL_INSET),
            Position::new(self.width - EDGE_INSET, self.height - EDGE_INSET),
        )
    }
}

/// Result of the final move of a drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Settled {
    /// Where the actor ended up, after clamping
    pub position: Position,
    pub delta: EdgeDelta<ActorId>,
    /// New groups, if the gesture changed them
    pub groups: Option<Partition<ActorId>>,
}

/// A sized canvas with live proximity tracking.
#[derive(Debug, Clone)]
pub struct Scene {
    size: CanvasSize,
    tracker: GroupTracker<ActorId>,
}

impl Scene {
    /// Lay out actors on a canvas, taking `seed` as the last committed groups.
    pub fn new<'a, I>(radius: ProximityRadius, size: CanvasSize, actors: I, seed: &[Vec<ActorId>]) -> Self
    where
        I: IntoIterator<Item = &'a Actor>,
    {
        let entities = entities(size, actors);
        let tracker = GroupTracker::with_seed(radius, &entities, &partition_from_groups(seed));
        Self { size, tracker }
    }

    /// Rebuild after actors were added or removed.
    pub fn reload<'a, I>(&mut self, actors: I, seed: &[Vec<ActorId>])
    where
        I: IntoIterator<Item = &'a Actor>,
    {
        let entities = entities(self.size, actors);
        self.tracker.reseed(&entities, &partition_from_groups(seed));
    }

    /// Change the canvas size and lay actors out again.
    pub fn resize<'a, I>(&mut self, size: CanvasSize, actors: I, seed: &[Vec<ActorId>])
    where
        I: IntoIterator<Item = &'a Actor>,
    {
        debug!(width = size.width, height = size.height, "canvas resized");
        self.size = size;
        self.reload(actors, seed);
    }

    /// Move an actor mid-gesture, reporting its connection changes.
    pub fn drag(&mut self, id: &ActorId, point: Position) -> Result<(Position, EdgeDelta<ActorId>)> {
        if !self.tracker.contains(id) {
            return Err(Error::UnknownActor(*id));
        }
        let position = self.size.clamp(point);
        let delta = self.tracker.on_entity_moved(id, position);
        Ok((position, delta))
    }

    /// Final move of a gesture, then a group commit.
    pub fn release(&mut self, id: &ActorId, point: Position) -> Result<Settled> {
        let (position, delta) = self.drag(id, point)?;
        let groups = self.tracker.commit();
        Ok(Settled {
            position,
            delta,
            groups,
        })
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    pub fn radius(&self) -> ProximityRadius {
        self.tracker.radius()
    }

    pub fn tracker(&self) -> &GroupTracker<ActorId> {
        &self.tracker
    }
}

fn entities<'a, I>(size: CanvasSize, actors: I) -> Vec<Entity<ActorId>>
where
    I: IntoIterator<Item = &'a Actor>,
{
    actors
        .into_iter()
        .map(|actor| Entity::new(actor.id, size.to_absolute((actor.center_x, actor.center_y))))
        .collect()
}
