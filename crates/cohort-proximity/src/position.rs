//! Planar positions and the entities that carry them.
//!
//! Coordinates are plain `f64` points. Whether they are absolute canvas points
//! or normalized fractions is up to the caller, as long as one graph never
//! mixes the two.

/// A point on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Position {
    /// Create a new position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another position.
    #[inline]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another position.
    #[inline]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Clamp each axis into `[min, max]`.
    pub fn clamp(&self, min: Self, max: Self) -> Self {
        Self {
            x: self.x.max(min.x).min(max.x),
            y: self.y.max(min.y).min(max.y),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A keyed entity at a position.
///
/// The key is the entity's stable identity. Positions are read, never
/// written, by the proximity functions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity<K> {
    /// Stable identifier
    pub id: K,
    /// Current position
    pub position: Position,
}

impl<K> Entity<K> {
    /// Create a new entity.
    pub const fn new(id: K, position: Position) -> Self {
        Self { id, position }
    }
}
