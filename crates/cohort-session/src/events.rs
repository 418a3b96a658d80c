//! Session events streamed to connected clients.

use cohort_tracker::EdgeDelta;
use serde::{Deserialize, Serialize};

use crate::model::{Actor, ActorId, Terrain, TerrainId};
use crate::transactions::Groups;

/// A drawn connection between two actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub from: ActorId,
    pub to: ActorId,
}

/// Things that happen in a live session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Two actors came within reach; draw a line
    ConnectionAdded {
        from: ActorId,
        to: ActorId,
        tick: u64,
    },

    /// Two actors drifted apart; erase their line
    ConnectionRemoved {
        from: ActorId,
        to: ActorId,
        tick: u64,
    },

    /// A line whose endpoint moved and needs redrawing
    ConnectionRefreshed {
        from: ActorId,
        to: ActorId,
        tick: u64,
    },

    /// A released drag changed the groups
    GroupsChanged {
        groups: Groups,
        names: Vec<Vec<String>>,
        tick: u64,
    },

    /// An actor was dragged to a new normalized center
    ActorMoved {
        actor: ActorId,
        center_x: f32,
        center_y: f32,
        tick: u64,
    },

    ActorAdded {
        actor: Actor,
        tick: u64,
    },

    ActorRemoved {
        actor: ActorId,
        tick: u64,
    },

    ActorUpdated {
        actor: Actor,
        tick: u64,
    },

    TerrainAdded {
        terrain: Terrain,
        tick: u64,
    },

    TerrainRemoved {
        terrain: TerrainId,
        tick: u64,
    },

    TerrainUpdated {
        terrain: Terrain,
        tick: u64,
    },

    /// The clock advanced
    Ticked {
        tick: u64,
        clock: String,
    },

    /// The clock was paused or resumed
    PauseChanged {
        paused: bool,
        tick: u64,
    },

    /// The canvas changed size; connections are redrawn from scratch
    Resized {
        width: f64,
        height: f64,
        connections: Vec<ConnectionState>,
        tick: u64,
    },

    /// The session started over with a fresh model
    Reset {
        tick: u64,
    },
}

impl SessionEvent {
    /// Get the tick this event happened at.
    pub fn tick(&self) -> u64 {
        match self {
            SessionEvent::ConnectionAdded { tick, .. }
            | SessionEvent::ConnectionRemoved { tick, .. }
            | SessionEvent::ConnectionRefreshed { tick, .. }
            | SessionEvent::GroupsChanged { tick, .. }
            | SessionEvent::ActorMoved { tick, .. }
            | SessionEvent::ActorAdded { tick, .. }
            | SessionEvent::ActorRemoved { tick, .. }
            | SessionEvent::ActorUpdated { tick, .. }
            | SessionEvent::TerrainAdded { tick, .. }
            | SessionEvent::TerrainRemoved { tick, .. }
            | SessionEvent::TerrainUpdated { tick, .. }
            | SessionEvent::Ticked { tick, .. }
            | SessionEvent::PauseChanged { tick, .. }
            | SessionEvent::Resized { tick, .. }
            | SessionEvent::Reset { tick } => *tick,
        }
    }

    /// Line instructions for one move: removals, then additions, then redraws.
    pub fn from_delta(delta: &EdgeDelta<ActorId>, tick: u64) -> Vec<SessionEvent> {
        let removed = delta.removed.iter().map(|edge| {
            let (from, to) = edge.endpoints();
            SessionEvent::ConnectionRemoved { from: *from, to: *to, tick }
        });
        let added = delta.added.iter().map(|edge| {
            let (from, to) = edge.endpoints();
            SessionEvent::ConnectionAdded { from: *from, to: *to, tick }
        });
        let refreshed = delta.unchanged.iter().map(|edge| {
            let (from, to) = edge.endpoints();
            SessionEvent::ConnectionRefreshed { from: *from, to: *to, tick }
        });

        removed.chain(added).chain(refreshed).collect()
    }
}

/// Everything a client needs to draw the session from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub tick: u64,
    /// Elapsed time as shown on the clock
    pub clock: String,
    pub paused: bool,
    pub width: f64,
    pub height: f64,
    pub radius: f64,
    /// Active actors in listing order
    pub actors: Vec<Actor>,
    pub terrains: Vec<Terrain>,
    pub connections: Vec<ConnectionState>,
    /// Groups of the latest transaction
    pub groups: Groups,
    pub transaction_count: usize,
}
