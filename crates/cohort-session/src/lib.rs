//! Cohort Session Host
//!
//! Hosts a live proximity-grouping session: actors on a canvas, a running
//! clock, and a log of how the actors grouped over time.
//!
//! # Architecture
//!
//! - **Model**: Actors, terrain, and the transaction log, persisted as JSON
//! - **Scene**: Canvas geometry on top of a [`cohort_tracker::GroupTracker`]
//! - **Session**: Applies edits and gestures, broadcasts [`SessionEvent`]s
//! - **Clock**: Ticks the session once per interval while it runs
//! - **Server**: REST API plus a WebSocket event stream
//!
//! # Usage
//!
//! ```ignore
//! let config = SessionConfig::load(None)?;
//! let session = Session::open(config)?.shared();
//! Clock::new(Duration::from_secs(1)).spawn(session.clone());
//! CohortServer::new(session).serve(3000).await?;
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod model;
pub mod scene;
pub mod server;
pub mod session;
pub mod store;
pub mod transactions;

pub use clock::{format_ticks, Clock};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use events::{ConnectionState, SceneSnapshot, SessionEvent};
pub use export::ExportFormat;
pub use model::{Actor, ActorId, ActorPatch, HairStyle, Model, Terrain, TerrainId, TerrainKind, TerrainSize};
pub use scene::{CanvasSize, Scene};
pub use server::CohortServer;
pub use session::{Session, SharedSession};
pub use store::Store;
pub use transactions::{Bootstrap, Groups, TransactionLog};

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_proximity::Position;

    #[test]
    fn a_session_round() {
        let mut session = Session::in_memory(SessionConfig::default(), Model::default()).unwrap();
        session.set_paused(false);
        session.tick();

        let ids: Vec<ActorId> = session.model().actors().map(|a| a.id).collect();
        for id in &ids {
            session.release(id, Position::new(200.0, 400.0)).unwrap();
        }

        let groups = session.model().last_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), ids.len());

        let csv = session.export(ExportFormat::CsvGroup).unwrap();
        assert!(csv.lines().last().unwrap().starts_with("1,"));
    }
}
