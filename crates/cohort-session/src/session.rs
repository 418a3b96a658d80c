//! A hosted grouping session.
//!
//! [`Session`] owns the model and keeps the scene in step with it. Every
//! mutation is broadcast as [`SessionEvent`]s and, when the session is backed
//! by a [`Store`], saved. Saving during a mutation is best effort: a failure
//! is logged and the session carries on with its in-memory state.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use cohort_proximity::Position;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::clock::format_ticks;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::events::{ConnectionState, SceneSnapshot, SessionEvent};
use crate::export::ExportFormat;
use crate::model::{Actor, ActorId, ActorPatch, HairStyle, Model, Terrain, TerrainId, TerrainKind, TerrainSize};
use crate::scene::{CanvasSize, Scene};
use crate::store::Store;
use crate::transactions::{groups_from_partition, Groups};

/// Capacity of the event channel before slow subscribers lag.
const EVENT_CAPACITY: usize = 1024;

/// Session behind the async lock shared by the server and the clock.
pub type SharedSession = Arc<RwLock<Session>>;

/// One live session.
pub struct Session {
    config: SessionConfig,
    model: Model,
    scene: Scene,
    store: Option<Store>,
    paused: bool,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Open the session saved at the configured data path.
    ///
    /// A missing or unreadable file starts a fresh model.
    pub fn open(config: SessionConfig) -> Result<Self> {
        let store = Store::new(&config.data_path);
        let model = store.load_or_default(config.bootstrap);
        Self::build(config, model, Some(store))
    }

    /// A session that never touches the disk.
    pub fn in_memory(config: SessionConfig, model: Model) -> Result<Self> {
        Self::build(config, model, None)
    }

    fn build(config: SessionConfig, model: Model, store: Option<Store>) -> Result<Self> {
        let scene = Scene::new(config.radius()?, config.canvas()?, model.actors(), &model.last_groups());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        info!(
            actors = model.actor_count(),
            ticks = model.ticks(),
            radius = scene.radius().value(),
            "session opened"
        );

        Ok(Self {
            config,
            model,
            scene,
            store,
            paused: true,
            events,
        })
    }

    /// Wrap for sharing with the server and clock.
    pub fn shared(self) -> SharedSession {
        Arc::new(RwLock::new(self))
    }

    /// Receive every event from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance the clock unless paused, autosaving on the configured cadence.
    pub fn tick(&mut self) -> Option<u64> {
        if self.paused {
            return None;
        }

        let tick = self.model.tick();
        let every = self.config.autosave_every;
        if every > 0 && tick % every == 0 {
            self.persist();
        }

        self.emit(SessionEvent::Ticked {
            tick,
            clock: format_ticks(tick),
        });
        Some(tick)
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        info!(paused, ticks = self.model.ticks(), "clock toggled");
        self.emit(SessionEvent::PauseChanged {
            paused,
            tick: self.model.ticks(),
        });
    }

    /// Add an actor at the canvas center, alone in a new group.
    pub fn add_actor(&mut self, style: Option<HairStyle>) -> Actor {
        let actor = Actor::random(&mut rand::thread_rng(), style, (0.5, 0.5));
        let tick = self.model.ticks();

        let mut groups = self.model.last_groups();
        groups.push(vec![actor.id]);
        self.model.add_actor(actor.clone());
        self.model.record_transaction(tick, groups);
        self.reload_scene();

        info!(actor = %actor.id, name = %actor.name, tick, "actor added");
        self.emit(SessionEvent::ActorAdded {
            actor: actor.clone(),
            tick,
        });
        self.persist();
        actor
    }

    /// Retire an actor. Its name stays in the history.
    pub fn remove_actor(&mut self, id: &ActorId) -> Result<()> {
        self.model.remove_actor(id)?;
        self.reload_scene();

        info!(actor = %id, "actor removed");
        self.emit(SessionEvent::ActorRemoved {
            actor: *id,
            tick: self.model.ticks(),
        });
        self.persist();
        Ok(())
    }

    /// Edit an actor's looks or name.
    pub fn update_actor(&mut self, id: &ActorId, patch: ActorPatch) -> Result<Actor> {
        let actor = self.model.update_actor(id, patch)?.clone();
        self.emit(SessionEvent::ActorUpdated {
            actor: actor.clone(),
            tick: self.model.ticks(),
        });
        self.persist();
        Ok(actor)
    }

    /// Place a new terrain piece at the canvas center.
    pub fn add_terrain(&mut self, kind: TerrainKind) -> Terrain {
        let terrain = Terrain::new(kind);
        self.model.add_terrain(terrain.clone());
        self.emit(SessionEvent::TerrainAdded {
            terrain: terrain.clone(),
            tick: self.model.ticks(),
        });
        self.persist();
        terrain
    }

    pub fn remove_terrain(&mut self, id: &TerrainId) -> Result<Terrain> {
        let terrain = self.model.remove_terrain(id)?;
        self.emit(SessionEvent::TerrainRemoved {
            terrain: *id,
            tick: self.model.ticks(),
        });
        self.persist();
        Ok(terrain)
    }

    /// Move a terrain piece to a canvas point, kept inside the drawable area.
    pub fn move_terrain(&mut self, id: &TerrainId, point: Position) -> Result<Terrain> {
        let size = self.scene.size();
        let (x, y) = size.to_normalized(size.clamp(point));
        self.update_terrain(id, |terrain| {
            terrain.center_x = x;
            terrain.center_y = y;
        })
    }

    pub fn resize_terrain(&mut self, id: &TerrainId, size: TerrainSize) -> Result<Terrain> {
        self.update_terrain(id, |terrain| terrain.size = size)
    }

    fn update_terrain<F>(&mut self, id: &TerrainId, edit: F) -> Result<Terrain>
    where
        F: FnOnce(&mut Terrain),
    {
        let terrain = self.model.terrain_mut(id)?;
        edit(terrain);
        let terrain = terrain.clone();
        self.emit(SessionEvent::TerrainUpdated {
            terrain: terrain.clone(),
            tick: self.model.ticks(),
        });
        self.persist();
        Ok(terrain)
    }

    /// Move an actor mid-gesture. Returns the line instructions for the move.
    pub fn drag(&mut self, id: &ActorId, point: Position) -> Result<Vec<SessionEvent>> {
        let (position, delta) = self.scene.drag(id, point)?;
        let tick = self.model.ticks();

        let mut events = SessionEvent::from_delta(&delta, tick);
        events.push(self.place_actor(id, position)?);
        for event in &events {
            self.emit(event.clone());
        }
        Ok(events)
    }

    /// Finish a gesture: final move, group commit, save.
    ///
    /// Returns the new groups when the gesture changed them. They are
    /// recorded at the current tick, replacing any earlier record there.
    pub fn release(&mut self, id: &ActorId, point: Position) -> Result<Option<Groups>> {
        let settled = self.scene.release(id, point)?;
        let tick = self.model.ticks();

        let mut events = SessionEvent::from_delta(&settled.delta, tick);
        events.push(self.place_actor(id, settled.position)?);

        let groups = settled.groups.map(groups_from_partition);
        if let Some(groups) = &groups {
            self.model.record_transaction(tick, groups.clone());
            info!(tick, groups = groups.len(), "groups changed");
            events.push(SessionEvent::GroupsChanged {
                groups: groups.clone(),
                names: self.model.group_names(groups),
                tick,
            });
        }

        for event in events {
            self.emit(event);
        }
        self.persist();
        Ok(groups)
    }

    fn place_actor(&mut self, id: &ActorId, position: Position) -> Result<SessionEvent> {
        let (center_x, center_y) = self.scene.size().to_normalized(position);
        self.model.set_actor_center(id, (center_x, center_y))?;
        Ok(SessionEvent::ActorMoved {
            actor: *id,
            center_x,
            center_y,
            tick: self.model.ticks(),
        })
    }

    /// Change the canvas size. Actors keep their normalized centers.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        let size = CanvasSize::new(width, height)?;
        self.scene.resize(size, self.model.actors(), &self.model.last_groups());
        self.emit(SessionEvent::Resized {
            width,
            height,
            connections: self.connections(),
            tick: self.model.ticks(),
        });
        Ok(())
    }

    /// Start over with a fresh model. The clock is paused.
    pub fn reset(&mut self) {
        self.paused = true;
        self.model = Model::new(self.config.bootstrap);
        self.reload_scene();

        warn!("session reset");
        self.emit(SessionEvent::Reset { tick: 0 });
        self.persist();
    }

    /// Render the transaction history.
    pub fn export(&self, format: ExportFormat) -> Result<String> {
        format.render(&self.model)
    }

    /// Write an export into the configured export directory.
    pub fn export_to_dir(&self, format: ExportFormat) -> Result<PathBuf> {
        format.write_to(&self.config.export_dir, &self.model, Utc::now())
    }

    /// Save now, reporting failure.
    pub fn save(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.save(&self.model),
            None => Ok(()),
        }
    }

    /// Everything a client needs to draw the session.
    pub fn snapshot(&self) -> SceneSnapshot {
        let size = self.scene.size();
        SceneSnapshot {
            tick: self.model.ticks(),
            clock: format_ticks(self.model.ticks()),
            paused: self.paused,
            width: size.width(),
            height: size.height(),
            radius: self.scene.radius().value(),
            actors: self.model.actors_sorted().into_iter().cloned().collect(),
            terrains: self.model.terrains().cloned().collect(),
            connections: self.connections(),
            groups: self.model.last_groups(),
            transaction_count: self.model.transactions().len(),
        }
    }

    fn reload_scene(&mut self) {
        self.scene.reload(self.model.actors(), &self.model.last_groups());
    }

    fn connections(&self) -> Vec<ConnectionState> {
        self.scene
            .tracker()
            .connections()
            .iter()
            .map(|edge| {
                let (from, to) = edge.endpoints();
                ConnectionState { from: *from, to: *to }
            })
            .collect()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "failed to save model");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("ticks", &self.model.ticks())
            .field("actors", &self.model.actor_count())
            .field("paused", &self.paused)
            .finish()
    }
}
