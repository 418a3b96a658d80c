//! Actors, terrain, and the model that owns them.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::transactions::{Bootstrap, Groups, TransactionLog};

/// Stable actor identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable terrain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainId(pub Uuid);

impl TerrainId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TerrainId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TerrainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Names handed out to new actors.
pub const NAMES: &[&str] = &[
    "Alex", "Ari", "Avery", "Bailey", "Blair", "Cameron", "Casey", "Charlie", "Dakota", "Devon",
    "Drew", "Eden", "Emery", "Finley", "Harper", "Hayden", "Jamie", "Jesse", "Jordan", "Kai",
    "Kendall", "Lee", "Logan", "Morgan", "Noa", "Parker", "Quinn", "Reese", "Riley", "Robin",
    "Rowan", "Sage", "Sam", "Skyler", "Taylor",
];

/// Starting layout: a hexagon around the canvas center, normalized.
pub const STARTING_POSITIONS: [(f32, f32); 6] = [
    (0.35, 0.65),
    (0.5, 0.8),
    (0.65, 0.65),
    (0.65, 0.35),
    (0.5, 0.2),
    (0.35, 0.35),
];

macro_rules! palette {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Pick a variant uniformly.
            pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
                *Self::ALL.choose(rng).unwrap_or(&Self::ALL[0])
            }
        }
    };
}

palette!(
    /// Skin tone of an actor.
    SkinColor {
        Silk, Lumber, Peach, Eggshell, Spice, Sienna, Oak, Clay, Coffee,
    }
);

palette!(
    /// Hair color of an actor.
    HairColor {
        Ebony, Chocolate, Cinnamon, Hazelnut, Chestnut, Pecan, Ginger, Blonde, Sand, Apricot,
        Fire, Auburn, Copper, Walnut, Mist, Silver, Platinum, Onyx,
    }
);

palette!(
    /// Shirt color of an actor.
    ShirtColor {
        Blue, Green, Indigo, Orange, Pink, Purple, Red, Teal, Yellow, White, Black,
    }
);

palette!(
    /// What a terrain decoration depicts.
    TerrainKind {
        Bookcase, Wardrobe, Building, Temple, Bed, Tv, Computer, Radio, Guitars, Game, Paint,
        Rectangle, Circle,
    }
);

palette!(
    /// Size step of a terrain decoration.
    TerrainSize {
        Tiny, Small, Medium, Large, Huge, Extreme,
    }
);

impl TerrainSize {
    /// Drawing scale factor for this size.
    pub fn scale(&self) -> u32 {
        let step = Self::ALL.iter().position(|size| size == self).unwrap_or(0) as u32;
        step * 2 + 4
    }
}

/// Hair style sprite index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HairStyle(u8);

impl HairStyle {
    /// Number of available styles.
    pub const COUNT: u8 = 31;

    /// Wrap a style index, rejecting out-of-range values.
    pub fn new(index: u8) -> Option<Self> {
        (index < Self::COUNT).then_some(Self(index))
    }

    /// Get the raw style index.
    pub const fn index(&self) -> u8 {
        self.0
    }

    /// Pick a style uniformly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..Self::COUNT))
    }
}

impl TryFrom<u8> for HairStyle {
    type Error = String;

    fn try_from(index: u8) -> std::result::Result<Self, String> {
        Self::new(index).ok_or_else(|| format!("hair style {} out of range", index))
    }
}

impl From<HairStyle> for u8 {
    fn from(style: HairStyle) -> Self {
        style.0
    }
}

/// A draggable person on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub skin: SkinColor,
    pub hair: HairColor,
    pub shirt: ShirtColor,
    pub style: HairStyle,
    /// Horizontal center as a fraction of canvas width
    pub center_x: f32,
    /// Vertical center as a fraction of canvas height
    pub center_y: f32,
}

impl Actor {
    /// A new actor with random looks and name.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, style: Option<HairStyle>, center: (f32, f32)) -> Self {
        Self {
            id: ActorId::new(),
            name: NAMES.choose(rng).copied().unwrap_or_default().to_string(),
            skin: SkinColor::random(rng),
            hair: HairColor::random(rng),
            shirt: ShirtColor::random(rng),
            style: style.unwrap_or_else(|| HairStyle::random(rng)),
            center_x: center.0,
            center_y: center.1,
        }
    }
}

/// Changes to an actor's editable attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorPatch {
    pub name: Option<String>,
    pub skin: Option<SkinColor>,
    pub hair: Option<HairColor>,
    pub shirt: Option<ShirtColor>,
    pub style: Option<HairStyle>,
}

impl ActorPatch {
    fn apply(self, actor: &mut Actor) {
        if let Some(name) = self.name {
            actor.name = name;
        }
        if let Some(skin) = self.skin {
            actor.skin = skin;
        }
        if let Some(hair) = self.hair {
            actor.hair = hair;
        }
        if let Some(shirt) = self.shirt {
            actor.shirt = shirt;
        }
        if let Some(style) = self.style {
            actor.style = style;
        }
    }
}

/// A static decoration on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    pub id: TerrainId,
    pub kind: TerrainKind,
    pub size: TerrainSize,
    pub center_x: f32,
    pub center_y: f32,
}

impl Terrain {
    /// A small terrain piece at the canvas center.
    pub fn new(kind: TerrainKind) -> Self {
        Self {
            id: TerrainId::new(),
            kind,
            size: TerrainSize::Small,
            center_x: 0.5,
            center_y: 0.5,
        }
    }
}

/// Everything that gets persisted.
///
/// Removed actors are kept aside so names in old transactions still resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    ticks: u64,
    actors: BTreeMap<ActorId, Actor>,
    terrains: BTreeMap<TerrainId, Terrain>,
    #[serde(default)]
    removed_actors: BTreeMap<ActorId, Actor>,
    transactions: TransactionLog,
}

impl Model {
    /// A fresh model with the six starting actors.
    pub fn new(bootstrap: Bootstrap) -> Self {
        Self::with_rng(bootstrap, &mut rand::thread_rng())
    }

    /// A fresh model drawing looks and names from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(bootstrap: Bootstrap, rng: &mut R) -> Self {
        let actors: BTreeMap<ActorId, Actor> = STARTING_POSITIONS
            .iter()
            .map(|&center| {
                let actor = Actor::random(rng, None, center);
                (actor.id, actor)
            })
            .collect();

        let mut transactions = TransactionLog::default();
        transactions.record(0, bootstrap.initial_groups(actors.keys().copied()));

        Self {
            ticks: 0,
            actors,
            terrains: BTreeMap::new(),
            removed_actors: BTreeMap::new(),
            transactions,
        }
    }

    /// An empty model with no actors and no transactions.
    pub fn empty() -> Self {
        Self {
            ticks: 0,
            actors: BTreeMap::new(),
            terrains: BTreeMap::new(),
            removed_actors: BTreeMap::new(),
            transactions: TransactionLog::default(),
        }
    }

    /// Seconds the session has been running.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the clock by one tick.
    pub fn tick(&mut self) -> u64 {
        self.ticks += 1;
        self.ticks
    }

    /// Active actors, ordered by id.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Active actors in listing order (descending id).
    pub fn actors_sorted(&self) -> Vec<&Actor> {
        self.actors.values().rev().collect()
    }

    /// Number of active actors.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Look up an actor, falling back to removed ones.
    pub fn actor(&self, id: &ActorId) -> Option<&Actor> {
        self.actors.get(id).or_else(|| self.removed_actors.get(id))
    }

    /// Check if an actor is active.
    pub fn is_active(&self, id: &ActorId) -> bool {
        self.actors.contains_key(id)
    }

    /// Add an actor.
    pub fn add_actor(&mut self, actor: Actor) {
        self.actors.insert(actor.id, actor);
    }

    /// Retire an actor. Its name stays resolvable for history.
    pub fn remove_actor(&mut self, id: &ActorId) -> Result<()> {
        let actor = self.actors.remove(id).ok_or(Error::UnknownActor(*id))?;
        self.removed_actors.insert(actor.id, actor);
        Ok(())
    }

    /// Edit an active actor.
    pub fn update_actor(&mut self, id: &ActorId, patch: ActorPatch) -> Result<&Actor> {
        let actor = self.actors.get_mut(id).ok_or(Error::UnknownActor(*id))?;
        patch.apply(actor);
        Ok(actor)
    }

    /// Store an actor's normalized center.
    pub fn set_actor_center(&mut self, id: &ActorId, center: (f32, f32)) -> Result<()> {
        let actor = self.actors.get_mut(id).ok_or(Error::UnknownActor(*id))?;
        actor.center_x = center.0;
        actor.center_y = center.1;
        Ok(())
    }

    /// Terrain pieces, ordered by id.
    pub fn terrains(&self) -> impl Iterator<Item = &Terrain> {
        self.terrains.values()
    }

    /// Add a terrain piece.
    pub fn add_terrain(&mut self, terrain: Terrain) {
        self.terrains.insert(terrain.id, terrain);
    }

    /// Remove a terrain piece.
    pub fn remove_terrain(&mut self, id: &TerrainId) -> Result<Terrain> {
        self.terrains.remove(id).ok_or(Error::UnknownTerrain(*id))
    }

    /// Mutable access to a terrain piece.
    pub fn terrain_mut(&mut self, id: &TerrainId) -> Result<&mut Terrain> {
        self.terrains.get_mut(id).ok_or(Error::UnknownTerrain(*id))
    }

    /// The transaction history.
    pub fn transactions(&self) -> &TransactionLog {
        &self.transactions
    }

    /// Record groups at a tick, replacing any earlier record at that tick.
    pub fn record_transaction(&mut self, tick: u64, groups: Groups) {
        self.transactions.record(tick, groups);
    }

    /// Groups of the latest transaction.
    pub fn last_groups(&self) -> Groups {
        self.transactions
            .last()
            .map(|(_, groups)| groups.clone())
            .unwrap_or_default()
    }

    /// Resolve groups of ids into names, skipping unknown ids.
    pub fn group_names(&self, groups: &[Vec<ActorId>]) -> Vec<Vec<String>> {
        groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .filter_map(|id| self.actor(id))
                    .map(|actor| actor.name.clone())
                    .collect()
            })
            .collect()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(Bootstrap::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn model() -> Model {
        Model::with_rng(Bootstrap::Singletons, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn new_model_has_six_actors() {
        let model = model();
        assert_eq!(model.actor_count(), 6);
        assert_eq!(model.ticks(), 0);

        let centers: Vec<(f32, f32)> = model.actors().map(|a| (a.center_x, a.center_y)).collect();
        for position in STARTING_POSITIONS {
            assert!(centers.contains(&position));
        }
    }

    #[test]
    fn new_model_records_bootstrap_transaction() {
        let model = model();
        let (tick, groups) = model.transactions().last().unwrap();
        assert_eq!(tick, 0);
        assert_eq!(groups.len(), 6);
        assert!(groups.iter().all(|g| g.len() == 1));
    }

    #[test]
    fn single_group_bootstrap() {
        let model = Model::with_rng(Bootstrap::SingleGroup, &mut StdRng::seed_from_u64(7));
        assert_eq!(model.last_groups().len(), 1);
        assert_eq!(model.last_groups()[0].len(), 6);
    }

    #[test]
    fn removed_actor_still_resolves() {
        let mut model = model();
        let id = model.actors().next().unwrap().id;
        let name = model.actor(&id).unwrap().name.clone();

        model.remove_actor(&id).unwrap();
        assert!(!model.is_active(&id));
        assert_eq!(model.actor_count(), 5);
        assert_eq!(model.actor(&id).unwrap().name, name);
        assert_eq!(model.group_names(&[vec![id]]), vec![vec![name]]);
    }

    #[test]
    fn removing_twice_fails() {
        let mut model = model();
        let id = model.actors().next().unwrap().id;
        model.remove_actor(&id).unwrap();
        assert!(matches!(model.remove_actor(&id), Err(Error::UnknownActor(_))));
    }

    #[test]
    fn actors_sorted_descending() {
        let model = model();
        let ids: Vec<ActorId> = model.actors_sorted().iter().map(|a| a.id).collect();
        let mut expected = ids.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(ids, expected);
    }

    #[test]
    fn patch_updates_only_given_fields() {
        let mut model = model();
        let id = model.actors().next().unwrap().id;
        let before = model.actor(&id).unwrap().clone();

        let patch = ActorPatch {
            name: Some("Jo".into()),
            shirt: Some(ShirtColor::Teal),
            ..ActorPatch::default()
        };
        let after = model.update_actor(&id, patch).unwrap().clone();

        assert_eq!(after.name, "Jo");
        assert_eq!(after.shirt, ShirtColor::Teal);
        assert_eq!(after.skin, before.skin);
        assert_eq!(after.style, before.style);
    }

    #[test]
    fn terrain_lifecycle() {
        let mut model = model();
        let terrain = Terrain::new(TerrainKind::Bed);
        let id = terrain.id;
        model.add_terrain(terrain);
        assert_eq!(model.terrains().count(), 1);

        model.terrain_mut(&id).unwrap().size = TerrainSize::Huge;
        assert_eq!(model.remove_terrain(&id).unwrap().size, TerrainSize::Huge);
        assert!(model.remove_terrain(&id).is_err());
    }

    #[test]
    fn terrain_scale_steps_by_two() {
        assert_eq!(TerrainSize::Tiny.scale(), 4);
        assert_eq!(TerrainSize::Small.scale(), 6);
        assert_eq!(TerrainSize::Extreme.scale(), 14);
    }

    #[test]
    fn hair_style_range() {
        assert!(HairStyle::new(0).is_some());
        assert!(HairStyle::new(30).is_some());
        assert!(HairStyle::new(31).is_none());

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!(HairStyle::random(&mut rng).index() < HairStyle::COUNT);
        }
    }

    #[test]
    fn hair_style_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<HairStyle>("12").is_ok());
        assert!(serde_json::from_str::<HairStyle>("31").is_err());
    }

    #[test]
    fn model_survives_json() {
        let mut model = model();
        model.tick();
        model.add_terrain(Terrain::new(TerrainKind::Radio));

        let json = serde_json::to_string(&model).unwrap();
        let parsed: Model = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.ticks(), 1);
        assert_eq!(parsed.actor_count(), 6);
        assert_eq!(parsed.terrains().count(), 1);
        assert_eq!(parsed.last_groups(), model.last_groups());
    }
}
