//! Payload shapes carried by player events.
//!
//! These are plain data. The engine that raises an event owns the values and
//! lends them to subscribers for the duration of a dispatch call; nothing in
//! this crate attaches game behaviour to them.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Unique identifier for a player session.
///
/// Wraps a UUID so player ids cannot be confused with other ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Creates a new random player ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a player ID from its string form.
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in the world, double precision.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Integer coordinates of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Face of a block that was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

/// A stack of items, identified by item name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Namespaced item identifier, e.g. `minecraft:cobblestone`
    pub item: String,
    /// Number of items in the stack
    pub count: u32,
    /// Durability used so far
    #[serde(default)]
    pub damage: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
            damage: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// A placed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Namespaced block identifier, e.g. `minecraft:stone`
    pub name: String,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Dimension a world belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Overworld,
    Nether,
    End,
}

/// Reference to a world managed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldRef {
    pub name: String,
    pub dimension: Dimension,
}

impl WorldRef {
    pub fn new(name: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            dimension,
        }
    }
}

/// Reference to an entity in a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: Uuid,
    /// Entity type identifier, e.g. `minecraft:zombie`
    pub entity_type: String,
    /// Display name, when the entity has one
    pub name: Option<String>,
    pub position: Vec3,
}

/// Cause of damage dealt to a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DamageSource {
    Attack { attacker: EntityRef },
    Projectile { owner: Option<EntityRef> },
    Fall { distance: f64 },
    Fire,
    Lava,
    Drowning,
    Starvation,
    Suffocation,
    Explosion,
    Void,
    Custom(String),
}

/// Cause of health being restored to a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HealingSource {
    Food,
    Regeneration,
    InstantHealth,
    Custom(String),
}

/// A player skin as reported by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skin {
    pub skin_id: String,
    pub width: u32,
    pub height: u32,
    pub persona: bool,
    /// Raw RGBA pixel data
    #[serde(default)]
    pub pixels: Vec<u8>,
}

/// The command a player invoked, as resolved by the command layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRef {
    pub name: String,
    pub aliases: Vec<String>,
}

impl CommandRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }
}

/// Client performance figures, sent periodically by clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub average_frames_per_second: f64,
    pub average_server_sim_tick_time: Duration,
    pub average_client_sim_tick_time: Duration,
    pub average_begin_frame_time: Duration,
    pub average_input_time: Duration,
    pub average_render_time: Duration,
    pub average_end_frame_time: Duration,
    pub average_remainder_time_percent: f64,
    pub average_unaccounted_time_percent: f64,
}
