//! Core entity structs for the Castaway simulation.
//!
//! The [`Agent`] record is the only entity that lives outside the tile grid;
//! tiles, crop fields, and structures belong to the world crate. Everything
//! here is plain data: the logic that mutates it lives in
//! `castaway-agents`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{
    Gender, ImportanceTier, LifeStage, MemoryCategory, RelationshipKind, Resource, SpatialCategory,
};
use crate::ids::AgentId;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// An integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (king-move) distance. Used for visibility, movement, and
    /// interaction range.
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// Manhattan distance. Used for spatial-memory deduplication.
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// Offset by `(dx, dy)`, saturating at the `i32` bounds.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Agent components
// ---------------------------------------------------------------------------

/// Five personality traits, each in `[0, 100]`, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Personality {
    /// Curiosity and appetite for novelty.
    pub openness: u8,
    /// Diligence and planning.
    pub conscientiousness: u8,
    /// Sociability.
    pub extraversion: u8,
    /// Cooperativeness.
    pub agreeableness: u8,
    /// Emotional volatility.
    pub neuroticism: u8,
}

/// One entry in an agent's memory log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Tick at which the memory was formed.
    pub tick: u64,
    /// Category tag.
    pub category: MemoryCategory,
    /// Free-text description.
    pub description: String,
    /// Importance in `[0, 10]`.
    pub importance: u8,
    /// Other agents involved, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<AgentId>,
}

/// One agent's standing toward another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship kind, re-derived from `value` on every update.
    pub kind: RelationshipKind,
    /// Running score. Unbounded; positive is good.
    pub value: i32,
    /// Human-readable summary derived from `value`.
    pub note: String,
}

/// An ongoing pregnancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pregnancy {
    /// Tick at which the pregnancy began.
    pub start_tick: u64,
    /// Ticks until birth.
    pub duration: u64,
    /// The father.
    pub partner_id: AgentId,
}

impl Pregnancy {
    /// Whether the pregnancy has run its full duration at `tick`.
    pub const fn is_due(&self, tick: u64) -> bool {
        tick.saturating_sub(self.start_tick) >= self.duration
    }
}

/// A single line of conversation with a partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLine {
    /// Tick the line was spoken.
    pub tick: u64,
    /// Who said it.
    pub speaker: AgentId,
    /// What was said.
    pub message: String,
}

/// A remembered point of interest on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialMemory {
    /// What made the tile notable.
    pub category: SpatialCategory,
    /// Where it is.
    pub position: Position,
    /// Tick it was last seen.
    pub last_seen: u64,
    /// Quantity observed, for resource memories.
    #[serde(default)]
    pub quantity: u32,
    /// Importance tier at the time of the last ranking.
    pub tier: ImportanceTier,
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A living or dead inhabitant of the island.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Binary gender.
    pub gender: Gender,
    /// Age in whole ticks.
    pub age: u64,
    /// Lifecycle stage.
    pub status: LifeStage,
    /// Happiness in `[0, 100]`.
    pub happiness: u8,
    /// Fixed personality vector.
    pub personality: Personality,
    /// Bounded, ordered memory log (oldest first).
    pub memories: Vec<MemoryEntry>,
    /// Relationships keyed by the other agent.
    pub relationships: BTreeMap<AgentId, Relationship>,
    /// Resource counts. Absent keys mean zero.
    pub inventory: BTreeMap<Resource, u32>,
    /// Meals eaten since the start of the current day.
    pub meals_eaten: u32,
    /// Tick of the most recent meal.
    pub last_meal_tick: Option<u64>,
    /// Set after one under-fed day; a second one is fatal.
    pub starving: bool,
    /// Cleared exactly once, on death.
    pub alive: bool,
    /// Ongoing pregnancy, if any.
    pub pregnancy: Option<Pregnancy>,
    /// Current tile.
    pub location: Position,
    /// Chebyshev radius for perception and interaction.
    pub visibility_radius: u32,
    /// Per-partner conversation history (oldest first).
    pub conversations: BTreeMap<AgentId, Vec<ConversationLine>>,
    /// Deduplicated points of interest.
    pub spatial_memory: Vec<SpatialMemory>,
}

impl Agent {
    /// Count of a resource in the inventory (zero if absent).
    pub fn count(&self, resource: Resource) -> u32 {
        self.inventory.get(&resource).copied().unwrap_or(0)
    }

    /// Whether the agent is an adult or an elder.
    pub fn is_grown(&self) -> bool {
        self.status >= LifeStage::Adult
    }
}

// ---------------------------------------------------------------------------
// World items
// ---------------------------------------------------------------------------

/// Resources left on the ground, typically by a death.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPile {
    /// Where the pile lies.
    pub position: Position,
    /// What it contains. Absent keys mean zero.
    pub inventory: BTreeMap<Resource, u32>,
    /// Tick it was dropped.
    pub dropped_at: u64,
}
