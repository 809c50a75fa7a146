//! The bounded per-agent context handed to a decision source.
//!
//! A [`Perception`] is assembled by the core once per agent per tick. It is
//! a read-only projection of the world: nothing in it aliases engine state,
//! so it can be serialized, templated into a prompt, or sent across a task
//! boundary freely.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{Gender, LifeStage, RelationshipKind, Resource, StructureType, Terrain, Weather};
use crate::ids::AgentId;
use crate::structs::{ConversationLine, MemoryEntry, Personality, Position, SpatialMemory};

/// Everything an agent knows when it decides what to do this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perception {
    /// Current tick.
    pub tick: u64,
    /// Hour of the day, `tick % 24`.
    pub hour: u64,
    /// Whether it is daytime.
    pub is_day: bool,
    /// Current weather.
    pub weather: Weather,
    /// The agent's own state.
    pub self_state: SelfState,
    /// Most recent memories, oldest first.
    pub recent_memories: Vec<MemoryEntry>,
    /// Strongest relationships, strongest first.
    pub relationships: Vec<KnownAgent>,
    /// Recent conversation lines grouped by partner.
    pub conversations: Vec<ConversationExcerpt>,
    /// Ranked points of interest the agent remembers.
    pub spatial_memory: Vec<SpatialMemory>,
    /// Tiles within the visibility radius, row-major.
    pub visible_tiles: Vec<VisibleTile>,
    /// Other living agents within the visibility radius.
    pub visible_agents: Vec<VisibleAgent>,
    /// Action names the agent may use this tick.
    pub available_actions: Vec<String>,
}

/// The perceiving agent's own state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfState {
    /// Identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Gender.
    pub gender: Gender,
    /// Age in ticks.
    pub age: u64,
    /// Lifecycle stage.
    pub status: LifeStage,
    /// Happiness in `[0, 100]`.
    pub happiness: u8,
    /// Personality traits.
    pub personality: Personality,
    /// Non-zero inventory entries.
    pub inventory: BTreeMap<Resource, u32>,
    /// Current tile.
    pub location: Position,
    /// Meals eaten today.
    pub meals_eaten: u32,
    /// Meals required per day.
    pub meals_needed: u32,
    /// Whether the agent went hungry yesterday.
    pub starving: bool,
    /// Whether the agent is pregnant.
    pub pregnant: bool,
    /// Perception radius.
    pub visibility_radius: u32,
}

/// A relationship as seen from the perceiving agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownAgent {
    /// The other agent.
    pub id: AgentId,
    /// Their name, if they are still alive.
    pub name: Option<String>,
    /// Relationship kind.
    pub kind: RelationshipKind,
    /// Running value.
    pub value: i32,
    /// Human-readable summary.
    pub note: String,
}

/// The tail of a conversation with one partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationExcerpt {
    /// The partner.
    pub partner: AgentId,
    /// Their name, if they are still alive.
    pub partner_name: Option<String>,
    /// Most recent lines, oldest first.
    pub lines: Vec<ConversationLine>,
}

/// A crop field as seen on a visible tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleCrop {
    /// Times watered.
    pub watered: u32,
    /// Earliest harvest tick.
    pub mature_tick: u64,
    /// Whether it can be harvested right now.
    pub ready: bool,
}

/// One tile within sight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleTile {
    /// Coordinates.
    pub position: Position,
    /// Terrain category.
    pub terrain: Terrain,
    /// Non-zero resources on the tile.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<Resource, u32>,
    /// Live crop field, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<VisibleCrop>,
    /// Structure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureType>,
    /// Resources lying in dropped piles on the tile.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dropped: BTreeMap<Resource, u32>,
}

/// Another agent within sight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleAgent {
    /// Identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Gender.
    pub gender: Gender,
    /// Lifecycle stage.
    pub status: LifeStage,
    /// Current tile.
    pub position: Position,
    /// Chebyshev distance from the perceiving agent.
    pub distance: u32,
}

impl Perception {
    /// The nearest visible agent, ties broken by id.
    pub fn nearest_agent(&self) -> Option<&VisibleAgent> {
        self.visible_agents
            .iter()
            .min_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.id.cmp(&b.id)))
    }

    /// The visible tile at `position`, if any.
    pub fn tile_at(&self, position: Position) -> Option<&VisibleTile> {
        self.visible_tiles.iter().find(|t| t.position == position)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ids::IdMint;

    fn visible(mint: &mut IdMint, distance: u32) -> VisibleAgent {
        VisibleAgent {
            id: mint.mint(),
            name: String::from("Ana"),
            gender: Gender::Female,
            status: LifeStage::Adult,
            position: Position::new(0, 0),
            distance,
        }
    }

    fn empty_perception(mint: &mut IdMint) -> Perception {
        Perception {
            tick: 30,
            hour: 6,
            is_day: true,
            weather: Weather::Sun,
            self_state: SelfState {
                id: mint.mint(),
                name: String::from("Bo"),
                gender: Gender::Male,
                age: 300,
                status: LifeStage::Adult,
                happiness: 50,
                personality: Personality::default(),
                inventory: BTreeMap::new(),
                location: Position::new(0, 0),
                meals_eaten: 0,
                meals_needed: 3,
                starving: false,
                pregnant: false,
                visibility_radius: 5,
            },
            recent_memories: Vec::new(),
            relationships: Vec::new(),
            conversations: Vec::new(),
            spatial_memory: Vec::new(),
            visible_tiles: Vec::new(),
            visible_agents: Vec::new(),
            available_actions: Vec::new(),
        }
    }

    #[test]
    fn nearest_agent_prefers_smallest_distance() {
        let mut mint = IdMint::new(4);
        let mut perception = empty_perception(&mut mint);
        let far = visible(&mut mint, 4);
        let near = visible(&mut mint, 1);
        let near_id = near.id;
        perception.visible_agents = vec![far, near];
        assert_eq!(perception.nearest_agent().unwrap().id, near_id);
    }

    #[test]
    fn no_visible_agents_yields_none() {
        let mut mint = IdMint::new(4);
        let perception = empty_perception(&mut mint);
        assert!(perception.nearest_agent().is_none());
        assert!(perception.tile_at(Position::new(1, 1)).is_none());
    }
}
