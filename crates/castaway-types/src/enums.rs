//! Enumeration types for the Castaway simulation.
//!
//! All closed sets used across the workspace live here: resources, terrain,
//! structure catalog, recipes, lifecycle stages, weather, relationship kinds,
//! memory categories, and event types. Every enum serializes in
//! `snake_case` so the snapshot format and the decision-service schema share
//! one vocabulary.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A resource kind that can sit on a tile or in an inventory.
///
/// The first four kinds occur naturally on tiles and can be gathered. The
/// rest only come out of crafting recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    // --- Natural ---
    /// Berries, roots, and harvested crops. Eaten once per tick when held.
    Food,
    /// Timber from forest tiles.
    Wood,
    /// Loose stone from rocky tiles.
    Stone,
    /// Plant fiber from grass and beach tiles.
    Fiber,

    // --- Crafted ---
    /// Rope twisted from fiber.
    Rope,
    /// Planks split from wood.
    Plank,
    /// A basic stone tool.
    Tool,
}

impl Resource {
    /// All resource kinds, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Food,
        Self::Wood,
        Self::Stone,
        Self::Fiber,
        Self::Rope,
        Self::Plank,
        Self::Tool,
    ];

    /// Whether this resource occurs naturally on tiles.
    pub const fn is_natural(self) -> bool {
        matches!(self, Self::Food | Self::Wood | Self::Stone | Self::Fiber)
    }

    /// Stable lowercase name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Fiber => "fiber",
            Self::Rope => "rope",
            Self::Plank => "plank",
            Self::Tool => "tool",
        }
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Terrain category of a tile, derived from elevation at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// Open water. Never walkable, never hosts crops or structures.
    Water,
    /// Sandy shoreline.
    Beach,
    /// Open grassland. The only terrain that accepts crop fields.
    Grass,
    /// Wooded land.
    Forest,
    /// Rocky highland.
    Rocky,
}

impl Terrain {
    /// Whether agents may stand on this terrain.
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Water)
    }

    /// Stable lowercase name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Beach => "beach",
            Self::Grass => "grass",
            Self::Forest => "forest",
            Self::Rocky => "rocky",
        }
    }
}

// ---------------------------------------------------------------------------
// Structures and recipes
// ---------------------------------------------------------------------------

/// Fixed catalog of structures an agent can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    /// A simple roofed shelter.
    Shelter,
    /// A storage hut.
    Storage,
    /// A campfire ring.
    Campfire,
}

impl StructureType {
    /// All structure types.
    pub const ALL: [Self; 3] = [Self::Shelter, Self::Storage, Self::Campfire];

    /// Stable lowercase name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shelter => "shelter",
            Self::Storage => "storage",
            Self::Campfire => "campfire",
        }
    }
}

/// Fixed catalog of crafting recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipe {
    /// Fiber into rope.
    Rope,
    /// Wood into planks.
    Plank,
    /// Wood, stone, and rope into a tool.
    Tool,
}

impl Recipe {
    /// All recipes.
    pub const ALL: [Self; 3] = [Self::Rope, Self::Plank, Self::Tool];

    /// Stable lowercase name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rope => "rope",
            Self::Plank => "plank",
            Self::Tool => "tool",
        }
    }
}

// ---------------------------------------------------------------------------
// Agent lifecycle
// ---------------------------------------------------------------------------

/// Binary gender of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

/// Lifecycle stage of an agent.
///
/// Ordered: `Child < Adult < Elder`. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    /// Too young for anything but moving and talking.
    Child,
    /// Full action set, can procreate.
    Adult,
    /// Full action set, faces per-tick mortality.
    Elder,
}

impl LifeStage {
    /// Stable lowercase name, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Adult => "adult",
            Self::Elder => "elder",
        }
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Island-wide weather. Binary by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    /// Clear skies.
    #[default]
    Sun,
    /// Rain. Waters every unharvested crop field once per toggle.
    Rain,
}

impl Weather {
    /// The other weather state.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Sun => Self::Rain,
            Self::Rain => Self::Sun,
        }
    }
}

// ---------------------------------------------------------------------------
// Social
// ---------------------------------------------------------------------------

/// Kind of relationship one agent holds toward another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// Default on first contact.
    #[default]
    Trust,
    /// Strongly positive history.
    Friendship,
    /// Strongly negative history.
    Rivalry,
}

/// Interactions that move relationship values and happiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Exchanged a message.
    Communicate,
    /// Gave or received resources.
    Give,
    /// Conceived a child together.
    Procreate,
    /// Suffered a hostile act.
    Hostile,
    /// Went hungry for a full day.
    Starve,
    /// Saw another agent die nearby.
    DeathWitnessed,
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Category tag on an agent's memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    /// A conversation.
    Conversation,
    /// An action the agent performed.
    Action,
    /// Something that happened to the agent.
    Experience,
    /// A birth, pregnancy, or death in the agent's circle.
    Family,
    /// A message injected from outside the world.
    God,
}

/// Category of a spatial memory. Each category is pruned independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "of")]
pub enum SpatialCategory {
    /// A tile with a notable amount of a natural resource.
    Resource(Resource),
    /// A tile hosting a live crop field.
    Crop,
    /// A tile hosting a structure of the given type.
    Structure(StructureType),
}

/// Importance tier used to rank spatial memories.
///
/// Ordered so that `Critical` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceTier {
    /// Nice to know.
    Low,
    /// Useful.
    Medium,
    /// The agent is running short.
    High,
    /// The agent has none.
    Critical,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Closed set of event types recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// An agent moved.
    Move,
    /// An agent spoke to nearby agents.
    Communicate,
    /// An agent crafted an item.
    Craft,
    /// An agent gathered a resource.
    Gather,
    /// An agent built a structure.
    Build,
    /// A pregnancy began.
    Procreate,
    /// An agent gave resources to another.
    Give,
    /// An agent planted a crop field.
    CreateCropField,
    /// An agent harvested a crop field.
    HarvestCrop,
    /// Weather toggled.
    WeatherChange,
    /// A child was born.
    Birth,
    /// An agent died.
    Death,
    /// A dead agent's inventory was dropped as a pile.
    ResourceDrop,
    /// A message injected from outside the simulation.
    GodMessage,
    /// The decision source produced nothing usable for an agent.
    DecisionError,
    /// The decision source was unavailable; local behavior was used.
    DecisionFallback,
    /// An agent moved to the next lifecycle stage.
    StatusChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn life_stage_ordering_is_monotonic() {
        assert!(LifeStage::Child < LifeStage::Adult);
        assert!(LifeStage::Adult < LifeStage::Elder);
    }

    #[test]
    fn importance_tier_ordering() {
        assert!(ImportanceTier::Critical > ImportanceTier::High);
        assert!(ImportanceTier::High > ImportanceTier::Medium);
        assert!(ImportanceTier::Medium > ImportanceTier::Low);
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&EventType::CreateCropField).unwrap_or_default();
        assert_eq!(json, "\"create_crop_field\"");
        let json = serde_json::to_string(&Resource::Food).unwrap_or_default();
        assert_eq!(json, "\"food\"");
    }

    #[test]
    fn resource_as_str_matches_serde() {
        for resource in Resource::ALL {
            let json = serde_json::to_string(&resource).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", resource.as_str()));
        }
    }

    #[test]
    fn weather_toggle_round_trips() {
        assert_eq!(Weather::Sun.toggled(), Weather::Rain);
        assert_eq!(Weather::Sun.toggled().toggled(), Weather::Sun);
    }

    #[test]
    fn only_water_is_unwalkable() {
        assert!(!Terrain::Water.is_walkable());
        assert!(Terrain::Beach.is_walkable());
        assert!(Terrain::Rocky.is_walkable());
    }
}
