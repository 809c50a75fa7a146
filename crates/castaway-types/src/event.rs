//! Immutable event records forming the simulation's causal chain.
//!
//! Every world mutation is described by exactly one [`Event`]. Events are
//! built by the engine, handed to the event log once, and never modified
//! after that. The `parent_event_id` field links each event to the one
//! appended before it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{EventType, Gender, LifeStage, Recipe, Resource, StructureType, Weather};
use crate::ids::{AgentId, CropFieldId, EventId, StructureId};
use crate::structs::Position;

/// Why an agent died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathReason {
    /// Two consecutive under-fed days.
    Starvation,
    /// Elder mortality roll.
    OldAge,
}

impl core::fmt::Display for DeathReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Starvation => write!(f, "starvation"),
            Self::OldAge => write!(f, "old_age"),
        }
    }
}

/// Typed payload of an event, one variant per [`EventType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventDetails {
    /// An agent moved.
    Move {
        /// Origin tile.
        from: Position,
        /// Destination tile.
        to: Position,
    },
    /// An agent spoke.
    Communicate {
        /// The message.
        message: String,
        /// Listeners that were in range.
        recipients: Vec<AgentId>,
    },
    /// An agent crafted.
    Craft {
        /// Recipe used.
        recipe: Recipe,
        /// Products added to the inventory.
        produced: BTreeMap<Resource, u32>,
    },
    /// An agent gathered one unit.
    Gather {
        /// Resource taken.
        resource: Resource,
        /// Tile it came from.
        at: Position,
        /// Whether it came from a dropped pile rather than the tile itself.
        from_pile: bool,
    },
    /// An agent built a structure.
    Build {
        /// The new structure.
        structure_id: StructureId,
        /// Its type.
        structure: StructureType,
        /// Its tile.
        at: Position,
    },
    /// A pregnancy began.
    Procreate {
        /// The mother.
        mother: AgentId,
        /// The father.
        father: AgentId,
        /// Tick at which the child is due.
        due_tick: u64,
    },
    /// Resources changed hands.
    Give {
        /// Resource given.
        resource: Resource,
        /// Amount given.
        quantity: u32,
        /// Giver.
        from: AgentId,
        /// Receiver.
        to: AgentId,
    },
    /// A crop field was planted.
    CreateCropField {
        /// The new field.
        field_id: CropFieldId,
        /// Its tile.
        at: Position,
        /// Earliest harvest tick.
        mature_tick: u64,
    },
    /// A crop field was harvested.
    HarvestCrop {
        /// The field.
        field_id: CropFieldId,
        /// Its tile.
        at: Position,
        /// Food granted.
        food: u32,
    },
    /// Weather toggled.
    WeatherChange {
        /// Previous weather.
        from: Weather,
        /// New weather.
        to: Weather,
        /// Number of fields watered by this change.
        fields_watered: u32,
    },
    /// A child was born.
    Birth {
        /// The mother.
        mother: AgentId,
        /// The father.
        father: AgentId,
        /// The newborn.
        child: AgentId,
        /// Newborn's name.
        name: String,
        /// Newborn's gender.
        gender: Gender,
    },
    /// An agent died.
    Death {
        /// Cause of death.
        reason: DeathReason,
        /// Age at death.
        age: u64,
        /// Where the body lies.
        at: Position,
    },
    /// A dead agent's belongings were dropped.
    ResourceDrop {
        /// Where the pile lies.
        at: Position,
        /// What it holds.
        items: BTreeMap<Resource, u32>,
    },
    /// An external message reached the agents.
    GodMessage {
        /// The message.
        message: String,
        /// Who received it.
        recipients: Vec<AgentId>,
    },
    /// The decision source produced nothing usable.
    DecisionError {
        /// Why.
        reason: String,
    },
    /// The decision source was unavailable; local behavior was used.
    DecisionFallback {
        /// Why.
        reason: String,
    },
    /// An agent reached the next lifecycle stage.
    StatusChange {
        /// Previous stage.
        from: LifeStage,
        /// New stage.
        to: LifeStage,
    },
}

impl EventDetails {
    /// The event type this payload belongs to.
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::Move { .. } => EventType::Move,
            Self::Communicate { .. } => EventType::Communicate,
            Self::Craft { .. } => EventType::Craft,
            Self::Gather { .. } => EventType::Gather,
            Self::Build { .. } => EventType::Build,
            Self::Procreate { .. } => EventType::Procreate,
            Self::Give { .. } => EventType::Give,
            Self::CreateCropField { .. } => EventType::CreateCropField,
            Self::HarvestCrop { .. } => EventType::HarvestCrop,
            Self::WeatherChange { .. } => EventType::WeatherChange,
            Self::Birth { .. } => EventType::Birth,
            Self::Death { .. } => EventType::Death,
            Self::ResourceDrop { .. } => EventType::ResourceDrop,
            Self::GodMessage { .. } => EventType::GodMessage,
            Self::DecisionError { .. } => EventType::DecisionError,
            Self::DecisionFallback { .. } => EventType::DecisionFallback,
            Self::StatusChange { .. } => EventType::StatusChange,
        }
    }
}

/// An immutable entry in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: EventId,
    /// Event type, always equal to `details.event_type()`.
    pub event_type: EventType,
    /// Tick at which the event happened.
    pub tick: u64,
    /// Agents involved, actor first.
    pub agents: Vec<AgentId>,
    /// Typed payload.
    pub details: EventDetails,
    /// The event this one follows. `None` only for the genesis event,
    /// or before the log assigns it.
    pub parent_event_id: Option<EventId>,
}

impl Event {
    /// Build an event with no parent assigned yet.
    pub const fn new(id: EventId, tick: u64, agents: Vec<AgentId>, details: EventDetails) -> Self {
        Self {
            id,
            event_type: details.event_type(),
            tick,
            agents,
            details,
            parent_event_id: None,
        }
    }

    /// Override the parent link.
    #[must_use]
    pub fn with_parent(mut self, parent: EventId) -> Self {
        self.parent_event_id = Some(parent);
        self
    }
}
