//! Action types exchanged between the decision source and the engine.
//!
//! A decision source answers with zero or more [`DecidedCall`]s. Known calls
//! carry a strongly typed [`ActionCall`]; names the engine does not
//! recognize survive as [`DecidedCall::Unknown`] so they can be logged
//! instead of silently disappearing.

use serde::{Deserialize, Serialize};

use crate::enums::{EventType, Recipe, Resource, StructureType};
use crate::ids::AgentId;
use crate::structs::Position;

/// A validated-shape action request for one agent.
///
/// Shape validation (types, required fields) happens at parse time.
/// Spatial and resource validation happens in the engine before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionCall {
    /// Step to a nearby tile.
    Move {
        /// Destination tile.
        to: Position,
    },
    /// Speak to agents within sight.
    Communicate {
        /// Intended listeners. Out-of-range listeners are ignored.
        recipients: Vec<AgentId>,
        /// What to say.
        message: String,
    },
    /// Take one unit of a resource from a tile.
    Gather {
        /// Which resource.
        resource: Resource,
        /// Which tile.
        at: Position,
    },
    /// Turn ingredients into a product.
    Craft {
        /// Which recipe.
        recipe: Recipe,
    },
    /// Put up a structure on a tile.
    Build {
        /// What to build.
        structure: StructureType,
        /// Where to build it.
        at: Position,
    },
    /// Plant a crop field on a grass tile.
    CreateCropField {
        /// Where to plant.
        at: Position,
    },
    /// Harvest a mature, watered crop field.
    HarvestCrop {
        /// Which field.
        at: Position,
    },
    /// Hand resources to another agent.
    GiveResource {
        /// Who receives.
        recipient: AgentId,
        /// What to give.
        resource: Resource,
        /// How many.
        quantity: u32,
    },
}

impl ActionCall {
    /// Tool name, identical to the serialized tag.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::Communicate { .. } => "communicate",
            Self::Gather { .. } => "gather",
            Self::Craft { .. } => "craft",
            Self::Build { .. } => "build",
            Self::CreateCropField { .. } => "create_crop_field",
            Self::HarvestCrop { .. } => "harvest_crop",
            Self::GiveResource { .. } => "give_resource",
        }
    }

    /// The event type logged when this action succeeds.
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::Move { .. } => EventType::Move,
            Self::Communicate { .. } => EventType::Communicate,
            Self::Gather { .. } => EventType::Gather,
            Self::Craft { .. } => EventType::Craft,
            Self::Build { .. } => EventType::Build,
            Self::CreateCropField { .. } => EventType::CreateCropField,
            Self::HarvestCrop { .. } => EventType::HarvestCrop,
            Self::GiveResource { .. } => EventType::Give,
        }
    }

    /// Whether a child may perform this action.
    pub const fn allowed_for_child(&self) -> bool {
        matches!(self, Self::Move { .. } | Self::Communicate { .. })
    }
}

/// One call returned by a decision source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecidedCall {
    /// A recognized action with typed arguments.
    Known(ActionCall),
    /// A structurally valid call naming an action the engine does not know.
    Unknown {
        /// The name the decision source used.
        name: String,
    },
}
