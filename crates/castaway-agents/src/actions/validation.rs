//! Pre-dispatch validation of decided actions.
//!
//! The checks run in a fixed order:
//! 1. Actor: does the actor exist and is it alive?
//! 2. Stage: may the actor's lifecycle stage use this action?
//! 3. Spatial: bounds, terrain, movement allowance, interaction reach.
//! 4. Resources: does the actor hold what the action consumes?
//! 5. Tile state: is there something to gather, room to build, a crop to
//!    harvest?
//!
//! A failure yields a [`Skip`]. Skips are expected and frequent: the tick
//! engine drops the action without an event.

use castaway_types::{ActionCall, Agent, AgentId, Position, Resource};
use castaway_world::World;

use crate::config::AgentRules;
use crate::crafting;
use crate::error::AgentError;
use crate::inventory;

/// Why an action was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Skip {
    /// The acting agent is missing or dead.
    #[error("actor is missing or dead")]
    ActorUnavailable,

    /// Children may only move and communicate.
    #[error("action is not available to children")]
    ChildRestricted,

    /// Target coordinate is off the map.
    #[error("{0} is outside the map")]
    OutOfBounds(Position),

    /// Target tile is water.
    #[error("{0} is not walkable")]
    Unwalkable(Position),

    /// A move to the tile the actor already stands on.
    #[error("move target is the current tile")]
    NoMovement,

    /// A move further than the per-tick allowance.
    #[error("move of {distance} exceeds allowance {allowed}")]
    TooFar {
        /// Chebyshev distance requested.
        distance: u32,
        /// Configured allowance.
        allowed: u32,
    },

    /// Interaction target beyond the actor's visibility radius.
    #[error("target is {distance} away, beyond visibility {radius}")]
    OutOfReach {
        /// Chebyshev distance to the target.
        distance: u32,
        /// Actor's visibility radius.
        radius: u32,
    },

    /// Recipient is missing, dead, or the actor itself.
    #[error("recipient is missing, dead, or the actor")]
    InvalidRecipient,

    /// No listed recipient is alive and within reach.
    #[error("no recipient within reach")]
    NoRecipients,

    /// Message is blank.
    #[error("message is empty")]
    EmptyMessage,

    /// The actor lacks a required resource.
    #[error("insufficient {resource}")]
    Insufficient {
        /// First resource found short.
        resource: Resource,
    },

    /// Receiving inventory would overflow.
    #[error("{resource} count would overflow")]
    Overflow {
        /// Resource that would overflow.
        resource: Resource,
    },

    /// Crafted goods cannot be gathered.
    #[error("{0} cannot be gathered")]
    NotGatherable(Resource),

    /// Neither the tile nor a pile on it holds the resource.
    #[error("nothing to gather")]
    NothingToGather,

    /// The tile already has a structure or is water.
    #[error("tile cannot be built on")]
    Occupied,

    /// The tile is not grass or already hosts a live field.
    #[error("tile cannot be planted")]
    NotPlantable,

    /// No live field, or the field is immature or under-watered.
    #[error("no crop ready for harvest")]
    CropNotReady,

    /// A give of zero units.
    #[error("nothing to give")]
    EmptyTransfer,
}

impl From<AgentError> for Skip {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::InsufficientResource { resource, .. } => Self::Insufficient { resource },
            AgentError::InventoryOverflow { resource, .. } => Self::Overflow { resource },
        }
    }
}

/// The living actor, or [`Skip::ActorUnavailable`].
pub fn living_actor(world: &World, actor: AgentId) -> Result<&Agent, Skip> {
    world
        .agent(actor)
        .filter(|a| a.alive)
        .ok_or(Skip::ActorUnavailable)
}

/// Ensure `target` is within the actor's visibility radius.
pub const fn within_reach(agent: &Agent, target: Position) -> Result<(), Skip> {
    let distance = agent.location.chebyshev(target);
    if distance > agent.visibility_radius {
        return Err(Skip::OutOfReach {
            distance,
            radius: agent.visibility_radius,
        });
    }
    Ok(())
}

/// First resource in `bundle` the agent holds too little of.
fn require(agent: &Agent, bundle: &[(Resource, u32)]) -> Result<(), Skip> {
    match bundle
        .iter()
        .find(|&&(resource, amount)| !inventory::has_resource(&agent.inventory, resource, amount))
    {
        Some(&(resource, _)) => Err(Skip::Insufficient { resource }),
        None => Ok(()),
    }
}

/// Validate `call` for `actor` against the current world.
///
/// Returns `Ok(())` if the action can be resolved this tick.
pub fn validate_call(
    world: &World,
    actor: AgentId,
    call: &ActionCall,
    tick: u64,
    rules: &AgentRules,
) -> Result<(), Skip> {
    let agent = living_actor(world, actor)?;

    if !agent.is_grown() && !call.allowed_for_child() {
        return Err(Skip::ChildRestricted);
    }

    match call {
        ActionCall::Move { to } => validate_move(world, agent, *to, rules.move_distance),
        ActionCall::Communicate {
            recipients,
            message,
        } => {
            if message.trim().is_empty() {
                return Err(Skip::EmptyMessage);
            }
            let any_in_reach = recipients.iter().any(|&id| {
                id != actor
                    && world
                        .agent(id)
                        .is_some_and(|r| r.alive && within_reach(agent, r.location).is_ok())
            });
            if any_in_reach { Ok(()) } else { Err(Skip::NoRecipients) }
        }
        ActionCall::Gather { resource, at } => {
            if !resource.is_natural() {
                return Err(Skip::NotGatherable(*resource));
            }
            within_reach(agent, *at)?;
            let tile = world.tile(*at).ok_or(Skip::OutOfBounds(*at))?;
            let on_tile = tile.resource(*resource) > 0;
            let in_pile = world.pile_contents(*at).get(resource).is_some_and(|&n| n > 0);
            if !on_tile && !in_pile {
                return Err(Skip::NothingToGather);
            }
            Ok(())
        }
        ActionCall::Craft { recipe } => require(agent, crafting::recipe_for(*recipe).inputs),
        ActionCall::Build { structure, at } => {
            within_reach(agent, *at)?;
            let tile = world.tile(*at).ok_or(Skip::OutOfBounds(*at))?;
            if !tile.can_build() {
                return Err(Skip::Occupied);
            }
            require(agent, crafting::build_cost(*structure))
        }
        ActionCall::CreateCropField { at } => {
            within_reach(agent, *at)?;
            let tile = world.tile(*at).ok_or(Skip::OutOfBounds(*at))?;
            if tile.can_plant() { Ok(()) } else { Err(Skip::NotPlantable) }
        }
        ActionCall::HarvestCrop { at } => {
            within_reach(agent, *at)?;
            let tile = world.tile(*at).ok_or(Skip::OutOfBounds(*at))?;
            let ready = tile
                .live_crop()
                .is_some_and(|c| c.is_ready(tick, rules.crop_watering_required));
            if ready { Ok(()) } else { Err(Skip::CropNotReady) }
        }
        ActionCall::GiveResource {
            recipient,
            resource,
            quantity,
        } => {
            if *quantity == 0 {
                return Err(Skip::EmptyTransfer);
            }
            if *recipient == actor {
                return Err(Skip::InvalidRecipient);
            }
            let other = world
                .agent(*recipient)
                .filter(|r| r.alive)
                .ok_or(Skip::InvalidRecipient)?;
            within_reach(agent, other.location)?;
            require(agent, &[(*resource, *quantity)])
        }
    }
}

fn validate_move(world: &World, agent: &Agent, to: Position, allowed: u32) -> Result<(), Skip> {
    if !world.in_bounds(to) {
        return Err(Skip::OutOfBounds(to));
    }
    if !world.is_walkable(to) {
        return Err(Skip::Unwalkable(to));
    }
    let distance = agent.location.chebyshev(to);
    if distance == 0 {
        return Err(Skip::NoMovement);
    }
    if distance > allowed {
        return Err(Skip::TooFar { distance, allowed });
    }
    Ok(())
}
