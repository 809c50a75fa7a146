//! In-place resolvers for each action.
//!
//! A resolver assumes the call already passed
//! [`validate_call`](super::validation::validate_call) but still checks
//! the structural preconditions it depends on (actor alive, tile present,
//! resources held). Every check runs before the first mutation, so an
//! `Err` always leaves the world exactly as it was. Ids are minted only
//! once an action is certain to succeed.

use std::collections::BTreeMap;

use castaway_types::{
    ActionCall, AgentId, ConversationLine, EventDetails, IdMint, InteractionKind, MemoryCategory,
    Position, Recipe, Resource, StructureType,
};
use castaway_world::{STRUCTURE_DURABILITY, Structure, World, farming};
use tracing::debug;

use crate::config::AgentRules;
use crate::crafting;
use crate::inventory;
use crate::memory::{self, IMPORTANCE_CONVERSATION, IMPORTANCE_GIFT};
use crate::social;

use super::validation::{Skip, living_actor, within_reach};

/// Per-tick inputs every resolver may read.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// The current tick.
    pub tick: u64,
    /// Rule constants.
    pub rules: &'a AgentRules,
}

/// A successfully applied action, ready to be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Event payload describing the mutation.
    pub details: EventDetails,
    /// Every agent involved, actor first.
    pub agents: Vec<AgentId>,
}

impl Outcome {
    fn solo(actor: AgentId, details: EventDetails) -> Self {
        Self {
            details,
            agents: vec![actor],
        }
    }
}

/// Apply `call` for `actor`.
///
/// # Errors
///
/// Returns a [`Skip`] and leaves `world` untouched if the action cannot be
/// applied.
pub fn resolve(
    world: &mut World,
    actor: AgentId,
    call: &ActionCall,
    ctx: &ResolveContext<'_>,
    mint: &mut IdMint,
) -> Result<Outcome, Skip> {
    let outcome = match call {
        ActionCall::Move { to } => resolve_move(world, actor, *to),
        ActionCall::Communicate {
            recipients,
            message,
        } => resolve_communicate(world, actor, recipients, message, ctx),
        ActionCall::Gather { resource, at } => resolve_gather(world, actor, *resource, *at),
        ActionCall::Craft { recipe } => resolve_craft(world, actor, *recipe),
        ActionCall::Build { structure, at } => resolve_build(world, actor, *structure, *at, mint),
        ActionCall::CreateCropField { at } => resolve_plant(world, actor, *at, ctx, mint),
        ActionCall::HarvestCrop { at } => resolve_harvest(world, actor, *at, ctx),
        ActionCall::GiveResource {
            recipient,
            resource,
            quantity,
        } => resolve_give(world, actor, *recipient, *resource, *quantity, ctx),
    }?;
    debug!(tick = ctx.tick, agent_id = %actor, action = call.name(), "action resolved");
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Movement and speech
// ---------------------------------------------------------------------------

fn resolve_move(world: &mut World, actor: AgentId, to: Position) -> Result<Outcome, Skip> {
    living_actor(world, actor)?;
    let agent = world.agent_mut(actor).ok_or(Skip::ActorUnavailable)?;
    let from = agent.location;
    agent.location = to;
    Ok(Outcome::solo(actor, EventDetails::Move { from, to }))
}

/// Deliver a message to every listed recipient that is alive and within
/// the sender's visibility radius. Each pair exchanges relationship credit;
/// each participant gains happiness once.
fn resolve_communicate(
    world: &mut World,
    actor: AgentId,
    recipients: &[AgentId],
    message: &str,
    ctx: &ResolveContext<'_>,
) -> Result<Outcome, Skip> {
    let sender = living_actor(world, actor)?;
    let sender_name = sender.name.clone();

    let mut heard: Vec<AgentId> = Vec::new();
    for &id in recipients {
        if id == actor || heard.contains(&id) {
            continue;
        }
        let in_reach = world
            .agent(id)
            .is_some_and(|r| r.alive && within_reach(sender, r.location).is_ok());
        if in_reach {
            heard.push(id);
        }
    }
    if heard.is_empty() {
        return Err(Skip::NoRecipients);
    }

    let rules = ctx.rules;
    let line = ConversationLine {
        tick: ctx.tick,
        speaker: actor,
        message: String::from(message),
    };
    let mut participants = vec![actor];
    participants.extend(heard.iter().copied());

    for &id in &heard {
        if let Some((s, r)) = world.agent_pair_mut(actor, id) {
            social::update_relationship(s, id, InteractionKind::Communicate);
            social::update_relationship(r, actor, InteractionKind::Communicate);
            memory::record_line(s, id, line.clone(), rules.conversation_limit);
            memory::record_line(r, actor, line.clone(), rules.conversation_limit);
            social::update_happiness(r, InteractionKind::Communicate);
            memory::remember(
                r,
                ctx.tick,
                MemoryCategory::Conversation,
                format!("{sender_name} said: {message}"),
                IMPORTANCE_CONVERSATION,
                participants.clone(),
                rules.memory_limit,
            );
        }
    }

    if let Some(s) = world.agent_mut(actor) {
        social::update_happiness(s, InteractionKind::Communicate);
        memory::remember(
            s,
            ctx.tick,
            MemoryCategory::Conversation,
            format!("Said: {message}"),
            IMPORTANCE_CONVERSATION,
            participants.clone(),
            rules.memory_limit,
        );
    }

    Ok(Outcome {
        details: EventDetails::Communicate {
            message: String::from(message),
            recipients: heard,
        },
        agents: participants,
    })
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Take one unit from the tile, or from a dropped pile on it if the tile
/// itself is exhausted.
fn resolve_gather(world: &mut World, actor: AgentId, resource: Resource, at: Position) -> Result<Outcome, Skip> {
    if !resource.is_natural() {
        return Err(Skip::NotGatherable(resource));
    }
    let agent = living_actor(world, actor)?;
    if agent.count(resource) == u32::MAX {
        return Err(Skip::Overflow { resource });
    }

    let tile = world.tile_mut(at).ok_or(Skip::OutOfBounds(at))?;
    let from_pile = if tile.take_resource(resource) {
        false
    } else if world.take_from_pile(at, resource) {
        true
    } else {
        return Err(Skip::NothingToGather);
    };

    let agent = world.agent_mut(actor).ok_or(Skip::ActorUnavailable)?;
    inventory::add_resource(&mut agent.inventory, resource, 1)?;
    Ok(Outcome::solo(
        actor,
        EventDetails::Gather {
            resource,
            at,
            from_pile,
        },
    ))
}

fn resolve_craft(world: &mut World, actor: AgentId, recipe: Recipe) -> Result<Outcome, Skip> {
    living_actor(world, actor)?;
    let agent = world.agent_mut(actor).ok_or(Skip::ActorUnavailable)?;
    let table = crafting::recipe_for(recipe);
    inventory::exchange(&mut agent.inventory, table.inputs, table.outputs)?;
    let produced: BTreeMap<Resource, u32> = table.outputs.iter().copied().collect();
    Ok(Outcome::solo(actor, EventDetails::Craft { recipe, produced }))
}

fn resolve_build(
    world: &mut World,
    actor: AgentId,
    structure: StructureType,
    at: Position,
    mint: &mut IdMint,
) -> Result<Outcome, Skip> {
    living_actor(world, actor)?;
    if !world.tile(at).ok_or(Skip::OutOfBounds(at))?.can_build() {
        return Err(Skip::Occupied);
    }

    let agent = world.agent_mut(actor).ok_or(Skip::ActorUnavailable)?;
    inventory::exchange(&mut agent.inventory, crafting::build_cost(structure), &[])?;

    let structure_id = mint.mint();
    if let Some(tile) = world.tile_mut(at) {
        tile.structure = Some(Structure {
            id: structure_id,
            kind: structure,
            position: at,
            durability: STRUCTURE_DURABILITY,
            builder: actor,
        });
    }
    Ok(Outcome::solo(
        actor,
        EventDetails::Build {
            structure_id,
            structure,
            at,
        },
    ))
}

// ---------------------------------------------------------------------------
// Farming
// ---------------------------------------------------------------------------

fn resolve_plant(
    world: &mut World,
    actor: AgentId,
    at: Position,
    ctx: &ResolveContext<'_>,
    mint: &mut IdMint,
) -> Result<Outcome, Skip> {
    living_actor(world, actor)?;
    let plantable = world.tile(at).ok_or(Skip::OutOfBounds(at))?.can_plant();
    if !plantable || ctx.tick.checked_add(ctx.rules.crop_growth_time).is_none() {
        return Err(Skip::NotPlantable);
    }

    let field_id = mint.mint();
    let mature_tick = farming::plant(world, at, field_id, ctx.tick, ctx.rules.crop_growth_time)
        .ok_or(Skip::NotPlantable)?;
    Ok(Outcome::solo(
        actor,
        EventDetails::CreateCropField {
            field_id,
            at,
            mature_tick,
        },
    ))
}

fn resolve_harvest(
    world: &mut World,
    actor: AgentId,
    at: Position,
    ctx: &ResolveContext<'_>,
) -> Result<Outcome, Skip> {
    let food = ctx.rules.harvest_yield;
    let agent = living_actor(world, actor)?;
    if agent.count(Resource::Food).checked_add(food).is_none() {
        return Err(Skip::Overflow {
            resource: Resource::Food,
        });
    }

    let field_id = farming::harvest(world, at, ctx.tick, ctx.rules.crop_watering_required)
        .ok_or(Skip::CropNotReady)?;
    let agent = world.agent_mut(actor).ok_or(Skip::ActorUnavailable)?;
    inventory::add_resource(&mut agent.inventory, Resource::Food, food)?;
    Ok(Outcome::solo(
        actor,
        EventDetails::HarvestCrop { field_id, at, food },
    ))
}

// ---------------------------------------------------------------------------
// Giving
// ---------------------------------------------------------------------------

fn resolve_give(
    world: &mut World,
    actor: AgentId,
    recipient: AgentId,
    resource: Resource,
    quantity: u32,
    ctx: &ResolveContext<'_>,
) -> Result<Outcome, Skip> {
    if quantity == 0 {
        return Err(Skip::EmptyTransfer);
    }
    let (giver, taker) = world
        .agent_pair_mut(actor, recipient)
        .ok_or(Skip::InvalidRecipient)?;
    if !giver.alive {
        return Err(Skip::ActorUnavailable);
    }
    if !taker.alive {
        return Err(Skip::InvalidRecipient);
    }
    if taker.count(resource).checked_add(quantity).is_none() {
        return Err(Skip::Overflow { resource });
    }

    inventory::remove_resource(&mut giver.inventory, resource, quantity)?;
    inventory::add_resource(&mut taker.inventory, resource, quantity)?;
    social::mutual_interaction(giver, taker, InteractionKind::Give);

    let limit = ctx.rules.memory_limit;
    let participants = vec![actor, recipient];
    let gave = format!("Gave {quantity} {resource} to {}", taker.name);
    let got = format!("Received {quantity} {resource} from {}", giver.name);
    memory::remember(giver, ctx.tick, MemoryCategory::Action, gave, IMPORTANCE_GIFT, participants.clone(), limit);
    memory::remember(taker, ctx.tick, MemoryCategory::Action, got, IMPORTANCE_GIFT, participants.clone(), limit);

    Ok(Outcome {
        details: EventDetails::Give {
            resource,
            quantity,
            from: actor,
            to: recipient,
        },
        agents: participants,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use castaway_types::{Gender, Terrain};

    use super::*;
    use crate::testing;

    struct Fixture {
        world: World,
        mint: IdMint,
        rules: AgentRules,
        actor: AgentId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut mint = IdMint::new(0);
            let mut world = testing::grass_world(12, 12);
            let agent = testing::adult(&mut mint, Gender::Female, Position::new(3, 3));
            let actor = agent.id;
            world.add_agent(agent);
            Self {
                world,
                mint,
                rules: AgentRules::default(),
                actor,
            }
        }

        fn add(&mut self, gender: Gender, at: Position) -> AgentId {
            let agent = testing::adult(&mut self.mint, gender, at);
            let id = agent.id;
            self.world.add_agent(agent);
            id
        }

        fn run(&mut self, call: &ActionCall, tick: u64) -> Result<Outcome, Skip> {
            let ctx = ResolveContext {
                tick,
                rules: &self.rules,
            };
            resolve(&mut self.world, self.actor, call, &ctx, &mut self.mint)
        }

        fn actor(&self) -> &castaway_types::Agent {
            self.world.agent(self.actor).unwrap()
        }
    }

    #[test]
    fn move_relocates() {
        let mut fx = Fixture::new();
        let out = fx
            .run(&ActionCall::Move { to: Position::new(4, 3) }, 0)
            .unwrap();
        assert_eq!(fx.actor().location, Position::new(4, 3));
        assert!(matches!(out.details, EventDetails::Move { from, .. } if from == Position::new(3, 3)));
    }

    #[test]
    fn communicate_reaches_only_nearby() {
        let mut fx = Fixture::new();
        let near = fx.add(Gender::Male, Position::new(5, 3));
        let far = fx.add(Gender::Male, Position::new(11, 11));
        let call = ActionCall::Communicate {
            recipients: vec![near, far],
            message: String::from("hello"),
        };
        let out = fx.run(&call, 4).unwrap();
        assert_eq!(out.agents, vec![fx.actor, near]);

        let sender = fx.actor();
        assert_eq!(sender.happiness, 52);
        assert_eq!(sender.relationships.get(&near).unwrap().value, 2);
        assert_eq!(sender.conversations.get(&near).unwrap().len(), 1);
        assert_eq!(sender.memories.len(), 1);

        let listener = fx.world.agent(near).unwrap();
        assert_eq!(listener.happiness, 52);
        assert_eq!(listener.relationships.get(&fx.actor).unwrap().value, 2);
        assert_eq!(listener.conversations.get(&fx.actor).unwrap().len(), 1);
        assert!(fx.world.agent(far).unwrap().memories.is_empty());
    }

    #[test]
    fn communicate_to_nobody_is_a_noop() {
        let mut fx = Fixture::new();
        let far = fx.add(Gender::Male, Position::new(11, 11));
        let before = fx.world.clone();
        let call = ActionCall::Communicate {
            recipients: vec![far],
            message: String::from("anyone?"),
        };
        assert_eq!(fx.run(&call, 0), Err(Skip::NoRecipients));
        assert_eq!(fx.world, before);
    }

    #[test]
    fn gather_drains_tile_then_pile() {
        let mut fx = Fixture::new();
        let at = Position::new(3, 4);
        fx.world.tile_mut(at).unwrap().set_resource(Resource::Fiber, 1);
        fx.world.drop_pile(at, BTreeMap::from([(Resource::Fiber, 1)]), 0);
        let call = ActionCall::Gather {
            resource: Resource::Fiber,
            at,
        };

        let first = fx.run(&call, 1).unwrap();
        assert!(matches!(first.details, EventDetails::Gather { from_pile: false, .. }));
        assert!(!fx.world.tile(at).unwrap().resources.contains_key(&Resource::Fiber));

        let second = fx.run(&call, 2).unwrap();
        assert!(matches!(second.details, EventDetails::Gather { from_pile: true, .. }));
        assert_eq!(fx.actor().count(Resource::Fiber), 2);

        let before = fx.world.clone();
        assert_eq!(fx.run(&call, 3), Err(Skip::NothingToGather));
        assert_eq!(fx.world, before);
    }

    #[test]
    fn craft_without_inputs_changes_nothing() {
        let mut fx = Fixture::new();
        let before = fx.world.clone();
        let call = ActionCall::Craft {
            recipe: Recipe::Tool,
        };
        assert!(matches!(fx.run(&call, 0), Err(Skip::Insufficient { .. })));
        assert_eq!(fx.world, before);
    }

    #[test]
    fn craft_rope() {
        let mut fx = Fixture::new();
        let actor = fx.actor;
        fx.world.agent_mut(actor).unwrap().inventory.insert(Resource::Fiber, 3);
        fx.run(&ActionCall::Craft { recipe: Recipe::Rope }, 0).unwrap();
        assert_eq!(fx.actor().count(Resource::Fiber), 1);
        assert_eq!(fx.actor().count(Resource::Rope), 1);
    }

    #[test]
    fn build_places_structure_once() {
        let mut fx = Fixture::new();
        let actor = fx.actor;
        let inv = &mut fx.world.agent_mut(actor).unwrap().inventory;
        inv.insert(Resource::Wood, 8);
        inv.insert(Resource::Fiber, 4);
        let at = Position::new(3, 3);
        let call = ActionCall::Build {
            structure: StructureType::Shelter,
            at,
        };
        fx.run(&call, 0).unwrap();
        let placed = fx.world.tile(at).unwrap().structure.as_ref().unwrap();
        assert_eq!(placed.kind, StructureType::Shelter);
        assert_eq!(placed.builder, actor);
        assert_eq!(fx.actor().count(Resource::Wood), 4);

        let issued = fx.mint.issued();
        assert_eq!(fx.run(&call, 1), Err(Skip::Occupied));
        assert_eq!(fx.actor().count(Resource::Wood), 4);
        assert_eq!(fx.mint.issued(), issued);
    }

    #[test]
    fn crop_lifecycle() {
        let mut fx = Fixture::new();
        let at = Position::new(3, 3);
        let out = fx.run(&ActionCall::CreateCropField { at }, 10).unwrap();
        assert!(matches!(out.details, EventDetails::CreateCropField { mature_tick: 82, .. }));
        assert_eq!(fx.run(&ActionCall::CreateCropField { at }, 11), Err(Skip::NotPlantable));

        fx.world.tile_mut(at).unwrap().crop.as_mut().unwrap().watered = 3;
        assert_eq!(fx.run(&ActionCall::HarvestCrop { at }, 81), Err(Skip::CropNotReady));
        assert_eq!(fx.actor().count(Resource::Food), 0);

        fx.run(&ActionCall::HarvestCrop { at }, 82).unwrap();
        assert_eq!(fx.actor().count(Resource::Food), 5);
        assert!(fx.world.tile(at).unwrap().crop.as_ref().unwrap().harvested);
        assert_eq!(fx.run(&ActionCall::HarvestCrop { at }, 83), Err(Skip::CropNotReady));
    }

    #[test]
    fn cannot_plant_off_grass() {
        let mut fx = Fixture::new();
        let at = Position::new(4, 4);
        fx.world.tile_mut(at).unwrap().terrain = Terrain::Forest;
        let issued = fx.mint.issued();
        assert_eq!(fx.run(&ActionCall::CreateCropField { at }, 0), Err(Skip::NotPlantable));
        assert_eq!(fx.mint.issued(), issued);
    }

    #[test]
    fn give_is_atomic_and_mutual() {
        let mut fx = Fixture::new();
        let other = fx.add(Gender::Male, Position::new(3, 3));
        let actor = fx.actor;
        fx.world.agent_mut(actor).unwrap().inventory.insert(Resource::Food, 2);

        let too_much = ActionCall::GiveResource {
            recipient: other,
            resource: Resource::Food,
            quantity: 3,
        };
        let before = fx.world.clone();
        assert!(matches!(fx.run(&too_much, 0), Err(Skip::Insufficient { .. })));
        assert_eq!(fx.world, before);

        let call = ActionCall::GiveResource {
            recipient: other,
            resource: Resource::Food,
            quantity: 2,
        };
        fx.run(&call, 1).unwrap();
        assert_eq!(fx.actor().count(Resource::Food), 0);
        let taker = fx.world.agent(other).unwrap();
        assert_eq!(taker.count(Resource::Food), 2);
        assert_eq!(taker.happiness, 53);
        assert_eq!(taker.relationships.get(&actor).unwrap().value, 3);
        assert_eq!(fx.actor().relationships.get(&other).unwrap().value, 3);
    }
}
