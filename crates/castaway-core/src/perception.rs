//! Perception assembly for the action dispatch phase.
//!
//! Before an agent decides, the engine refreshes its spatial memory from
//! the tiles it can see ([`observe`]) and then builds a bounded
//! [`Perception`] ([`assemble`]). The perception is a detached copy: it
//! never borrows the world, so it can cross into a decision source task.
//!
//! Agents see every tile within their visibility radius (Chebyshev). What
//! they remember beyond that comes from spatial memory, which is pruned
//! per category.

use std::collections::BTreeMap;

use castaway_agents::{AgentRules, memory, spatial};
use castaway_types::{
    Agent, AgentId, ConversationExcerpt, KnownAgent, LifeStage, Perception, Resource, SelfState,
    VisibleAgent, VisibleCrop, VisibleTile,
};
use castaway_world::{Tile, World, clock};

/// Memories included in a perception.
pub const RECENT_MEMORIES: usize = 10;

/// Relationships included, strongest first.
pub const TOP_RELATIONSHIPS: usize = 8;

/// Conversation partners included, most recent first.
pub const CONVERSATION_PARTNERS: usize = 4;

/// Lines per conversation partner.
pub const CONVERSATION_LINES: usize = 5;

/// Actions open to children.
const CHILD_ACTIONS: [&str; 2] = ["move", "communicate"];

/// Actions open to adults and elders.
const GROWN_ACTIONS: [&str; 8] = [
    "move",
    "communicate",
    "gather",
    "craft",
    "build",
    "create_crop_field",
    "harvest_crop",
    "give_resource",
];

/// Action names available to an agent at `status`.
pub fn available_actions(status: LifeStage) -> Vec<String> {
    let names: &[&str] = if status == LifeStage::Child {
        &CHILD_ACTIONS
    } else {
        &GROWN_ACTIONS
    };
    names.iter().map(|&n| String::from(n)).collect()
}

/// Refresh an agent's spatial memory from the tiles currently in view.
///
/// Does nothing for missing or dead agents.
pub fn observe(world: &mut World, agent_id: AgentId, rules: &AgentRules) {
    let Some(agent) = world.agent(agent_id).filter(|a| a.alive) else {
        return;
    };
    let visible: Vec<Tile> = world
        .tiles_within(agent.location, agent.visibility_radius)
        .cloned()
        .collect();
    let tick = world.tick;
    if let Some(agent) = world.agent_mut(agent_id) {
        spatial::perceive(
            agent,
            visible.iter(),
            tick,
            rules.spatial_dedup_radius,
            rules.spatial_top_n,
        );
    }
}

/// Build the perception handed to a decision source.
///
/// Returns `None` if the agent is missing or dead.
pub fn assemble(world: &World, agent_id: AgentId, rules: &AgentRules) -> Option<Perception> {
    let agent = world.agent(agent_id).filter(|a| a.alive)?;
    let tick = world.tick;

    let visible_tiles = world
        .tiles_within(agent.location, agent.visibility_radius)
        .map(|tile| visible_tile(world, tile, rules))
        .collect();

    let mut visible_agents: Vec<VisibleAgent> = world
        .agents_within(agent.location, agent.visibility_radius)
        .filter(|other| other.id != agent.id)
        .map(|other| VisibleAgent {
            id: other.id,
            name: other.name.clone(),
            gender: other.gender,
            status: other.status,
            position: other.location,
            distance: agent.location.chebyshev(other.location),
        })
        .collect();
    visible_agents.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.id.cmp(&b.id)));

    Some(Perception {
        tick,
        hour: clock::hour_of(tick),
        is_day: world.is_day,
        weather: world.weather,
        self_state: self_state(agent, rules),
        recent_memories: memory::recent(agent, RECENT_MEMORIES).to_vec(),
        relationships: relationships(world, agent),
        conversations: conversations(world, agent),
        spatial_memory: spatial::ranked(agent),
        visible_tiles,
        visible_agents,
        available_actions: available_actions(agent.status),
    })
}

fn self_state(agent: &Agent, rules: &AgentRules) -> SelfState {
    SelfState {
        id: agent.id,
        name: agent.name.clone(),
        gender: agent.gender,
        age: agent.age,
        status: agent.status,
        happiness: agent.happiness,
        personality: agent.personality,
        inventory: non_zero(&agent.inventory),
        location: agent.location,
        meals_eaten: agent.meals_eaten,
        meals_needed: rules.meals_per_day,
        starving: agent.starving,
        pregnant: agent.pregnancy.is_some(),
        visibility_radius: agent.visibility_radius,
    }
}

fn visible_tile(world: &World, tile: &Tile, rules: &AgentRules) -> VisibleTile {
    VisibleTile {
        position: tile.position,
        terrain: tile.terrain,
        resources: non_zero(&tile.resources),
        crop: tile.live_crop().map(|field| VisibleCrop {
            watered: field.watered,
            mature_tick: field.mature_tick,
            ready: field.is_ready(world.tick, rules.crop_watering_required),
        }),
        structure: tile.structure.as_ref().map(|s| s.kind),
        dropped: world.pile_contents(tile.position),
    }
}

/// Name of a living agent, `None` for the dead and the removed.
fn living_name(world: &World, id: AgentId) -> Option<String> {
    world.agent(id).filter(|a| a.alive).map(|a| a.name.clone())
}

fn relationships(world: &World, agent: &Agent) -> Vec<KnownAgent> {
    let mut known: Vec<KnownAgent> = agent
        .relationships
        .iter()
        .map(|(&id, rel)| KnownAgent {
            id,
            name: living_name(world, id),
            kind: rel.kind,
            value: rel.value,
            note: rel.note.clone(),
        })
        .collect();
    known.sort_by(|a, b| {
        b.value
            .unsigned_abs()
            .cmp(&a.value.unsigned_abs())
            .then_with(|| a.id.cmp(&b.id))
    });
    known.truncate(TOP_RELATIONSHIPS);
    known
}

fn conversations(world: &World, agent: &Agent) -> Vec<ConversationExcerpt> {
    let mut excerpts: Vec<ConversationExcerpt> = agent
        .conversations
        .iter()
        .filter(|(_, lines)| !lines.is_empty())
        .map(|(&partner, lines)| {
            let start = lines.len().saturating_sub(CONVERSATION_LINES);
            ConversationExcerpt {
                partner,
                partner_name: living_name(world, partner),
                lines: lines.get(start..).unwrap_or_default().to_vec(),
            }
        })
        .collect();
    excerpts.sort_by(|a, b| {
        let last = |e: &ConversationExcerpt| e.lines.last().map_or(0, |l| l.tick);
        last(b).cmp(&last(a)).then_with(|| a.partner.cmp(&b.partner))
    });
    excerpts.truncate(CONVERSATION_PARTNERS);
    excerpts
}

fn non_zero(items: &BTreeMap<Resource, u32>) -> BTreeMap<Resource, u32> {
    items
        .iter()
        .filter(|&(_, &n)| n > 0)
        .map(|(&r, &n)| (r, n))
        .collect()
}
