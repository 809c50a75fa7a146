//! Conception and birth.
//!
//! Any living, non-pregnant adult female sharing a tile with a living adult
//! male conceives; there is no consent or relationship gate. After
//! `pregnancy_duration` ticks the mother gives birth to a child on her
//! current tile. A birth consumes RNG draws for the child's gender,
//! personality, and name, in that order.

use castaway_types::{
    AgentId, Gender, IdMint, InteractionKind, LifeStage, MemoryCategory, Position, Pregnancy,
};
use castaway_world::{SimRng, World};
use tracing::debug;

use crate::agent::{AgentOverrides, create_agent};
use crate::config::AgentRules;
use crate::memory::{self, IMPORTANCE_FAMILY};
use crate::social;

/// A new pregnancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conception {
    /// The pregnant agent.
    pub mother: AgentId,
    /// The partner recorded on the pregnancy.
    pub father: AgentId,
    /// Tick at which the birth is due.
    pub due_tick: u64,
}

/// A birth that added a child to the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthRecord {
    /// The mother.
    pub mother: AgentId,
    /// The partner recorded on the pregnancy. May have died since.
    pub father: AgentId,
    /// The newborn.
    pub child: AgentId,
    /// Newborn's name.
    pub name: String,
    /// Newborn's gender.
    pub gender: Gender,
    /// Where the child was born.
    pub at: Position,
}

/// Whether `mother` could conceive right now, ignoring partners.
fn fertile_female(world: &World, id: AgentId) -> Option<Position> {
    let agent = world.agent(id)?;
    (agent.alive
        && agent.gender == Gender::Female
        && agent.status == LifeStage::Adult
        && agent.pregnancy.is_none())
    .then_some(agent.location)
}

/// The co-located adult male with the smallest id, if any.
pub fn find_partner(world: &World, mother: AgentId) -> Option<AgentId> {
    let at = fertile_female(world, mother)?;
    world
        .living_agents()
        .filter(|a| a.gender == Gender::Male && a.status == LifeStage::Adult && a.location == at)
        .map(|a| a.id)
        .min()
}

/// Start a pregnancy on `mother` with `father` as the partner.
///
/// Both parents gain the procreate relationship and happiness bonus and a
/// family memory. Returns `None` and changes nothing if `mother` cannot
/// conceive or `father` is missing.
pub fn conceive(
    world: &mut World,
    mother: AgentId,
    father: AgentId,
    tick: u64,
    rules: &AgentRules,
) -> Option<Conception> {
    fertile_female(world, mother)?;
    let due_tick = tick.checked_add(rules.pregnancy_duration)?;
    let (m, f) = world.agent_pair_mut(mother, father)?;
    if !f.alive {
        return None;
    }

    m.pregnancy = Some(Pregnancy {
        start_tick: tick,
        duration: rules.pregnancy_duration,
        partner_id: father,
    });
    social::mutual_interaction(m, f, InteractionKind::Procreate);
    let mother_line = format!("Conceived a child with {}", f.name);
    let father_line = format!("Conceived a child with {}", m.name);
    let participants = vec![mother, father];
    memory::remember(
        m,
        tick,
        MemoryCategory::Family,
        mother_line,
        IMPORTANCE_FAMILY,
        participants.clone(),
        rules.memory_limit,
    );
    memory::remember(
        f,
        tick,
        MemoryCategory::Family,
        father_line,
        IMPORTANCE_FAMILY,
        participants,
        rules.memory_limit,
    );

    debug!(tick, mother = %mother, father = %father, due_tick, "conception");
    Some(Conception {
        mother,
        father,
        due_tick,
    })
}

/// Deliver the mother's child if her pregnancy is due.
///
/// Returns `None` without touching the RNG or the world if the mother is
/// missing, dead, not pregnant, or not yet due.
pub fn deliver(
    world: &mut World,
    mother: AgentId,
    tick: u64,
    rules: &AgentRules,
    mint: &mut IdMint,
    rng: &mut SimRng,
) -> Option<BirthRecord> {
    let agent = world.agent(mother)?;
    if !agent.alive {
        return None;
    }
    let pregnancy = agent.pregnancy.filter(|p| p.is_due(tick))?;
    let at = agent.location;
    let father = pregnancy.partner_id;

    let overrides = AgentOverrides {
        location: Some(at),
        ..AgentOverrides::default()
    };
    let child = create_agent(mint.mint(), overrides, rules, rng);
    let record = BirthRecord {
        mother,
        father,
        child: child.id,
        name: child.name.clone(),
        gender: child.gender,
        at,
    };

    let line = format!("{} was born", child.name);
    let participants = vec![mother, father, child.id];
    for parent in [mother, father] {
        if let Some(p) = world.agent_mut(parent).filter(|p| p.alive) {
            memory::remember(
                p,
                tick,
                MemoryCategory::Family,
                line.clone(),
                IMPORTANCE_FAMILY,
                participants.clone(),
                rules.memory_limit,
            );
        }
    }
    if let Some(m) = world.agent_mut(mother) {
        m.pregnancy = None;
    }
    world.add_agent(child);

    debug!(tick, mother = %mother, child = %record.child, name = %record.name, "birth");
    Some(record)
}
