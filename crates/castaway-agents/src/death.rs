//! Death and its consequences.
//!
//! On death the agent's whole inventory is dropped as a pile on its tile
//! and the inventory is zeroed. Every living agent whose own visibility
//! radius covers the body witnesses the death: it loses happiness and
//! remembers the event. The record stays in the world until the removal
//! phase filters it out.

use std::collections::BTreeMap;

use castaway_types::{AgentId, DeathReason, InteractionKind, MemoryCategory, Position, Resource};
use castaway_world::World;
use tracing::info;

use crate::inventory;
use crate::memory::{self, IMPORTANCE_DEATH};
use crate::social;

/// What a death left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathRecord {
    /// The agent who died.
    pub agent_id: AgentId,
    /// Cause of death.
    pub reason: DeathReason,
    /// Age at death.
    pub age: u64,
    /// Where the body lies and the pile was dropped.
    pub at: Position,
    /// Resources dropped on the tile. Empty if the agent carried nothing.
    pub dropped: BTreeMap<Resource, u32>,
    /// Living agents that saw it happen.
    pub witnesses: Vec<AgentId>,
}

/// Mark `id` dead and apply the consequences. Safe to call on an agent
/// already flagged dead by the lifecycle or nutrition phase.
///
/// Returns `None` if the agent does not exist.
pub fn process_death(
    world: &mut World,
    id: AgentId,
    reason: DeathReason,
    tick: u64,
    memory_limit: usize,
) -> Option<DeathRecord> {
    let agent = world.agent_mut(id)?;
    agent.alive = false;
    agent.starving = false;
    agent.pregnancy = None;
    let dropped = inventory::drain_all(&mut agent.inventory);
    let at = agent.location;
    let age = agent.age;
    let name = agent.name.clone();

    world.drop_pile(at, dropped.clone(), tick);

    let witnesses: Vec<AgentId> = world
        .living_agents()
        .filter(|w| w.id != id && w.location.chebyshev(at) <= w.visibility_radius)
        .map(|w| w.id)
        .collect();
    let line = format!("Saw {name} die of {reason}");
    for witness in &witnesses {
        if let Some(w) = world.agent_mut(*witness) {
            social::update_happiness(w, InteractionKind::DeathWitnessed);
            memory::remember(
                w,
                tick,
                MemoryCategory::Experience,
                line.clone(),
                IMPORTANCE_DEATH,
                vec![id],
                memory_limit,
            );
        }
    }

    info!(tick, agent_id = %id, %reason, age, witnesses = witnesses.len(), "agent died");
    Some(DeathRecord {
        agent_id: id,
        reason,
        age,
        at,
        dropped,
        witnesses,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use castaway_types::{Gender, IdMint};

    use super::*;
    use crate::testing;

    #[test]
    fn drops_inventory_and_notifies_witnesses() {
        let mut mint = IdMint::new(0);
        let mut world = testing::grass_world(20, 5);
        let mut victim = testing::adult(&mut mint, Gender::Male, Position::new(2, 2));
        victim.inventory.insert(Resource::Wood, 3);
        victim.inventory.insert(Resource::Food, 1);
        let near = testing::adult(&mut mint, Gender::Female, Position::new(4, 2));
        let far = testing::adult(&mut mint, Gender::Female, Position::new(15, 2));
        let (vid, nid, fid) = (victim.id, near.id, far.id);
        world.add_agent(victim);
        world.add_agent(near);
        world.add_agent(far);

        let record = process_death(&mut world, vid, DeathReason::Starvation, 30, 50).unwrap();
        assert_eq!(record.dropped, BTreeMap::from([(Resource::Food, 1), (Resource::Wood, 3)]));
        assert_eq!(record.witnesses, vec![nid]);

        let body = world.agent(vid).unwrap();
        assert!(!body.alive);
        assert!(body.inventory.is_empty());
        assert_eq!(world.pile_contents(Position::new(2, 2)), record.dropped);

        let witness = world.agent(nid).unwrap();
        assert_eq!(witness.happiness, 30);
        assert_eq!(witness.memories.len(), 1);
        assert_eq!(world.agent(fid).unwrap().happiness, 50);
    }

    #[test]
    fn empty_handed_death_drops_nothing() {
        let mut mint = IdMint::new(0);
        let mut world = testing::grass_world(4, 4);
        let agent = testing::adult(&mut mint, Gender::Male, Position::new(1, 1));
        let id = agent.id;
        world.add_agent(agent);
        let record = process_death(&mut world, id, DeathReason::OldAge, 5, 50).unwrap();
        assert!(record.dropped.is_empty());
        assert!(world.piles.is_empty());
    }

    #[test]
    fn missing_agent_is_none() {
        let mut mint = IdMint::new(0);
        let mut world = testing::grass_world(4, 4);
        assert!(process_death(&mut world, mint.mint(), DeathReason::OldAge, 0, 50).is_none());
    }
}
