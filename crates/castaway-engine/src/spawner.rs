//! Seed population for a fresh island.
//!
//! At simulation start the spawner creates `population.initial_agents`
//! agents with drawn personalities and names, scatters them over distinct
//! walkable tiles, and hands each a few meals of food. Every draw comes from
//! the simulation stream so the seed population is part of the replay.

use std::collections::{BTreeMap, BTreeSet};

use castaway_agents::{AgentOverrides, create_agent};
use castaway_core::SimulationState;
use castaway_types::{AgentId, Gender, Position, Resource};
use castaway_world::SimRng;
use serde::Deserialize;
use tracing::info;

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// The `agents` section of `castaway-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpawnerConfig {
    /// Starting age in ticks. Unset means "just grown up".
    #[serde(default)]
    pub starting_age: Option<u64>,

    /// Food units each seed agent carries.
    #[serde(default = "default_starting_food")]
    pub starting_food: u32,

    /// Guarantee one female and one male among the first two agents.
    #[serde(default = "default_balanced_genders")]
    pub balanced_genders: bool,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            starting_age: None,
            starting_food: default_starting_food(),
            balanced_genders: default_balanced_genders(),
        }
    }
}

const fn default_starting_food() -> u32 {
    3
}

const fn default_balanced_genders() -> bool {
    true
}

// -----------------------------------------------------------------------
// Spawning
// -----------------------------------------------------------------------

/// Create `count` seed agents in `state` and return their ids in creation
/// order.
///
/// Agents land on distinct walkable tiles while there are enough of them;
/// after that tiles are reused in the same shuffled order. Names that
/// collide with an agent already on the island get a numeric suffix.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] if the island has no walkable tile.
pub fn spawn_seed_agents(
    state: &mut SimulationState,
    count: u32,
    config: &SpawnerConfig,
) -> Result<Vec<AgentId>, EngineError> {
    let mut tiles = state.world.walkable_positions();
    if tiles.is_empty() {
        return Err(EngineError::Spawner {
            message: String::from("island has no walkable tile to place agents"),
        });
    }
    state.rng.shuffle(&mut tiles);

    let genders = assign_genders(&mut state.rng, count, config.balanced_genders);
    let age = config.starting_age.unwrap_or(state.rules.child_duration);
    let mut names: BTreeSet<String> = state.world.living_agents().map(|a| a.name.clone()).collect();
    let mut spawned = Vec::with_capacity(genders.len());

    for (gender, location) in genders.into_iter().zip(tiles.iter().copied().cycle()) {
        let id = spawn_one(state, gender, age, location, config.starting_food, &mut names);
        spawned.push(id);
    }

    info!(
        agents = spawned.len(),
        age,
        starting_food = config.starting_food,
        "seed agents spawned"
    );
    Ok(spawned)
}

fn spawn_one(
    state: &mut SimulationState,
    gender: Option<Gender>,
    age: u64,
    location: Position,
    food: u32,
    names: &mut BTreeSet<String>,
) -> AgentId {
    let inventory = BTreeMap::from([(Resource::Food, food)]);
    let mut agent = create_agent(
        state.mint.mint(),
        AgentOverrides {
            gender,
            age: Some(age),
            location: Some(location),
            inventory: Some(inventory),
            ..AgentOverrides::default()
        },
        &state.rules,
        &mut state.rng,
    );
    agent.name = unique_name(&agent.name, names);
    names.insert(agent.name.clone());

    let id = agent.id;
    info!(
        agent_id = %id,
        name = %agent.name,
        gender = ?agent.gender,
        x = location.x,
        y = location.y,
        "spawned seed agent"
    );
    state.world.add_agent(agent);
    id
}

/// `base` if unused, otherwise `base 2`, `base 3`, ...
fn unique_name(base: &str, taken: &BTreeSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_owned();
    }
    (2_u32..)
        .map(|n| format!("{base} {n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_owned())
}

/// Gender for each seed agent; `None` leaves the draw to [`create_agent`].
///
/// With `balanced` and at least two agents, the first two are one female
/// and one male in random order.
fn assign_genders(rng: &mut SimRng, count: u32, balanced: bool) -> Vec<Option<Gender>> {
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    let mut genders: Vec<Option<Gender>> = Vec::with_capacity(count);
    if balanced && count >= 2 {
        if rng.coin() {
            genders.extend([Some(Gender::Female), Some(Gender::Male)]);
        } else {
            genders.extend([Some(Gender::Male), Some(Gender::Female)]);
        }
    }
    genders.resize(count, None);
    genders
}
