//! Aging, lifecycle transitions, and elder mortality.
//!
//! Status only moves upward: child, then adult, then elder. An agent that
//! skips a stage (age raised past both thresholds by an override) jumps
//! straight to the final stage in one transition.

use castaway_types::{Agent, LifeStage};
use castaway_world::SimRng;

use crate::agent::stage_for_age;

/// What happened to an agent during one call to [`tick_age`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AgeReport {
    /// `(from, to)` if the lifecycle stage changed this tick.
    pub transition: Option<(LifeStage, LifeStage)>,
    /// Whether the agent died of old age this tick.
    pub died: bool,
}

/// Age an agent by one tick.
///
/// No-op on a dead agent (no RNG draw either). Only elders consume a draw,
/// including an agent that became an elder on this very tick.
pub fn tick_age(
    agent: &mut Agent,
    child_duration: u64,
    elder_age: u64,
    elder_death_chance: f64,
    rng: &mut SimRng,
) -> AgeReport {
    let mut report = AgeReport::default();
    if !agent.alive {
        return report;
    }

    agent.age = agent.age.saturating_add(1);

    let next = stage_for_age(agent.age, child_duration, elder_age);
    if next > agent.status {
        report.transition = Some((agent.status, next));
        agent.status = next;
    }

    if agent.status == LifeStage::Elder && rng.chance(elder_death_chance) {
        agent.alive = false;
        report.died = true;
    }

    report
}
