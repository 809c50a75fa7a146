//! Meals, the daily nutrition check, and starvation.
//!
//! An agent eats at most one food per tick, whenever it holds any. At the
//! last hour of each day the meal count is compared with the requirement:
//! the first short day marks the agent as starving, a second consecutive
//! one kills it. The counter resets at the first hour of the next day.

use castaway_types::{Agent, InteractionKind, Resource};
use castaway_world::clock;

use crate::inventory;
use crate::social;

/// Outcome of the end-of-day nutrition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyVerdict {
    /// Enough meals; any starving flag was cleared.
    Fed,
    /// First short day; the agent is now starving.
    Starving,
    /// Second consecutive short day; the agent died.
    Starved,
}

/// Everything the nutrition phase did to one agent this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NutritionReport {
    /// Whether the agent ate this tick.
    pub ate: bool,
    /// Set on the last hour of the day.
    pub verdict: Option<DailyVerdict>,
}

/// Reset the daily meal counter.
pub const fn reset_meals(agent: &mut Agent) {
    agent.meals_eaten = 0;
}

/// Eat one food if the agent holds any and has not eaten this tick.
/// Returns whether a meal was taken.
pub fn eat(agent: &mut Agent, tick: u64) -> bool {
    if !agent.alive || agent.last_meal_tick == Some(tick) {
        return false;
    }
    if inventory::remove_resource(&mut agent.inventory, Resource::Food, 1).is_err() {
        return false;
    }
    agent.meals_eaten = agent.meals_eaten.saturating_add(1);
    agent.last_meal_tick = Some(tick);
    true
}

/// Compare today's meals with the requirement and update the starving flag.
///
/// The first short day also costs the agent happiness.
pub fn daily_check(agent: &mut Agent, meals_needed: u32) -> DailyVerdict {
    if agent.meals_eaten >= meals_needed {
        agent.starving = false;
        return DailyVerdict::Fed;
    }
    if agent.starving {
        agent.alive = false;
        DailyVerdict::Starved
    } else {
        agent.starving = true;
        social::update_happiness(agent, InteractionKind::Starve);
        DailyVerdict::Starving
    }
}

/// Run the nutrition phase for one agent at `tick`.
pub fn nutrition_phase(agent: &mut Agent, tick: u64, meals_needed: u32) -> NutritionReport {
    let mut report = NutritionReport::default();
    if !agent.alive {
        return report;
    }
    if clock::is_day_start(tick) {
        reset_meals(agent);
    }
    report.ate = eat(agent, tick);
    if clock::is_day_end(tick) {
        report.verdict = Some(daily_check(agent, meals_needed));
    }
    report
}
