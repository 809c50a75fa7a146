//! Rule constants for the agent model and the action resolvers.
//!
//! [`AgentRules`] bundles every tunable the lifecycle, nutrition, social,
//! and resolver code reads, so callers (the tick engine, tests) can
//! override defaults in one place. The engine builds it from the loaded
//! simulation configuration.

/// Tunables for agent mechanics, applied every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRules {
    /// Age at which a child becomes an adult (default: 240 ticks).
    pub child_duration: u64,

    /// Age at which an adult becomes an elder (default: 1440 ticks).
    pub elder_age: u64,

    /// Per-tick death probability for elders (default: 0.01).
    pub elder_death_chance: f64,

    /// Ticks from conception to birth (default: 72).
    pub pregnancy_duration: u64,

    /// Ticks from planting to maturity (default: 72).
    pub crop_growth_time: u64,

    /// Rain waterings required before a harvest (default: 3).
    pub crop_watering_required: u32,

    /// Food granted by one harvest (default: 5).
    pub harvest_yield: u32,

    /// Maximum Chebyshev distance of one move (default: 1).
    pub move_distance: u32,

    /// Meals required per 24-tick day (default: 3).
    pub meals_per_day: u32,

    /// Visibility radius given to new agents (default: 5).
    pub visibility_radius: u32,

    /// Maximum memory entries kept per agent (default: 50).
    pub memory_limit: usize,

    /// Maximum conversation lines kept per partner (default: 10).
    pub conversation_limit: usize,

    /// Spatial memories kept per category (default: 5).
    pub spatial_top_n: usize,

    /// Manhattan radius inside which a same-category spatial memory
    /// suppresses a new one (default: 8).
    pub spatial_dedup_radius: u32,
}

impl Default for AgentRules {
    fn default() -> Self {
        Self {
            child_duration: 240,
            elder_age: 1440,
            elder_death_chance: 0.01,
            pregnancy_duration: 72,
            crop_growth_time: 72,
            crop_watering_required: 3,
            harvest_yield: 5,
            move_distance: 1,
            meals_per_day: 3,
            visibility_radius: 5,
            memory_limit: 50,
            conversation_limit: 10,
            spatial_top_n: 5,
            spatial_dedup_radius: 8,
        }
    }
}
