//! Agent model, lifecycle mechanics, and action resolvers for Castaway.
//!
//! This crate contains the logic layer for agents: everything that operates
//! on agent records and the world without touching I/O or the clock. It
//! sits between `castaway-types`/`castaway-world` (data) and `castaway-core`
//! (orchestration).
//!
//! # Modules
//!
//! - [`actions`] -- Action validation ([`Skip`]) and in-place resolvers ([`Outcome`])
//! - [`agent`] -- Agent creation with overrides ([`create_agent`])
//! - [`config`] -- Rule constants ([`AgentRules`])
//! - [`crafting`] -- Recipe and construction cost tables
//! - [`death`] -- Death consequences: dropped piles and witnesses ([`DeathRecord`])
//! - [`error`] -- Inventory error type ([`AgentError`])
//! - [`inventory`] -- Checked inventory arithmetic
//! - [`lifecycle`] -- Aging, stage transitions, elder mortality ([`tick_age`])
//! - [`memory`] -- Bounded memory log and conversation history
//! - [`nutrition`] -- Meals, daily check, starvation ([`DailyVerdict`])
//! - [`reproduction`] -- Conception and birth
//! - [`social`] -- Relationship and happiness deltas
//! - [`spatial`] -- Spatial memory of points of interest

pub mod actions;
pub mod agent;
pub mod config;
pub mod crafting;
pub mod death;
pub mod error;
pub mod inventory;
pub mod lifecycle;
pub mod memory;
pub mod nutrition;
pub mod reproduction;
pub mod social;
pub mod spatial;

#[cfg(test)]
pub(crate) mod testing;

// Re-export primary types at crate root for convenience.
pub use actions::{Outcome, ResolveContext, Skip, resolve, validate_call};
pub use agent::{AgentOverrides, create_agent, stage_for_age};
pub use config::AgentRules;
pub use crafting::{CraftRecipe, build_cost, recipe_for};
pub use death::{DeathRecord, process_death};
pub use error::AgentError;
pub use lifecycle::{AgeReport, tick_age};
pub use nutrition::{DailyVerdict, NutritionReport, nutrition_phase};
pub use reproduction::{BirthRecord, Conception, conceive, deliver, find_partner};
pub use social::{update_happiness, update_relationship};
