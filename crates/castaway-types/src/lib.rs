//! Shared type definitions for the Castaway island simulation.
//!
//! This crate is the single source of truth for the data exchanged between
//! the world, the agent model, the tick engine, and decision sources. It
//! holds plain data only; behavior lives in the downstream crates.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers and the deterministic [`IdMint`]
//! - [`enums`] -- Closed sets (resources, terrain, life stages, event types)
//! - [`structs`] -- The agent record and its components
//! - [`actions`] -- Typed action calls returned by decision sources
//! - [`event`] -- Immutable event records forming the causal chain
//! - [`perception`] -- Bounded per-agent context for decision sources

pub mod actions;
pub mod enums;
pub mod event;
pub mod ids;
pub mod perception;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{ActionCall, DecidedCall};
pub use enums::{
    EventType, Gender, ImportanceTier, InteractionKind, LifeStage, MemoryCategory, Recipe,
    RelationshipKind, Resource, SpatialCategory, StructureType, Terrain, Weather,
};
pub use event::{DeathReason, Event, EventDetails};
pub use ids::{AgentId, CropFieldId, EventId, IdMint, StructureId};
pub use perception::{
    ConversationExcerpt, KnownAgent, Perception, SelfState, VisibleAgent, VisibleCrop, VisibleTile,
};
pub use structs::{
    Agent, ConversationLine, ItemPile, MemoryEntry, Personality, Position, Pregnancy, Relationship,
    SpatialMemory,
};
