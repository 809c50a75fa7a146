//! Tick engine, event log, and orchestration for the Castaway simulation.
//!
//! This crate owns the eight-phase tick pipeline (order, lifecycle,
//! nutrition, procreation, removal, dispatch, weather, clock), the
//! causally-linked event log with per-event snapshots, the decision source
//! boundary, and the simulation handle that ties them together.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `castaway-config.yaml` into
//!   strongly-typed structs, with environment overrides.
//! - [`decision`] -- [`DecisionSource`] trait, [`LocalDecisionSource`], and
//!   [`ScriptedDecisionSource`].
//! - [`event_log`] -- Append-only event chain with snapshots.
//! - [`fallback`] -- Local heuristic used when no source answers.
//! - [`operator`] -- Shared pause/resume/stop/speed controls.
//! - [`perception`] -- Per-agent perception assembly from world state.
//! - [`persist`] -- Timeline save and load as JSON.
//! - [`runner`] -- The fixed-interval loop around the handle.
//! - [`simulation`] -- The [`Simulation`] handle with replay and branching.
//! - [`tick`] -- The tick pipeline.

pub mod config;
pub mod decision;
pub mod event_log;
pub mod fallback;
pub mod operator;
pub mod perception;
pub mod persist;
pub mod runner;
pub mod simulation;
pub mod tick;

// Re-export primary types at crate root for convenience.
pub use config::{ConfigError, SimulationConfig};
pub use decision::{
    DecisionOutcome, DecisionRequest, DecisionSource, DecisionTelemetry, LocalDecisionSource,
    ScriptedDecisionSource,
};
pub use event_log::EventLog;
pub use operator::{OperatorState, QueuedMessage, SimulationEndReason};
pub use persist::{PersistError, SavedTimeline};
pub use runner::{NoOpCallback, RunnerError, SimulationResult, TickCallback, run_simulation};
pub use simulation::{Mode, RunState, Simulation, SimulationError};
pub use tick::{SimulationState, TickSettings, TickSummary, run_tick};
