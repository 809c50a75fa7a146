//! Action validation and resolution.
//!
//! The tick engine runs every decided call through [`validate_call`] and
//! then [`resolve`]. Either step may answer with a [`Skip`]; skipped
//! actions leave no trace in the world or the event log.
//!
//! # Submodules
//!
//! - [`handlers`] -- In-place resolvers, one per action.
//! - [`validation`] -- Spatial, stage, resource, and tile-state checks.

pub mod handlers;
pub mod validation;

pub use handlers::{Outcome, ResolveContext, resolve};
pub use validation::{Skip, validate_call};
