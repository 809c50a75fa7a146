//! The island: tile grid, crops, structures, weather, and randomness.
//!
//! This crate models the physical world the agents live in. It owns the
//! mutable [`World`] aggregate and the single seeded [`SimRng`] stream; it
//! knows nothing about decisions or events.
//!
//! # Modules
//!
//! - [`clock`] -- Hour, day, and day/night derived from the tick counter.
//! - [`environment`] -- Binary weather toggling and rain watering.
//! - [`error`] -- Error types for world construction.
//! - [`farming`] -- Crop field planting, harvest gates, and watering.
//! - [`grid`] -- Tiles, crop fields, structures, and resource caps.
//! - [`rng`] -- The deterministic random stream.
//! - [`terrain`] -- The [`TerrainGenerator`] interface and the default
//!   radial [`IslandGenerator`].
//! - [`world`] -- The [`World`] aggregate and its spatial queries.

pub mod clock;
pub mod environment;
pub mod error;
pub mod farming;
pub mod grid;
pub mod rng;
pub mod terrain;
pub mod world;

// Re-export primary types at crate root.
pub use environment::{WeatherShift, roll_weather, set_weather};
pub use error::WorldError;
pub use grid::{CropField, STRUCTURE_DURABILITY, Structure, Tile, resource_cap};
pub use rng::SimRng;
pub use terrain::{IslandGenerator, TerrainGenerator, UniformGenerator, generate_world};
pub use world::World;
