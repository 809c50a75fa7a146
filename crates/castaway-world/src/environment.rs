//! Island-wide weather.
//!
//! Weather is binary. Once per tick a single Bernoulli draw decides whether
//! it toggles between sun and rain. Turning to rain waters every
//! unharvested crop field by exactly one.
//!
//! # Determinism
//!
//! The draw comes from the shared [`SimRng`] stream at a fixed point in the
//! tick (after all action dispatch), so the same seed reproduces the same
//! weather history.

use castaway_types::Weather;
use tracing::info;

use crate::farming;
use crate::rng::SimRng;
use crate::world::World;

/// Outcome of a weather change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherShift {
    /// Weather before the change.
    pub from: Weather,
    /// Weather after the change.
    pub to: Weather,
    /// Crop fields watered by the change (zero unless it started raining).
    pub fields_watered: u32,
}

/// Roll for a weather toggle with probability `change_chance`.
///
/// Always consumes exactly one draw. Returns `None` if the weather held.
pub fn roll_weather(world: &mut World, rng: &mut SimRng, change_chance: f64) -> Option<WeatherShift> {
    if !rng.chance(change_chance) {
        return None;
    }
    let next = world.weather.toggled();
    Some(set_weather(world, next))
}

/// Force the weather to `to`, watering fields if that means rain.
pub fn set_weather(world: &mut World, to: Weather) -> WeatherShift {
    let from = world.weather;
    world.weather = to;
    let fields_watered = if to == Weather::Rain {
        farming::water_all(world)
    } else {
        0
    };
    info!(tick = world.tick, ?from, ?to, fields_watered, "weather changed");
    WeatherShift {
        from,
        to,
        fields_watered,
    }
}
