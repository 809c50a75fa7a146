//! Fixtures shared by the unit tests in this crate.

use std::collections::BTreeMap;

use castaway_types::{Agent, Gender, IdMint, LifeStage, Personality, Position, Terrain};
use castaway_world::{Tile, World};

/// An adult with empty state at `location`.
pub(crate) fn adult(mint: &mut IdMint, gender: Gender, location: Position) -> Agent {
    Agent {
        id: mint.mint(),
        name: String::from("Test"),
        gender,
        age: 300,
        status: LifeStage::Adult,
        happiness: 50,
        personality: Personality::default(),
        memories: Vec::new(),
        relationships: BTreeMap::new(),
        inventory: BTreeMap::new(),
        meals_eaten: 0,
        last_meal_tick: None,
        starving: false,
        alive: true,
        pregnancy: None,
        location,
        visibility_radius: 5,
        conversations: BTreeMap::new(),
        spatial_memory: Vec::new(),
    }
}

/// A `width x height` grass world with a water column at `x = 0`.
#[allow(clippy::unwrap_used)]
pub(crate) fn grass_world(width: i32, height: i32) -> World {
    let tiles = (0..height)
        .map(|y| {
            (0..width)
                .map(|x| {
                    let terrain = if x == 0 { Terrain::Water } else { Terrain::Grass };
                    Tile::new(Position::new(x, y), 0.4, terrain)
                })
                .collect()
        })
        .collect();
    World::new(tiles).unwrap()
}
