//! Local heuristic used when no decision source answers.
//!
//! Priority order:
//!
//! 1. Talk to the nearest visible agent.
//! 2. Grown agents only: harvest a ready crop on the current tile, or plant
//!    one if the current tile is free grass.
//! 3. Take one random step in a walkable cardinal direction.
//!
//! Only the last branch draws from the RNG, so agents who talk or farm
//! leave the stream untouched.

use castaway_types::{ActionCall, LifeStage, Perception, Position, Terrain};
use castaway_world::{SimRng, World};

/// Choose an action for the perceiving agent, or `None` if it is boxed in.
pub fn choose(world: &World, perception: &Perception, rng: &mut SimRng) -> Option<ActionCall> {
    let me = &perception.self_state;

    if let Some(nearest) = perception.nearest_agent() {
        return Some(ActionCall::Communicate {
            recipients: vec![nearest.id],
            message: format!("Hello, {}.", nearest.name),
        });
    }

    if me.status != LifeStage::Child {
        if let Some(here) = perception.tile_at(me.location) {
            if here.crop.is_some_and(|c| c.ready) {
                return Some(ActionCall::HarvestCrop { at: me.location });
            }
            if here.terrain == Terrain::Grass && here.crop.is_none() {
                return Some(ActionCall::CreateCropField { at: me.location });
            }
        }
    }

    let steps: Vec<Position> = cardinal_neighbors(me.location)
        .into_iter()
        .filter(|&p| world.is_walkable(p))
        .collect();
    rng.pick(&steps).map(|&to| ActionCall::Move { to })
}

/// Positions one step away, clockwise from north.
fn cardinal_neighbors(from: Position) -> [Position; 4] {
    [
        from.offset(0, -1),
        from.offset(1, 0),
        from.offset(0, 1),
        from.offset(-1, 0),
    ]
}
