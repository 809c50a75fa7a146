//! Crop field planting, harvest gates, and rain watering.
//!
//! A field lives on exactly one grass tile. It matures `growth_time` ticks
//! after planting and can only be harvested once it is mature *and* has
//! been watered by rain enough times. Harvest is terminal for the planting;
//! the tile may then host a new field.

use castaway_types::{CropFieldId, Position};
use tracing::debug;

use crate::grid::CropField;
use crate::world::World;

/// Plant a new field at `position`.
///
/// Returns the field's maturity tick, or `None` if the tile is missing,
/// not grass, already hosts a live field, or the maturity tick would
/// overflow. On `None` the world is unchanged.
pub fn plant(
    world: &mut World,
    position: Position,
    id: CropFieldId,
    tick: u64,
    growth_time: u64,
) -> Option<u64> {
    let mature_tick = tick.checked_add(growth_time)?;
    let tile = world.tile_mut(position)?;
    if !tile.can_plant() {
        return None;
    }
    tile.crop = Some(CropField {
        id,
        position,
        planted_tick: tick,
        watered: 0,
        mature_tick,
        harvested: false,
    });
    Some(mature_tick)
}

/// Mark the field at `position` harvested if it is ready.
///
/// Returns the field id on success. A field that is immature, under-watered,
/// already harvested, or absent is left untouched and yields `None`.
pub fn harvest(world: &mut World, position: Position, tick: u64, watering_required: u32) -> Option<CropFieldId> {
    let field = world.tile_mut(position)?.crop.as_mut()?;
    if !field.is_ready(tick, watering_required) {
        return None;
    }
    field.harvested = true;
    Some(field.id)
}

/// Water every unharvested field once. Returns the number watered.
pub fn water_all(world: &mut World) -> u32 {
    let mut count: u32 = 0;
    for field in world.live_crops_mut() {
        field.watered = field.watered.saturating_add(1);
        count = count.saturating_add(1);
    }
    debug!(fields = count, "rain watered crop fields");
    count
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use castaway_types::{IdMint, Terrain};

    use super::*;
    use crate::world::tests::small_world;

    #[test]
    fn planting_computes_maturity() {
        let mut mint = IdMint::new(0);
        let mut world = small_world(4, 4);
        let at = Position::new(2, 2);
        assert_eq!(plant(&mut world, at, mint.mint(), 10, 72), Some(82));
        let field = world.tile(at).unwrap().crop.clone().unwrap();
        assert_eq!(field.planted_tick, 10);
        assert_eq!(field.watered, 0);
        assert!(!field.harvested);
    }

    #[test]
    fn cannot_plant_twice_or_on_water() {
        let mut mint = IdMint::new(0);
        let mut world = small_world(4, 4);
        let at = Position::new(2, 2);
        assert!(plant(&mut world, at, mint.mint(), 0, 72).is_some());
        assert!(plant(&mut world, at, mint.mint(), 1, 72).is_none());
        assert!(plant(&mut world, Position::new(0, 1), mint.mint(), 0, 72).is_none());
        assert!(plant(&mut world, Position::new(9, 9), mint.mint(), 0, 72).is_none());
    }

    #[test]
    fn cannot_plant_on_forest() {
        let mut mint = IdMint::new(0);
        let mut world = small_world(4, 4);
        let at = Position::new(3, 3);
        world.tile_mut(at).unwrap().terrain = Terrain::Forest;
        assert!(plant(&mut world, at, mint.mint(), 0, 72).is_none());
        assert!(world.tile(at).unwrap().crop.is_none());
    }

    #[test]
    fn harvest_gates_hold() {
        let mut mint = IdMint::new(0);
        let mut world = small_world(4, 4);
        let at = Position::new(2, 2);
        let id: CropFieldId = mint.mint();
        plant(&mut world, at, id, 10, 72).unwrap();

        // Mature but dry.
        assert!(harvest(&mut world, at, 100, 3).is_none());
        world.tile_mut(at).unwrap().crop.as_mut().unwrap().watered = 3;
        // Watered but immature.
        assert!(harvest(&mut world, at, 81, 3).is_none());
        assert!(!world.tile(at).unwrap().crop.as_ref().unwrap().harvested);

        assert_eq!(harvest(&mut world, at, 82, 3), Some(id));
        assert!(world.tile(at).unwrap().crop.as_ref().unwrap().harvested);
        // Terminal.
        assert!(harvest(&mut world, at, 83, 3).is_none());
        // The tile can host a new planting.
        assert!(plant(&mut world, at, mint.mint(), 83, 72).is_some());
    }

    #[test]
    fn rain_skips_harvested_fields() {
        let mut mint = IdMint::new(0);
        let mut world = small_world(4, 4);
        let live = Position::new(1, 1);
        let done = Position::new(2, 1);
        plant(&mut world, live, mint.mint(), 0, 1).unwrap();
        plant(&mut world, done, mint.mint(), 0, 1).unwrap();
        world.tile_mut(done).unwrap().crop.as_mut().unwrap().harvested = true;

        assert_eq!(water_all(&mut world), 1);
        assert_eq!(world.tile(live).unwrap().crop.as_ref().unwrap().watered, 1);
        assert_eq!(world.tile(done).unwrap().crop.as_ref().unwrap().watered, 0);
    }
}
