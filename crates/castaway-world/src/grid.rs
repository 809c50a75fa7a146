//! Tiles and the things that sit on them.
//!
//! A [`Tile`] carries terrain, a sparse resource map bounded by
//! [`resource_cap`], at most one [`CropField`], and at most one
//! [`Structure`]. Water tiles never host crops or structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use castaway_types::{AgentId, CropFieldId, Position, Resource, StructureId, StructureType, Terrain};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Durability of a freshly built structure.
pub const STRUCTURE_DURABILITY: u32 = 100;

/// Maximum quantity of a natural resource a tile of the given terrain can
/// hold. Zero means the resource never appears there.
#[allow(clippy::match_same_arms)]
pub const fn resource_cap(terrain: Terrain, resource: Resource) -> u32 {
    match (terrain, resource) {
        (Terrain::Beach, Resource::Food) => 2,
        (Terrain::Beach, Resource::Fiber) => 3,
        (Terrain::Grass, Resource::Food) => 4,
        (Terrain::Grass, Resource::Fiber) => 5,
        (Terrain::Forest, Resource::Food) => 3,
        (Terrain::Forest, Resource::Wood) => 8,
        (Terrain::Forest, Resource::Fiber) => 2,
        (Terrain::Rocky, Resource::Stone) => 8,
        (Terrain::Rocky, Resource::Wood) => 1,
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// CropField
// ---------------------------------------------------------------------------

/// A planting on a grass tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropField {
    /// Unique identifier.
    pub id: CropFieldId,
    /// The tile it occupies.
    pub position: Position,
    /// Tick it was planted.
    pub planted_tick: u64,
    /// Number of times rain has watered it.
    pub watered: u32,
    /// Earliest tick it can be harvested.
    pub mature_tick: u64,
    /// Terminal flag set on harvest.
    pub harvested: bool,
}

impl CropField {
    /// Whether the field has reached its maturity tick.
    pub const fn is_mature(&self, tick: u64) -> bool {
        tick >= self.mature_tick
    }

    /// Whether the field can be harvested at `tick` given the watering
    /// requirement.
    pub const fn is_ready(&self, tick: u64, watering_required: u32) -> bool {
        !self.harvested && self.is_mature(tick) && self.watered >= watering_required
    }
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

/// A building on a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// Unique identifier.
    pub id: StructureId,
    /// Catalog entry.
    pub kind: StructureType,
    /// The tile it stands on.
    pub position: Position,
    /// Remaining durability.
    pub durability: u32,
    /// Who built it.
    pub builder: AgentId,
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// One cell of the island grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Coordinates.
    pub position: Position,
    /// Elevation in `[0, 1]` from terrain generation.
    pub elevation: f32,
    /// Terrain category.
    pub terrain: Terrain,
    /// Natural resources lying on the tile. Absent keys mean zero.
    pub resources: BTreeMap<Resource, u32>,
    /// Crop field, live or harvested.
    pub crop: Option<CropField>,
    /// Structure, if any.
    pub structure: Option<Structure>,
}

impl Tile {
    /// A bare tile with no resources.
    pub const fn new(position: Position, elevation: f32, terrain: Terrain) -> Self {
        Self {
            position,
            elevation,
            terrain,
            resources: BTreeMap::new(),
            crop: None,
            structure: None,
        }
    }

    /// Whether agents may stand here.
    pub const fn is_walkable(&self) -> bool {
        self.terrain.is_walkable()
    }

    /// Quantity of a resource on the tile.
    pub fn resource(&self, resource: Resource) -> u32 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }

    /// The crop field if it has not been harvested yet.
    pub fn live_crop(&self) -> Option<&CropField> {
        self.crop.as_ref().filter(|c| !c.harvested)
    }

    /// Whether a new crop field may be planted here.
    pub fn can_plant(&self) -> bool {
        self.terrain == Terrain::Grass && self.live_crop().is_none()
    }

    /// Whether a structure may be built here.
    pub const fn can_build(&self) -> bool {
        self.is_walkable() && self.structure.is_none()
    }

    /// Remove one unit of a resource. Returns `false` (and changes nothing)
    /// if none is present. The key is removed when it reaches zero.
    pub fn take_resource(&mut self, resource: Resource) -> bool {
        let Some(count) = self.resources.get_mut(&resource) else {
            return false;
        };
        let Some(remaining) = count.checked_sub(1) else {
            return false;
        };
        if remaining == 0 {
            self.resources.remove(&resource);
        } else {
            *count = remaining;
        }
        true
    }

    /// Set a resource quantity, clamped to the terrain's cap. A zero result
    /// removes the key.
    pub fn set_resource(&mut self, resource: Resource, quantity: u32) {
        let capped = quantity.min(resource_cap(self.terrain, resource));
        if capped == 0 {
            self.resources.remove(&resource);
        } else {
            self.resources.insert(resource, capped);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use castaway_types::IdMint;

    use super::*;

    fn grass() -> Tile {
        Tile::new(Position::new(1, 1), 0.4, Terrain::Grass)
    }

    #[test]
    fn water_hosts_nothing() {
        for resource in Resource::ALL {
            assert_eq!(resource_cap(Terrain::Water, resource), 0);
        }
        let tile = Tile::new(Position::new(0, 0), 0.1, Terrain::Water);
        assert!(!tile.can_plant());
        assert!(!tile.can_build());
    }

    #[test]
    fn crafted_resources_never_spawn() {
        for terrain in [Terrain::Beach, Terrain::Grass, Terrain::Forest, Terrain::Rocky] {
            for resource in [Resource::Rope, Resource::Plank, Resource::Tool] {
                assert_eq!(resource_cap(terrain, resource), 0);
            }
        }
    }

    #[test]
    fn take_resource_removes_key_at_zero() {
        let mut tile = grass();
        tile.set_resource(Resource::Food, 2);
        assert!(tile.take_resource(Resource::Food));
        assert_eq!(tile.resource(Resource::Food), 1);
        assert!(tile.take_resource(Resource::Food));
        assert!(!tile.resources.contains_key(&Resource::Food));
        assert!(!tile.take_resource(Resource::Food));
    }

    #[test]
    fn set_resource_respects_cap() {
        let mut tile = grass();
        tile.set_resource(Resource::Food, 99);
        assert_eq!(tile.resource(Resource::Food), 4);
        tile.set_resource(Resource::Stone, 3);
        assert_eq!(tile.resource(Resource::Stone), 0);
    }

    #[test]
    fn harvested_field_frees_the_tile() {
        let mut mint = IdMint::new(0);
        let mut tile = grass();
        tile.crop = Some(CropField {
            id: mint.mint(),
            position: tile.position,
            planted_tick: 0,
            watered: 0,
            mature_tick: 10,
            harvested: false,
        });
        assert!(!tile.can_plant());
        tile.crop.as_mut().unwrap().harvested = true;
        assert!(tile.can_plant());
    }

    #[test]
    fn readiness_needs_maturity_and_water() {
        let mut mint = IdMint::new(0);
        let mut field = CropField {
            id: mint.mint(),
            position: Position::new(0, 0),
            planted_tick: 10,
            watered: 2,
            mature_tick: 82,
            harvested: false,
        };
        assert!(!field.is_ready(82, 3));
        field.watered = 3;
        assert!(!field.is_ready(81, 3));
        assert!(field.is_ready(82, 3));
    }
}
