//! Terrain generation behind a narrow interface.
//!
//! The engine only needs a rectangular grid of [`Tile`]s whose positions
//! match their indices and whose resources respect
//! [`resource_cap`](crate::grid::resource_cap). Any [`TerrainGenerator`]
//! satisfying that contract can be plugged in. [`IslandGenerator`] is the
//! default: a radial falloff from the map centre with smoothed random
//! jitter, so the edges drown and the middle rises into forest and rock.
//!
//! # Elevation bands
//!
//! | Elevation      | Terrain |
//! |----------------|---------|
//! | `< 0.20`       | Water   |
//! | `0.20 .. 0.30` | Beach   |
//! | `0.30 .. 0.55` | Grass   |
//! | `0.55 .. 0.75` | Forest  |
//! | `>= 0.75`      | Rocky   |

use castaway_types::{Position, Resource, Terrain};
use tracing::info;

use crate::error::WorldError;
use crate::grid::{Tile, resource_cap};
use crate::rng::SimRng;
use crate::world::World;

/// Upper elevation bound of each band, in ascending order.
const BANDS: [(f32, Terrain); 4] = [
    (0.20, Terrain::Water),
    (0.30, Terrain::Beach),
    (0.55, Terrain::Grass),
    (0.75, Terrain::Forest),
];

/// Map an elevation in `[0, 1]` to its terrain band.
pub fn terrain_for_elevation(elevation: f32) -> Terrain {
    BANDS
        .iter()
        .find(|(upper, _)| elevation < *upper)
        .map_or(Terrain::Rocky, |&(_, terrain)| terrain)
}

/// A producer of tile grids.
pub trait TerrainGenerator {
    /// Produce a `height x width` grid, row-major, drawing all randomness
    /// from `rng`.
    fn generate(&self, width: u32, height: u32, rng: &mut SimRng) -> Vec<Vec<Tile>>;
}

/// Build a world from a generator, rejecting maps without land.
///
/// # Errors
///
/// Returns [`WorldError::NoLand`] if no tile is walkable, or any error
/// from [`World::new`].
pub fn generate_world<G: TerrainGenerator>(
    generator: &G,
    width: u32,
    height: u32,
    rng: &mut SimRng,
) -> Result<World, WorldError> {
    let world = World::new(generator.generate(width, height, rng))?;
    let land = world.walkable_positions().len();
    if land == 0 {
        return Err(WorldError::NoLand);
    }
    info!(width, height, land_tiles = land, seed = rng.seed(), "island generated");
    Ok(world)
}

/// Seed each natural resource on a tile with a uniform draw up to its cap.
fn seed_resources(tile: &mut Tile, rng: &mut SimRng) {
    for resource in Resource::ALL.into_iter().filter(|r| r.is_natural()) {
        let cap = resource_cap(tile.terrain, resource);
        if cap > 0 {
            let quantity = rng.range_u32(0, cap);
            tile.set_resource(resource, quantity);
        }
    }
}

// ---------------------------------------------------------------------------
// IslandGenerator
// ---------------------------------------------------------------------------

/// Radial island with smoothed jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IslandGenerator {
    /// Amplitude of the per-tile random offset before smoothing.
    pub jitter: f32,
    /// Number of 3x3 box-blur passes over the raw elevation.
    pub smoothing_passes: u32,
}

impl Default for IslandGenerator {
    fn default() -> Self {
        Self {
            jitter: 0.35,
            smoothing_passes: 2,
        }
    }
}

impl IslandGenerator {
    /// Raw elevation: distance falloff plus jitter, row-major.
    #[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
    fn raw_elevation(&self, width: usize, height: usize, rng: &mut SimRng) -> Vec<Vec<f32>> {
        let cx = (width.saturating_sub(1) as f32 / 2.0).max(1.0);
        let cy = (height.saturating_sub(1) as f32 / 2.0).max(1.0);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        let dx = (x as f32 - cx) / cx;
                        let dy = (y as f32 - cy) / cy;
                        let falloff = 1.0 - dx.hypot(dy);
                        let noise = (rng.unit() - 0.5) * self.jitter;
                        falloff + noise
                    })
                    .collect()
            })
            .collect()
    }
}

/// One 3x3 box-blur pass, clipped at the edges.
#[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
fn smooth(grid: &[Vec<f32>]) -> Vec<Vec<f32>> {
    grid.iter()
        .enumerate()
        .map(|(y, row)| {
            (0..row.len())
                .map(|x| {
                    let mut sum = 0.0_f32;
                    let mut n = 0_u32;
                    for ny in y.saturating_sub(1)..=y.saturating_add(1) {
                        for nx in x.saturating_sub(1)..=x.saturating_add(1) {
                            if let Some(v) = grid.get(ny).and_then(|r| r.get(nx)) {
                                sum += v;
                                n = n.saturating_add(1);
                            }
                        }
                    }
                    if n == 0 { 0.0 } else { sum / n as f32 }
                })
                .collect()
        })
        .collect()
}

impl TerrainGenerator for IslandGenerator {
    fn generate(&self, width: u32, height: u32, rng: &mut SimRng) -> Vec<Vec<Tile>> {
        let w = usize::try_from(width).unwrap_or(0);
        let h = usize::try_from(height).unwrap_or(0);
        let mut elevation = self.raw_elevation(w, h, rng);
        for _ in 0..self.smoothing_passes {
            elevation = smooth(&elevation);
        }

        let mut tiles = Vec::with_capacity(h);
        for (y, row) in elevation.into_iter().enumerate() {
            let mut cells = Vec::with_capacity(w);
            for (x, raw) in row.into_iter().enumerate() {
                let value = raw.clamp(0.0, 1.0);
                let position = Position::new(
                    i32::try_from(x).unwrap_or(i32::MAX),
                    i32::try_from(y).unwrap_or(i32::MAX),
                );
                let mut tile = Tile::new(position, value, terrain_for_elevation(value));
                seed_resources(&mut tile, rng);
                cells.push(tile);
            }
            tiles.push(cells);
        }
        tiles
    }
}

// ---------------------------------------------------------------------------
// UniformGenerator
// ---------------------------------------------------------------------------

/// Every tile the same terrain, resources seeded as usual. Handy for
/// scenario runs where geography should not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformGenerator {
    /// Terrain of every tile.
    pub terrain: Terrain,
    /// Whether to seed natural resources.
    pub with_resources: bool,
}

impl TerrainGenerator for UniformGenerator {
    fn generate(&self, width: u32, height: u32, rng: &mut SimRng) -> Vec<Vec<Tile>> {
        let elevation = match self.terrain {
            Terrain::Water => 0.1,
            Terrain::Beach => 0.25,
            Terrain::Grass => 0.4,
            Terrain::Forest => 0.6,
            Terrain::Rocky => 0.8,
        };
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        (0..h)
            .map(|y| {
                (0..w)
                    .map(|x| {
                        let mut tile = Tile::new(Position::new(x, y), elevation, self.terrain);
                        if self.with_resources {
                            seed_resources(&mut tile, rng);
                        }
                        tile
                    })
                    .collect()
            })
            .collect()
    }
}
