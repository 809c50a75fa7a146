//! The mutable aggregate root of the simulation.
//!
//! [`World`] owns the tile grid, every agent record, dropped item piles,
//! weather, and the clock. It is plain data plus queries: the tick engine
//! is its only mutator during a tick and the event log stores deep copies
//! of it as snapshots. Cloning a `World` always yields a fully independent
//! value.
//!
//! Grid rows are indexed by `y`, columns by `x`. All lookups go through
//! [`World::tile`] so that out-of-range coordinates become `None` instead
//! of a panic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use castaway_types::{Agent, AgentId, ItemPile, Position, Resource, Weather};

use crate::clock;
use crate::error::WorldError;
use crate::grid::{CropField, Tile};

/// The island and everything on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Number of columns.
    width: i32,
    /// Number of rows.
    height: i32,
    /// Tile grid, `tiles[y][x]`.
    tiles: Vec<Vec<Tile>>,
    /// Agents, including any that died this tick and await removal.
    pub agents: Vec<Agent>,
    /// Resources dropped on the ground.
    pub piles: Vec<ItemPile>,
    /// Current weather.
    pub weather: Weather,
    /// Current tick.
    pub tick: u64,
    /// Cached day/night flag for `tick`.
    pub is_day: bool,
}

impl World {
    /// Build a world from a tile grid, starting at tick 0 in sunshine.
    ///
    /// # Errors
    ///
    /// Returns a [`WorldError`] if the grid is empty, ragged, too large to
    /// address with `i32` coordinates, or has tiles whose stored position
    /// disagrees with their place in the grid.
    pub fn new(tiles: Vec<Vec<Tile>>) -> Result<Self, WorldError> {
        let expected = tiles.first().map_or(0, Vec::len);
        if tiles.is_empty() || expected == 0 {
            return Err(WorldError::EmptyGrid);
        }
        let width = i32::try_from(expected).map_err(|_err| WorldError::TooLarge(expected))?;
        let height = i32::try_from(tiles.len()).map_err(|_err| WorldError::TooLarge(tiles.len()))?;

        for (row, cells) in tiles.iter().enumerate() {
            if cells.len() != expected {
                return Err(WorldError::RaggedGrid {
                    row,
                    expected,
                    found: cells.len(),
                });
            }
            for (column, tile) in cells.iter().enumerate() {
                let matches = usize::try_from(tile.position.x).ok() == Some(column)
                    && usize::try_from(tile.position.y).ok() == Some(row);
                if !matches {
                    return Err(WorldError::MisplacedTile {
                        row,
                        column,
                        claimed: tile.position,
                    });
                }
            }
        }

        Ok(Self {
            width,
            height,
            tiles,
            agents: Vec::new(),
            piles: Vec::new(),
            weather: Weather::default(),
            tick: 0,
            is_day: clock::is_daytime(0),
        })
    }

    // -------------------------------------------------------------------
    // Grid
    // -------------------------------------------------------------------

    /// Number of columns.
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Whether `position` lies on the grid.
    pub const fn in_bounds(&self, position: Position) -> bool {
        position.x >= 0 && position.y >= 0 && position.x < self.width && position.y < self.height
    }

    /// The tile at `position`.
    pub fn tile(&self, position: Position) -> Option<&Tile> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        self.tiles.get(y)?.get(x)
    }

    /// Mutable access to the tile at `position`.
    pub fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        self.tiles.get_mut(y)?.get_mut(x)
    }

    /// Whether `position` is on the grid and not water.
    pub fn is_walkable(&self, position: Position) -> bool {
        self.tile(position).is_some_and(Tile::is_walkable)
    }

    /// Every tile, row-major.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    /// Every tile mutably, row-major.
    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut().flatten()
    }

    /// Tiles within Chebyshev `radius` of `center`, row-major, clipped to
    /// the grid.
    pub fn tiles_within(&self, center: Position, radius: u32) -> impl Iterator<Item = &Tile> {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        let (lo_y, hi_y) = (center.y.saturating_sub(r), center.y.saturating_add(r));
        let (lo_x, hi_x) = (center.x.saturating_sub(r), center.x.saturating_add(r));
        (lo_y.max(0)..=hi_y.min(self.height.saturating_sub(1))).flat_map(move |y| {
            (lo_x.max(0)..=hi_x.min(self.width.saturating_sub(1)))
                .filter_map(move |x| self.tile(Position::new(x, y)))
        })
    }

    /// Positions of every walkable tile, row-major.
    pub fn walkable_positions(&self) -> Vec<Position> {
        self.tiles()
            .filter(|t| t.is_walkable())
            .map(|t| t.position)
            .collect()
    }

    /// Every crop field that has not been harvested, mutably.
    pub fn live_crops_mut(&mut self) -> impl Iterator<Item = &mut CropField> {
        self.tiles_mut()
            .filter_map(|t| t.crop.as_mut())
            .filter(|c| !c.harvested)
    }

    // -------------------------------------------------------------------
    // Agents
    // -------------------------------------------------------------------

    /// Add an agent record.
    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    /// The agent with `id`, dead or alive.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Mutable access to the agent with `id`.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    /// Two distinct agents, mutably. `None` if either is missing or the ids
    /// are equal.
    pub fn agent_pair_mut(&mut self, a: AgentId, b: AgentId) -> Option<(&mut Agent, &mut Agent)> {
        let i = self.agents.iter().position(|x| x.id == a)?;
        let j = self.agents.iter().position(|x| x.id == b)?;
        if i < j {
            let (left, right) = self.agents.split_at_mut(j);
            Some((left.get_mut(i)?, right.first_mut()?))
        } else if j < i {
            let (left, right) = self.agents.split_at_mut(i);
            let second = left.get_mut(j)?;
            Some((right.first_mut()?, second))
        } else {
            None
        }
    }

    /// Living agents in storage order.
    pub fn living_agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.alive)
    }

    /// Ids of living agents in storage order.
    pub fn living_ids(&self) -> Vec<AgentId> {
        self.living_agents().map(|a| a.id).collect()
    }

    /// Living agents within Chebyshev `radius` of `center`.
    pub fn agents_within(&self, center: Position, radius: u32) -> impl Iterator<Item = &Agent> {
        self.living_agents()
            .filter(move |a| a.location.chebyshev(center) <= radius)
    }

    /// Drop dead agents from the active set. Returns how many were removed.
    pub fn remove_dead(&mut self) -> usize {
        let before = self.agents.len();
        self.agents.retain(|a| a.alive);
        before.saturating_sub(self.agents.len())
    }

    // -------------------------------------------------------------------
    // Item piles
    // -------------------------------------------------------------------

    /// Leave a pile on the ground. Empty entries are discarded; returns
    /// `false` and adds nothing if no entry is left.
    pub fn drop_pile(&mut self, position: Position, items: BTreeMap<Resource, u32>, tick: u64) -> bool {
        let inventory: BTreeMap<Resource, u32> = items.into_iter().filter(|&(_, n)| n > 0).collect();
        if inventory.is_empty() {
            return false;
        }
        self.piles.push(ItemPile {
            position,
            inventory,
            dropped_at: tick,
        });
        true
    }

    /// Combined contents of every pile at `position`.
    pub fn pile_contents(&self, position: Position) -> BTreeMap<Resource, u32> {
        let mut total = BTreeMap::new();
        for pile in self.piles.iter().filter(|p| p.position == position) {
            for (&resource, &count) in &pile.inventory {
                let slot = total.entry(resource).or_insert(0_u32);
                *slot = slot.saturating_add(count);
            }
        }
        total
    }

    /// Take one unit of `resource` from the oldest pile at `position` that
    /// holds it. Emptied piles are removed.
    pub fn take_from_pile(&mut self, position: Position, resource: Resource) -> bool {
        let Some(index) = self
            .piles
            .iter()
            .position(|p| p.position == position && p.inventory.get(&resource).is_some_and(|&n| n > 0))
        else {
            return false;
        };
        let Some(pile) = self.piles.get_mut(index) else {
            return false;
        };
        if let Some(count) = pile.inventory.get_mut(&resource) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                pile.inventory.remove(&resource);
            }
        }
        if pile.inventory.is_empty() {
            self.piles.remove(index);
        }
        true
    }

    // -------------------------------------------------------------------
    // Clock
    // -------------------------------------------------------------------

    /// Advance to the next tick and recompute day/night.
    pub const fn advance_clock(&mut self) {
        self.tick = self.tick.saturating_add(1);
        self.is_day = clock::is_daytime(self.tick);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use castaway_types::{Gender, IdMint, LifeStage, Personality, Terrain};

    use super::*;

    /// A `width x height` grass world with a water column at `x = 0`.
    pub(crate) fn small_world(width: i32, height: i32) -> World {
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

    pub(crate) fn bare_agent(mint: &mut IdMint, location: Position) -> Agent {
        Agent {
            id: mint.mint(),
            name: String::from("Test"),
            gender: Gender::Female,
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

    #[test]
    fn rejects_empty_and_ragged_grids() {
        assert!(matches!(World::new(Vec::new()), Err(WorldError::EmptyGrid)));
        let ragged = vec![
            vec![Tile::new(Position::new(0, 0), 0.4, Terrain::Grass)],
            Vec::new(),
        ];
        assert!(matches!(World::new(ragged), Err(WorldError::RaggedGrid { row: 1, .. })));
    }

    #[test]
    fn rejects_misplaced_tiles() {
        let grid = vec![vec![Tile::new(Position::new(3, 3), 0.4, Terrain::Grass)]];
        assert!(matches!(World::new(grid), Err(WorldError::MisplacedTile { .. })));
    }

    #[test]
    fn out_of_bounds_lookups_are_none() {
        let world = small_world(4, 3);
        assert!(world.tile(Position::new(-1, 0)).is_none());
        assert!(world.tile(Position::new(4, 0)).is_none());
        assert!(world.tile(Position::new(3, 2)).is_some());
        assert!(!world.is_walkable(Position::new(0, 1)));
        assert!(world.is_walkable(Position::new(1, 1)));
    }

    #[test]
    fn tiles_within_clips_to_grid() {
        let world = small_world(5, 5);
        assert_eq!(world.tiles_within(Position::new(0, 0), 1).count(), 4);
        assert_eq!(world.tiles_within(Position::new(2, 2), 1).count(), 9);
        assert_eq!(world.tiles_within(Position::new(2, 2), 10).count(), 25);
    }

    #[test]
    fn agent_pair_mut_requires_distinct_ids() {
        let mut mint = IdMint::new(0);
        let mut world = small_world(3, 3);
        let a = bare_agent(&mut mint, Position::new(1, 1));
        let b = bare_agent(&mut mint, Position::new(2, 1));
        let (ida, idb) = (a.id, b.id);
        world.add_agent(a);
        world.add_agent(b);

        let (first, second) = world.agent_pair_mut(idb, ida).unwrap();
        assert_eq!(first.id, idb);
        assert_eq!(second.id, ida);
        assert!(world.agent_pair_mut(ida, ida).is_none());
    }

    #[test]
    fn piles_drain_and_disappear() {
        let mut world = small_world(3, 3);
        let at = Position::new(1, 1);
        assert!(!world.drop_pile(at, BTreeMap::from([(Resource::Wood, 0)]), 1));
        assert!(world.drop_pile(at, BTreeMap::from([(Resource::Wood, 1), (Resource::Food, 0)]), 1));
        assert_eq!(world.pile_contents(at), BTreeMap::from([(Resource::Wood, 1)]));
        assert!(world.take_from_pile(at, Resource::Wood));
        assert!(world.piles.is_empty());
        assert!(!world.take_from_pile(at, Resource::Wood));
    }

    #[test]
    fn remove_dead_keeps_living() {
        let mut mint = IdMint::new(0);
        let mut world = small_world(3, 3);
        let mut dead = bare_agent(&mut mint, Position::new(1, 1));
        dead.alive = false;
        world.add_agent(dead);
        world.add_agent(bare_agent(&mut mint, Position::new(1, 1)));
        assert_eq!(world.remove_dead(), 1);
        assert_eq!(world.agents.len(), 1);
    }

    #[test]
    fn clock_advances_day_flag() {
        let mut world = small_world(2, 2);
        world.tick = 5;
        world.advance_clock();
        assert_eq!(world.tick, 6);
        assert!(world.is_day);
    }

    #[test]
    fn clone_is_independent() {
        let mut world = small_world(3, 3);
        let snapshot = world.clone();
        if let Some(tile) = world.tile_mut(Position::new(1, 1)) {
            tile.set_resource(Resource::Food, 2);
        }
        assert_ne!(world, snapshot);
        assert_eq!(snapshot.tile(Position::new(1, 1)).unwrap().resource(Resource::Food), 0);
    }
}
