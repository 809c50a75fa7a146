//! Spatial memory: remembered points of interest on the map.
//!
//! When an agent perceives a tile it may remember it under one or more
//! categories:
//!
//! - a natural resource, if the tile carries more than one unit of it
//! - a crop, if the tile hosts a live field
//! - a structure, keyed by structure type
//!
//! A new memory is only recorded if no memory of the same category lies
//! within the deduplication radius (Manhattan). A memory at the exact same
//! position is refreshed instead. Each category is then pruned to the
//! top-N by importance tier, then recency. Tiers come from the owning
//! agent's current scarcity, so a well-stocked agent stops caring about
//! wood piles while a hungry one ranks every berry bush as critical.

use std::collections::BTreeMap;

use castaway_types::{Agent, ImportanceTier, Position, Resource, SpatialCategory, SpatialMemory, StructureType};
use castaway_world::Tile;

/// Minimum tile quantity (exclusive) for a resource to be noteworthy.
const NOTABLE_QUANTITY: u32 = 1;

/// Importance tier of a category for `agent` right now.
pub fn importance_tier(agent: &Agent, category: SpatialCategory) -> ImportanceTier {
    match category {
        SpatialCategory::Resource(resource) => match agent.count(resource) {
            0 => ImportanceTier::Critical,
            1..=2 => ImportanceTier::High,
            3..=5 => ImportanceTier::Medium,
            _ => ImportanceTier::Low,
        },
        SpatialCategory::Crop => {
            if agent.count(Resource::Food) == 0 {
                ImportanceTier::Critical
            } else {
                ImportanceTier::Medium
            }
        }
        SpatialCategory::Structure(StructureType::Shelter) => ImportanceTier::Medium,
        SpatialCategory::Structure(_) => ImportanceTier::Low,
    }
}

/// The noteworthy categories on a tile, with the observed quantity.
fn notable(tile: &Tile) -> Vec<(SpatialCategory, u32)> {
    let mut found: Vec<(SpatialCategory, u32)> = tile
        .resources
        .iter()
        .filter(|&(resource, &n)| resource.is_natural() && n > NOTABLE_QUANTITY)
        .map(|(&resource, &n)| (SpatialCategory::Resource(resource), n))
        .collect();
    if tile.live_crop().is_some() {
        found.push((SpatialCategory::Crop, 1));
    }
    if let Some(structure) = &tile.structure {
        found.push((SpatialCategory::Structure(structure.kind), 1));
    }
    found
}

/// Observe one tile at `tick`. Returns how many memories were added.
pub fn observe_tile(agent: &mut Agent, tile: &Tile, tick: u64, dedup_radius: u32) -> usize {
    let mut added = 0_usize;
    for (category, quantity) in notable(tile) {
        if let Some(existing) = agent
            .spatial_memory
            .iter_mut()
            .find(|m| m.category == category && m.position == tile.position)
        {
            existing.last_seen = tick;
            existing.quantity = quantity;
            continue;
        }
        let crowded = agent
            .spatial_memory
            .iter()
            .any(|m| m.category == category && m.position.manhattan(tile.position) <= dedup_radius);
        if crowded {
            continue;
        }
        let tier = importance_tier(agent, category);
        agent.spatial_memory.push(SpatialMemory {
            category,
            position: tile.position,
            last_seen: tick,
            quantity,
            tier,
        });
        added = added.saturating_add(1);
    }
    added
}

/// Forget remembered tiles that no longer hold what they were remembered
/// for. Only tiles currently in view can be re-checked.
pub fn forget_stale<'a>(agent: &mut Agent, visible: impl IntoIterator<Item = &'a Tile>) {
    let in_view: BTreeMap<Position, Vec<SpatialCategory>> = visible
        .into_iter()
        .map(|t| (t.position, notable(t).into_iter().map(|(c, _)| c).collect()))
        .collect();
    agent.spatial_memory.retain(|m| {
        in_view
            .get(&m.position)
            .is_none_or(|present| present.contains(&m.category))
    });
}

/// Re-rank every memory and keep the top `top_n` per category.
pub fn prune(agent: &mut Agent, top_n: usize) {
    let tiers: Vec<ImportanceTier> = agent
        .spatial_memory
        .iter()
        .map(|m| importance_tier(agent, m.category))
        .collect();
    for (memory, tier) in agent.spatial_memory.iter_mut().zip(tiers) {
        memory.tier = tier;
    }

    agent.spatial_memory.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| b.tier.cmp(&a.tier))
            .then_with(|| b.last_seen.cmp(&a.last_seen))
            .then_with(|| a.position.cmp(&b.position))
    });

    let mut kept: BTreeMap<SpatialCategory, usize> = BTreeMap::new();
    agent.spatial_memory.retain(|m| {
        let count = kept.entry(m.category).or_insert(0);
        *count = count.saturating_add(1);
        *count <= top_n
    });
}

/// Observe every tile in view, drop stale entries, and prune.
pub fn perceive<'a>(
    agent: &mut Agent,
    visible: impl IntoIterator<Item = &'a Tile> + Clone,
    tick: u64,
    dedup_radius: u32,
    top_n: usize,
) {
    forget_stale(agent, visible.clone());
    for tile in visible {
        observe_tile(agent, tile, tick, dedup_radius);
    }
    prune(agent, top_n);
}

/// Memories ranked for presentation: highest tier first, then most recent.
pub fn ranked(agent: &Agent) -> Vec<SpatialMemory> {
    let mut all = agent.spatial_memory.clone();
    all.sort_by(|a, b| {
        b.tier
            .cmp(&a.tier)
            .then_with(|| b.last_seen.cmp(&a.last_seen))
            .then_with(|| a.position.cmp(&b.position))
    });
    all
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use castaway_types::{Gender, IdMint, Terrain};

    use super::*;
    use crate::testing;

    fn forest(x: i32, y: i32, wood: u32) -> Tile {
        let mut tile = Tile::new(Position::new(x, y), 0.6, Terrain::Forest);
        tile.set_resource(Resource::Wood, wood);
        tile
    }

    #[test]
    fn single_unit_is_not_notable() {
        let mut mint = IdMint::new(0);
        let mut agent = testing::adult(&mut mint, Gender::Male, Position::new(0, 0));
        assert_eq!(observe_tile(&mut agent, &forest(1, 1, 1), 0, 8), 0);
        assert_eq!(observe_tile(&mut agent, &forest(1, 1, 2), 0, 8), 1);
    }

    #[test]
    fn nearby_duplicates_are_suppressed() {
        let mut mint = IdMint::new(0);
        let mut agent = testing::adult(&mut mint, Gender::Male, Position::new(0, 0));
        observe_tile(&mut agent, &forest(0, 0, 5), 0, 8);
        // Manhattan 8 away: suppressed.
        assert_eq!(observe_tile(&mut agent, &forest(4, 4, 5), 1, 8), 0);
        // Manhattan 9 away: kept.
        assert_eq!(observe_tile(&mut agent, &forest(5, 4, 5), 2, 8), 1);
        assert_eq!(agent.spatial_memory.len(), 2);
    }

    #[test]
    fn same_tile_refreshes() {
        let mut mint = IdMint::new(0);
        let mut agent = testing::adult(&mut mint, Gender::Male, Position::new(0, 0));
        observe_tile(&mut agent, &forest(2, 2, 5), 0, 8);
        observe_tile(&mut agent, &forest(2, 2, 3), 9, 8);
        assert_eq!(agent.spatial_memory.len(), 1);
        let memory = agent.spatial_memory.first().unwrap();
        assert_eq!(memory.last_seen, 9);
        assert_eq!(memory.quantity, 3);
    }

    #[test]
    fn tier_reflects_scarcity() {
        let mut mint = IdMint::new(0);
        let mut agent = testing::adult(&mut mint, Gender::Male, Position::new(0, 0));
        let wood = SpatialCategory::Resource(Resource::Wood);
        assert_eq!(importance_tier(&agent, wood), ImportanceTier::Critical);
        agent.inventory.insert(Resource::Wood, 2);
        assert_eq!(importance_tier(&agent, wood), ImportanceTier::High);
        agent.inventory.insert(Resource::Wood, 5);
        assert_eq!(importance_tier(&agent, wood), ImportanceTier::Medium);
        agent.inventory.insert(Resource::Wood, 6);
        assert_eq!(importance_tier(&agent, wood), ImportanceTier::Low);
        assert_eq!(importance_tier(&agent, SpatialCategory::Crop), ImportanceTier::Critical);
    }

    #[test]
    fn prune_keeps_most_recent_within_tier() {
        let mut mint = IdMint::new(0);
        let mut agent = testing::adult(&mut mint, Gender::Male, Position::new(0, 0));
        for i in 0..4 {
            observe_tile(&mut agent, &forest(i * 10, 0, 5), u64::try_from(i).unwrap(), 8);
        }
        prune(&mut agent, 2);
        assert_eq!(agent.spatial_memory.len(), 2);
        let seen: Vec<u64> = agent.spatial_memory.iter().map(|m| m.last_seen).collect();
        assert_eq!(seen, vec![3, 2]);
    }

    #[test]
    fn stale_memories_are_forgotten_when_seen() {
        let mut mint = IdMint::new(0);
        let mut agent = testing::adult(&mut mint, Gender::Male, Position::new(0, 0));
        observe_tile(&mut agent, &forest(1, 1, 5), 0, 8);
        let cleared = forest(1, 1, 0);
        forget_stale(&mut agent, [&cleared]);
        assert!(agent.spatial_memory.is_empty());
    }
}
