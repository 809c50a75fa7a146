//! Static recipe and construction tables.
//!
//! | Recipe | Consumes                   | Produces |
//! |--------|----------------------------|----------|
//! | Rope   | 2 fiber                    | 1 rope   |
//! | Plank  | 1 wood                     | 2 plank  |
//! | Tool   | 1 wood + 1 stone + 1 rope  | 1 tool   |
//!
//! | Structure | Cost                 |
//! |-----------|----------------------|
//! | Shelter   | 4 wood + 2 fiber     |
//! | Storage   | 4 plank + 2 rope     |
//! | Campfire  | 2 wood + 3 stone     |

use castaway_types::{Recipe, Resource, StructureType};

// ---------------------------------------------------------------------------
// CraftRecipe
// ---------------------------------------------------------------------------

/// Inputs and outputs of one crafting recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CraftRecipe {
    /// Which recipe this is.
    pub recipe: Recipe,
    /// Materials consumed.
    pub inputs: &'static [(Resource, u32)],
    /// Products created.
    pub outputs: &'static [(Resource, u32)],
}

/// Look up a recipe.
pub const fn recipe_for(recipe: Recipe) -> CraftRecipe {
    match recipe {
        Recipe::Rope => CraftRecipe {
            recipe,
            inputs: &[(Resource::Fiber, 2)],
            outputs: &[(Resource::Rope, 1)],
        },
        Recipe::Plank => CraftRecipe {
            recipe,
            inputs: &[(Resource::Wood, 1)],
            outputs: &[(Resource::Plank, 2)],
        },
        Recipe::Tool => CraftRecipe {
            recipe,
            inputs: &[(Resource::Wood, 1), (Resource::Stone, 1), (Resource::Rope, 1)],
            outputs: &[(Resource::Tool, 1)],
        },
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Materials consumed to build a structure.
pub const fn build_cost(structure: StructureType) -> &'static [(Resource, u32)] {
    match structure {
        StructureType::Shelter => &[(Resource::Wood, 4), (Resource::Fiber, 2)],
        StructureType::Storage => &[(Resource::Plank, 4), (Resource::Rope, 2)],
        StructureType::Campfire => &[(Resource::Wood, 2), (Resource::Stone, 3)],
    }
}
