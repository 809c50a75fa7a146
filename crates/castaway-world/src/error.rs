//! Error types for the `castaway-world` crate.
//!
//! World construction is the only fallible operation here. Queries return
//! [`Option`] and the mutation helpers report failure as `false`/`None`,
//! because the tick pipeline treats a missing tile as a skip rather than a
//! fault.

use castaway_types::Position;

/// Errors that can occur while building or validating a world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The tile grid has no rows or no columns.
    #[error("tile grid is empty")]
    EmptyGrid,

    /// A row's length differs from the first row's.
    #[error("tile grid row {row} has {found} tiles, expected {expected}")]
    RaggedGrid {
        /// Offending row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// A tile's recorded position does not match its place in the grid.
    #[error("tile at row {row}, column {column} claims position {claimed}")]
    MisplacedTile {
        /// Row index in the grid.
        row: usize,
        /// Column index in the grid.
        column: usize,
        /// Position stored on the tile.
        claimed: Position,
    },

    /// The grid is larger than coordinates can address.
    #[error("grid dimension {0} exceeds the coordinate range")]
    TooLarge(usize),

    /// The grid has no walkable tile to place agents on.
    #[error("island has no walkable land")]
    NoLand,
}
