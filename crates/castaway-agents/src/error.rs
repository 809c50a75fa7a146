//! Error types for the castaway-agents crate.
//!
//! Inventory arithmetic returns typed errors rather than panicking. Action
//! preconditions are not errors: they are reported as
//! [`Skip`](crate::actions::Skip) values.

use castaway_types::Resource;

/// Errors that can occur during agent state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// Attempted to remove more of a resource than the agent holds.
    #[error("insufficient resource: wanted {requested} of {resource} but only have {available}")]
    InsufficientResource {
        /// The resource type being removed.
        resource: Resource,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity actually held.
        available: u32,
    },

    /// Adding to an inventory would overflow its counter.
    #[error("inventory overflow: adding {attempted} of {resource} to {current}")]
    InventoryOverflow {
        /// The resource type being added.
        resource: Resource,
        /// The quantity the caller attempted to add.
        attempted: u32,
        /// The quantity already held.
        current: u32,
    },
}
