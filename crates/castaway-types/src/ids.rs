//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity in the simulation has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time.
//!
//! IDs are never derived from the wall clock. Replays must reproduce the
//! exact same identifiers, so the engine mints them from a seeded counter
//! via [`IdMint`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an agent.
    AgentId
}

define_id! {
    /// Unique identifier for a structure built on a tile.
    StructureId
}

define_id! {
    /// Unique identifier for a crop field planted on a grass tile.
    CropFieldId
}

define_id! {
    /// Unique identifier for an event in the event log.
    EventId
}

/// Deterministic identifier source.
///
/// Produces UUIDs from a `(namespace, counter)` pair so that two runs with
/// the same seed mint the same identifiers in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMint {
    namespace: u64,
    next: u64,
}

impl IdMint {
    /// Create a mint for the given namespace (usually the world seed).
    pub const fn new(namespace: u64) -> Self {
        Self { namespace, next: 0 }
    }

    /// Mint the next identifier of any ID type.
    pub fn mint<T: From<Uuid>>(&mut self) -> T {
        let id = Uuid::from_u64_pair(self.namespace, self.next);
        self.next = self.next.wrapping_add(1);
        T::from(id)
    }

    /// Number of identifiers minted so far.
    pub const fn issued(&self) -> u64 {
        self.next
    }
}
