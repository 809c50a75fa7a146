//! Inventory operations with checked arithmetic.
//!
//! Inventories are sparse maps: absent keys mean zero and a count that
//! reaches zero is removed. Every function here either fully applies or
//! leaves the map untouched.

use std::collections::BTreeMap;

use castaway_types::Resource;

use crate::error::AgentError;

/// Check whether the inventory contains at least `amount` of `resource`.
pub fn has_resource(inventory: &BTreeMap<Resource, u32>, resource: Resource, amount: u32) -> bool {
    inventory.get(&resource).copied().unwrap_or(0) >= amount
}

/// Add `amount` units of `resource`.
///
/// Fails on `u32` overflow. Adding zero is a no-op.
pub fn add_resource(
    inventory: &mut BTreeMap<Resource, u32>,
    resource: Resource,
    amount: u32,
) -> Result<(), AgentError> {
    if amount == 0 {
        return Ok(());
    }
    let current = inventory.get(&resource).copied().unwrap_or(0);
    let updated = current.checked_add(amount).ok_or(AgentError::InventoryOverflow {
        resource,
        attempted: amount,
        current,
    })?;
    inventory.insert(resource, updated);
    Ok(())
}

/// Remove `amount` units of `resource`.
///
/// Fails if the inventory holds less. Removes the key at zero.
pub fn remove_resource(
    inventory: &mut BTreeMap<Resource, u32>,
    resource: Resource,
    amount: u32,
) -> Result<(), AgentError> {
    let current = inventory.get(&resource).copied().unwrap_or(0);
    let remaining = current
        .checked_sub(amount)
        .ok_or(AgentError::InsufficientResource {
            resource,
            requested: amount,
            available: current,
        })?;
    if remaining == 0 {
        inventory.remove(&resource);
    } else {
        inventory.insert(resource, remaining);
    }
    Ok(())
}

/// Swap `consume` for `produce` atomically.
///
/// Checks every input and every output before touching the map, so a
/// failure leaves it unchanged.
pub fn exchange(
    inventory: &mut BTreeMap<Resource, u32>,
    consume: &[(Resource, u32)],
    produce: &[(Resource, u32)],
) -> Result<(), AgentError> {
    let mut staged = inventory.clone();
    for &(resource, amount) in consume {
        remove_resource(&mut staged, resource, amount)?;
    }
    for &(resource, amount) in produce {
        add_resource(&mut staged, resource, amount)?;
    }
    *inventory = staged;
    Ok(())
}

/// Drain all resources, returning them as a new map.
///
/// The inventory is left empty. Used when a dead agent's belongings are
/// dropped on the ground.
pub const fn drain_all(inventory: &mut BTreeMap<Resource, u32>) -> BTreeMap<Resource, u32> {
    let mut dropped = BTreeMap::new();
    core::mem::swap(inventory, &mut dropped);
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_resource_zero_requested() {
        let inv = BTreeMap::new();
        assert!(has_resource(&inv, Resource::Wood, 0));
        assert!(!has_resource(&inv, Resource::Wood, 1));
    }

    #[test]
    fn remove_to_zero_drops_key() {
        let mut inv = BTreeMap::from([(Resource::Stone, 2)]);
        assert!(remove_resource(&mut inv, Resource::Stone, 2).is_ok());
        assert!(inv.is_empty());
    }

    #[test]
    fn remove_more_than_held_leaves_inventory() {
        let mut inv = BTreeMap::from([(Resource::Stone, 1)]);
        let result = remove_resource(&mut inv, Resource::Stone, 2);
        assert_eq!(
            result,
            Err(AgentError::InsufficientResource {
                resource: Resource::Stone,
                requested: 2,
                available: 1,
            })
        );
        assert_eq!(inv.get(&Resource::Stone).copied(), Some(1));
    }

    #[test]
    fn add_overflow_is_rejected() {
        let mut inv = BTreeMap::from([(Resource::Food, u32::MAX)]);
        assert!(add_resource(&mut inv, Resource::Food, 1).is_err());
        assert_eq!(inv.get(&Resource::Food).copied(), Some(u32::MAX));
    }

    #[test]
    fn exchange_is_atomic() {
        let mut inv = BTreeMap::from([(Resource::Wood, 1), (Resource::Stone, 1)]);
        let before = inv.clone();
        let result = exchange(
            &mut inv,
            &[(Resource::Wood, 1), (Resource::Stone, 1), (Resource::Rope, 1)],
            &[(Resource::Tool, 1)],
        );
        assert!(result.is_err());
        assert_eq!(inv, before);

        inv.insert(Resource::Rope, 1);
        assert!(exchange(
            &mut inv,
            &[(Resource::Wood, 1), (Resource::Stone, 1), (Resource::Rope, 1)],
            &[(Resource::Tool, 1)],
        )
        .is_ok());
        assert_eq!(inv, BTreeMap::from([(Resource::Tool, 1)]));
    }

    #[test]
    fn drain_all_empties() {
        let mut inv = BTreeMap::from([(Resource::Wood, 3)]);
        let dropped = drain_all(&mut inv);
        assert!(inv.is_empty());
        assert_eq!(dropped.get(&Resource::Wood).copied(), Some(3));
    }
}
