//! Inventory operation errors.

use chronicle_domain::{EquipmentSlot, ItemId};

/// Errors that can occur during inventory operations.
///
/// Every failing operation leaves the inventory untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InventoryError {
    #[error("Character not found: {0}")]
    CharacterNotFound(String),
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("Item {item} cannot go in slot {slot}: {reason}")]
    InvalidSlot {
        item: ItemId,
        slot: EquipmentSlot,
        reason: &'static str,
    },
    #[error("Invalid quantity {quantity} for a stack of {count}")]
    InvalidQuantity { quantity: u32, count: u32 },
    #[error("Stacks cannot be merged: {0}")]
    IncompatibleStacks(String),
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}
