//! Consistency checks for a whole inventory.
//!
//! Used after loading saves and in tests; engine operations never produce
//! an inventory that fails them.

use std::collections::HashSet;

use chronicle_domain::{CharacterInventory, EquipmentSlot, ItemId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryViolation {
    DuplicateItemId(ItemId),
    EquippedItemMissing { slot: EquipmentSlot, item: ItemId },
    SlotNotAllowed { slot: EquipmentSlot, item: ItemId },
    EquippedInSeveralSlots(ItemId),
    /// The item's contents path names no container in this inventory
    OrphanedContents { item: ItemId, path: Vec<String> },
}

pub fn check_invariants(inventory: &CharacterInventory) -> Vec<InventoryViolation> {
    let mut violations = Vec::new();

    let mut seen = HashSet::new();
    for item in &inventory.items {
        if !seen.insert(item.existed_id) {
            violations.push(InventoryViolation::DuplicateItemId(item.existed_id));
        }
    }

    let mut equipped = HashSet::new();
    for (slot, item_id) in &inventory.equipped_items {
        match inventory.get(*item_id) {
            None => violations.push(InventoryViolation::EquippedItemMissing {
                slot: *slot,
                item: *item_id,
            }),
            Some(item) if !item.equipment_slot.contains(*slot) => {
                violations.push(InventoryViolation::SlotNotAllowed {
                    slot: *slot,
                    item: *item_id,
                })
            }
            Some(_) => {}
        }
        if !equipped.insert(*item_id) {
            violations.push(InventoryViolation::EquippedInSeveralSlots(*item_id));
        }
    }

    for item in &inventory.items {
        if !item.contents_path.is_empty() && inventory.container_at(&item.contents_path).is_none() {
            violations.push(InventoryViolation::OrphanedContents {
                item: item.existed_id,
                path: item.contents_path.clone(),
            });
        }
    }

    violations
}
