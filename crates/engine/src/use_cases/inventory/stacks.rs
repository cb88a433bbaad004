//! Splitting and merging stacks.

use chronicle_domain::{CharacterInventory, Item, ItemId};

use super::error::InventoryError;

/// Move `quantity` units of a stack into a new item with `new_id`.
///
/// The new stack is placed right after its source, both in the item list
/// and in a manual sort order, and starts unequipped.
pub(super) fn split(
    inventory: &mut CharacterInventory,
    item_id: ItemId,
    quantity: u32,
    new_id: ItemId,
) -> Result<ItemId, InventoryError> {
    let position = inventory
        .position(item_id)
        .ok_or(InventoryError::ItemNotFound(item_id))?;
    let source = &mut inventory.items[position];

    if source.is_container {
        return Err(InventoryError::IncompatibleStacks(
            "containers do not split".to_string(),
        ));
    }
    if quantity == 0 || quantity >= source.count {
        return Err(InventoryError::InvalidQuantity {
            quantity,
            count: source.count,
        });
    }

    source.count -= quantity;
    let mut split_off = source.clone();
    split_off.existed_id = new_id;
    split_off.count = quantity;
    inventory.items.insert(position + 1, split_off);

    if let Some(order_pos) = inventory.item_sort_order.iter().position(|id| *id == item_id) {
        inventory.item_sort_order.insert(order_pos + 1, new_id);
    }
    Ok(new_id)
}

/// Why two items cannot share a stack, if they cannot.
pub fn merge_blocker(inventory: &CharacterInventory, source: &Item, target: &Item) -> Option<String> {
    if source.existed_id == target.existed_id {
        return Some("an item cannot be merged into itself".to_string());
    }
    if source.name != target.name {
        return Some(format!("{} and {} are different items", source.name, target.name));
    }
    if source.is_equippable() || target.is_equippable() {
        return Some("equippable items do not stack".to_string());
    }
    if source.is_container || target.is_container {
        return Some("containers do not stack".to_string());
    }
    if inventory.is_equipped(source.existed_id) || inventory.is_equipped(target.existed_id) {
        return Some("equipped items do not stack".to_string());
    }
    if (source.has_resource() || target.has_resource())
        && !(source.is_resource_full() && target.is_resource_full())
    {
        return Some("partly used items do not stack".to_string());
    }
    None
}

/// Fold `source` into `target`. Returns the merged count.
pub(super) fn merge(
    inventory: &mut CharacterInventory,
    source_id: ItemId,
    target_id: ItemId,
) -> Result<u32, InventoryError> {
    let source = inventory
        .get(source_id)
        .ok_or(InventoryError::ItemNotFound(source_id))?;
    let target = inventory
        .get(target_id)
        .ok_or(InventoryError::ItemNotFound(target_id))?;

    if let Some(reason) = merge_blocker(inventory, source, target) {
        return Err(InventoryError::IncompatibleStacks(reason));
    }
    let merged = target
        .count
        .checked_add(source.count)
        .ok_or_else(|| InventoryError::IncompatibleStacks("stack would overflow".to_string()))?;

    if let Some(target) = inventory.get_mut(target_id) {
        target.count = merged;
    }
    inventory.items.retain(|item| item.existed_id != source_id);
    inventory.forget(source_id);
    Ok(merged)
}
