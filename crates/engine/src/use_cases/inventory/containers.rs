//! Container nesting.
//!
//! Items record their location as a path of container names
//! (`["Backpack", "Pouch"]`). A container's own contents live under its
//! inner path, so moving or renaming a container rewrites the paths of
//! everything below it.

use chronicle_domain::{CharacterInventory, Item, ItemId};

use super::error::InventoryError;

/// What a successful move changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub contents_path: Vec<String>,
    /// Slots the item was taken out of because it went into a container
    pub unequipped: Vec<chronicle_domain::EquipmentSlot>,
    /// Items carried along inside a moved container
    pub carried: Vec<ItemId>,
}

pub(super) fn move_to_container(
    inventory: &mut CharacterInventory,
    item_id: ItemId,
    target: Option<ItemId>,
) -> Result<MoveOutcome, InventoryError> {
    let item = inventory
        .get(item_id)
        .ok_or(InventoryError::ItemNotFound(item_id))?;

    let destination = match target {
        None => Vec::new(),
        Some(container_id) => {
            if container_id == item_id {
                return Err(InventoryError::InvalidTarget(
                    "an item cannot be placed inside itself".to_string(),
                ));
            }
            let container = inventory.get(container_id).ok_or_else(|| {
                InventoryError::InvalidTarget(format!(
                    "container {container_id} is not in this inventory"
                ))
            })?;
            if !container.is_container {
                return Err(InventoryError::InvalidTarget(format!(
                    "{} is not a container",
                    container.name
                )));
            }
            if item.is_container && container.is_within(&item.inner_path()) {
                return Err(InventoryError::InvalidTarget(format!(
                    "{} is inside {}",
                    container.name, item.name
                )));
            }
            container.inner_path()
        }
    };

    if item.is_container && name_taken_at(inventory, item, &destination) {
        return Err(InventoryError::InvalidTarget(format!(
            "a container named {} is already there",
            item.name
        )));
    }

    let unequipped = if destination.is_empty() {
        Vec::new()
    } else {
        let slots = inventory.slots_of(item_id);
        inventory.equipped_items.retain(|_, equipped| *equipped != item_id);
        slots
    };
    let carried = relocate(inventory, item_id, destination.clone());

    Ok(MoveOutcome {
        contents_path: destination,
        unequipped,
        carried,
    })
}

/// Whether another container with the item's name already sits at `path`.
pub(super) fn name_taken_at(inventory: &CharacterInventory, item: &Item, path: &[String]) -> bool {
    inventory.items.iter().any(|other| {
        other.existed_id != item.existed_id
            && other.is_container
            && other.name == item.name
            && other.contents_path == path
    })
}

/// Set an item's path and carry its contents along. Returns the carried IDs.
pub(super) fn relocate(
    inventory: &mut CharacterInventory,
    item_id: ItemId,
    destination: Vec<String>,
) -> Vec<ItemId> {
    let Some(item) = inventory.get_mut(item_id) else {
        return Vec::new();
    };
    let old_inner = item.is_container.then(|| item.inner_path());
    item.contents_path = destination;
    let new_inner = item.inner_path();

    match old_inner {
        Some(old_inner) if old_inner != new_inner => {
            rewrite_prefix(&mut inventory.items, &old_inner, &new_inner)
        }
        _ => Vec::new(),
    }
}

/// Replace `old_prefix` with `new_prefix` on every path under it.
pub(crate) fn rewrite_prefix(items: &mut [Item], old_prefix: &[String], new_prefix: &[String]) -> Vec<ItemId> {
    let mut touched = Vec::new();
    for item in items.iter_mut().filter(|i| i.is_within(old_prefix)) {
        let mut path = new_prefix.to_vec();
        path.extend_from_slice(&item.contents_path[old_prefix.len()..]);
        item.contents_path = path;
        touched.push(item.existed_id);
    }
    touched
}

/// IDs of everything nested (at any depth) inside `root`.
pub(crate) fn descendants(items: &[Item], root: &Item) -> Vec<ItemId> {
    if !root.is_container {
        return Vec::new();
    }
    let inner = root.inner_path();
    items
        .iter()
        .filter(|item| item.is_within(&inner))
        .map(|item| item.existed_id)
        .collect()
}

/// Remove an item and its contents from a list, returning them root first.
pub(crate) fn take_subtree(items: &mut Vec<Item>, item_id: ItemId) -> Vec<Item> {
    let Some(root) = items.iter().find(|i| i.existed_id == item_id) else {
        return Vec::new();
    };
    let mut ids = vec![item_id];
    ids.extend(descendants(items, root));

    let mut taken = Vec::with_capacity(ids.len());
    let mut kept = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if ids.contains(&item.existed_id) {
            taken.push(item);
        } else {
            kept.push(item);
        }
    }
    *items = kept;
    if let Some(pos) = taken.iter().position(|i| i.existed_id == item_id) {
        taken.swap(0, pos);
    }
    taken
}
