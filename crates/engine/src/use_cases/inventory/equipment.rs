//! Equip and unequip.

use chronicle_domain::{CharacterInventory, EquipmentSlot, ItemId};

use super::containers;
use super::error::InventoryError;

/// Result of equipping an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipOutcome {
    pub slot: EquipmentSlot,
    /// Item that previously occupied the slot
    pub displaced: Option<ItemId>,
    /// Other slots the item was moved out of
    pub vacated: Vec<EquipmentSlot>,
}

pub(super) fn equip(
    inventory: &mut CharacterInventory,
    item_id: ItemId,
    slot: EquipmentSlot,
) -> Result<EquipOutcome, InventoryError> {
    let item = inventory
        .get(item_id)
        .ok_or(InventoryError::ItemNotFound(item_id))?;

    if slot == EquipmentSlot::Unknown {
        return Err(InventoryError::InvalidSlot {
            item: item_id,
            slot,
            reason: "unrecognized slot",
        });
    }
    if !item.equipment_slot.contains(slot) {
        return Err(InventoryError::InvalidSlot {
            item: item_id,
            slot,
            reason: "the item does not fit this slot",
        });
    }
    if item.is_broken() {
        return Err(InventoryError::InvalidSlot {
            item: item_id,
            slot,
            reason: "the item is broken",
        });
    }

    if item.is_container && containers::name_taken_at(inventory, item, &[]) {
        return Err(InventoryError::InvalidTarget(format!(
            "a container named {} is already carried",
            item.name
        )));
    }

    let displaced = inventory
        .equipped_items
        .get(&slot)
        .copied()
        .filter(|current| *current != item_id);
    let vacated: Vec<EquipmentSlot> = inventory
        .slots_of(item_id)
        .into_iter()
        .filter(|s| *s != slot)
        .collect();

    inventory.equipped_items.retain(|_, equipped| *equipped != item_id);
    inventory.equipped_items.insert(slot, item_id);
    // Worn gear is never inside a container.
    containers::relocate(inventory, item_id, Vec::new());

    Ok(EquipOutcome {
        slot,
        displaced,
        vacated,
    })
}

/// Take an item out of every slot. Unequipping an unequipped item is a no-op.
pub(super) fn unequip(
    inventory: &mut CharacterInventory,
    item_id: ItemId,
) -> Result<Vec<EquipmentSlot>, InventoryError> {
    if !inventory.contains(item_id) {
        return Err(InventoryError::ItemNotFound(item_id));
    }
    let slots = inventory.slots_of(item_id);
    inventory.equipped_items.retain(|_, equipped| *equipped != item_id);
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_domain::{EntityName, Item, SlotSet};

    fn name(s: &str) -> EntityName {
        EntityName::new(s).unwrap()
    }

    #[test]
    fn nested_container_cannot_be_lifted_beside_its_namesake() {
        let pouch = Item::new(name("Pouch")).as_container();
        let gem = Item::new(name("Gem")).inside(vec!["Pouch".into()]);
        let backpack = Item::new(name("Backpack")).as_container();
        let inner = Item::new(name("Pouch"))
            .as_container()
            .with_slots(SlotSet::single(EquipmentSlot::Waist))
            .inside(vec!["Backpack".into()]);
        let coin = Item::new(name("Coin")).inside(vec!["Backpack".into(), "Pouch".into()]);
        let inner_id = inner.existed_id;
        let mut inventory = CharacterInventory::with_items(vec![pouch, gem, backpack, inner, coin]);
        let before = inventory.clone();

        let err = equip(&mut inventory, inner_id, EquipmentSlot::Waist).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidTarget(_)));
        assert_eq!(inventory, before);
    }

    fn ring() -> Item {
        Item::new(name("Ring")).with_slots(SlotSet::from_slots([
            EquipmentSlot::Ring1,
            EquipmentSlot::Ring2,
        ]))
    }

    #[test]
    fn equip_then_unequip_restores_slot() {
        let ring = ring();
        let id = ring.existed_id;
        let mut inventory = CharacterInventory::with_items(vec![ring]);
        let before = inventory.equipped_items.clone();

        equip(&mut inventory, id, EquipmentSlot::Ring1).unwrap();
        assert_eq!(inventory.equipped_items.get(&EquipmentSlot::Ring1), Some(&id));

        let removed = unequip(&mut inventory, id).unwrap();
        assert_eq!(removed, vec![EquipmentSlot::Ring1]);
        assert_eq!(inventory.equipped_items, before);
    }

    #[test]
    fn item_occupies_one_slot_at_a_time() {
        let ring = ring();
        let id = ring.existed_id;
        let mut inventory = CharacterInventory::with_items(vec![ring]);

        equip(&mut inventory, id, EquipmentSlot::Ring1).unwrap();
        let outcome = equip(&mut inventory, id, EquipmentSlot::Ring2).unwrap();

        assert_eq!(outcome.vacated, vec![EquipmentSlot::Ring1]);
        assert_eq!(inventory.slots_of(id), vec![EquipmentSlot::Ring2]);
    }

    #[test]
    fn equipping_displaces_previous_item() {
        let first = ring();
        let second = ring();
        let (a, b) = (first.existed_id, second.existed_id);
        let mut inventory = CharacterInventory::with_items(vec![first, second]);

        equip(&mut inventory, a, EquipmentSlot::Ring1).unwrap();
        let outcome = equip(&mut inventory, b, EquipmentSlot::Ring1).unwrap();
        assert_eq!(outcome.displaced, Some(a));
        assert!(!inventory.is_equipped(a));
    }

    #[test]
    fn rejects_wrong_slot_and_unknown_slot() {
        let ring = ring();
        let id = ring.existed_id;
        let mut inventory = CharacterInventory::with_items(vec![ring]);

        let err = equip(&mut inventory, id, EquipmentSlot::Head).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidSlot { .. }));
        let err = equip(&mut inventory, id, EquipmentSlot::Unknown).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidSlot { .. }));
        assert!(inventory.equipped_items.is_empty());
    }

    #[test]
    fn rejects_broken_items() {
        let ring = ring().with_durability("0%");
        let id = ring.existed_id;
        let mut inventory = CharacterInventory::with_items(vec![ring]);

        let err = equip(&mut inventory, id, EquipmentSlot::Ring1).unwrap_err();
        assert_eq!(
            err,
            InventoryError::InvalidSlot {
                item: id,
                slot: EquipmentSlot::Ring1,
                reason: "the item is broken"
            }
        );
    }

    #[test]
    fn equipping_lifts_item_out_of_container() {
        let bag = Item::new(name("Bag")).as_container();
        let ring = ring().inside(vec!["Bag".into()]);
        let id = ring.existed_id;
        let mut inventory = CharacterInventory::with_items(vec![bag, ring]);

        equip(&mut inventory, id, EquipmentSlot::Ring2).unwrap();
        assert!(inventory.get(id).unwrap().contents_path.is_empty());
    }

    #[test]
    fn missing_item_is_not_found() {
        let mut inventory = CharacterInventory::new();
        let id = ItemId::new();
        assert_eq!(
            equip(&mut inventory, id, EquipmentSlot::Head),
            Err(InventoryError::ItemNotFound(id))
        );
        assert_eq!(unequip(&mut inventory, id), Err(InventoryError::ItemNotFound(id)));
    }
}
