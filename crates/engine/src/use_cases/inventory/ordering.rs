//! Display order of an inventory.
//!
//! Equipped items always come first. Within each group, items follow the
//! chosen criterion; ties keep their list order.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chronicle_domain::{CharacterInventory, Item, ItemId, SortCriteria, SortDirection};

pub fn display_order(inventory: &CharacterInventory) -> Vec<&Item> {
    let mut ordered: Vec<(usize, &Item)> = inventory.items.iter().enumerate().collect();

    match inventory.item_sort_criteria {
        SortCriteria::Manual => {
            let rank: HashMap<ItemId, usize> = inventory
                .item_sort_order
                .iter()
                .enumerate()
                .map(|(rank, id)| (*id, rank))
                .collect();
            ordered.sort_by_key(|(original, item)| match rank.get(&item.existed_id) {
                Some(rank) => (0, *rank, *original),
                None => (1, 0, *original),
            });
        }
        criteria => {
            let descending = inventory.item_sort_direction == SortDirection::Desc;
            ordered.sort_by(|(ia, a), (ib, b)| {
                let by_field = compare(a, b, criteria);
                let by_field = if descending { by_field.reverse() } else { by_field };
                by_field.then(ia.cmp(ib))
            });
        }
    }

    let (equipped, loose): (Vec<_>, Vec<_>) = ordered
        .into_iter()
        .map(|(_, item)| item)
        .partition(|item| inventory.is_equipped(item.existed_id));
    equipped.into_iter().chain(loose).collect()
}

fn compare(a: &Item, b: &Item, criteria: SortCriteria) -> Ordering {
    match criteria {
        SortCriteria::Name => a
            .name
            .as_str()
            .to_lowercase()
            .cmp(&b.name.as_str().to_lowercase()),
        SortCriteria::Quality => a.quality.rank().cmp(&b.quality.rank()),
        SortCriteria::Weight => a.weight.total_cmp(&b.weight),
        SortCriteria::Price => a.price.cmp(&b.price),
        SortCriteria::Type => type_key(a).cmp(&type_key(b)),
        SortCriteria::Manual => Ordering::Equal,
    }
}

fn type_key(item: &Item) -> String {
    item.item_type.as_deref().unwrap_or_default().to_lowercase()
}

/// Store a manual order, keeping the first occurrence of each known item.
pub(super) fn set_sort_order(inventory: &mut CharacterInventory, order: Vec<ItemId>) {
    let mut seen = HashSet::new();
    let cleaned: Vec<ItemId> = order
        .into_iter()
        .filter(|id| inventory.contains(*id) && seen.insert(*id))
        .collect();
    inventory.item_sort_order = cleaned;
}

/// Switching to manual with no stored order freezes the order on screen.
pub(super) fn set_sort_settings(
    inventory: &mut CharacterInventory,
    criteria: SortCriteria,
    direction: SortDirection,
) {
    if criteria == SortCriteria::Manual && inventory.item_sort_order.is_empty() {
        let current: Vec<ItemId> = display_order(inventory)
            .into_iter()
            .map(|item| item.existed_id)
            .collect();
        inventory.item_sort_order = current;
    }
    inventory.item_sort_criteria = criteria;
    inventory.item_sort_direction = direction;
}
