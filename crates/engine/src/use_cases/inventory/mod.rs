//! Inventory use cases.
//!
//! Player-initiated inventory changes. Every operation works on one
//! character's inventory inside the world and is atomic: it either applies
//! completely or fails without touching anything.

mod containers;
mod equipment;
mod error;
mod invariants;
mod ordering;
mod stacks;

use std::sync::Arc;

use chronicle_domain::{
    CharacterInventory, EquipmentSlot, Item, ItemId, NpcId, PlayerId, SortCriteria, SortDirection,
    WorldModel,
};

use crate::infrastructure::ports::IdGenerator;
use crate::use_cases::identity::allocate_id;

pub use containers::MoveOutcome;
pub(crate) use containers::{rewrite_prefix, take_subtree};
pub use equipment::EquipOutcome;
pub use error::InventoryError;
pub use invariants::{check_invariants, InventoryViolation};
pub use ordering::display_order;
pub use stacks::merge_blocker;

/// Whose inventory an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterHandle {
    Player(PlayerId),
    Npc(NpcId),
}

impl std::fmt::Display for CharacterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player(id) => write!(f, "player:{id}"),
            Self::Npc(id) => write!(f, "npc:{id}"),
        }
    }
}

fn inventory_of(world: &WorldModel, who: CharacterHandle) -> Result<&CharacterInventory, InventoryError> {
    let inventory = match who {
        CharacterHandle::Player(id) => world.player_for(id).map(|pc| &pc.inventory),
        CharacterHandle::Npc(id) => world.npc(id).map(|npc| &npc.inventory),
    };
    inventory.ok_or_else(|| InventoryError::CharacterNotFound(who.to_string()))
}

fn inventory_of_mut(
    world: &mut WorldModel,
    who: CharacterHandle,
) -> Result<&mut CharacterInventory, InventoryError> {
    let inventory = match who {
        CharacterHandle::Player(id) => world.player_for_mut(id).map(|pc| &mut pc.inventory),
        CharacterHandle::Npc(id) => world.npc_mut(id).map(|npc| &mut npc.inventory),
    };
    inventory.ok_or_else(|| InventoryError::CharacterNotFound(who.to_string()))
}

pub struct InventoryEngine {
    ids: Arc<dyn IdGenerator>,
}

impl InventoryEngine {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    // =========================================================================
    // Equipment
    // =========================================================================

    pub fn equip(
        &self,
        world: &mut WorldModel,
        who: CharacterHandle,
        item_id: ItemId,
        slot: EquipmentSlot,
    ) -> Result<EquipOutcome, InventoryError> {
        let outcome = equipment::equip(inventory_of_mut(world, who)?, item_id, slot)?;
        tracing::debug!(character = %who, item = %item_id, slot = %slot, "Equipped item");
        Ok(outcome)
    }

    pub fn unequip(
        &self,
        world: &mut WorldModel,
        who: CharacterHandle,
        item_id: ItemId,
    ) -> Result<Vec<EquipmentSlot>, InventoryError> {
        equipment::unequip(inventory_of_mut(world, who)?, item_id)
    }

    // =========================================================================
    // Containers
    // =========================================================================

    /// Put an item inside a container, or back at the top level with `None`.
    pub fn move_to_container(
        &self,
        world: &mut WorldModel,
        who: CharacterHandle,
        item_id: ItemId,
        container: Option<ItemId>,
    ) -> Result<MoveOutcome, InventoryError> {
        let outcome = containers::move_to_container(inventory_of_mut(world, who)?, item_id, container)?;
        tracing::debug!(
            character = %who,
            item = %item_id,
            path = ?outcome.contents_path,
            carried = outcome.carried.len(),
            "Moved item"
        );
        Ok(outcome)
    }

    // =========================================================================
    // Stacks
    // =========================================================================

    /// Split `quantity` units off a stack. Returns the new stack's ID.
    pub fn split(
        &self,
        world: &mut WorldModel,
        who: CharacterHandle,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<ItemId, InventoryError> {
        inventory_of(world, who)?;
        let new_id = ItemId::from_uuid(allocate_id(self.ids.as_ref(), world));
        stacks::split(inventory_of_mut(world, who)?, item_id, quantity, new_id)
    }

    /// Fold `source` into `target`; `source` ceases to exist.
    pub fn merge(
        &self,
        world: &mut WorldModel,
        who: CharacterHandle,
        source: ItemId,
        target: ItemId,
    ) -> Result<u32, InventoryError> {
        let merged = stacks::merge(inventory_of_mut(world, who)?, source, target)?;
        world.retire(source.to_uuid());
        Ok(merged)
    }

    // =========================================================================
    // Leaving the inventory
    // =========================================================================

    /// Destroy an item together with anything inside it.
    pub fn drop_item(
        &self,
        world: &mut WorldModel,
        who: CharacterHandle,
        item_id: ItemId,
    ) -> Result<Vec<Item>, InventoryError> {
        let inventory = inventory_of_mut(world, who)?;
        let dropped = take_subtree(&mut inventory.items, item_id);
        if dropped.is_empty() {
            return Err(InventoryError::ItemNotFound(item_id));
        }
        for item in &dropped {
            inventory.forget(item.existed_id);
        }
        for item in &dropped {
            world.retire(item.existed_id.to_uuid());
        }
        tracing::debug!(character = %who, item = %item_id, count = dropped.len(), "Dropped item");
        Ok(dropped)
    }

    /// Set an item (and its contents) aside in the world's temporary stash.
    pub fn stash(
        &self,
        world: &mut WorldModel,
        who: CharacterHandle,
        item_id: ItemId,
    ) -> Result<Vec<ItemId>, InventoryError> {
        let inventory = inventory_of_mut(world, who)?;
        let mut moved = take_subtree(&mut inventory.items, item_id);
        let Some(root) = moved.first() else {
            return Err(InventoryError::ItemNotFound(item_id));
        };
        let old_parent = root.contents_path.clone();
        for item in &moved {
            inventory.forget(item.existed_id);
        }

        for item in moved.iter_mut() {
            item.contents_path.drain(..old_parent.len().min(item.contents_path.len()));
        }
        let ids = moved.iter().map(|item| item.existed_id).collect();
        world.temporary_stash.extend(moved);
        Ok(ids)
    }

    /// Move a stashed item (and its contents) into a character's inventory.
    pub fn retrieve(
        &self,
        world: &mut WorldModel,
        who: CharacterHandle,
        item_id: ItemId,
    ) -> Result<Vec<ItemId>, InventoryError> {
        let inventory = inventory_of(world, who)?;
        let root = world
            .temporary_stash
            .iter()
            .find(|item| item.existed_id == item_id)
            .ok_or(InventoryError::ItemNotFound(item_id))?;
        if root.is_container
            && inventory
                .container_at(std::slice::from_ref(&root.name.as_str().to_string()))
                .is_some()
        {
            return Err(InventoryError::InvalidTarget(format!(
                "a container named {} is already carried",
                root.name
            )));
        }

        let mut moved = take_subtree(&mut world.temporary_stash, item_id);
        if let Some(root) = moved.first_mut() {
            root.contents_path.clear();
        }
        let ids = moved.iter().map(|item| item.existed_id).collect();
        inventory_of_mut(world, who)?.items.extend(moved);
        Ok(ids)
    }

    // =========================================================================
    // Presentation
    // =========================================================================

    pub fn set_sort_order(
        &self,
        world: &mut WorldModel,
        who: CharacterHandle,
        order: Vec<ItemId>,
    ) -> Result<(), InventoryError> {
        ordering::set_sort_order(inventory_of_mut(world, who)?, order);
        Ok(())
    }

    pub fn set_sort_settings(
        &self,
        world: &mut WorldModel,
        who: CharacterHandle,
        criteria: SortCriteria,
        direction: SortDirection,
    ) -> Result<(), InventoryError> {
        ordering::set_sort_settings(inventory_of_mut(world, who)?, criteria, direction);
        Ok(())
    }

    pub fn display_order<'w>(
        &self,
        world: &'w WorldModel,
        who: CharacterHandle,
    ) -> Result<Vec<&'w Item>, InventoryError> {
        Ok(display_order(inventory_of(world, who)?))
    }

    pub fn check(
        &self,
        world: &WorldModel,
        who: CharacterHandle,
    ) -> Result<Vec<InventoryViolation>, InventoryError> {
        Ok(check_invariants(inventory_of(world, who)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SequentialIds;
    use chronicle_domain::{EntityName, Npc, PlayerCharacter, SlotSet};

    fn name(s: &str) -> EntityName {
        EntityName::new(s).unwrap()
    }

    struct Fixture {
        engine: InventoryEngine,
        world: WorldModel,
        who: CharacterHandle,
        backpack: ItemId,
        rope: ItemId,
        arrows: ItemId,
        helm: ItemId,
    }

    fn fixture() -> Fixture {
        let backpack = Item::new(name("Backpack")).as_container();
        let rope = Item::new(name("Rope")).inside(vec!["Backpack".into()]);
        let arrows = Item::new(name("Arrow")).with_count(12);
        let helm = Item::new(name("Helm")).with_slots(SlotSet::single(EquipmentSlot::Head));
        let ids = (backpack.existed_id, rope.existed_id, arrows.existed_id, helm.existed_id);

        let player_id = PlayerId::new();
        let mut pc = PlayerCharacter::new(player_id, name("Ash"));
        pc.inventory.items = vec![backpack, rope, arrows, helm];

        Fixture {
            engine: InventoryEngine::new(Arc::new(SequentialIds::starting_at(1))),
            world: WorldModel::new().with_player(pc),
            who: CharacterHandle::Player(player_id),
            backpack: ids.0,
            rope: ids.1,
            arrows: ids.2,
            helm: ids.3,
        }
    }

    fn inventory(f: &Fixture) -> &CharacterInventory {
        inventory_of(&f.world, f.who).unwrap()
    }

    #[test]
    fn unknown_character_is_not_found() {
        let mut f = fixture();
        let who = CharacterHandle::Npc(NpcId::new());
        let err = f.engine.equip(&mut f.world, who, f.helm, EquipmentSlot::Head).unwrap_err();
        assert!(matches!(err, InventoryError::CharacterNotFound(_)));
    }

    #[test]
    fn npc_inventories_follow_the_same_rules() {
        let mut f = fixture();
        let mut npc = Npc::new(name("Mira"));
        let cloak = Item::new(name("Cloak")).with_slots(SlotSet::single(EquipmentSlot::Back));
        let cloak_id = cloak.existed_id;
        npc.inventory.items.push(cloak);
        let who = CharacterHandle::Npc(npc.id);
        f.world.encountered_npcs.push(npc);

        f.engine.equip(&mut f.world, who, cloak_id, EquipmentSlot::Back).unwrap();
        assert!(inventory_of(&f.world, who).unwrap().is_equipped(cloak_id));
    }

    #[test]
    fn split_allocates_unused_id_and_merge_retires_it() {
        let mut f = fixture();
        let (who, arrows) = (f.who, f.arrows);
        let new_id = f.engine.split(&mut f.world, who, arrows, 4).unwrap();
        assert!(!f.world.retired_ids.contains(&new_id.to_uuid()));
        assert_eq!(inventory(&f).get(arrows).unwrap().count, 8);

        f.engine.merge(&mut f.world, who, new_id, arrows).unwrap();
        assert_eq!(inventory(&f).get(arrows).unwrap().count, 12);
        assert!(f.world.is_id_taken(new_id.to_uuid()));
        assert!(f.world.retired_ids.contains(&new_id.to_uuid()));
    }

    #[test]
    fn dropping_container_drops_contents() {
        let mut f = fixture();
        let (who, backpack, rope) = (f.who, f.backpack, f.rope);
        let dropped = f.engine.drop_item(&mut f.world, who, backpack).unwrap();

        assert_eq!(dropped.len(), 2);
        assert!(!inventory(&f).contains(rope));
        assert!(f.world.retired_ids.contains(&rope.to_uuid()));
    }

    #[test]
    fn stash_and_retrieve_round_trip() {
        let mut f = fixture();
        let (who, backpack, rope) = (f.who, f.backpack, f.rope);

        let stashed = f.engine.stash(&mut f.world, who, backpack).unwrap();
        assert_eq!(stashed, vec![backpack, rope]);
        assert_eq!(f.world.temporary_stash.len(), 2);
        assert!(!inventory(&f).contains(backpack));

        f.engine.retrieve(&mut f.world, who, backpack).unwrap();
        assert!(f.world.temporary_stash.is_empty());
        assert_eq!(
            inventory(&f).get(rope).unwrap().contents_path,
            vec!["Backpack".to_string()]
        );
        assert!(check_invariants(inventory(&f)).is_empty());
    }

    #[test]
    fn stashing_nested_item_makes_it_top_level() {
        let mut f = fixture();
        let (who, rope) = (f.who, f.rope);
        f.engine.stash(&mut f.world, who, rope).unwrap();
        assert!(f.world.temporary_stash[0].contents_path.is_empty());
    }

    #[test]
    fn display_order_after_equip() {
        let mut f = fixture();
        let (who, helm) = (f.who, f.helm);
        f.engine.equip(&mut f.world, who, helm, EquipmentSlot::Head).unwrap();
        f.engine
            .set_sort_settings(&mut f.world, who, SortCriteria::Name, SortDirection::Asc)
            .unwrap();

        let shown: Vec<&str> = f
            .engine
            .display_order(&f.world, who)
            .unwrap()
            .into_iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(shown, vec!["Helm", "Arrow", "Backpack", "Rope"]);
    }
}
