//! Items in character inventories and the temporary stash.
//!
//! Every change is validated before the owner's list is touched, so a skipped
//! delta never leaves a half-applied item behind.

use uuid::Uuid;

use chronicle_domain::{CharacterInventory, EntityKind, EntityName, Item, ItemId, WorldModel};
use chronicle_shared::{EntityChanges, ItemDelta, ItemOwnerData};

use super::characters::player_index;
use super::{overwrite, set, validated_name, TurnContext};
use crate::use_cases::identity::{Candidate, IdentityResolver};
use crate::use_cases::inventory::{rewrite_prefix, take_subtree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    Player(usize),
    Npc(usize),
    Stash,
}

fn resolve_owner(world: &WorldModel, owner: &ItemOwnerData) -> Option<Owner> {
    match owner {
        ItemOwnerData::Player { player_id } => player_index(world, *player_id).map(Owner::Player),
        ItemOwnerData::Npc { id, name } => {
            IdentityResolver::position(&Candidate::new(*id, name.as_deref()), &world.encountered_npcs)
                .map(Owner::Npc)
        }
        ItemOwnerData::Stash => Some(Owner::Stash),
    }
}

fn owner_items(world: &WorldModel, owner: Owner) -> Option<&[Item]> {
    match owner {
        Owner::Player(i) => world.player_characters.get(i).map(|pc| pc.inventory.items.as_slice()),
        Owner::Npc(i) => world.encountered_npcs.get(i).map(|npc| npc.inventory.items.as_slice()),
        Owner::Stash => Some(world.temporary_stash.as_slice()),
    }
}

/// Whoever holds the item with this ID, searching every owner.
fn holder_of(world: &WorldModel, id: Uuid) -> Option<Owner> {
    if id.is_nil() {
        return None;
    }
    let holds = |items: &[Item]| items.iter().any(|item| item.existed_id.to_uuid() == id);
    world
        .player_characters
        .iter()
        .position(|pc| holds(&pc.inventory.items))
        .map(Owner::Player)
        .or_else(|| {
            world
                .encountered_npcs
                .iter()
                .position(|npc| holds(&npc.inventory.items))
                .map(Owner::Npc)
        })
        .or_else(|| holds(&world.temporary_stash).then_some(Owner::Stash))
}

/// A character inventory or the stash, which has no equipment or ordering.
enum ItemsMut<'w> {
    Inventory(&'w mut CharacterInventory),
    Stash(&'w mut Vec<Item>),
}

impl ItemsMut<'_> {
    fn of(world: &mut WorldModel, owner: Owner) -> Option<ItemsMut<'_>> {
        match owner {
            Owner::Player(i) => world
                .player_characters
                .get_mut(i)
                .map(|pc| ItemsMut::Inventory(&mut pc.inventory)),
            Owner::Npc(i) => world
                .encountered_npcs
                .get_mut(i)
                .map(|npc| ItemsMut::Inventory(&mut npc.inventory)),
            Owner::Stash => Some(ItemsMut::Stash(&mut world.temporary_stash)),
        }
    }

    fn items(&mut self) -> &mut Vec<Item> {
        match self {
            Self::Inventory(inventory) => &mut inventory.items,
            Self::Stash(items) => items,
        }
    }

    fn forget(&mut self, id: ItemId) {
        if let Self::Inventory(inventory) = self {
            inventory.forget(id);
        }
    }

    /// Drop equipment entries the item can no longer occupy.
    fn release_slots(&mut self, item: &Item) {
        if let Self::Inventory(inventory) = self {
            let inside = !item.contents_path.is_empty();
            inventory.equipped_items.retain(|slot, equipped| {
                *equipped != item.existed_id || (!inside && item.equipment_slot.contains(*slot))
            });
        }
    }

    /// Remove the item at `index`. A container's contents move up to where
    /// the container was.
    fn take(&mut self, index: usize) -> Item {
        let item = self.items().remove(index);
        if item.is_container {
            rewrite_prefix(self.items(), &item.inner_path(), &item.contents_path);
        }
        self.forget(item.existed_id);
        item
    }
}

fn container_in<'i>(items: &'i [Item], path: &[String]) -> Option<&'i Item> {
    let (name, parent) = path.split_last()?;
    items
        .iter()
        .find(|i| i.is_container && i.name.as_str() == name && i.contents_path == parent)
}

/// A non-empty path must name a container, and never one inside the moving
/// item itself.
fn check_destination(items: &[Item], path: &[String], moving: Option<&Item>) -> Result<(), String> {
    if path.is_empty() {
        return Ok(());
    }
    if container_in(items, path).is_none() {
        return Err(format!("no container at {}", path.join("/")));
    }
    if let Some(item) = moving.filter(|item| item.is_container) {
        if path.starts_with(&item.inner_path()) {
            return Err("a container cannot be placed inside itself".into());
        }
    }
    Ok(())
}

fn merge_item(item: &mut Item, delta: &ItemDelta) {
    overwrite(&mut item.description, &delta.description);
    overwrite(&mut item.item_type, &delta.item_type);
    set(&mut item.quality, &delta.quality);
    set(&mut item.weight, &delta.weight);
    set(&mut item.price, &delta.price);
    set(&mut item.equipment_slot, &delta.equipment_slot);
    set(&mut item.is_container, &delta.is_container);
    overwrite(&mut item.resource, &delta.resource);
    overwrite(&mut item.maximum_resource, &delta.maximum_resource);
    overwrite(&mut item.durability, &delta.durability);
    if let Some(count) = delta.count.filter(|count| *count > 0) {
        item.count = count;
    }
}

pub(super) fn apply_items(ctx: &mut TurnContext<'_>, changes: &EntityChanges<ItemDelta>) {
    for delta in &changes.added {
        upsert_item(ctx, delta, true);
    }
    for delta in &changes.updated {
        upsert_item(ctx, delta, false);
    }
    for delta in &changes.removed {
        remove_item(ctx, delta, "removed");
    }
}

fn upsert_item(ctx: &mut TurnContext<'_>, delta: &ItemDelta, create: bool) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    let name = match validated_name(delta.name.as_deref()) {
        Ok(name) => name,
        Err(reason) => return ctx.skipped(EntityKind::Item, &candidate, reason),
    };
    let Some(owner) = resolve_owner(ctx.world, &delta.owner) else {
        return ctx.skipped(EntityKind::Item, &candidate, "the item's owner is unknown");
    };
    let mut existing = owner_items(ctx.world, owner).and_then(|items| IdentityResolver::position(&candidate, items));
    if existing.is_none() && delta.count != Some(0) {
        match transfer(ctx, owner, delta.id) {
            Ok(index) => existing = index,
            Err(reason) => return ctx.skipped(EntityKind::Item, &candidate, reason),
        }
    }

    match existing {
        Some(_) if delta.count == Some(0) && !create => remove_item(ctx, delta, "consumed"),
        Some(index) => update_item(ctx, owner, index, delta, name, &candidate),
        None if create => create_item(ctx, owner, delta, name, &candidate),
        None => ctx.not_found(EntityKind::Item, &candidate),
    }
}

/// Move the item with `id` (and its contents) from another owner to `owner`,
/// keeping its ID. It arrives at the top level; the delta may then place it.
/// Returns its index in the new owner's list, or `None` if nobody else holds it.
fn transfer(ctx: &mut TurnContext<'_>, owner: Owner, id: Option<Uuid>) -> Result<Option<usize>, String> {
    let Some((id, from)) = id.and_then(|id| holder_of(ctx.world, id).map(|from| (id, from))) else {
        return Ok(None);
    };
    if from == owner {
        return Ok(None);
    }
    let item_id = ItemId::from_uuid(id);
    let Some(root) = owner_items(ctx.world, from).and_then(|items| items.iter().find(|i| i.existed_id == item_id).cloned())
    else {
        return Ok(None);
    };
    let Some(target) = owner_items(ctx.world, owner) else {
        return Ok(None);
    };
    if root.is_container && container_in(target, std::slice::from_ref(&root.name.as_str().to_string())).is_some() {
        return Err(format!("a container named {} is already held there", root.name));
    }

    let Some(mut source) = ItemsMut::of(ctx.world, from) else {
        return Ok(None);
    };
    let mut moved = take_subtree(source.items(), item_id);
    for item in &moved {
        source.forget(item.existed_id);
    }
    let depth = root.contents_path.len();
    for item in moved.iter_mut() {
        item.contents_path.drain(..depth.min(item.contents_path.len()));
    }

    let Some(mut list) = ItemsMut::of(ctx.world, owner) else {
        return Ok(None);
    };
    let index = list.items().len();
    list.items().extend(moved);
    tracing::debug!(item = %item_id, "Item changed hands");
    Ok(Some(index))
}

fn update_item(
    ctx: &mut TurnContext<'_>,
    owner: Owner,
    index: usize,
    delta: &ItemDelta,
    name: Option<EntityName>,
    candidate: &Candidate<'_>,
) {
    if delta.count == Some(0) {
        return ctx.skipped(EntityKind::Item, candidate, "count must be positive");
    }
    let Some(items) = owner_items(ctx.world, owner) else {
        return ctx.not_found(EntityKind::Item, candidate);
    };
    let Some(before) = items.get(index).cloned() else {
        return ctx.not_found(EntityKind::Item, candidate);
    };
    if let Some(path) = &delta.contents_path {
        if let Err(reason) = check_destination(items, path, Some(&before)) {
            return ctx.skipped(EntityKind::Item, candidate, reason);
        }
    }

    let Some(mut list) = ItemsMut::of(ctx.world, owner) else {
        return ctx.not_found(EntityKind::Item, candidate);
    };
    let after = {
        let item = &mut list.items()[index];
        if let Some(name) = name {
            item.name = name;
        }
        merge_item(item, delta);
        set(&mut item.contents_path, &delta.contents_path);
        item.clone()
    };

    if before.is_container {
        let old_inner = before.inner_path();
        let new_inner = if after.is_container {
            after.inner_path()
        } else {
            after.contents_path.clone()
        };
        if old_inner != new_inner {
            rewrite_prefix(list.items(), &old_inner, &new_inner);
        }
    }
    list.release_slots(&after);

    ctx.updated(EntityKind::Item, after.existed_id, after.name.as_str());
}

fn create_item(
    ctx: &mut TurnContext<'_>,
    owner: Owner,
    delta: &ItemDelta,
    name: Option<EntityName>,
    candidate: &Candidate<'_>,
) {
    let Some(name) = name else {
        return ctx.skipped(EntityKind::Item, candidate, "a new item needs a name");
    };
    if delta.count == Some(0) {
        return ctx.skipped(EntityKind::Item, candidate, "a new item needs a positive count");
    }
    if let Some(path) = &delta.contents_path {
        let items = owner_items(ctx.world, owner).unwrap_or_default();
        if let Err(reason) = check_destination(items, path, None) {
            return ctx.skipped(EntityKind::Item, candidate, reason);
        }
    }

    let id = ItemId::from_uuid(ctx.allocate(delta.id));
    let mut item = Item::with_id(id, name);
    merge_item(&mut item, delta);
    set(&mut item.contents_path, &delta.contents_path);
    let summary = item.name.to_string();

    let placed = ItemsMut::of(ctx.world, owner).map(|mut list| list.items().push(item));
    match placed {
        Some(()) => ctx.created(EntityKind::Item, id, &summary),
        None => ctx.skipped(EntityKind::Item, candidate, "the item's owner is unknown"),
    }
}

fn remove_item(ctx: &mut TurnContext<'_>, delta: &ItemDelta, why: &str) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    let Some(owner) = resolve_owner(ctx.world, &delta.owner) else {
        return ctx.skipped(EntityKind::Item, &candidate, "the item's owner is unknown");
    };
    let Some(index) = owner_items(ctx.world, owner).and_then(|items| IdentityResolver::position(&candidate, items))
    else {
        return ctx.not_found(EntityKind::Item, &candidate);
    };
    let Some(item) = ItemsMut::of(ctx.world, owner).map(|mut list| list.take(index)) else {
        return ctx.not_found(EntityKind::Item, &candidate);
    };
    ctx.world.retire(item.existed_id.to_uuid());
    ctx.removed(EntityKind::Item, item.existed_id, &format!("{} ({why})", item.name));
}
