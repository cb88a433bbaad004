//! Re-identification of entities.
//!
//! An entity gets a fresh ID and every reference the world holds to the old
//! one is rewritten. References that cannot be rewritten safely are reported
//! instead of guessed at.

use serde::Serialize;
use uuid::Uuid;

use chronicle_domain::{
    CharacterInventory, EntityKind, EntityRef, FactionId, ItemId, LocationId, NpcId,
    PlayerCharacterId, QuestId, WorldModel, WoundId,
};

use super::ReconcileError;
use crate::infrastructure::ports::IdGenerator;
use crate::use_cases::identity::allocate_id;

/// A place in the world that referred to the old ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackReference {
    /// Entity or collection holding the reference
    pub holder: String,
    pub field: &'static str,
}

impl BackReference {
    fn new(holder: impl Into<String>, field: &'static str) -> Self {
        Self {
            holder: holder.into(),
            field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerationReport {
    pub kind: EntityKind,
    pub old_id: Uuid,
    pub new_id: Uuid,
    pub rewritten: Vec<BackReference>,
    /// References left pointing at the retired ID
    pub unresolved: Vec<BackReference>,
}

/// The first entity still carrying the nil ID, in world order.
pub(super) fn first_nil_entity(world: &WorldModel) -> Option<EntityRef> {
    let nil = Uuid::nil();
    let nil_ref = |kind| Some(EntityRef::new(kind, nil));

    for pc in &world.player_characters {
        if pc.id.to_uuid().is_nil() {
            return nil_ref(EntityKind::PlayerCharacter);
        }
    }
    let inventories = world
        .player_characters
        .iter()
        .map(|pc| (&pc.inventory.items, &pc.wounds))
        .chain(world.encountered_npcs.iter().map(|npc| (&npc.inventory.items, &npc.wounds)));
    for (items, wounds) in inventories {
        if items.iter().any(|i| i.existed_id.to_uuid().is_nil()) {
            return nil_ref(EntityKind::Item);
        }
        if wounds.iter().any(|w| w.id.to_uuid().is_nil()) {
            return nil_ref(EntityKind::Wound);
        }
    }
    if world.temporary_stash.iter().any(|i| i.existed_id.to_uuid().is_nil()) {
        return nil_ref(EntityKind::Item);
    }
    if world.encountered_npcs.iter().any(|n| n.id.to_uuid().is_nil()) {
        return nil_ref(EntityKind::Npc);
    }
    if world.encountered_factions.iter().any(|f| f.id.to_uuid().is_nil()) {
        return nil_ref(EntityKind::Faction);
    }
    if world
        .active_quests
        .iter()
        .chain(&world.completed_quests)
        .any(|q| q.id.to_uuid().is_nil())
    {
        return nil_ref(EntityKind::Quest);
    }
    if world.visited_locations.iter().any(|l| l.location_id.to_uuid().is_nil()) {
        return nil_ref(EntityKind::Location);
    }
    None
}

/// Give `target` a fresh ID. The old ID is retired.
///
/// A nil old ID is treated as "never assigned": only the entity itself is
/// updated, since nothing can meaningfully refer to it.
pub(super) fn regenerate(
    world: &mut WorldModel,
    target: EntityRef,
    ids: &dyn IdGenerator,
) -> Result<RegenerationReport, ReconcileError> {
    let old_id = target.id;
    let new_id = allocate_id(ids, world);
    let mut report = RegenerationReport {
        kind: target.kind,
        old_id,
        new_id,
        rewritten: Vec::new(),
        unresolved: Vec::new(),
    };
    let follow_references = !old_id.is_nil();

    match target.kind {
        EntityKind::PlayerCharacter => {
            let pc = world
                .player_characters
                .iter_mut()
                .find(|pc| pc.id.to_uuid() == old_id)
                .ok_or_else(|| ReconcileError::not_found(target.kind, old_id))?;
            pc.id = PlayerCharacterId::from_uuid(new_id);
        }
        EntityKind::Npc => {
            let npc = world
                .npc_mut(NpcId::from_uuid(old_id))
                .ok_or_else(|| ReconcileError::not_found(target.kind, old_id))?;
            npc.id = NpcId::from_uuid(new_id);
            if follow_references {
                rewrite_quest_givers(world, NpcId::from_uuid(old_id), NpcId::from_uuid(new_id), &mut report);
            }
        }
        EntityKind::Item => regenerate_item(world, ItemId::from_uuid(old_id), ItemId::from_uuid(new_id), &mut report)?,
        EntityKind::Wound => {
            let wound = world
                .player_characters
                .iter_mut()
                .flat_map(|pc| pc.wounds.iter_mut())
                .chain(world.encountered_npcs.iter_mut().flat_map(|npc| npc.wounds.iter_mut()))
                .find(|w| w.id.to_uuid() == old_id)
                .ok_or_else(|| ReconcileError::not_found(target.kind, old_id))?;
            wound.id = WoundId::from_uuid(new_id);
        }
        EntityKind::Quest => {
            let quest = world
                .active_quests
                .iter_mut()
                .chain(world.completed_quests.iter_mut())
                .find(|q| q.id.to_uuid() == old_id)
                .ok_or_else(|| ReconcileError::not_found(target.kind, old_id))?;
            quest.id = QuestId::from_uuid(new_id);
        }
        EntityKind::Faction => {
            let (old, new) = (FactionId::from_uuid(old_id), FactionId::from_uuid(new_id));
            let faction = world
                .encountered_factions
                .iter_mut()
                .find(|f| f.id == old)
                .ok_or_else(|| ReconcileError::not_found(target.kind, old_id))?;
            faction.id = new;
            if follow_references {
                for npc in world.encountered_npcs.iter_mut().filter(|n| n.faction_id == Some(old)) {
                    npc.faction_id = Some(new);
                    report.rewritten.push(BackReference::new(npc.name.as_str(), "factionId"));
                }
            }
        }
        EntityKind::Location => {
            let (old, new) = (LocationId::from_uuid(old_id), LocationId::from_uuid(new_id));
            let location = world
                .visited_locations
                .iter_mut()
                .find(|l| l.location_id == old)
                .ok_or_else(|| ReconcileError::not_found(target.kind, old_id))?;
            location.location_id = new;
            if follow_references {
                rewrite_location_refs(world, old, new, &mut report);
            }
        }
    }

    if follow_references {
        let mut journal_hits = 0;
        for entry in &mut world.turn_journal {
            if entry.entity == Some(EntityRef::new(target.kind, old_id)) {
                entry.entity = Some(EntityRef::new(target.kind, new_id));
                journal_hits += 1;
            }
        }
        if journal_hits > 0 {
            report.rewritten.push(BackReference::new("turn journal", "entity"));
        }
        world.retire(old_id);
    }

    tracing::info!(
        kind = %report.kind,
        old_id = %old_id,
        new_id = %new_id,
        rewritten = report.rewritten.len(),
        unresolved = report.unresolved.len(),
        "Regenerated entity ID"
    );
    Ok(report)
}

fn rewrite_quest_givers(world: &mut WorldModel, old: NpcId, new: NpcId, report: &mut RegenerationReport) {
    for quest in world
        .active_quests
        .iter_mut()
        .chain(world.completed_quests.iter_mut())
        .filter(|q| q.giver_npc_id == Some(old))
    {
        quest.giver_npc_id = Some(new);
        report.rewritten.push(BackReference::new(quest.name.as_str(), "giverNpcId"));
    }
}

fn rewrite_location_refs(world: &mut WorldModel, old: LocationId, new: LocationId, report: &mut RegenerationReport) {
    if world.current_location_id == Some(old) {
        world.current_location_id = Some(new);
        report.rewritten.push(BackReference::new("world", "currentLocationId"));
    }
    for faction in &mut world.encountered_factions {
        let mut touched = false;
        for controlled in faction.controlled_location_ids.iter_mut().filter(|id| **id == old) {
            *controlled = new;
            touched = true;
        }
        if touched {
            report
                .rewritten
                .push(BackReference::new(faction.name.as_str(), "controlledLocationIds"));
        }
    }
    for location in &mut world.visited_locations {
        let mut touched = false;
        for link in location
            .adjacency_map
            .iter_mut()
            .filter(|link| link.target_location_id == Some(old))
        {
            link.target_location_id = Some(new);
            touched = true;
        }
        if touched {
            report
                .rewritten
                .push(BackReference::new(location.name.as_str(), "adjacencyMap"));
        }
    }
}

/// Rewrite equipment and ordering references inside one inventory.
fn rewrite_inventory_refs(inventory: &mut CharacterInventory, old: ItemId, new: ItemId) -> Vec<&'static str> {
    let mut fields = Vec::new();
    let mut equipped = false;
    for value in inventory.equipped_items.values_mut().filter(|v| **v == old) {
        *value = new;
        equipped = true;
    }
    if equipped {
        fields.push("equippedItems");
    }
    let mut ordered = false;
    for entry in inventory.item_sort_order.iter_mut().filter(|e| **e == old) {
        *entry = new;
        ordered = true;
    }
    if ordered {
        fields.push("itemSortOrder");
    }
    fields
}

fn inventory_refers_to(inventory: &CharacterInventory, id: ItemId) -> bool {
    inventory.is_equipped(id) || inventory.item_sort_order.contains(&id)
}

/// Items are rewritten in their holder's inventory. Any other inventory that
/// still names the old ID holds a stale reference and is reported.
fn regenerate_item(
    world: &mut WorldModel,
    old: ItemId,
    new: ItemId,
    report: &mut RegenerationReport,
) -> Result<(), ReconcileError> {
    let follow = !old.to_uuid().is_nil();
    let mut found = false;

    let characters = world
        .player_characters
        .iter_mut()
        .map(|pc| (pc.name.to_string(), &mut pc.inventory))
        .chain(
            world
                .encountered_npcs
                .iter_mut()
                .map(|npc| (npc.name.to_string(), &mut npc.inventory)),
        );
    for (holder, inventory) in characters {
        let held = match inventory.get_mut(old) {
            Some(item) if !found => {
                item.existed_id = new;
                found = true;
                true
            }
            _ => false,
        };
        if !follow {
            continue;
        }
        if held {
            for field in rewrite_inventory_refs(inventory, old, new) {
                report.rewritten.push(BackReference::new(holder.clone(), field));
            }
        } else if inventory_refers_to(inventory, old) {
            report.unresolved.push(BackReference::new(holder, "inventory"));
        }
    }

    if !found {
        if let Some(item) = world.temporary_stash.iter_mut().find(|i| i.existed_id == old) {
            item.existed_id = new;
            found = true;
        }
    }
    if found {
        Ok(())
    } else {
        Err(ReconcileError::not_found(EntityKind::Item, old))
    }
}
