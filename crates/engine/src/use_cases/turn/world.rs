//! Locations, factions, quests and world-level state.

use std::collections::BTreeMap;

use chronicle_domain::{
    EntityKind, EntityRef, Faction, FactionId, FlagValue, JournalAction, Location, LocationId,
    LocationLink, NpcId, Quest, QuestId, WorldModel,
};
use chronicle_shared::{
    EntityChanges, EntityRefData, FactionDelta, LocationDelta, LocationLinkData, QuestDelta,
    WorldStateDelta,
};

use super::{overwrite, set, validated_name, ChangeSubject, TurnContext};
use crate::use_cases::identity::{Candidate, IdentityResolver};

// =============================================================================
// Locations
// =============================================================================

pub(super) fn apply_locations(ctx: &mut TurnContext<'_>, changes: &EntityChanges<LocationDelta>) {
    for delta in &changes.added {
        upsert_location(ctx, delta, true);
    }
    for delta in &changes.updated {
        upsert_location(ctx, delta, false);
    }
    for delta in &changes.removed {
        remove_location(ctx, delta);
    }
}

fn upsert_location(ctx: &mut TurnContext<'_>, delta: &LocationDelta, create: bool) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    let name = match validated_name(delta.name.as_deref()) {
        Ok(name) => name,
        Err(reason) => return ctx.skipped(EntityKind::Location, &candidate, reason),
    };
    let links = delta
        .adjacency_map
        .as_ref()
        .map(|links| links.iter().map(|link| to_link(ctx.world, link)).collect::<Vec<_>>());

    match IdentityResolver::position(&candidate, &ctx.world.visited_locations) {
        Some(index) => {
            let location = &mut ctx.world.visited_locations[index];
            if let Some(name) = name {
                location.name = name;
            }
            merge_location(location, delta, links);
            let (id, name) = (location.location_id, location.name.to_string());
            ctx.updated(EntityKind::Location, id, &name);
        }
        None if create => {
            let Some(name) = name else {
                return ctx.skipped(EntityKind::Location, &candidate, "a new location needs a name");
            };
            let mut location = Location::new(name, delta.coordinates.unwrap_or_default());
            location.location_id = LocationId::from_uuid(ctx.allocate(delta.id));
            merge_location(&mut location, delta, links);
            let (id, name) = (location.location_id, location.name.to_string());
            ctx.world.visited_locations.push(location);
            ctx.created(EntityKind::Location, id, &name);
        }
        None => ctx.not_found(EntityKind::Location, &candidate),
    }
}

/// Links to locations the party has not visited keep only their coordinates.
fn to_link(world: &WorldModel, data: &LocationLinkData) -> LocationLink {
    let target = data
        .target_location_id
        .map(LocationId::from_uuid)
        .filter(|id| world.location(*id).is_some());
    LocationLink {
        target_location_id: target,
        target_coordinates: data.target_coordinates,
        name: data.name.clone(),
        estimated_difficulty: data.estimated_difficulty,
    }
}

fn merge_location(location: &mut Location, delta: &LocationDelta, links: Option<Vec<LocationLink>>) {
    overwrite(&mut location.description, &delta.description);
    set(&mut location.coordinates, &delta.coordinates);
    set(&mut location.difficulty_profile, &delta.difficulty_profile);
    if let Some(links) = links {
        location.adjacency_map = links;
    }
}

fn remove_location(ctx: &mut TurnContext<'_>, delta: &LocationDelta) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    let Some(index) = IdentityResolver::position(&candidate, &ctx.world.visited_locations) else {
        return ctx.not_found(EntityKind::Location, &candidate);
    };
    let location = ctx.world.visited_locations.remove(index);
    let id = location.location_id;

    if ctx.world.current_location_id == Some(id) {
        ctx.world.current_location_id = None;
    }
    for faction in &mut ctx.world.encountered_factions {
        faction.controlled_location_ids.retain(|controlled| *controlled != id);
    }
    for link in ctx
        .world
        .visited_locations
        .iter_mut()
        .flat_map(|l| l.adjacency_map.iter_mut())
    {
        if link.target_location_id == Some(id) {
            link.target_location_id = None;
        }
    }

    ctx.world.retire(id.to_uuid());
    ctx.removed(EntityKind::Location, id, location.name.as_str());
}

// =============================================================================
// Factions
// =============================================================================

pub(super) fn apply_factions(ctx: &mut TurnContext<'_>, changes: &EntityChanges<FactionDelta>) {
    for delta in &changes.added {
        upsert_faction(ctx, delta, true);
    }
    for delta in &changes.updated {
        upsert_faction(ctx, delta, false);
    }
    for delta in &changes.removed {
        remove_faction(ctx, delta);
    }
}

fn upsert_faction(ctx: &mut TurnContext<'_>, delta: &FactionDelta, create: bool) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    let name = match validated_name(delta.name.as_deref()) {
        Ok(name) => name,
        Err(reason) => return ctx.skipped(EntityKind::Faction, &candidate, reason),
    };
    let controlled = delta.controlled_location_ids.as_ref().map(|ids| {
        ids.iter()
            .map(|id| LocationId::from_uuid(*id))
            .filter(|id| ctx.world.location(*id).is_some())
            .collect::<Vec<_>>()
    });

    match IdentityResolver::position(&candidate, &ctx.world.encountered_factions) {
        Some(index) => {
            let faction = &mut ctx.world.encountered_factions[index];
            if let Some(name) = name {
                faction.name = name;
            }
            merge_faction(faction, delta, controlled);
            let (id, name) = (faction.id, faction.name.to_string());
            ctx.updated(EntityKind::Faction, id, &name);
        }
        None if create => {
            let Some(name) = name else {
                return ctx.skipped(EntityKind::Faction, &candidate, "a new faction needs a name");
            };
            let mut faction = Faction::new(name);
            faction.id = FactionId::from_uuid(ctx.allocate(delta.id));
            merge_faction(&mut faction, delta, controlled);
            let (id, name) = (faction.id, faction.name.to_string());
            ctx.world.encountered_factions.push(faction);
            ctx.created(EntityKind::Faction, id, &name);
        }
        None => ctx.not_found(EntityKind::Faction, &candidate),
    }
}

fn merge_faction(faction: &mut Faction, delta: &FactionDelta, controlled: Option<Vec<LocationId>>) {
    overwrite(&mut faction.description, &delta.description);
    if let Some(reputation) = delta.reputation {
        faction.set_reputation(reputation);
    }
    if let Some(controlled) = controlled {
        faction.controlled_location_ids = controlled;
    }
}

fn remove_faction(ctx: &mut TurnContext<'_>, delta: &FactionDelta) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    let Some(index) = IdentityResolver::position(&candidate, &ctx.world.encountered_factions) else {
        return ctx.not_found(EntityKind::Faction, &candidate);
    };
    let faction = ctx.world.encountered_factions.remove(index);
    for npc in &mut ctx.world.encountered_npcs {
        if npc.faction_id == Some(faction.id) {
            npc.faction_id = None;
        }
    }
    ctx.world.retire(faction.id.to_uuid());
    ctx.removed(EntityKind::Faction, faction.id, faction.name.as_str());
}

// =============================================================================
// Quests
// =============================================================================

/// Which list a quest lives in.
#[derive(Debug, Clone, Copy)]
enum QuestSlot {
    Active(usize),
    Completed(usize),
}

fn find_quest(world: &WorldModel, candidate: &Candidate<'_>) -> Option<QuestSlot> {
    IdentityResolver::position(candidate, &world.active_quests)
        .map(QuestSlot::Active)
        .or_else(|| IdentityResolver::position(candidate, &world.completed_quests).map(QuestSlot::Completed))
}

fn take_quest(world: &mut WorldModel, slot: QuestSlot) -> Quest {
    match slot {
        QuestSlot::Active(i) => world.active_quests.remove(i),
        QuestSlot::Completed(i) => world.completed_quests.remove(i),
    }
}

/// Closed quests live in the completed list; moving between lists appends.
fn file_quest(world: &mut WorldModel, quest: Quest) {
    if quest.status.is_closed() {
        world.completed_quests.push(quest);
    } else {
        world.active_quests.push(quest);
    }
}

pub(super) fn apply_quests(ctx: &mut TurnContext<'_>, changes: &EntityChanges<QuestDelta>) {
    for delta in &changes.added {
        upsert_quest(ctx, delta, true);
    }
    for delta in &changes.updated {
        upsert_quest(ctx, delta, false);
    }
    for delta in &changes.removed {
        remove_quest(ctx, delta);
    }
}

fn upsert_quest(ctx: &mut TurnContext<'_>, delta: &QuestDelta, create: bool) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    let name = match validated_name(delta.name.as_deref()) {
        Ok(name) => name,
        Err(reason) => return ctx.skipped(EntityKind::Quest, &candidate, reason),
    };
    let giver = delta
        .giver_npc_id
        .map(NpcId::from_uuid)
        .filter(|id| ctx.world.npc(*id).is_some());
    if delta.giver_npc_id.is_some() && giver.is_none() {
        tracing::warn!(quest = %candidate.describe(), "Ignoring unknown quest giver");
    }

    match find_quest(ctx.world, &candidate) {
        Some(slot) => {
            let mut quest = take_quest(ctx.world, slot);
            let was_closed = quest.status.is_closed();
            if let Some(name) = name {
                quest.name = name;
            }
            merge_quest(&mut quest, delta, giver);
            let (id, name) = (quest.id, quest.name.to_string());
            if quest.status.is_closed() == was_closed {
                put_back(ctx.world, slot, quest);
            } else {
                file_quest(ctx.world, quest);
            }
            ctx.updated(EntityKind::Quest, id, &name);
        }
        None if create => {
            let Some(name) = name else {
                return ctx.skipped(EntityKind::Quest, &candidate, "a new quest needs a name");
            };
            let mut quest = Quest::new(name);
            quest.id = QuestId::from_uuid(ctx.allocate(delta.id));
            merge_quest(&mut quest, delta, giver);
            let (id, name) = (quest.id, quest.name.to_string());
            file_quest(ctx.world, quest);
            ctx.created(EntityKind::Quest, id, &name);
        }
        None => ctx.not_found(EntityKind::Quest, &candidate),
    }
}

/// Return an unmoved quest to its original position.
fn put_back(world: &mut WorldModel, slot: QuestSlot, quest: Quest) {
    match slot {
        QuestSlot::Active(i) => world.active_quests.insert(i, quest),
        QuestSlot::Completed(i) => world.completed_quests.insert(i, quest),
    }
}

fn merge_quest(quest: &mut Quest, delta: &QuestDelta, giver: Option<NpcId>) {
    overwrite(&mut quest.description, &delta.description);
    set(&mut quest.objectives, &delta.objectives);
    set(&mut quest.status, &delta.status);
    if giver.is_some() {
        quest.giver_npc_id = giver;
    }
}

fn remove_quest(ctx: &mut TurnContext<'_>, delta: &QuestDelta) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    let Some(slot) = find_quest(ctx.world, &candidate) else {
        return ctx.not_found(EntityKind::Quest, &candidate);
    };
    let quest = take_quest(ctx.world, slot);
    ctx.world.retire(quest.id.to_uuid());
    ctx.removed(EntityKind::Quest, quest.id, quest.name.as_str());
}

// =============================================================================
// World state, flags and position
// =============================================================================

pub(super) fn apply_world_state(ctx: &mut TurnContext<'_>, delta: Option<&WorldStateDelta>) {
    let Some(delta) = delta else {
        return;
    };
    let state = &mut ctx.world.world_state;
    set(&mut state.day, &delta.day);
    overwrite(&mut state.time_of_day, &delta.time_of_day);
    overwrite(&mut state.weather, &delta.weather);
    overwrite(&mut state.season, &delta.season);
    overwrite(&mut state.description, &delta.description);
    let summary = format!(
        "day {}, {}",
        state.day,
        state.time_of_day.as_deref().unwrap_or("unknown time")
    );
    ctx.record(JournalAction::Updated, ChangeSubject::WorldState, None, summary);
}

pub(super) fn apply_flags(ctx: &mut TurnContext<'_>, flags: &BTreeMap<String, Option<FlagValue>>) {
    for (key, value) in flags {
        let subject = ChangeSubject::Flag(key.clone());
        match value {
            Some(value) => {
                ctx.world.world_state_flags.insert(key.clone(), value.clone());
                ctx.record(JournalAction::Updated, subject, None, format!("flag {key} set"));
            }
            None => {
                if ctx.world.world_state_flags.remove(key).is_some() {
                    ctx.record(JournalAction::Removed, subject, None, format!("flag {key} cleared"));
                }
            }
        }
    }
}

pub(super) fn apply_current_location(ctx: &mut TurnContext<'_>, target: Option<&EntityRefData>) {
    let Some(target) = target else {
        return;
    };
    let candidate = Candidate::from_ref(target);
    match IdentityResolver::resolve(&candidate, &ctx.world.visited_locations) {
        Some(location) => {
            let (id, name) = (location.location_id, location.name.to_string());
            ctx.world.current_location_id = Some(id);
            ctx.record(
                JournalAction::Updated,
                ChangeSubject::CurrentLocation,
                Some(EntityRef::new(EntityKind::Location, id)),
                format!("party moved to {name}"),
            );
        }
        None => ctx.skipped(EntityKind::Location, &candidate, "current location is not a visited location"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_domain::{Coordinates, EntityName, QuestStatus};

    fn name(s: &str) -> EntityName {
        EntityName::new(s).unwrap()
    }

    #[test]
    fn links_to_unknown_locations_drop_the_target() {
        let known = Location::new(name("Gate"), Coordinates::new(0, 0));
        let known_id = known.location_id;
        let mut world = WorldModel::new();
        world.visited_locations.push(known);

        let link = to_link(
            &world,
            &LocationLinkData {
                target_location_id: Some(known_id.to_uuid()),
                ..Default::default()
            },
        );
        assert_eq!(link.target_location_id, Some(known_id));

        let link = to_link(
            &world,
            &LocationLinkData {
                target_location_id: Some(uuid::Uuid::new_v4()),
                target_coordinates: Coordinates::new(3, 4),
                ..Default::default()
            },
        );
        assert_eq!(link.target_location_id, None);
        assert_eq!(link.target_coordinates, Coordinates::new(3, 4));
    }

    #[test]
    fn closed_quests_are_filed_as_completed() {
        let mut world = WorldModel::new();
        let mut quest = Quest::new(name("Find the key"));
        quest.status = QuestStatus::Failed;
        file_quest(&mut world, quest);
        assert!(world.active_quests.is_empty());
        assert_eq!(world.completed_quests.len(), 1);
    }
}
