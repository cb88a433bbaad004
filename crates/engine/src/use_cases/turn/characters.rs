//! NPCs, wounds and player progression.

use chronicle_domain::{
    EntityKind, EntityName, FactionId, Npc, NpcId, PlayerId, WorldModel, Wound, WoundId,
};
use chronicle_shared::{CharacterRefData, EntityChanges, NpcDelta, PlayerDelta, WoundDelta};

use super::{overwrite, set, validated_name, TurnContext};
use crate::use_cases::identity::{Candidate, IdentityResolver, WoundHolder, WoundLocation};

// =============================================================================
// NPCs
// =============================================================================

pub(super) fn apply_npcs(ctx: &mut TurnContext<'_>, changes: &EntityChanges<NpcDelta>) {
    for delta in &changes.added {
        upsert_npc(ctx, delta, true);
    }
    for delta in &changes.updated {
        upsert_npc(ctx, delta, false);
    }
    for delta in &changes.removed {
        remove_npc(ctx, delta);
    }
}

fn upsert_npc(ctx: &mut TurnContext<'_>, delta: &NpcDelta, create: bool) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    let name = match validated_name(delta.name.as_deref()) {
        Ok(name) => name,
        Err(reason) => return ctx.skipped(EntityKind::Npc, &candidate, reason),
    };
    let faction = known_faction(ctx, delta.faction_id);

    match IdentityResolver::position(&candidate, &ctx.world.encountered_npcs) {
        Some(index) => {
            let npc = &mut ctx.world.encountered_npcs[index];
            merge_npc(npc, delta, name, faction);
            let (id, name) = (npc.id, npc.name.to_string());
            ctx.updated(EntityKind::Npc, id, &name);
        }
        None if create => {
            let Some(name) = name else {
                return ctx.skipped(EntityKind::Npc, &candidate, "a new NPC needs a name");
            };
            let mut npc = Npc::new(name);
            npc.id = NpcId::from_uuid(ctx.allocate(delta.id));
            merge_npc(&mut npc, delta, None, faction);
            let (id, name) = (npc.id, npc.name.to_string());
            ctx.world.encountered_npcs.push(npc);
            ctx.created(EntityKind::Npc, id, &name);
        }
        None => ctx.not_found(EntityKind::Npc, &candidate),
    }
}

/// Faction references must point at a faction the party knows.
fn known_faction(ctx: &TurnContext<'_>, faction_id: Option<uuid::Uuid>) -> Option<FactionId> {
    let id = FactionId::from_uuid(faction_id?);
    if ctx.world.faction(id).is_some() {
        Some(id)
    } else {
        tracing::warn!(faction_id = %id, "Ignoring reference to unknown faction");
        None
    }
}

fn merge_npc(npc: &mut Npc, delta: &NpcDelta, name: Option<EntityName>, faction: Option<FactionId>) {
    if let Some(name) = name {
        npc.name = name;
    }
    overwrite(&mut npc.description, &delta.description);
    overwrite(&mut npc.attitude, &delta.attitude);
    overwrite(&mut npc.level, &delta.level);
    set(&mut npc.is_dead, &delta.is_dead);
    if faction.is_some() {
        npc.faction_id = faction;
    }
    if let Some(characteristics) = &delta.characteristics {
        npc.characteristics
            .extend(characteristics.iter().map(|(k, v)| (k.clone(), *v)));
    }
}

fn remove_npc(ctx: &mut TurnContext<'_>, delta: &NpcDelta) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    let Some(index) = IdentityResolver::position(&candidate, &ctx.world.encountered_npcs) else {
        return ctx.not_found(EntityKind::Npc, &candidate);
    };
    let npc = ctx.world.encountered_npcs.remove(index);

    for quest in ctx
        .world
        .active_quests
        .iter_mut()
        .chain(ctx.world.completed_quests.iter_mut())
    {
        if quest.giver_npc_id == Some(npc.id) {
            quest.giver_npc_id = None;
        }
    }

    let retired = std::iter::once(npc.id.to_uuid())
        .chain(npc.inventory.items.iter().map(|i| i.existed_id.to_uuid()))
        .chain(npc.wounds.iter().map(|w| w.id.to_uuid()));
    ctx.retire_all(retired.collect::<Vec<_>>());
    ctx.removed(EntityKind::Npc, npc.id, npc.name.as_str());
}

// =============================================================================
// Wounds
// =============================================================================

pub(super) fn apply_wounds(ctx: &mut TurnContext<'_>, changes: &EntityChanges<WoundDelta>) {
    for delta in &changes.added {
        upsert_wound(ctx, delta, true);
    }
    for delta in &changes.updated {
        upsert_wound(ctx, delta, false);
    }
    for delta in &changes.removed {
        remove_wound(ctx, delta);
    }
}

/// Resolve which character a reference means.
pub(super) fn resolve_character(world: &WorldModel, owner: &CharacterRefData) -> Option<WoundHolder> {
    match owner {
        CharacterRefData::Player { player_id } => player_index(world, *player_id).map(WoundHolder::Player),
        CharacterRefData::Npc { id, name } => {
            IdentityResolver::position(&Candidate::new(*id, name.as_deref()), &world.encountered_npcs)
                .map(WoundHolder::Npc)
        }
    }
}

/// Index of a player's character; `None` means the primary player.
pub(super) fn player_index(world: &WorldModel, player_id: Option<uuid::Uuid>) -> Option<usize> {
    match player_id {
        Some(id) => {
            let id = PlayerId::from_uuid(id);
            world
                .player_characters
                .iter()
                .position(|pc| pc.player_id == id)
        }
        None => (!world.player_characters.is_empty()).then_some(0),
    }
}

fn wounds_mut(world: &mut WorldModel, holder: WoundHolder) -> Option<&mut Vec<Wound>> {
    match holder {
        WoundHolder::Player(i) => world.player_characters.get_mut(i).map(|pc| &mut pc.wounds),
        WoundHolder::Npc(i) => world.encountered_npcs.get_mut(i).map(|npc| &mut npc.wounds),
    }
}

/// With an owner, only that character's wounds are searched; without one,
/// players are searched before NPCs.
fn locate_wound(ctx: &TurnContext<'_>, delta: &WoundDelta, candidate: &Candidate<'_>) -> Result<Option<WoundLocation>, String> {
    match &delta.owner {
        Some(owner) => {
            let holder = resolve_character(ctx.world, owner)
                .ok_or_else(|| "the wound's owner is unknown".to_string())?;
            let wounds = match holder {
                WoundHolder::Player(i) => ctx.world.player_characters.get(i).map(|pc| &pc.wounds),
                WoundHolder::Npc(i) => ctx.world.encountered_npcs.get(i).map(|npc| &npc.wounds),
            };
            Ok(wounds
                .and_then(|wounds| IdentityResolver::wound_position(candidate, delta.severity, wounds))
                .map(|index| WoundLocation { holder, index }))
        }
        None => Ok(IdentityResolver::resolve_wound(ctx.world, candidate, delta.severity)),
    }
}

fn upsert_wound(ctx: &mut TurnContext<'_>, delta: &WoundDelta, create: bool) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    let name = match validated_name(delta.name.as_deref()) {
        Ok(name) => name,
        Err(reason) => return ctx.skipped(EntityKind::Wound, &candidate, reason),
    };
    let location = match locate_wound(ctx, delta, &candidate) {
        Ok(location) => location,
        Err(reason) => return ctx.skipped(EntityKind::Wound, &candidate, reason),
    };

    match location {
        Some(location) if delta.healed => remove_wound_at(ctx, location, "healed"),
        Some(WoundLocation { holder, index }) => {
            let Some(wound) = wounds_mut(ctx.world, holder).and_then(|w| w.get_mut(index)) else {
                return ctx.not_found(EntityKind::Wound, &candidate);
            };
            if let Some(name) = name {
                wound.name = name;
            }
            set(&mut wound.severity, &delta.severity);
            overwrite(&mut wound.description, &delta.description);
            set(&mut wound.effects, &delta.effects);
            let (id, name) = (wound.id, wound.name.to_string());
            ctx.updated(EntityKind::Wound, id, &name);
        }
        None if create && !delta.healed => {
            let Some(name) = name else {
                return ctx.skipped(EntityKind::Wound, &candidate, "a new wound needs a name");
            };
            let owner = delta
                .owner
                .clone()
                .unwrap_or(CharacterRefData::Player { player_id: None });
            let Some(holder) = resolve_character(ctx.world, &owner) else {
                return ctx.skipped(EntityKind::Wound, &candidate, "the wound's owner is unknown");
            };
            let mut wound = Wound::new(name, delta.severity.unwrap_or_default());
            wound.id = WoundId::from_uuid(ctx.allocate(delta.id));
            overwrite(&mut wound.description, &delta.description);
            set(&mut wound.effects, &delta.effects);
            let (id, name) = (wound.id, wound.name.to_string());
            if let Some(wounds) = wounds_mut(ctx.world, holder) {
                wounds.push(wound);
                ctx.created(EntityKind::Wound, id, &name);
            }
        }
        None => ctx.not_found(EntityKind::Wound, &candidate),
    }
}

fn remove_wound(ctx: &mut TurnContext<'_>, delta: &WoundDelta) {
    let candidate = Candidate::new(delta.id, delta.name.as_deref());
    match locate_wound(ctx, delta, &candidate) {
        Ok(Some(location)) => remove_wound_at(ctx, location, "removed"),
        Ok(None) => ctx.not_found(EntityKind::Wound, &candidate),
        Err(reason) => ctx.skipped(EntityKind::Wound, &candidate, reason),
    }
}

fn remove_wound_at(ctx: &mut TurnContext<'_>, location: WoundLocation, why: &str) {
    let Some(wounds) = wounds_mut(ctx.world, location.holder) else {
        return;
    };
    if location.index >= wounds.len() {
        return;
    }
    let wound = wounds.remove(location.index);
    ctx.world.retire(wound.id.to_uuid());
    ctx.removed(EntityKind::Wound, wound.id, &format!("{} ({why})", wound.name));
}

// =============================================================================
// Player progression
// =============================================================================

pub(super) fn apply_player_updates(ctx: &mut TurnContext<'_>, updates: &[PlayerDelta]) {
    for delta in updates {
        let Some(index) = player_index(ctx.world, delta.player_id) else {
            let candidate = Candidate::new(delta.player_id, None);
            ctx.skipped(EntityKind::PlayerCharacter, &candidate, "no such player");
            continue;
        };
        let pc = &mut ctx.world.player_characters[index];
        set(&mut pc.level, &delta.level);
        set(&mut pc.experience, &delta.experience);
        if let Some(characteristics) = &delta.characteristics {
            pc.characteristics
                .extend(characteristics.iter().map(|(k, v)| (k.clone(), *v)));
        }
        if let Some(mastery) = &delta.skill_mastery {
            pc.skill_mastery_data
                .extend(mastery.iter().map(|(k, v)| (k.clone(), *v)));
        }
        let (id, name) = (pc.id, pc.name.to_string());
        ctx.updated(EntityKind::PlayerCharacter, id, &name);
    }
}
