//! WorldModel aggregate - the canonical, serializable state of one game session
//!
//! The engine's components are the only writers. Everything the presentation
//! layer shows is a projection of this aggregate.
//!
//! # Identity invariant
//!
//! Every entity with persistent identity carries a unique ID once assigned,
//! and IDs are never reused: whenever an entity is removed or re-identified,
//! its old ID is moved into `retired_ids`, and [`WorldModel::is_id_taken`]
//! treats retired IDs as taken.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Faction, Item, Location, Npc, PlayerCharacter, Quest};
use crate::ids::{FactionId, LocationId, NpcId, PlayerId, QuestId};
use crate::value_objects::{FlagValue, JournalEntry, WorldState};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldModel {
    /// One character per connected player; single-player sessions hold one
    pub player_characters: Vec<PlayerCharacter>,
    #[serde(rename = "encounteredNPCs")]
    pub encountered_npcs: Vec<Npc>,
    pub encountered_factions: Vec<Faction>,
    pub active_quests: Vec<Quest>,
    pub completed_quests: Vec<Quest>,
    pub visited_locations: Vec<Location>,
    pub world_state: WorldState,
    pub world_state_flags: BTreeMap<String, FlagValue>,
    /// Items set aside outside any character's inventory
    pub temporary_stash: Vec<Item>,
    pub current_location_id: Option<LocationId>,
    pub turn_number: u64,
    pub turn_journal: Vec<JournalEntry>,
    pub retired_ids: BTreeSet<Uuid>,
}

impl WorldModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_player(mut self, pc: PlayerCharacter) -> Self {
        self.player_characters.push(pc);
        self
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// The primary (first) player character.
    pub fn player(&self) -> Option<&PlayerCharacter> {
        self.player_characters.first()
    }

    pub fn player_for(&self, player_id: PlayerId) -> Option<&PlayerCharacter> {
        self.player_characters
            .iter()
            .find(|pc| pc.player_id == player_id)
    }

    pub fn player_for_mut(&mut self, player_id: PlayerId) -> Option<&mut PlayerCharacter> {
        self.player_characters
            .iter_mut()
            .find(|pc| pc.player_id == player_id)
    }

    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.encountered_npcs.iter().find(|n| n.id == id)
    }

    pub fn npc_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        self.encountered_npcs.iter_mut().find(|n| n.id == id)
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.encountered_factions.iter().find(|f| f.id == id)
    }

    /// Finds a quest in either the active or the completed list.
    pub fn quest(&self, id: QuestId) -> Option<&Quest> {
        self.active_quests
            .iter()
            .chain(self.completed_quests.iter())
            .find(|q| q.id == id)
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.visited_locations.iter().find(|l| l.location_id == id)
    }

    pub fn current_location(&self) -> Option<&Location> {
        self.current_location_id.and_then(|id| self.location(id))
    }

    pub fn flag(&self, key: &str) -> Option<&FlagValue> {
        self.world_state_flags.get(key)
    }

    // =========================================================================
    // Identity bookkeeping
    // =========================================================================

    /// Whether `id` is held by any live entity or has been retired.
    pub fn is_id_taken(&self, id: Uuid) -> bool {
        self.retired_ids.contains(&id) || self.live_ids().any(|live| live == id)
    }

    /// Marks an ID as permanently unavailable.
    pub fn retire(&mut self, id: Uuid) {
        self.retired_ids.insert(id);
    }

    /// Every ID currently held by a live entity.
    pub fn live_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        let players = self.player_characters.iter().flat_map(|pc| {
            std::iter::once(pc.id.to_uuid())
                .chain(pc.inventory.items.iter().map(|i| i.existed_id.to_uuid()))
                .chain(pc.wounds.iter().map(|w| w.id.to_uuid()))
        });
        let npcs = self.encountered_npcs.iter().flat_map(|npc| {
            std::iter::once(npc.id.to_uuid())
                .chain(npc.inventory.items.iter().map(|i| i.existed_id.to_uuid()))
                .chain(npc.wounds.iter().map(|w| w.id.to_uuid()))
        });
        players
            .chain(npcs)
            .chain(self.encountered_factions.iter().map(|f| f.id.to_uuid()))
            .chain(self.active_quests.iter().map(|q| q.id.to_uuid()))
            .chain(self.completed_quests.iter().map(|q| q.id.to_uuid()))
            .chain(self.visited_locations.iter().map(|l| l.location_id.to_uuid()))
            .chain(self.temporary_stash.iter().map(|i| i.existed_id.to_uuid()))
    }

    // =========================================================================
    // Journal
    // =========================================================================

    /// Appends a journal entry, dropping the oldest entries beyond `cap`.
    pub fn record(&mut self, entry: JournalEntry, cap: usize) {
        self.turn_journal.push(entry);
        if self.turn_journal.len() > cap {
            let excess = self.turn_journal.len() - cap;
            self.turn_journal.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Item;
    use crate::value_objects::{EntityName, JournalAction};
    use chrono::{TimeZone, Utc};

    fn name(s: &str) -> EntityName {
        EntityName::new(s).unwrap()
    }

    fn entry(turn: u64) -> JournalEntry {
        JournalEntry {
            turn_number: turn,
            recorded_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            action: JournalAction::Updated,
            entity: None,
            summary: format!("turn {turn}"),
        }
    }

    #[test]
    fn retired_ids_count_as_taken() {
        let mut world = WorldModel::new();
        let id = Uuid::new_v4();
        assert!(!world.is_id_taken(id));
        world.retire(id);
        assert!(world.is_id_taken(id));
    }

    #[test]
    fn live_ids_include_nested_items() {
        let mut pc = PlayerCharacter::new(PlayerId::new(), name("Ash"));
        let item = Item::new(name("Rope"));
        let item_id = item.existed_id.to_uuid();
        pc.inventory.items.push(item);
        let world = WorldModel::new().with_player(pc);
        assert!(world.is_id_taken(item_id));
    }

    #[test]
    fn journal_is_capped() {
        let mut world = WorldModel::new();
        for turn in 0..5 {
            world.record(entry(turn), 3);
        }
        assert_eq!(world.turn_journal.len(), 3);
        assert_eq!(world.turn_journal[0].turn_number, 2);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let json = serde_json::to_value(WorldModel::new()).unwrap();
        assert!(json.get("encounteredNPCs").is_some());
        assert!(json.get("worldStateFlags").is_some());
        assert!(json.get("temporaryStash").is_some());
        assert!(json.get("turnNumber").is_some());
    }
}
