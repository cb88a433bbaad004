//! Game-master turn payload
//!
//! The structured result the narrative subsystem returns for one turn. Every
//! collection is a set of deltas:
//!
//! - `added`: entities the game master introduces (creation intent)
//! - `updated`: changes to entities that should already exist
//! - `removed`: explicit deletions
//!
//! Any field left out (or `null`) means "unchanged". An entity left out means
//! "no change to this entity". Nothing is ever deleted by omission.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chronicle_domain::{
    Coordinates, DifficultyProfile, FlagValue, ItemQuality, QuestObjective, QuestStatus,
    SkillMastery, SlotSet, WoundSeverity,
};

/// Complete turn result from the game master.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GmTurnPayload {
    /// Narration shown to players; the engine only journals it
    pub narration: Option<String>,
    pub npcs: EntityChanges<NpcDelta>,
    pub items: EntityChanges<ItemDelta>,
    pub quests: EntityChanges<QuestDelta>,
    pub locations: EntityChanges<LocationDelta>,
    pub factions: EntityChanges<FactionDelta>,
    pub wounds: EntityChanges<WoundDelta>,
    pub world_state: Option<WorldStateDelta>,
    /// `null` values delete the flag
    pub world_state_flags: BTreeMap<String, Option<FlagValue>>,
    pub current_location: Option<EntityRefData>,
    pub player_updates: Vec<PlayerDelta>,
}

impl GmTurnPayload {
    /// Whether the payload carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
            && self.items.is_empty()
            && self.quests.is_empty()
            && self.locations.is_empty()
            && self.factions.is_empty()
            && self.wounds.is_empty()
            && self.world_state.is_none()
            && self.world_state_flags.is_empty()
            && self.current_location.is_none()
            && self.player_updates.is_empty()
    }
}

/// Added/updated/removed deltas for one entity collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityChanges<T> {
    pub added: Vec<T>,
    pub updated: Vec<T>,
    pub removed: Vec<T>,
}

impl<T> Default for EntityChanges<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            updated: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T> EntityChanges<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Reference to an entity by ID or, failing that, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityRefData {
    pub id: Option<Uuid>,
    pub name: Option<String>,
}

// =============================================================================
// Entity deltas
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NpcDelta {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub attitude: Option<String>,
    pub level: Option<u32>,
    pub faction_id: Option<Uuid>,
    pub is_dead: Option<bool>,
    pub characteristics: Option<BTreeMap<String, i32>>,
}

/// Whose inventory an item delta applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ItemOwnerData {
    /// A player character; `None` means the primary player
    #[serde(rename_all = "camelCase")]
    Player {
        #[serde(default)]
        player_id: Option<Uuid>,
    },
    Npc {
        #[serde(default)]
        id: Option<Uuid>,
        #[serde(default)]
        name: Option<String>,
    },
    Stash,
}

impl Default for ItemOwnerData {
    fn default() -> Self {
        Self::Player { player_id: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemDelta {
    pub owner: ItemOwnerData,
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub item_type: Option<String>,
    pub quality: Option<ItemQuality>,
    /// 0 on an update consumes the item
    pub count: Option<u32>,
    pub weight: Option<f64>,
    pub price: Option<u32>,
    pub equipment_slot: Option<SlotSet>,
    pub is_container: Option<bool>,
    pub contents_path: Option<Vec<String>>,
    pub resource: Option<u32>,
    pub maximum_resource: Option<u32>,
    pub durability: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestDelta {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub objectives: Option<Vec<QuestObjective>>,
    pub status: Option<QuestStatus>,
    pub giver_npc_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationLinkData {
    pub target_location_id: Option<Uuid>,
    pub target_coordinates: Coordinates,
    pub name: Option<String>,
    pub estimated_difficulty: DifficultyProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationDelta {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub adjacency_map: Option<Vec<LocationLinkData>>,
    pub difficulty_profile: Option<DifficultyProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FactionDelta {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub reputation: Option<i32>,
    pub controlled_location_ids: Option<Vec<Uuid>>,
}

/// Which character a wound belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CharacterRefData {
    #[serde(rename_all = "camelCase")]
    Player {
        #[serde(default)]
        player_id: Option<Uuid>,
    },
    Npc {
        #[serde(default)]
        id: Option<Uuid>,
        #[serde(default)]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WoundDelta {
    /// Required when adding; lookups search every character otherwise
    pub owner: Option<CharacterRefData>,
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub severity: Option<WoundSeverity>,
    pub description: Option<String>,
    pub effects: Option<Vec<String>>,
    /// `true` on an update removes the wound
    pub healed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldStateDelta {
    pub day: Option<u32>,
    pub time_of_day: Option<String>,
    pub weather: Option<String>,
    pub season: Option<String>,
    pub description: Option<String>,
}

/// Progression changes for one player character. Map fields merge per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerDelta {
    /// `None` means the primary player
    pub player_id: Option<Uuid>,
    pub level: Option<u32>,
    pub experience: Option<u64>,
    pub characteristics: Option<BTreeMap<String, i32>>,
    pub skill_mastery: Option<BTreeMap<String, SkillMastery>>,
}
