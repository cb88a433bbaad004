//! Characters - the player characters and the NPCs they meet
//!
//! Both kinds carry a [`CharacterInventory`]; inventory rules apply to them
//! identically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::item::{EquipmentSlot, Item};
use crate::entities::skill::{ActiveSkill, PassiveSkill, SkillMastery};
use crate::entities::wound::Wound;
use crate::ids::{FactionId, ItemId, NpcId, PlayerCharacterId, PlayerId};
use crate::value_objects::EntityName;

/// Field an inventory is displayed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortCriteria {
    /// Player-arranged order from `item_sort_order`
    #[default]
    Manual,
    Name,
    Quality,
    Weight,
    Price,
    Type,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Items a character carries plus equipment and presentation metadata.
///
/// # Invariants
///
/// - Every value in `equipped_items` references an item in `items` whose
///   slot set contains the key it is stored under.
/// - `item_sort_order` only matters when `item_sort_criteria` is `Manual`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterInventory {
    pub items: Vec<Item>,
    pub equipped_items: BTreeMap<EquipmentSlot, ItemId>,
    pub item_sort_criteria: SortCriteria,
    pub item_sort_direction: SortDirection,
    pub item_sort_order: Vec<ItemId>,
}

impl CharacterInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.existed_id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.existed_id == id)
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.existed_id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.position(id).is_some()
    }

    pub fn is_equipped(&self, id: ItemId) -> bool {
        self.equipped_items.values().any(|equipped| *equipped == id)
    }

    /// Slots currently holding the item.
    pub fn slots_of(&self, id: ItemId) -> Vec<EquipmentSlot> {
        self.equipped_items
            .iter()
            .filter(|(_, equipped)| **equipped == id)
            .map(|(slot, _)| *slot)
            .collect()
    }

    /// Find the container that holds items at `path`.
    pub fn container_at(&self, path: &[String]) -> Option<&Item> {
        let (name, parent) = path.split_last()?;
        self.items
            .iter()
            .find(|i| i.is_container && i.name.as_str() == name && i.contents_path == parent)
    }

    /// Remove every equipment and sort-order reference to `id`.
    pub fn forget(&mut self, id: ItemId) {
        self.equipped_items.retain(|_, equipped| *equipped != id);
        self.item_sort_order.retain(|entry| *entry != id);
    }
}

/// A character controlled by a human player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCharacter {
    pub id: PlayerCharacterId,
    /// The human player controlling this character
    pub player_id: PlayerId,
    pub name: EntityName,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub experience: u64,
    /// Characteristic name (e.g., "strength") to value
    #[serde(default)]
    pub characteristics: BTreeMap<String, i32>,
    #[serde(default)]
    pub active_skills: Vec<ActiveSkill>,
    #[serde(default)]
    pub passive_skills: Vec<PassiveSkill>,
    /// Mastery of active skills, keyed by skill name
    #[serde(default)]
    pub skill_mastery_data: BTreeMap<String, SkillMastery>,
    #[serde(default)]
    pub inventory: CharacterInventory,
    #[serde(default)]
    pub wounds: Vec<Wound>,
}

fn default_level() -> u32 {
    1
}

impl PlayerCharacter {
    pub fn new(player_id: PlayerId, name: EntityName) -> Self {
        Self {
            id: PlayerCharacterId::new(),
            player_id,
            name,
            level: 1,
            experience: 0,
            characteristics: BTreeMap::new(),
            active_skills: Vec::new(),
            passive_skills: Vec::new(),
            skill_mastery_data: BTreeMap::new(),
            inventory: CharacterInventory::new(),
            wounds: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_characteristic(mut self, name: impl Into<String>, value: i32) -> Self {
        self.characteristics.insert(name.into(), value);
        self
    }

    /// Characteristic value, 0 when the character lacks it.
    pub fn characteristic(&self, name: &str) -> i32 {
        self.characteristics.get(name).copied().unwrap_or(0)
    }
}

/// A non-player character the party has met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    pub id: NpcId,
    pub name: EntityName,
    #[serde(default)]
    pub description: Option<String>,
    /// Current attitude toward the party (e.g., "friendly", "hostile")
    #[serde(default)]
    pub attitude: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub faction_id: Option<FactionId>,
    #[serde(default)]
    pub is_dead: bool,
    #[serde(default)]
    pub characteristics: BTreeMap<String, i32>,
    #[serde(default)]
    pub inventory: CharacterInventory,
    #[serde(default)]
    pub wounds: Vec<Wound>,
}

impl Npc {
    pub fn new(name: EntityName) -> Self {
        Self {
            id: NpcId::new(),
            name,
            description: None,
            attitude: None,
            level: None,
            faction_id: None,
            is_dead: false,
            characteristics: BTreeMap::new(),
            inventory: CharacterInventory::new(),
            wounds: Vec::new(),
        }
    }
}
