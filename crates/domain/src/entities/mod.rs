//! Domain entities - Core game objects with identity

mod character;
mod faction;
mod item;
mod location;
mod quest;
mod skill;
mod wound;

pub use character::{CharacterInventory, Npc, PlayerCharacter, SortCriteria, SortDirection};
pub use faction::{Faction, MAX_REPUTATION, MIN_REPUTATION};
pub use item::{EquipmentSlot, Item, ItemQuality, SlotSet};
pub use location::{Coordinates, DifficultyProfile, Location, LocationLink};
pub use quest::{Quest, QuestObjective, QuestStatus};
pub use skill::{ActiveSkill, EffectType, PassiveSkill, ScalingFlags, SkillEffect, SkillMastery};
pub use wound::{Wound, WoundSeverity};
