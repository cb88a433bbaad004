//! Chronicle domain - the canonical world model of an AI-narrated role-playing session.
//!
//! Pure data and invariants: no I/O, no async, no runtime dependencies.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use aggregates::WorldModel;

pub use entities::{
    ActiveSkill, CharacterInventory, Coordinates, DifficultyProfile, EffectType, EquipmentSlot,
    Faction, Item, ItemQuality, Location, LocationLink, Npc, PassiveSkill, PlayerCharacter, Quest,
    QuestObjective, QuestStatus, ScalingFlags, SkillEffect, SkillMastery, SlotSet, SortCriteria,
    SortDirection, Wound, WoundSeverity, MAX_REPUTATION, MIN_REPUTATION,
};

pub use error::DomainError;

pub use ids::{
    EntityKind, EntityRef, FactionId, ItemId, LocationId, NpcId, PlayerCharacterId, PlayerId,
    QuestId, RoundId, WoundId,
};

pub use value_objects::{EntityName, FlagValue, JournalAction, JournalEntry, WorldState};
