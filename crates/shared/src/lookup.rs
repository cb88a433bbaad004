//! Entity detail requests from the presentation layer
//!
//! The presentation layer caches entity references across turns. It refreshes
//! them by sending back whatever it holds; the engine answers with the current
//! canonical copy.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chronicle_domain::{EntityKind, Faction, Item, Location, Npc, PlayerCharacter, Quest, Wound};

/// A cached reference to refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityLookup {
    pub kind: EntityKind,
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
}

impl EntityLookup {
    pub fn by_id(kind: EntityKind, id: impl Into<Uuid>) -> Self {
        Self {
            kind,
            id: Some(id.into()),
            name: None,
        }
    }

    pub fn by_name(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            id: None,
            name: Some(name.into()),
        }
    }
}

/// The current canonical copy of a looked-up entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "camelCase")]
pub enum EntityDetail {
    Npc(Npc),
    Item(Item),
    Quest(Quest),
    Location(Location),
    Faction(Faction),
    Wound(Wound),
    PlayerCharacter(Box<PlayerCharacter>),
}

impl EntityDetail {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Npc(_) => EntityKind::Npc,
            Self::Item(_) => EntityKind::Item,
            Self::Quest(_) => EntityKind::Quest,
            Self::Location(_) => EntityKind::Location,
            Self::Faction(_) => EntityKind::Faction,
            Self::Wound(_) => EntityKind::Wound,
            Self::PlayerCharacter(_) => EntityKind::PlayerCharacter,
        }
    }
}
