//! Factions - organisations the party has encountered

use serde::{Deserialize, Serialize};

use crate::ids::{FactionId, LocationId};
use crate::value_objects::EntityName;

/// Reputation bounds with a faction.
pub const MIN_REPUTATION: i32 = -100;
pub const MAX_REPUTATION: i32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faction {
    pub id: FactionId,
    pub name: EntityName,
    #[serde(default)]
    pub description: Option<String>,
    /// Party standing with the faction, clamped to -100..=100
    #[serde(default)]
    pub reputation: i32,
    /// Locations under this faction's control
    #[serde(default)]
    pub controlled_location_ids: Vec<LocationId>,
}

impl Faction {
    pub fn new(name: EntityName) -> Self {
        Self {
            id: FactionId::new(),
            name,
            description: None,
            reputation: 0,
            controlled_location_ids: Vec::new(),
        }
    }

    pub fn set_reputation(&mut self, value: i32) {
        self.reputation = value.clamp(MIN_REPUTATION, MAX_REPUTATION);
    }
}
