//! Quests - goals the party has taken on

use serde::{Deserialize, Serialize};

use crate::ids::{NpcId, QuestId};
use crate::value_objects::EntityName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestStatus {
    #[default]
    Active,
    Completed,
    Failed,
}

impl QuestStatus {
    /// Completed and failed quests live in the completed list.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestObjective {
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: QuestId,
    pub name: EntityName,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub objectives: Vec<QuestObjective>,
    #[serde(default)]
    pub status: QuestStatus,
    /// NPC who handed out the quest
    #[serde(default)]
    pub giver_npc_id: Option<NpcId>,
}

impl Quest {
    pub fn new(name: EntityName) -> Self {
        Self {
            id: QuestId::new(),
            name,
            description: None,
            objectives: Vec::new(),
            status: QuestStatus::Active,
            giver_npc_id: None,
        }
    }
}
