//! What a turn did to the world.

use serde::Serialize;

use chronicle_domain::{EntityKind, EntityRef, JournalAction};

/// Part of the world a change touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ChangeSubject {
    Entity(EntityKind),
    WorldState,
    Flag(String),
    CurrentLocation,
}

impl std::fmt::Display for ChangeSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entity(kind) => write!(f, "{kind}"),
            Self::WorldState => write!(f, "world_state"),
            Self::Flag(key) => write!(f, "flag:{key}"),
            Self::CurrentLocation => write!(f, "current_location"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedChange {
    pub action: JournalAction,
    pub subject: ChangeSubject,
    pub entity: Option<EntityRef>,
    pub summary: String,
}

/// Every change a turn applied or skipped, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedLog {
    pub turn_number: u64,
    pub narration: Option<String>,
    pub changes: Vec<AppliedChange>,
}

impl AppliedLog {
    pub fn with_action(&self, action: JournalAction) -> impl Iterator<Item = &AppliedChange> + '_ {
        self.changes.iter().filter(move |change| change.action == action)
    }

    pub fn count(&self, action: JournalAction) -> usize {
        self.with_action(action).count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &AppliedChange> + '_ {
        self.with_action(JournalAction::Skipped)
    }

    /// Whether every change in the payload was applied.
    pub fn is_clean(&self) -> bool {
        self.count(JournalAction::Skipped) == 0
    }
}
