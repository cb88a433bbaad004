//! World state value objects: ambient world conditions, flags, and the turn journal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::EntityRef;

/// Ambient conditions of the world that the game master narrates against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldState {
    /// In-game day counter
    pub day: u32,
    pub time_of_day: Option<String>,
    pub weather: Option<String>,
    pub season: Option<String>,
    pub description: Option<String>,
}

/// Value of a world-state flag set by the game master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FlagValue {
    /// Truthiness used by flag checks: `false`, `0` and empty text are unset.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(s) => !s.is_empty(),
        }
    }
}

/// What happened to an entity during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JournalAction {
    Created,
    Updated,
    Removed,
    Skipped,
    Regenerated,
}

impl std::fmt::Display for JournalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Removed => write!(f, "removed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Regenerated => write!(f, "regenerated"),
        }
    }
}

/// A single entry in the world's turn journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub turn_number: u64,
    pub recorded_at: DateTime<Utc>,
    pub action: JournalAction,
    /// The entity this entry is about, if any
    pub entity: Option<EntityRef>,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_values_deserialize_untagged() {
        let b: FlagValue = serde_json::from_str("true").unwrap();
        let i: FlagValue = serde_json::from_str("3").unwrap();
        let f: FlagValue = serde_json::from_str("0.5").unwrap();
        let t: FlagValue = serde_json::from_str("\"open\"").unwrap();
        assert_eq!(b, FlagValue::Bool(true));
        assert_eq!(i, FlagValue::Int(3));
        assert_eq!(f, FlagValue::Float(0.5));
        assert_eq!(t, FlagValue::Text("open".into()));
    }

    #[test]
    fn truthiness() {
        assert!(!FlagValue::Bool(false).is_truthy());
        assert!(!FlagValue::Int(0).is_truthy());
        assert!(FlagValue::Text("yes".into()).is_truthy());
    }
}
