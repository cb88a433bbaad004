//! Wounds - lasting injuries tracked on player characters and NPCs

use serde::{Deserialize, Serialize};

use crate::ids::WoundId;
use crate::value_objects::EntityName;

/// How bad a wound is, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WoundSeverity {
    #[default]
    Minor,
    Moderate,
    Severe,
    Critical,
}

impl std::fmt::Display for WoundSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minor => write!(f, "Minor"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Severe => write!(f, "Severe"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// A wound carried by a character.
///
/// Without an ID, a wound is identified by its `(name, severity)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wound {
    pub id: WoundId,
    pub name: EntityName,
    #[serde(default)]
    pub severity: WoundSeverity,
    #[serde(default)]
    pub description: Option<String>,
    /// Mechanical effects as narrated (e.g., "-2 to agility")
    #[serde(default)]
    pub effects: Vec<String>,
}

impl Wound {
    pub fn new(name: EntityName, severity: WoundSeverity) -> Self {
        Self {
            id: WoundId::new(),
            name,
            severity,
            description: None,
            effects: Vec::new(),
        }
    }

    pub fn matches(&self, name: &str, severity: WoundSeverity) -> bool {
        self.name.as_str() == name && self.severity == severity
    }
}
