//! Validated name newtype for world entities
//!
//! Names arrive from the game master as free text. They are the fallback
//! identity key when no ID is supplied, so they must be valid by construction:
//! - Non-empty
//! - Within length limits
//! - Trimmed of leading/trailing whitespace

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for name fields
const MAX_NAME_LENGTH: usize = 200;

/// A validated entity name (non-empty, <=200 chars, trimmed)
///
/// Comparison is case-sensitive; identity resolution relies on exact equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityName(String);

impl EntityName {
    /// Create a new validated entity name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The name is empty after trimming
    /// - The name exceeds 200 characters after trimming
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Entity name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Entity name cannot exceed {} characters",
                MAX_NAME_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EntityName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<EntityName> for String {
    fn from(name: EntityName) -> String {
        name.0
    }
}

impl AsRef<str> for EntityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace() {
        let name = EntityName::new("  Rusty Sword  ").unwrap();
        assert_eq!(name.as_str(), "Rusty Sword");
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert!(EntityName::new("").is_err());
        assert!(EntityName::new("   ").is_err());
    }

    #[test]
    fn rejects_overlong() {
        let long = "x".repeat(201);
        assert!(matches!(
            EntityName::new(long),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn deserialize_validates() {
        let ok: EntityName = serde_json::from_str("\"Mira\"").unwrap();
        assert_eq!(ok.as_str(), "Mira");
        let bad: Result<EntityName, _> = serde_json::from_str("\"  \"");
        assert!(bad.is_err());
    }

    #[test]
    fn comparison_is_case_sensitive() {
        assert_ne!(
            EntityName::new("mira").unwrap(),
            EntityName::new("Mira").unwrap()
        );
    }
}
