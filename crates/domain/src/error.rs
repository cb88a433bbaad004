//! Domain construction errors
//!
//! Names and parsed value objects report failures through `DomainError`;
//! the engine maps them onto its own use-case errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A value broke a construction rule, such as an empty name
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Text did not name a known variant
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
