//! Error types for port operations.

/// Failures reported by the game-master adapter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameMasterError {
    /// No game master is configured (offline tools, tests).
    #[error("Game master unavailable: {0}")]
    Unavailable(String),

    /// The request timed out or the connection dropped; worth retrying.
    #[error("Game master request failed: {0}")]
    Transient(String),

    /// The game master answered with something that is not a turn payload.
    #[error("Game master returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl GameMasterError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::InvalidResponse(_))
    }
}

/// Save-slot storage errors with context for debugging.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SlotStoreError {
    #[error("Invalid slot name: {0:?}")]
    InvalidSlot(String),

    /// Storage backend failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },
}

impl SlotStoreError {
    pub fn storage(operation: &'static str, message: impl ToString) -> Self {
        Self::Storage {
            operation,
            message: message.to_string(),
        }
    }
}
