//! Turn reconciliation errors.

use chronicle_domain::EntityKind;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReconcileError {
    /// The payload as a whole is unusable; re-request the turn.
    #[error("Malformed game master payload: {0}")]
    MalformedPayload(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Uuid },
}

impl ReconcileError {
    pub fn not_found(kind: EntityKind, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}
