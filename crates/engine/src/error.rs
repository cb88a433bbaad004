//! Engine-wide error type.
//!
//! Every use-case error converts into [`EngineError`], which maps onto a
//! small set of [`ErrorKind`]s the presentation layer can act on.

use serde::Serialize;

use crate::infrastructure::persistence::PersistenceError;
use crate::infrastructure::ports::{GameMasterError, SlotStoreError};
use crate::use_cases::inventory::InventoryError;
use crate::use_cases::round::RoundError;
use crate::use_cases::turn::ReconcileError;

/// Coarse classification of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NotFound,
    InvalidSlot,
    InvalidQuantity,
    IncompatibleStacks,
    InvalidTarget,
    AlreadyActive,
    AlreadySubmitted,
    NotAParticipant,
    RoundClosed,
    MalformedPayload,
    NotPermitted,
    NotReady,
    EmptyAction,
    Persistence,
    GameMaster,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Round(#[from] RoundError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Game master error: {0}")]
    GameMaster(#[from] GameMasterError),
    #[error("Slot store error: {0}")]
    SlotStore(#[from] SlotStoreError),
    #[error("Save slot is empty: {0}")]
    EmptySlot(String),
    #[error("No round is waiting to be resolved")]
    NothingPending,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Inventory(e) => match e {
                InventoryError::CharacterNotFound(_) | InventoryError::ItemNotFound(_) => {
                    ErrorKind::NotFound
                }
                InventoryError::InvalidSlot { .. } => ErrorKind::InvalidSlot,
                InventoryError::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
                InventoryError::IncompatibleStacks(_) => ErrorKind::IncompatibleStacks,
                InventoryError::InvalidTarget(_) => ErrorKind::InvalidTarget,
            },
            Self::Round(e) => match e {
                RoundError::AlreadyActive => ErrorKind::AlreadyActive,
                RoundError::AlreadySubmitted(_) => ErrorKind::AlreadySubmitted,
                RoundError::NotAParticipant(_) | RoundError::NoParticipants => {
                    ErrorKind::NotAParticipant
                }
                RoundError::RoundClosed => ErrorKind::RoundClosed,
                RoundError::NotPermitted(_) => ErrorKind::NotPermitted,
                RoundError::NotReady { .. } => ErrorKind::NotReady,
                RoundError::EmptyAction => ErrorKind::EmptyAction,
            },
            Self::Reconcile(e) => match e {
                ReconcileError::MalformedPayload(_) => ErrorKind::MalformedPayload,
                ReconcileError::NotFound { .. } => ErrorKind::NotFound,
            },
            Self::Persistence(_) | Self::SlotStore(_) => ErrorKind::Persistence,
            Self::EmptySlot(_) | Self::NothingPending => ErrorKind::NotFound,
            Self::GameMaster(GameMasterError::InvalidResponse(_)) => ErrorKind::MalformedPayload,
            Self::GameMaster(_) => ErrorKind::GameMaster,
        }
    }

    /// Whether re-requesting the turn may succeed. Inventory and round
    /// rejections are final for the attempted action.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Reconcile(ReconcileError::MalformedPayload(_)) => true,
            Self::GameMaster(e) => e.is_retryable(),
            _ => false,
        }
    }
}
