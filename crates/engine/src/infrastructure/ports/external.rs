//! External service port traits.

use async_trait::async_trait;
use chronicle_shared::{GmTurnPayload, TurnRequest};

use super::error::{GameMasterError, SlotStoreError};

/// The narrative subsystem that turns player actions into a turn payload.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameMasterPort: Send + Sync {
    async fn resolve_round(&self, request: TurnRequest) -> Result<GmTurnPayload, GameMasterError>;
}

/// Named save slots holding serialized world snapshots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn save(&self, slot: &str, bytes: Vec<u8>) -> Result<(), SlotStoreError>;
    async fn load(&self, slot: &str) -> Result<Option<Vec<u8>>, SlotStoreError>;
    async fn delete(&self, slot: &str) -> Result<(), SlotStoreError>;
}
