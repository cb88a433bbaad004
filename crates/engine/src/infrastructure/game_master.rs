//! A game master that needs no network.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use chronicle_shared::{GmTurnPayload, TurnRequest};

use crate::infrastructure::ports::{GameMasterError, GameMasterPort};

/// Replays prepared payloads in order, one per round. Keeps every request it
/// receives so callers can inspect what would have been sent.
#[derive(Default)]
pub struct ScriptedGameMaster {
    script: Mutex<VecDeque<GmTurnPayload>>,
    received: Mutex<Vec<TurnRequest>>,
}

impl ScriptedGameMaster {
    pub fn new(payloads: impl IntoIterator<Item = GmTurnPayload>) -> Self {
        Self {
            script: Mutex::new(payloads.into_iter().collect()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub async fn push(&self, payload: GmTurnPayload) {
        self.script.lock().await.push_back(payload);
    }

    pub async fn received(&self) -> Vec<TurnRequest> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl GameMasterPort for ScriptedGameMaster {
    async fn resolve_round(&self, request: TurnRequest) -> Result<GmTurnPayload, GameMasterError> {
        self.received.lock().await.push(request);
        self.script
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| GameMasterError::Unavailable("script exhausted".to_string()))
    }
}
