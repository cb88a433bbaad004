//! Multiplayer round messages
//!
//! What the engine sends to the game master once a round of player actions
//! is complete, and what players submit into a round.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a round's actions were gathered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundMode {
    /// An initiator asked a chosen subset of players to act together
    Collective,
    /// Every active player acted at once
    Simultaneous,
}

impl std::fmt::Display for RoundMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collective => write!(f, "collective"),
            Self::Simultaneous => write!(f, "simultaneous"),
        }
    }
}

/// One player's submitted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerActionData {
    pub player_id: Uuid,
    pub text: String,
}

/// A single multi-actor turn handed to the game master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub round_id: Uuid,
    pub mode: RoundMode,
    /// Turn number the resulting payload will be applied on top of
    pub turn_number: u64,
    #[serde(default)]
    pub initiator_id: Option<Uuid>,
    #[serde(default)]
    pub initiator_name: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    /// Actions in roster order
    pub actions: Vec<PlayerActionData>,
}
