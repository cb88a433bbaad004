//! Round state as seen from outside the coordinator.

use std::collections::BTreeMap;

use serde::Serialize;

use chronicle_domain::{PlayerId, RoundId};
use chronicle_shared::{PlayerActionData, RoundMode, TurnRequest};

/// Where a round is in its lifecycle.
///
/// `Resolved` and `Cancelled` are terminal: the round stays visible until
/// the next one is opened, but accepts nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundPhase {
    Idle,
    Collecting,
    Ready,
    Resolved,
    Cancelled,
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Collecting => write!(f, "collecting"),
            Self::Ready => write!(f, "ready"),
            Self::Resolved => write!(f, "resolved"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Read-only view of the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    pub round_id: Option<RoundId>,
    pub phase: RoundPhase,
    pub mode: Option<RoundMode>,
    pub initiator_id: Option<PlayerId>,
    pub prompt: Option<String>,
    /// Players whose actions the round waits for, in roster order
    pub participants: Vec<PlayerId>,
    pub submitted: Vec<PlayerId>,
    pub pending: Vec<PlayerId>,
}

impl RoundSnapshot {
    pub fn idle() -> Self {
        Self {
            round_id: None,
            phase: RoundPhase::Idle,
            mode: None,
            initiator_id: None,
            prompt: None,
            participants: Vec::new(),
            submitted: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == RoundPhase::Ready
    }
}

/// Collective action as the presentation layer tracks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectiveActionState {
    pub is_active: bool,
    pub initiator_id: PlayerId,
    pub initiator_name: Option<String>,
    pub prompt: Option<String>,
    pub participant_ids: Vec<PlayerId>,
    pub actions: BTreeMap<PlayerId, String>,
}

/// Simultaneous round actions, scoped to the active roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimultaneousRoundState {
    pub round_actions: BTreeMap<PlayerId, String>,
}

/// A completed round, ready for the game master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResolution {
    pub round_id: RoundId,
    pub mode: RoundMode,
    pub initiator_id: Option<PlayerId>,
    pub initiator_name: Option<String>,
    pub prompt: Option<String>,
    /// One entry per participant, in roster order
    pub actions: Vec<(PlayerId, String)>,
}

impl RoundResolution {
    /// The request the game master resolves; `turn_number` is the world's
    /// turn the payload will be applied on top of.
    pub fn to_turn_request(&self, turn_number: u64) -> TurnRequest {
        TurnRequest {
            round_id: self.round_id.to_uuid(),
            mode: self.mode,
            turn_number,
            initiator_id: self.initiator_id.map(PlayerId::to_uuid),
            initiator_name: self.initiator_name.clone(),
            prompt: self.prompt.clone(),
            actions: self
                .actions
                .iter()
                .map(|(player, text)| PlayerActionData {
                    player_id: player.to_uuid(),
                    text: text.clone(),
                })
                .collect(),
        }
    }
}

/// Result of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Recorded; the round is still open
    Recorded(RoundSnapshot),
    /// The submission completed a round that resolves automatically
    Resolved(RoundResolution),
}
