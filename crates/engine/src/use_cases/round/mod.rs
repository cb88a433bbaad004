//! Multiplayer round coordination.
//!
//! One coordinator drives both round kinds. They differ only in who must act
//! and who may close the round:
//!
//! | | participants | process / cancel |
//! |---|---|---|
//! | collective | the initiator's chosen players | initiator only |
//! | simultaneous | the active roster | controllers, or any roster player when none are designated |
//!
//! Calls are linearised through a single mutex, so concurrent submissions
//! from different players are applied one at a time and readiness is always
//! evaluated against a consistent round.

mod error;
mod types;

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use chronicle_domain::{PlayerId, RoundId};
use chronicle_shared::RoundMode;

use crate::infrastructure::ports::IdGenerator;

pub use error::RoundError;
pub use types::{
    CollectiveActionState, RoundPhase, RoundResolution, RoundSnapshot, SimultaneousRoundState,
    SubmitOutcome,
};

/// An open round.
#[derive(Debug, Clone)]
struct Round {
    id: RoundId,
    mode: RoundMode,
    initiator_id: Option<PlayerId>,
    initiator_name: Option<String>,
    prompt: Option<String>,
    /// Chosen participants; simultaneous rounds read the roster instead
    participants: Vec<PlayerId>,
    controllers: Vec<PlayerId>,
    actions: BTreeMap<PlayerId, String>,
}

impl Round {
    fn expected<'a>(&'a self, roster: &'a [PlayerId]) -> &'a [PlayerId] {
        match self.mode {
            RoundMode::Collective => &self.participants,
            RoundMode::Simultaneous => roster,
        }
    }

    fn pending(&self, roster: &[PlayerId]) -> Vec<PlayerId> {
        self.expected(roster)
            .iter()
            .filter(|p| !self.actions.contains_key(*p))
            .copied()
            .collect()
    }

    fn is_ready(&self, roster: &[PlayerId]) -> bool {
        !self.expected(roster).is_empty() && self.pending(roster).is_empty()
    }

    fn may_close(&self, caller: PlayerId, roster: &[PlayerId]) -> bool {
        match self.mode {
            RoundMode::Collective => self.initiator_id == Some(caller),
            RoundMode::Simultaneous if self.controllers.is_empty() => roster.contains(&caller),
            RoundMode::Simultaneous => self.controllers.contains(&caller),
        }
    }

    fn snapshot(&self, roster: &[PlayerId], phase: RoundPhase) -> RoundSnapshot {
        let expected = self.expected(roster);
        RoundSnapshot {
            round_id: Some(self.id),
            phase,
            mode: Some(self.mode),
            initiator_id: self.initiator_id,
            prompt: self.prompt.clone(),
            participants: expected.to_vec(),
            submitted: expected
                .iter()
                .filter(|p| self.actions.contains_key(*p))
                .copied()
                .collect(),
            pending: self.pending(roster),
        }
    }

    /// Only the current participants' actions are handed on.
    fn resolution(&self, roster: &[PlayerId]) -> RoundResolution {
        RoundResolution {
            round_id: self.id,
            mode: self.mode,
            initiator_id: self.initiator_id,
            initiator_name: self.initiator_name.clone(),
            prompt: self.prompt.clone(),
            actions: self
                .expected(roster)
                .iter()
                .filter_map(|p| self.actions.get(p).map(|text| (*p, text.clone())))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
enum RoundSlot {
    Idle,
    Open(Round),
    /// The last round, kept for inspection after it closed
    Closed(Round, RoundPhase),
}

#[derive(Debug)]
struct CoordinatorState {
    roster: Vec<PlayerId>,
    slot: RoundSlot,
}

impl CoordinatorState {
    fn open_round(&mut self) -> Result<&mut Round, RoundError> {
        match &mut self.slot {
            RoundSlot::Open(round) => Ok(round),
            _ => Err(RoundError::RoundClosed),
        }
    }

    fn snapshot(&self) -> RoundSnapshot {
        match &self.slot {
            RoundSlot::Idle => RoundSnapshot::idle(),
            RoundSlot::Open(round) => {
                let phase = if round.is_ready(&self.roster) {
                    RoundPhase::Ready
                } else {
                    RoundPhase::Collecting
                };
                round.snapshot(&self.roster, phase)
            }
            RoundSlot::Closed(round, phase) => round.snapshot(&self.roster, *phase),
        }
    }

    /// Close the open round with `phase`, returning it.
    fn close(&mut self, phase: RoundPhase) -> Option<Round> {
        match std::mem::replace(&mut self.slot, RoundSlot::Idle) {
            RoundSlot::Open(round) => {
                self.slot = RoundSlot::Closed(round.clone(), phase);
                Some(round)
            }
            other => {
                self.slot = other;
                None
            }
        }
    }

    fn resolve(&mut self) -> Option<RoundResolution> {
        let roster = self.roster.clone();
        let round = self.close(RoundPhase::Resolved)?;
        let resolution = round.resolution(&roster);
        tracing::info!(
            round_id = %round.id,
            mode = %round.mode,
            actions = resolution.actions.len(),
            "Round resolved"
        );
        Some(resolution)
    }

    /// Resolve an open simultaneous round that has become ready.
    fn auto_resolve(&mut self) -> Option<RoundResolution> {
        let ready = match &self.slot {
            RoundSlot::Open(round) => {
                round.mode == RoundMode::Simultaneous && round.is_ready(&self.roster)
            }
            _ => false,
        };
        if ready {
            self.resolve()
        } else {
            None
        }
    }
}

/// Unique, order-preserving player list.
fn dedup(players: Vec<PlayerId>) -> Vec<PlayerId> {
    let mut out = Vec::with_capacity(players.len());
    for player in players {
        if !out.contains(&player) {
            out.push(player);
        }
    }
    out
}

pub struct RoundCoordinator {
    state: Mutex<CoordinatorState>,
    ids: Arc<dyn IdGenerator>,
    auto_resolve: bool,
}

impl RoundCoordinator {
    /// `auto_resolve` makes simultaneous rounds resolve as soon as every
    /// roster player has acted; otherwise they wait for [`Self::process`].
    pub fn new(ids: Arc<dyn IdGenerator>, auto_resolve: bool) -> Self {
        Self {
            state: Mutex::new(CoordinatorState {
                roster: Vec::new(),
                slot: RoundSlot::Idle,
            }),
            ids,
            auto_resolve,
        }
    }

    pub async fn snapshot(&self) -> RoundSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn is_ready(&self) -> bool {
        self.snapshot().await.is_ready()
    }

    pub async fn active_roster(&self) -> Vec<PlayerId> {
        self.state.lock().await.roster.clone()
    }

    /// Replace the active roster. An open simultaneous round is re-evaluated
    /// against the new roster and may resolve.
    pub async fn set_active_roster(&self, players: Vec<PlayerId>) -> Option<RoundResolution> {
        let mut state = self.state.lock().await;
        state.roster = dedup(players);
        tracing::debug!(players = state.roster.len(), "Active roster updated");
        if self.auto_resolve {
            state.auto_resolve()
        } else {
            None
        }
    }

    /// Start a collective action: the initiator asks `participants` to act
    /// together.
    pub async fn request_collective(
        &self,
        initiator_id: PlayerId,
        initiator_name: Option<String>,
        participants: Vec<PlayerId>,
        prompt: Option<String>,
    ) -> Result<RoundSnapshot, RoundError> {
        let participants = dedup(participants);
        if participants.is_empty() {
            return Err(RoundError::NoParticipants);
        }
        self.open(Round {
            id: RoundId::from_uuid(self.ids.new_uuid()),
            mode: RoundMode::Collective,
            initiator_id: Some(initiator_id),
            initiator_name,
            prompt,
            participants,
            controllers: Vec::new(),
            actions: BTreeMap::new(),
        })
        .await
    }

    /// Start a simultaneous round over the active roster. `controllers` may
    /// process and cancel it; with none, any roster player may.
    pub async fn open_simultaneous(&self, controllers: Vec<PlayerId>) -> Result<RoundSnapshot, RoundError> {
        self.open(Round {
            id: RoundId::from_uuid(self.ids.new_uuid()),
            mode: RoundMode::Simultaneous,
            initiator_id: None,
            initiator_name: None,
            prompt: None,
            participants: Vec::new(),
            controllers: dedup(controllers),
            actions: BTreeMap::new(),
        })
        .await
    }

    async fn open(&self, round: Round) -> Result<RoundSnapshot, RoundError> {
        let mut state = self.state.lock().await;
        if matches!(state.slot, RoundSlot::Open(_)) {
            return Err(RoundError::AlreadyActive);
        }
        if round.mode == RoundMode::Simultaneous && state.roster.is_empty() {
            return Err(RoundError::NoParticipants);
        }
        tracing::info!(
            round_id = %round.id,
            mode = %round.mode,
            participants = round.expected(&state.roster).len(),
            "Round opened"
        );
        state.slot = RoundSlot::Open(round);
        Ok(state.snapshot())
    }

    pub async fn submit(&self, player_id: PlayerId, text: &str) -> Result<SubmitOutcome, RoundError> {
        let mut state = self.state.lock().await;
        let roster = state.roster.clone();
        let round = state.open_round()?;

        if !round.expected(&roster).contains(&player_id) {
            return Err(RoundError::NotAParticipant(player_id));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(RoundError::EmptyAction);
        }
        if round.actions.contains_key(&player_id) {
            return Err(RoundError::AlreadySubmitted(player_id));
        }
        round.actions.insert(player_id, text.to_string());
        tracing::debug!(round_id = %round.id, player_id = %player_id, "Action submitted");

        if self.auto_resolve {
            if let Some(resolution) = state.auto_resolve() {
                return Ok(SubmitOutcome::Resolved(resolution));
            }
        }
        Ok(SubmitOutcome::Recorded(state.snapshot()))
    }

    /// Close a ready round and hand its actions on.
    pub async fn process(&self, caller: PlayerId) -> Result<RoundResolution, RoundError> {
        let mut state = self.state.lock().await;
        let roster = state.roster.clone();
        let round = state.open_round()?;
        if !round.may_close(caller, &roster) {
            return Err(RoundError::NotPermitted(caller));
        }
        let pending = round.pending(&roster).len();
        if !round.is_ready(&roster) {
            return Err(RoundError::NotReady { pending });
        }
        state.resolve().ok_or(RoundError::RoundClosed)
    }

    /// Discard the open round and every submission in it.
    pub async fn cancel(&self, caller: PlayerId) -> Result<RoundSnapshot, RoundError> {
        let mut state = self.state.lock().await;
        let roster = state.roster.clone();
        let round = state.open_round()?;
        if !round.may_close(caller, &roster) {
            return Err(RoundError::NotPermitted(caller));
        }
        let round_id = round.id;
        state.close(RoundPhase::Cancelled);
        tracing::info!(round_id = %round_id, cancelled_by = %caller, "Round cancelled");
        Ok(state.snapshot())
    }

    /// The open collective action, if any.
    pub async fn collective_state(&self) -> Option<CollectiveActionState> {
        let state = self.state.lock().await;
        match &state.slot {
            RoundSlot::Open(round) if round.mode == RoundMode::Collective => {
                Some(CollectiveActionState {
                    is_active: true,
                    initiator_id: round.initiator_id?,
                    initiator_name: round.initiator_name.clone(),
                    prompt: round.prompt.clone(),
                    participant_ids: round.participants.clone(),
                    actions: round.actions.clone(),
                })
            }
            _ => None,
        }
    }

    /// Actions of the open simultaneous round from current roster players.
    pub async fn simultaneous_state(&self) -> Option<SimultaneousRoundState> {
        let state = self.state.lock().await;
        match &state.slot {
            RoundSlot::Open(round) if round.mode == RoundMode::Simultaneous => {
                Some(SimultaneousRoundState {
                    round_actions: round
                        .actions
                        .iter()
                        .filter(|(player, _)| state.roster.contains(*player))
                        .map(|(player, text)| (*player, text.clone()))
                        .collect(),
                })
            }
            _ => None,
        }
    }
}
