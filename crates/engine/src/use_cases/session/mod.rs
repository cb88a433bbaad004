//! Game session orchestration.
//!
//! A session owns one world and is its only writer. Turns from the game
//! master, player inventory actions and identity repairs all go through the
//! world lock, so each one applies completely before the next starts.

use std::sync::Arc;

use tokio::sync::Mutex;

use chronicle_domain::{EntityRef, LocationLink, PlayerId, WorldModel};
use chronicle_shared::{EntityDetail, EntityLookup, GmTurnPayload};

use crate::error::EngineError;
use crate::infrastructure::persistence;
use crate::infrastructure::ports::{ClockPort, GameMasterPort, IdGenerator, SlotStore};
use crate::infrastructure::settings::EngineSettings;
use crate::use_cases::identity::IdentityResolver;
use crate::use_cases::inventory::{InventoryEngine, InventoryError};
use crate::use_cases::round::{RoundCoordinator, RoundResolution, RoundSnapshot, SubmitOutcome};
use crate::use_cases::scaling::{rate_links, rate_location, ProfileRating, ScaledSkill, ScalingCalculator};
use crate::use_cases::turn::{AppliedLog, RegenerationReport, TurnReconciler};

/// Collaborators a session is wired with.
#[derive(Clone)]
pub struct SessionPorts {
    pub ids: Arc<dyn IdGenerator>,
    pub clock: Arc<dyn ClockPort>,
    pub game_master: Arc<dyn GameMasterPort>,
    pub slots: Arc<dyn SlotStore>,
}

/// What a player's submission led to.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundProgress {
    /// The round is still collecting actions
    Waiting(RoundSnapshot),
    /// The round closed and its turn was applied
    Applied {
        resolution: RoundResolution,
        log: AppliedLog,
    },
}

pub struct GameSession {
    world: Mutex<WorldModel>,
    /// A resolved round whose turn has not been applied yet
    pending: Mutex<Option<RoundResolution>>,
    reconciler: TurnReconciler,
    inventory: InventoryEngine,
    scaling: ScalingCalculator,
    rounds: RoundCoordinator,
    game_master: Arc<dyn GameMasterPort>,
    slots: Arc<dyn SlotStore>,
    clock: Arc<dyn ClockPort>,
}

impl GameSession {
    pub fn new(world: WorldModel, settings: &EngineSettings, ports: SessionPorts) -> Self {
        Self {
            world: Mutex::new(world),
            pending: Mutex::new(None),
            reconciler: TurnReconciler::new(
                Arc::clone(&ports.ids),
                Arc::clone(&ports.clock),
                settings.max_turn_history,
            ),
            inventory: InventoryEngine::new(Arc::clone(&ports.ids)),
            scaling: ScalingCalculator::new(settings.default_skill_mastery),
            rounds: RoundCoordinator::new(ports.ids, settings.simultaneous_auto_resolve),
            game_master: ports.game_master,
            slots: ports.slots,
            clock: ports.clock,
        }
    }

    /// A copy of the current world.
    pub async fn world(&self) -> WorldModel {
        self.world.lock().await.clone()
    }

    pub async fn turn_number(&self) -> u64 {
        self.world.lock().await.turn_number
    }

    pub fn rounds(&self) -> &RoundCoordinator {
        &self.rounds
    }

    // =========================================================================
    // Turns
    // =========================================================================

    /// Apply a single-player turn.
    pub async fn apply_turn(&self, payload: &GmTurnPayload) -> Result<AppliedLog, EngineError> {
        let mut world = self.world.lock().await;
        let (next, log) = self.reconciler.apply_turn(&world, payload)?;
        *world = next;
        Ok(log)
    }

    /// Parse raw game-master output and apply it.
    pub async fn apply_raw_turn(&self, raw: &str) -> Result<AppliedLog, EngineError> {
        let payload = TurnReconciler::parse_payload(raw)?;
        self.apply_turn(&payload).await
    }

    /// Send a completed round to the game master and apply its answer.
    ///
    /// The world stays locked while the game master works, so no other turn
    /// can land in between. On failure the round is kept pending for
    /// [`Self::retry_pending_round`].
    pub async fn resolve_round(&self, resolution: RoundResolution) -> Result<AppliedLog, EngineError> {
        *self.pending.lock().await = Some(resolution.clone());

        let mut world = self.world.lock().await;
        let request = resolution.to_turn_request(world.turn_number);
        let payload = self.game_master.resolve_round(request).await.map_err(|e| {
            tracing::warn!(round_id = %resolution.round_id, error = %e, "Game master failed to resolve round");
            e
        })?;
        let (next, log) = self.reconciler.apply_turn(&world, &payload)?;
        *world = next;
        drop(world);

        *self.pending.lock().await = None;
        Ok(log)
    }

    pub async fn pending_round(&self) -> Option<RoundResolution> {
        self.pending.lock().await.clone()
    }

    pub async fn retry_pending_round(&self) -> Result<AppliedLog, EngineError> {
        let resolution = self
            .pending
            .lock()
            .await
            .clone()
            .ok_or(EngineError::NothingPending)?;
        self.resolve_round(resolution).await
    }

    // =========================================================================
    // Rounds
    // =========================================================================

    pub async fn submit_action(&self, player_id: PlayerId, text: &str) -> Result<RoundProgress, EngineError> {
        match self.rounds.submit(player_id, text).await? {
            SubmitOutcome::Recorded(snapshot) => Ok(RoundProgress::Waiting(snapshot)),
            SubmitOutcome::Resolved(resolution) => self.applied(resolution).await,
        }
    }

    pub async fn process_round(&self, caller: PlayerId) -> Result<RoundProgress, EngineError> {
        let resolution = self.rounds.process(caller).await?;
        self.applied(resolution).await
    }

    pub async fn cancel_round(&self, caller: PlayerId) -> Result<RoundSnapshot, EngineError> {
        Ok(self.rounds.cancel(caller).await?)
    }

    /// Replace the active roster; a simultaneous round it completes is
    /// resolved and applied.
    pub async fn set_active_roster(&self, players: Vec<PlayerId>) -> Result<Option<RoundProgress>, EngineError> {
        match self.rounds.set_active_roster(players).await {
            Some(resolution) => self.applied(resolution).await.map(Some),
            None => Ok(None),
        }
    }

    async fn applied(&self, resolution: RoundResolution) -> Result<RoundProgress, EngineError> {
        let log = self.resolve_round(resolution.clone()).await?;
        Ok(RoundProgress::Applied { resolution, log })
    }

    // =========================================================================
    // Player-facing reads and actions
    // =========================================================================

    /// Run an inventory operation against the world. Inventory operations
    /// either apply fully or leave the world untouched.
    pub async fn with_inventory<R>(
        &self,
        op: impl FnOnce(&InventoryEngine, &mut WorldModel) -> Result<R, InventoryError>,
    ) -> Result<R, EngineError> {
        let mut world = self.world.lock().await;
        Ok(op(&self.inventory, &mut world)?)
    }

    /// The current canonical copy of an entity the caller holds a reference to.
    pub async fn entity_detail(&self, lookup: &EntityLookup) -> Option<EntityDetail> {
        let world = self.world.lock().await;
        IdentityResolver::lookup(&world, lookup)
    }

    /// Scaled effects of every skill on a player's sheet.
    pub async fn scaled_skills(&self, player_id: PlayerId) -> Option<Vec<ScaledSkill>> {
        let world = self.world.lock().await;
        world
            .player_for(player_id)
            .map(|pc| self.scaling.scale_character(pc))
    }

    /// How hard the party's current location is for a player.
    pub async fn current_location_rating(&self, player_id: PlayerId) -> Option<ProfileRating> {
        let world = self.world.lock().await;
        let level = world.player_for(player_id)?.level;
        world.current_location().map(|location| rate_location(location, level))
    }

    /// Each route out of the current location, rated for this player.
    pub async fn current_link_ratings(&self, player_id: PlayerId) -> Option<Vec<(LocationLink, ProfileRating)>> {
        let world = self.world.lock().await;
        let level = world.player_for(player_id)?.level;
        let location = world.current_location()?;
        Some(
            rate_links(location, level)
                .into_iter()
                .map(|(link, rating)| (link.clone(), rating))
                .collect(),
        )
    }

    pub async fn regenerate_id(&self, target: EntityRef) -> Result<RegenerationReport, EngineError> {
        let mut world = self.world.lock().await;
        let report = self.reconciler.regenerate_id(&mut world, target)?;
        for unresolved in &report.unresolved {
            tracing::warn!(
                entity = %target,
                holder = %unresolved.holder,
                field = unresolved.field,
                "Reference left pointing at retired ID"
            );
        }
        Ok(report)
    }

    // =========================================================================
    // Saves
    // =========================================================================

    pub async fn save(&self, slot: &str) -> Result<(), EngineError> {
        let bytes = {
            let world = self.world.lock().await;
            persistence::serialize(&world, self.clock.now())?
        };
        self.slots.save(slot, bytes).await?;
        tracing::info!(slot, "World saved");
        Ok(())
    }

    /// Replace the world with a saved one. Entities saved without IDs are
    /// given fresh ones.
    pub async fn load(&self, slot: &str) -> Result<Vec<RegenerationReport>, EngineError> {
        let bytes = self
            .slots
            .load(slot)
            .await?
            .ok_or_else(|| EngineError::EmptySlot(slot.to_string()))?;
        let mut loaded = persistence::deserialize(&bytes)?;
        let repaired = self.reconciler.repair_missing_ids(&mut loaded);

        *self.world.lock().await = loaded;
        tracing::info!(slot, repaired = repaired.len(), "World loaded");
        Ok(repaired)
    }
}
