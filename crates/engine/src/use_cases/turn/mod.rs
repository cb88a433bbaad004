//! Turn reconciliation.
//!
//! Applies a game-master turn payload to the canonical world model and
//! produces the new world plus a log of what changed.
//!
//! # Merge rules
//!
//! - Entities are matched with
//!   [`IdentityResolver`](crate::use_cases::identity::IdentityResolver). A match is updated by
//!   overwriting the fields the payload carries; absent fields stay as they
//!   are. Nothing is cleared or deleted by omission.
//! - Only `added` deltas may create entities. An `updated` or `removed`
//!   delta that matches nothing is skipped.
//! - A sub-entity that cannot be applied (bad name, unknown owner, missing
//!   container) is skipped and logged; the rest of the turn still applies.
//! - A payload that contradicts itself is rejected whole as malformed and
//!   the world is left untouched.
//!
//! Collections are applied in dependency order: locations, factions, NPCs,
//! quests, items, wounds, player progression, then world state.

mod characters;
mod error;
mod items;
mod log;
mod regenerate;
mod world;

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use chronicle_domain::{EntityKind, EntityName, EntityRef, JournalAction, JournalEntry, WorldModel};
use chronicle_shared::{EntityChanges, GmTurnPayload};

use crate::infrastructure::ports::{ClockPort, IdGenerator};
use crate::use_cases::identity::{claim_or_allocate, Candidate};

pub use error::ReconcileError;
pub use log::{AppliedChange, AppliedLog, ChangeSubject};
pub use regenerate::{BackReference, RegenerationReport};

pub struct TurnReconciler {
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn ClockPort>,
    journal_cap: usize,
}

impl TurnReconciler {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn ClockPort>, journal_cap: usize) -> Self {
        Self {
            ids,
            clock,
            journal_cap,
        }
    }

    /// Parse raw game-master output. Markdown code fences around the JSON
    /// are tolerated.
    pub fn parse_payload(raw: &str) -> Result<GmTurnPayload, ReconcileError> {
        let trimmed = raw.trim();
        let body = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .map(|rest| rest.trim_end().trim_end_matches("```"))
            .unwrap_or(trimmed);
        serde_json::from_str(body.trim()).map_err(|e| ReconcileError::MalformedPayload(e.to_string()))
    }

    /// Apply one turn. The input world is never modified; on error no new
    /// world is produced.
    pub fn apply_turn(
        &self,
        world: &WorldModel,
        payload: &GmTurnPayload,
    ) -> Result<(WorldModel, AppliedLog), ReconcileError> {
        validate(payload)?;

        let mut next = world.clone();
        let turn_number = world.turn_number + 1;
        let changes = {
            let mut ctx = TurnContext::new(&mut next, self.ids.as_ref());
            world::apply_locations(&mut ctx, &payload.locations);
            world::apply_factions(&mut ctx, &payload.factions);
            characters::apply_npcs(&mut ctx, &payload.npcs);
            world::apply_quests(&mut ctx, &payload.quests);
            items::apply_items(&mut ctx, &payload.items);
            characters::apply_wounds(&mut ctx, &payload.wounds);
            characters::apply_player_updates(&mut ctx, &payload.player_updates);
            world::apply_world_state(&mut ctx, payload.world_state.as_ref());
            world::apply_flags(&mut ctx, &payload.world_state_flags);
            world::apply_current_location(&mut ctx, payload.current_location.as_ref());
            ctx.changes
        };

        next.turn_number = turn_number;
        let recorded_at = self.clock.now();
        for change in &changes {
            next.record(
                JournalEntry {
                    turn_number,
                    recorded_at,
                    action: change.action,
                    entity: change.entity,
                    summary: change.summary.clone(),
                },
                self.journal_cap,
            );
        }

        let log = AppliedLog {
            turn_number,
            narration: payload.narration.clone(),
            changes,
        };
        tracing::info!(
            turn = turn_number,
            created = log.count(JournalAction::Created),
            updated = log.count(JournalAction::Updated),
            removed = log.count(JournalAction::Removed),
            skipped = log.count(JournalAction::Skipped),
            "Applied game master turn"
        );
        Ok((next, log))
    }

    /// Give an entity a fresh ID and rewrite every reference to the old one.
    pub fn regenerate_id(
        &self,
        world: &mut WorldModel,
        target: EntityRef,
    ) -> Result<RegenerationReport, ReconcileError> {
        let report = regenerate::regenerate(world, target, self.ids.as_ref())?;
        world.record(
            JournalEntry {
                turn_number: world.turn_number,
                recorded_at: self.clock.now(),
                action: JournalAction::Regenerated,
                entity: Some(EntityRef::new(report.kind, report.new_id)),
                summary: format!("{} {} became {}", report.kind, report.old_id, report.new_id),
            },
            self.journal_cap,
        );
        Ok(report)
    }

    /// Assign real IDs to every entity still carrying the nil ID, as found in
    /// saves written before IDs were tracked.
    pub fn repair_missing_ids(&self, world: &mut WorldModel) -> Vec<RegenerationReport> {
        let mut reports = Vec::new();
        while let Some(target) = regenerate::first_nil_entity(world) {
            match self.regenerate_id(world, target) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::warn!(entity = %target, error = %e, "Could not repair entity ID");
                    break;
                }
            }
        }
        reports
    }
}

/// Reject payloads that change and remove the same entity in one turn.
fn validate(payload: &GmTurnPayload) -> Result<(), ReconcileError> {
    contradictions(&payload.npcs, |d| d.id, "npcs")?;
    contradictions(&payload.items, |d| d.id, "items")?;
    contradictions(&payload.quests, |d| d.id, "quests")?;
    contradictions(&payload.locations, |d| d.id, "locations")?;
    contradictions(&payload.factions, |d| d.id, "factions")?;
    contradictions(&payload.wounds, |d| d.id, "wounds")?;
    Ok(())
}

fn contradictions<T>(
    changes: &EntityChanges<T>,
    id_of: impl Fn(&T) -> Option<Uuid>,
    collection: &str,
) -> Result<(), ReconcileError> {
    let removed: HashSet<Uuid> = changes.removed.iter().filter_map(&id_of).collect();
    let clash = changes
        .added
        .iter()
        .chain(&changes.updated)
        .filter_map(&id_of)
        .find(|id| removed.contains(id));
    match clash {
        Some(id) => Err(ReconcileError::MalformedPayload(format!(
            "{collection}: {id} is both changed and removed"
        ))),
        None => Ok(()),
    }
}

// =============================================================================
// Shared helpers for the collection appliers
// =============================================================================

/// Mutable state threaded through one turn.
pub(super) struct TurnContext<'a> {
    pub world: &'a mut WorldModel,
    ids: &'a dyn IdGenerator,
    pub changes: Vec<AppliedChange>,
}

impl<'a> TurnContext<'a> {
    fn new(world: &'a mut WorldModel, ids: &'a dyn IdGenerator) -> Self {
        Self {
            world,
            ids,
            changes: Vec::new(),
        }
    }

    /// The proposed ID if still free, otherwise a fresh one.
    pub fn allocate(&self, proposed: Option<Uuid>) -> Uuid {
        claim_or_allocate(proposed, self.ids, self.world)
    }

    pub fn retire_all(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        for id in ids {
            self.world.retire(id);
        }
    }

    pub fn record(
        &mut self,
        action: JournalAction,
        subject: ChangeSubject,
        entity: Option<EntityRef>,
        summary: String,
    ) {
        tracing::debug!(%action, %subject, "{summary}");
        self.changes.push(AppliedChange {
            action,
            subject,
            entity,
            summary,
        });
    }

    fn entity_change(&mut self, action: JournalAction, kind: EntityKind, id: Uuid, name: &str) {
        self.record(
            action,
            ChangeSubject::Entity(kind),
            Some(EntityRef::new(kind, id)),
            format!("{kind} {name} {action}"),
        );
    }

    pub fn created(&mut self, kind: EntityKind, id: impl Into<Uuid>, name: &str) {
        self.entity_change(JournalAction::Created, kind, id.into(), name);
    }

    pub fn updated(&mut self, kind: EntityKind, id: impl Into<Uuid>, name: &str) {
        self.entity_change(JournalAction::Updated, kind, id.into(), name);
    }

    pub fn removed(&mut self, kind: EntityKind, id: impl Into<Uuid>, name: &str) {
        self.entity_change(JournalAction::Removed, kind, id.into(), name);
    }

    pub fn skipped(&mut self, kind: EntityKind, candidate: &Candidate<'_>, reason: impl AsRef<str>) {
        let reason = reason.as_ref();
        let target = candidate.describe();
        tracing::warn!(kind = %kind, entity = %target, reason, "Skipped game master change");
        self.record(
            JournalAction::Skipped,
            ChangeSubject::Entity(kind),
            candidate.id.map(|id| EntityRef::new(kind, id)),
            format!("{kind} {target} skipped: {reason}"),
        );
    }

    pub fn not_found(&mut self, kind: EntityKind, candidate: &Candidate<'_>) {
        self.skipped(kind, candidate, "no matching entity");
    }
}

/// Validate an optional incoming name.
pub(super) fn validated_name(raw: Option<&str>) -> Result<Option<EntityName>, String> {
    raw.map(|name| EntityName::new(name))
        .transpose()
        .map_err(|e| e.to_string())
}

/// Overwrite an optional field when the payload carries a value.
pub(super) fn overwrite<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if let Some(value) = value {
        *slot = Some(value.clone());
    }
}

/// Overwrite a required field when the payload carries a value.
pub(super) fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *slot = value.clone();
    }
}

#[cfg(test)]
mod tests;
