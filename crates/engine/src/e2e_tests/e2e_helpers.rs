//! E2E test helpers for constructing a wired session.
//!
//! Provides a seeded three-player party and shorthands for building game
//! master payloads.

use std::sync::Arc;

use uuid::Uuid;

use chronicle_domain::{
    Coordinates, DifficultyProfile, EntityName, Item, Location, LocationLink, PlayerCharacter, PlayerId, WorldModel,
};
use chronicle_shared::{EntityChanges, GmTurnPayload, ItemDelta, ItemOwnerData, NpcDelta};

use crate::infrastructure::clock::{FixedClock, SequentialIds};
use crate::infrastructure::game_master::ScriptedGameMaster;
use crate::infrastructure::settings::EngineSettings;
use crate::infrastructure::slot_store::InMemorySlotStore;
use crate::use_cases::{GameSession, SessionPorts};

/// Players of the seeded party, in roster order.
#[derive(Debug, Clone, Copy)]
pub struct Party {
    pub ash: PlayerId,
    pub bryn: PlayerId,
    pub cato: PlayerId,
}

impl Party {
    pub fn new() -> Self {
        Self {
            ash: PlayerId::from_uuid(Uuid::from_u128(0xA5)),
            bryn: PlayerId::from_uuid(Uuid::from_u128(0xB7)),
            cato: PlayerId::from_uuid(Uuid::from_u128(0xC4)),
        }
    }

    pub fn roster(&self) -> Vec<PlayerId> {
        vec![self.ash, self.bryn, self.cato]
    }
}

pub fn name(raw: &str) -> EntityName {
    EntityName::new(raw).expect("valid test name")
}

/// Three adventurers standing in the Millbrook square.
pub fn seeded_world(party: &Party) -> WorldModel {
    let mut square = Location::new(name("Millbrook Square"), Coordinates::new(0, 0));
    square.difficulty_profile = DifficultyProfile {
        combat: 5,
        environment: 0,
        social: 10,
        exploration: 0,
    };
    square.adjacency_map.push(LocationLink {
        target_location_id: None,
        target_coordinates: Coordinates::new(0, 1),
        name: Some("North Road".into()),
        estimated_difficulty: DifficultyProfile {
            combat: 24,
            ..DifficultyProfile::default()
        },
    });

    let mut ash = PlayerCharacter::new(party.ash, name("Ash"))
        .with_level(3)
        .with_characteristic("strength", 14);
    ash.inventory.items.push(Item::new(name("Torch")).with_count(3));

    let mut world = WorldModel::new()
        .with_player(ash)
        .with_player(PlayerCharacter::new(party.bryn, name("Bryn")).with_level(2))
        .with_player(PlayerCharacter::new(party.cato, name("Cato")).with_level(4));
    world.current_location_id = Some(square.location_id);
    world.visited_locations.push(square);
    world
}

pub struct E2ETestContext {
    pub session: GameSession,
    pub game_master: Arc<ScriptedGameMaster>,
    pub slots: Arc<InMemorySlotStore>,
    pub party: Party,
}

impl E2ETestContext {
    pub fn setup() -> Self {
        Self::setup_with(EngineSettings::default())
    }

    pub fn setup_with(settings: EngineSettings) -> Self {
        let party = Party::new();
        let game_master = Arc::new(ScriptedGameMaster::default());
        let slots = Arc::new(InMemorySlotStore::new());
        let session = GameSession::new(
            seeded_world(&party),
            &settings,
            SessionPorts {
                ids: Arc::new(SequentialIds::starting_at(1_000)),
                clock: Arc::new(FixedClock::at_epoch(1_700_000_000)),
                game_master: game_master.clone(),
                slots: slots.clone(),
            },
        );
        Self {
            session,
            game_master,
            slots,
            party,
        }
    }
}

pub fn npc_added(npc_name: &str) -> NpcDelta {
    NpcDelta {
        name: Some(npc_name.into()),
        ..Default::default()
    }
}

pub fn item_for(owner: ItemOwnerData, item_name: &str) -> ItemDelta {
    ItemDelta {
        owner,
        name: Some(item_name.into()),
        ..Default::default()
    }
}

pub fn player_owner(player: PlayerId) -> ItemOwnerData {
    ItemOwnerData::Player {
        player_id: Some(player.to_uuid()),
    }
}

pub fn adds<T>(added: Vec<T>) -> EntityChanges<T> {
    EntityChanges {
        added,
        ..Default::default()
    }
}

pub fn narrated(text: &str) -> GmTurnPayload {
    GmTurnPayload {
        narration: Some(text.into()),
        ..Default::default()
    }
}
