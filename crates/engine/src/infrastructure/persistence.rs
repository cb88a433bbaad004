//! World snapshot codec.
//!
//! A save is a JSON envelope around the world model:
//!
//! ```json
//! { "formatVersion": 1, "savedAt": "2024-05-01T12:00:00Z", "world": { ... } }
//! ```
//!
//! Saves written before the envelope existed are a bare world object; they
//! are still accepted on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chronicle_domain::WorldModel;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersistenceError {
    #[error("Malformed save data: {0}")]
    Malformed(String),

    #[error("Unsupported save format version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Failed to encode world: {0}")]
    Encode(String),
}

/// A decoded save and its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedWorld {
    pub format_version: u32,
    pub saved_at: Option<DateTime<Utc>>,
    pub world: WorldModel,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeOut<'a> {
    format_version: u32,
    saved_at: DateTime<Utc>,
    world: &'a WorldModel,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeIn {
    format_version: u32,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    world: WorldModel,
}

/// Encode the world for a save slot.
pub fn serialize(world: &WorldModel, saved_at: DateTime<Utc>) -> Result<Vec<u8>, PersistenceError> {
    let envelope = EnvelopeOut {
        format_version: FORMAT_VERSION,
        saved_at,
        world,
    };
    serde_json::to_vec_pretty(&envelope).map_err(|e| PersistenceError::Encode(e.to_string()))
}

/// Decode a save into the world model it holds.
pub fn deserialize(bytes: &[u8]) -> Result<WorldModel, PersistenceError> {
    read_save(bytes).map(|saved| saved.world)
}

/// Decode a save, keeping its envelope metadata.
pub fn read_save(bytes: &[u8]) -> Result<SavedWorld, PersistenceError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| PersistenceError::Malformed(e.to_string()))?;

    if !value.is_object() {
        return Err(PersistenceError::Malformed(
            "save must be a JSON object".to_string(),
        ));
    }

    if value.get("formatVersion").is_none() {
        let world: WorldModel = serde_json::from_value(value)
            .map_err(|e| PersistenceError::Malformed(e.to_string()))?;
        tracing::debug!("Loaded save without envelope");
        return Ok(SavedWorld {
            format_version: 0,
            saved_at: None,
            world,
        });
    }

    let envelope: EnvelopeIn =
        serde_json::from_value(value).map_err(|e| PersistenceError::Malformed(e.to_string()))?;
    if envelope.format_version > FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: envelope.format_version,
            supported: FORMAT_VERSION,
        });
    }

    Ok(SavedWorld {
        format_version: envelope.format_version,
        saved_at: envelope.saved_at,
        world: envelope.world,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chronicle_domain::{
        EntityName, EquipmentSlot, FlagValue, Item, ItemQuality, Npc, PlayerCharacter, PlayerId,
        SlotSet,
    };

    fn name(s: &str) -> EntityName {
        EntityName::new(s).unwrap()
    }

    fn sample_world() -> WorldModel {
        let sword = Item::new(name("Sword"))
            .with_quality(ItemQuality::Rare)
            .with_weight(3.25)
            .with_slots(SlotSet::from_slots([EquipmentSlot::MainHand, EquipmentSlot::OffHand]));
        let sword_id = sword.existed_id;
        let mut pc = PlayerCharacter::new(PlayerId::new(), name("Ash")).with_characteristic("strength", 14);
        pc.inventory.items.push(sword);
        pc.inventory.equipped_items.insert(EquipmentSlot::MainHand, sword_id);

        let mut world = WorldModel::new().with_player(pc);
        world.encountered_npcs.push(Npc::new(name("Old Tam")));
        world
            .world_state_flags
            .insert("gateOpen".into(), FlagValue::Bool(true));
        world.world_state_flags.insert("odds".into(), FlagValue::Float(0.5));
        world.turn_number = 7;
        world
    }

    #[test]
    fn round_trips_world() {
        let world = sample_world();
        let saved_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let bytes = serialize(&world, saved_at).unwrap();

        let saved = read_save(&bytes).unwrap();
        assert_eq!(saved.world, world);
        assert_eq!(saved.format_version, FORMAT_VERSION);
        assert_eq!(saved.saved_at, Some(saved_at));
    }

    #[test]
    fn accepts_bare_world_object() {
        let world = sample_world();
        let bytes = serde_json::to_vec(&world).unwrap();
        assert_eq!(deserialize(&bytes).unwrap(), world);
    }

    #[test]
    fn rejects_newer_format() {
        let bytes = br#"{ "formatVersion": 99, "world": {} }"#;
        assert_eq!(
            deserialize(bytes),
            Err(PersistenceError::UnsupportedVersion {
                found: 99,
                supported: FORMAT_VERSION
            })
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            deserialize(b"not json"),
            Err(PersistenceError::Malformed(_))
        ));
        assert!(matches!(
            deserialize(b"[1, 2]"),
            Err(PersistenceError::Malformed(_))
        ));
    }
}
