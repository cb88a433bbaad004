//! Chronicle Shared - wire types between the engine and its collaborators
//!
//! This crate contains the types the engine consumes from, and produces for,
//! the outside world:
//! - The game-master turn payload
//! - Entity detail lookups for the presentation layer
//! - Multiplayer round requests
//!
//! # Design Principles
//!
//! 1. **No business logic** - Pure data types and serialization
//! 2. **Raw IDs** - use `uuid::Uuid` on the wire; the engine maps to domain IDs
//! 3. **camelCase JSON** - matches what the narrative subsystem emits

pub mod gm_payload;
pub mod lookup;
pub mod rounds;

pub use gm_payload::{
    CharacterRefData, EntityChanges, EntityRefData, FactionDelta, GmTurnPayload, ItemDelta,
    ItemOwnerData, LocationDelta, LocationLinkData, NpcDelta, PlayerDelta, QuestDelta,
    WorldStateDelta, WoundDelta,
};
pub use lookup::{EntityDetail, EntityLookup};
pub use rounds::{PlayerActionData, RoundMode, TurnRequest};
