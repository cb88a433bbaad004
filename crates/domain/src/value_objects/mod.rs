//! Value objects - immutable, identity-less domain types

mod names;
mod world_state;

pub use names::EntityName;
pub use world_state::{FlagValue, JournalAction, JournalEntry, WorldState};
