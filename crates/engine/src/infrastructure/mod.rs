//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod game_master;
pub mod persistence;
pub mod ports;
pub mod settings;
pub mod slot_store;
