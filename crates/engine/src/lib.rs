//! Chronicle Engine library.
//!
//! Keeps the canonical world of a game-master driven campaign consistent
//! while the game master, and several players, change it.
//!
//! ## Structure
//!
//! - `use_cases/` - identity, inventory, scaling, turn and round rules, and the session that ties them together
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `error` - The engine-wide error type

pub mod error;
pub mod infrastructure;
pub mod use_cases;

/// Whole-session flows driven through the public API.
#[cfg(test)]
mod e2e_tests;

pub use error::{EngineError, ErrorKind};
pub use use_cases::GameSession;
