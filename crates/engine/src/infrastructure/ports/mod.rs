//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - The game master that narrates and resolves turns (LLM-backed in practice)
//! - Save-slot storage
//! - Clock/ID generation (for testing)

mod error;
mod external;
mod testing;

pub use error::{GameMasterError, SlotStoreError};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{GameMasterPort, SlotStore};

#[cfg(test)]
pub use external::{MockGameMasterPort, MockSlotStore};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, IdGenerator};

#[cfg(test)]
pub use testing::{MockClockPort, MockIdGenerator};
