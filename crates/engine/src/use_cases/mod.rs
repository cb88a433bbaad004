//! Use cases - rules that act on the world model.
//!
//! Each module owns one concern. `session` composes the others into the
//! single entry point a client drives.

pub mod identity;
pub mod inventory;
pub mod round;
pub mod scaling;
pub mod session;
pub mod turn;

pub use identity::IdentityResolver;
pub use inventory::InventoryEngine;
pub use round::RoundCoordinator;
pub use scaling::ScalingCalculator;
pub use session::{GameSession, RoundProgress, SessionPorts};
pub use turn::TurnReconciler;
