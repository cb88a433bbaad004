//! Engine E2E tests.
//!
//! These tests drive a fully wired [`GameSession`](crate::GameSession)
//! through whole play sessions:
//! - Scripted game master replaying prepared turn payloads
//! - In-memory save slots
//! - Fixed clock and sequential IDs, so runs are repeatable
//!
//! # Running E2E Tests
//!
//! ```bash
//! cargo test -p chronicle-engine --lib e2e_tests
//! ```

mod e2e_helpers;
mod multiplayer_round_tests;

pub use e2e_helpers::*;
