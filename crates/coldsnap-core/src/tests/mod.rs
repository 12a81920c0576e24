//! Cross-module tests for the game core.
//!
//! - `determinism.rs`: same seed and same calls produce identical worlds
//! - `integration.rs`: end-to-end behavior across timers, rooms, and the
//!   ledger
//! - `helpers.rs`: world and room factory functions

mod helpers;
mod integration;

pub use helpers::*;
