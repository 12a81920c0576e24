//! Headless core logic for Coldsnap, a 2D side-scrolling action game.
//!
//! The crate owns the game's rules and state: timed enemy behavior chains,
//! the gate/unlock ledger, a streaming room graph, puzzle entities, and
//! codec fusion. It renders nothing and reads no input devices. A host
//! engine drives it by feeding elapsed milliseconds into [`World::step`],
//! forwarding abstract input as [`player::Intent`] values, and draining
//! visual side effects from [`World::take_effects`] each frame.
//!
//! Determinism is the load-bearing property: all time flows through the
//! injected frame delta, all randomness through a seed given at
//! construction. Two worlds built with the same seed and fed the same call
//! sequence are identical, which is what makes replay and simulation
//! testing possible.
//!
//! # Example
//!
//! ```
//! use coldsnap_core::enemy::{DamageFlavor, Flavor, PopsicleState};
//! use coldsnap_core::World;
//! use glam::Vec2;
//!
//! let mut world = World::new(7);
//! let id = world.spawn_popsicle(Flavor::Cherry, Vec2::new(100.0, 100.0));
//!
//! // Cherry is weak to fire: the hit starts the melt chain.
//! assert!(world.hit(id, DamageFlavor::Fire));
//! world.step(600);
//!
//! let pop = world.enemy(id).and_then(|e| e.as_popsicle()).unwrap();
//! assert_eq!(pop.state(), PopsicleState::Crystallizing);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod effect;
pub mod enemy;
pub mod fusion;
pub mod ledger;
pub mod player;
pub mod puzzle;
pub mod room;
pub mod world;

pub use effect::{Effect, EffectLog, Tint};
pub use fusion::{fuse, Codec, FusionOutcome};
pub use ledger::{GateKey, Ledger};
pub use player::{Facing, Intent, Player};
pub use room::{RoomGraph, RoomKey};
pub use world::World;

#[cfg(test)]
mod tests;
