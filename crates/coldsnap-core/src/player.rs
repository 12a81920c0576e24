//! The player as the core sees it.
//!
//! Movement, gravity, and collision response belong to the host physics
//! layer. The core tracks only what its own systems consume: position (door
//! and switch overlap), the current room key, the monotonically growing
//! upgrade set (gate satisfaction), and a facing value that dependent systems
//! read when launching projectiles.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::room::RoomKey;

/// Horizontal facing, updated by movement intents.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    /// Facing left (negative x).
    Left,
    /// Facing right (positive x).
    #[default]
    Right,
}

/// Abstract input signal produced by the excluded input layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Move left. Updates facing; locomotion is the host's concern.
    MoveLeft,
    /// Move right. Updates facing.
    MoveRight,
    /// Jump. Consumed by the host physics layer; the core ignores it.
    Jump,
    /// Fire a projectile in the current facing direction.
    Fire,
    /// Interact with the nearest switch in range.
    Interact,
}

/// Player state referenced by the core systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// World position, written by the host physics layer each frame and by
    /// room transitions.
    pub position: Vec2,
    /// Key of the room the player currently occupies.
    pub room: Option<RoomKey>,
    /// Facing used for projectile launch direction.
    pub facing: Facing,
    /// Owned upgrades by name. Append-only within a session.
    upgrades: BTreeSet<String>,
}

impl Player {
    /// Creates a player at `position` with no upgrades, in no room.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            room: None,
            facing: Facing::default(),
            upgrades: BTreeSet::new(),
        }
    }

    /// Grants an upgrade. Returns `true` if it was newly acquired.
    pub fn grant_upgrade(&mut self, name: &str) -> bool {
        self.upgrades.insert(name.to_string())
    }

    /// Returns `true` if the player owns the named upgrade.
    #[must_use]
    pub fn has_upgrade(&self, name: &str) -> bool {
        self.upgrades.contains(name)
    }

    /// Iterates over owned upgrade names in sorted order.
    pub fn upgrades(&self) -> impl Iterator<Item = &str> + '_ {
        self.upgrades.iter().map(String::as_str)
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}
