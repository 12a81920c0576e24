//! Switches and lockable doors.
//!
//! A switch binds to at most one lock door at room-load time (by index into
//! the room's lock list). Activating it once is permanent for that room
//! instance; re-activation is a no-op. A lock door blocks transition while
//! locked and behaves exactly like a plain door once unlocked.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::effect::Tint;
use crate::room::RoomKey;

/// Result of a switch activation attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SwitchActivation {
    /// The switch was already activated; nothing happened.
    AlreadyActive,
    /// First activation; `target_lock` is the bound lock-door index, if any.
    Activated {
        /// Index of the lock door to unlock, `None` for an unbound switch.
        target_lock: Option<usize>,
    },
}

/// A one-shot floor switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    /// World position.
    pub position: Vec2,
    target_lock: Option<usize>,
    activated: bool,
}

impl Switch {
    /// Creates an inactive switch, optionally bound to a lock-door index.
    #[must_use]
    pub fn new(position: Vec2, target_lock: Option<usize>) -> Self {
        Self {
            position,
            target_lock,
            activated: false,
        }
    }

    /// Activates the switch.
    ///
    /// Idempotent: only the first call reports `Activated`. An unbound switch
    /// still flips its activated flag — that is not an error, it just unlocks
    /// nothing.
    pub fn activate(&mut self) -> SwitchActivation {
        if self.activated {
            return SwitchActivation::AlreadyActive;
        }
        self.activated = true;
        SwitchActivation::Activated {
            target_lock: self.target_lock,
        }
    }

    /// Returns `true` once the switch has been activated.
    #[must_use]
    pub const fn is_activated(&self) -> bool {
        self.activated
    }

    /// Returns the bound lock-door index, if any.
    #[must_use]
    pub const fn target_lock(&self) -> Option<usize> {
        self.target_lock
    }
}

/// A lockable door.
///
/// Starts locked with a warning tint. Once unlocked it is indistinguishable
/// from a plain door for transition purposes: full opacity, no tint, and
/// player overlap triggers the room transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockDoor {
    /// World position.
    pub position: Vec2,
    /// Destination room.
    pub target: RoomKey,
    /// Player spawn point in the destination room.
    pub spawn: Vec2,
    /// Rendered invisible while `true`.
    pub hidden: bool,
    locked: bool,
}

impl LockDoor {
    /// Creates a locked door to `target`.
    #[must_use]
    pub fn new(position: Vec2, target: RoomKey, spawn: Vec2, hidden: bool) -> Self {
        Self {
            position,
            target,
            spawn,
            hidden,
            locked: true,
        }
    }

    /// Unlocks the door, clearing the warning tint and restoring full
    /// visibility.
    pub fn unlock(&mut self) {
        self.locked = false;
        self.hidden = false;
    }

    /// Returns `true` while the door still blocks transition.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// The warning tint the host renders this door with, if any.
    #[must_use]
    pub const fn tint(&self) -> Option<Tint> {
        if self.locked {
            Some(Tint::LOCK_WARNING)
        } else {
            None
        }
    }
}
