//! Enemy entities and their timed behavior.
//!
//! Every enemy declares a single weakness as a [`Stimulus`]. Incoming hits
//! carry a damage flavor, and the world matches that flavor — and the
//! currently active world format — against the weakness. Matching the
//! format means some enemies are only vulnerable while the world is in the
//! right mode, independent of what the player fires.
//!
//! All time-driven behavior runs on scheduler timers owned by the enemy;
//! destroying an enemy cancels its timers in the same call, so a dead
//! enemy can never emit another effect.

pub mod popsicle;
pub mod turret;

pub use popsicle::{Popsicle, PopsicleState};
pub use turret::Turret;

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tempo::TimerId;

use crate::effect::Tint;

// =============================================================================
// Identity
// =============================================================================

/// Unique identifier for an enemy, assigned at spawn and never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyId(u64);

impl EnemyId {
    /// Creates an identifier from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnemyId({})", self.0)
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EnemyId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// =============================================================================
// Stimuli
// =============================================================================

/// The elemental flavor carried by a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageFlavor {
    /// Heat damage.
    Fire,
    /// Cold damage.
    Ice,
}

/// The world-wide presentation format. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorldFormat {
    /// Grainy film mode.
    #[default]
    EightMm,
    /// Tape mode.
    Vhs,
}

/// What an enemy is vulnerable to.
///
/// A hit matches when either the hit's own flavor or the active world
/// format equals the enemy's declared weakness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stimulus {
    /// Vulnerable to a damage flavor.
    Flavor(DamageFlavor),
    /// Vulnerable only while a world format is active.
    Format(WorldFormat),
}

// =============================================================================
// Popsicle flavors
// =============================================================================

/// The flavor of a popsicle enemy. Fixed at spawn; determines body tint and
/// elemental weakness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flavor {
    /// Red, weak to fire.
    Cherry,
    /// Green, weak to ice.
    Lime,
    /// Blue, weak to fire.
    Blueberry,
}

impl Flavor {
    /// Body tint for this flavor.
    #[must_use]
    pub const fn tint(self) -> Tint {
        match self {
            Self::Cherry => Tint(0xff_00_00),
            Self::Lime => Tint(0x00_ff_00),
            Self::Blueberry => Tint(0x00_00_ff),
        }
    }

    /// Damage flavor this popsicle flavor is weak to.
    #[must_use]
    pub const fn weakness(self) -> DamageFlavor {
        match self {
            Self::Cherry | Self::Blueberry => DamageFlavor::Fire,
            Self::Lime => DamageFlavor::Ice,
        }
    }
}

// =============================================================================
// Enemy
// =============================================================================

/// A live enemy in the world.
#[derive(Debug, Clone, PartialEq)]
pub enum Enemy {
    /// A flavored popsicle with the melt/freeze behavior chain.
    Popsicle(Popsicle),
    /// A stationary turret firing at the player on an interval.
    Turret(Turret),
}

impl Enemy {
    /// This enemy's identifier.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        match self {
            Self::Popsicle(p) => p.id,
            Self::Turret(t) => t.id,
        }
    }

    /// Current world position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Popsicle(p) => p.position,
            Self::Turret(t) => t.position,
        }
    }

    /// Current body tint.
    #[must_use]
    pub fn tint(&self) -> Tint {
        match self {
            Self::Popsicle(p) => p.tint,
            Self::Turret(_) => Tint::WHITE,
        }
    }

    /// The single stimulus this enemy is vulnerable to.
    #[must_use]
    pub fn weakness(&self) -> Stimulus {
        match self {
            Self::Popsicle(p) => Stimulus::Flavor(p.flavor.weakness()),
            Self::Turret(_) => Stimulus::Format(WorldFormat::EightMm),
        }
    }

    /// All timer ids currently owned by this enemy. Cancelled en masse when
    /// the enemy is destroyed.
    #[must_use]
    pub fn timer_ids(&self) -> Vec<TimerId> {
        match self {
            Self::Popsicle(p) => p.timer_ids(),
            Self::Turret(t) => vec![t.fire_timer],
        }
    }

    /// Borrow as a popsicle, if that is what this enemy is.
    #[must_use]
    pub fn as_popsicle(&self) -> Option<&Popsicle> {
        match self {
            Self::Popsicle(p) => Some(p),
            Self::Turret(_) => None,
        }
    }

    /// Mutably borrow as a popsicle.
    pub fn as_popsicle_mut(&mut self) -> Option<&mut Popsicle> {
        match self {
            Self::Popsicle(p) => Some(p),
            Self::Turret(_) => None,
        }
    }
}
