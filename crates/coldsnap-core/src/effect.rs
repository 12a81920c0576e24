//! Cosmetic side effects reported to the host.
//!
//! The core owns no rendering. When a state transition has a visual
//! consequence (a particle burst on melt, a tint change on freeze, a grow-in
//! tween on reform), it records an [`Effect`] in the world's [`EffectLog`].
//! The host drains the log once per frame with [`EffectLog::take`] and maps
//! each entry onto its own particle/tween/tint machinery. Effects are
//! fire-and-forget: nothing in the core ever reads one back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enemy::EnemyId;
use crate::player::Facing;

/// An RGB tint, `0xRRGGBB`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tint(pub u32);

impl Tint {
    /// Neutral tint (no recoloring).
    pub const WHITE: Self = Self(0xff_ff_ff);
    /// Frost overlay applied to frozen enemies.
    pub const FROST: Self = Self(0x99_cc_ff);
    /// Confirmation color for an activated switch.
    pub const SWITCH_LIT: Self = Self(0x00_ff_00);
    /// Warning color carried by a still-locked door.
    pub const LOCK_WARNING: Self = Self(0xff_00_00);
}

/// A fire-and-forget visual side effect.
///
/// Positions are world coordinates at the moment the effect was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// One-shot particle burst, sized and positioned at the emitting
    /// entity's last location.
    ParticleBurst {
        /// Burst origin.
        position: Vec2,
        /// Particle tint (the emitter's tint at burst time).
        tint: Tint,
        /// Number of particles to emit.
        quantity: u32,
        /// Particle lifespan in milliseconds.
        lifespan_ms: u64,
    },
    /// An enemy's tint changed (freeze overlay, thaw restore).
    TintChanged {
        /// The recolored enemy.
        enemy: EnemyId,
        /// The new tint.
        tint: Tint,
    },
    /// An enemy reformed and should scale in from zero.
    GrowIn {
        /// The reforming enemy.
        enemy: EnemyId,
        /// Tween duration in milliseconds.
        duration_ms: u64,
    },
    /// A switch flipped to its activated color.
    SwitchLit {
        /// Switch position.
        position: Vec2,
    },
    /// A lock door opened: warning tint cleared, full opacity restored.
    LockOpened {
        /// Door position.
        position: Vec2,
    },
    /// The player fired; the host launches a projectile this way.
    ProjectileLaunched {
        /// Launch origin (the player's position).
        origin: Vec2,
        /// Launch direction.
        facing: Facing,
    },
    /// A codec fusion produced the hallucination outcome. Purely visual.
    Hallucination,
}

/// Accumulates effects for the host to drain once per frame.
///
/// Single-threaded by design; the log is only touched from the main update
/// step.
#[derive(Debug, Default)]
pub struct EffectLog {
    entries: Vec<Effect>,
}

impl EffectLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an effect.
    pub fn push(&mut self, effect: Effect) {
        self.entries.push(effect);
    }

    /// Drains and returns all recorded effects in recording order.
    pub fn take(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.entries)
    }

    /// Returns the number of effects currently recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no effects are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Peeks at the recorded effects without draining them.
    #[must_use]
    pub fn entries(&self) -> &[Effect] {
        &self.entries
    }
}
