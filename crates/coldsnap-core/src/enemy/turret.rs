//! The turret enemy: stationary, fires a projectile at the player on a
//! fixed interval. Only vulnerable while the grainy film format is active.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tempo::TimerId;

use super::EnemyId;
use crate::effect::Tint;

/// Interval between turret shots.
pub const FIRE_INTERVAL_MS: u64 = 1500;
/// Projectile speed in px/s.
pub const BULLET_SPEED: f32 = 200.0;
/// Projectile lifetime before it expires.
pub const BULLET_LIFETIME_MS: u64 = 3000;
/// Turret bullets are tinted red.
pub const BULLET_TINT: Tint = Tint(0xff_00_00);

/// A stationary turret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turret {
    /// Identifier assigned at spawn.
    pub id: EnemyId,
    /// World position.
    pub position: Vec2,
    /// The repeating fire timer; cancelled when the turret is destroyed.
    pub fire_timer: TimerId,
}

impl Turret {
    /// Creates a turret. The caller arms the repeating fire timer and
    /// passes its id in.
    #[must_use]
    pub const fn new(id: EnemyId, position: Vec2, fire_timer: TimerId) -> Self {
        Self {
            id,
            position,
            fire_timer,
        }
    }

    /// Velocity of a bullet aimed at `target` from this turret.
    ///
    /// A target exactly on top of the turret gets a horizontal shot rather
    /// than a zero vector.
    #[must_use]
    pub fn aim(&self, target: Vec2) -> Vec2 {
        let delta = target - self.position;
        delta.try_normalize().unwrap_or(Vec2::X) * BULLET_SPEED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod aim_tests {
        use super::*;

        fn turret_at(x: f32, y: f32) -> Turret {
            Turret::new(EnemyId::new(1), Vec2::new(x, y), TimerId::new(1))
        }

        #[test]
        fn bullet_speed_is_constant() {
            let turret = turret_at(100.0, 100.0);
            let v = turret.aim(Vec2::new(400.0, 500.0));
            assert!((v.length() - BULLET_SPEED).abs() < 0.001);
        }

        #[test]
        fn aims_along_the_line_to_target() {
            let turret = turret_at(0.0, 0.0);
            let v = turret.aim(Vec2::new(300.0, 0.0));
            assert_eq!(v, Vec2::new(BULLET_SPEED, 0.0));
        }

        #[test]
        fn coincident_target_gets_horizontal_shot() {
            let turret = turret_at(50.0, 50.0);
            let v = turret.aim(Vec2::new(50.0, 50.0));
            assert_eq!(v, Vec2::new(BULLET_SPEED, 0.0));
        }
    }
}
