//! The popsicle enemy and its melt/freeze behavior chain.
//!
//! A popsicle idles in [`PopsicleState::Solid`]. A hit matching its
//! weakness starts the melt chain: the body drops its collider and walks
//! through five visible stages 600 ms apart, then either reassembles back
//! to solid (with a grow-in effect) or, 20 % of the time, is recycled and
//! removed from the world. A hit that does *not* match the weakness
//! freezes it solid for 2000 ms instead. Hits landing in any state other
//! than solid are ignored outright.
//!
//! Every transition is driven by a scheduler timer carrying the owning
//! popsicle's id, and every timer handler re-checks that the popsicle is
//! still alive and still in the state the timer was armed for. Stale
//! timers fall through harmlessly.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tempo::{Scheduler, TimerId};
use tracing::trace;

use crate::effect::{Effect, EffectLog, Tint};
use crate::world::TimerAction;

use super::{EnemyId, Flavor};

/// Interval between drip drops while solid.
pub const DRIP_INTERVAL_MS: u64 = 2000;
/// How long a mismatched hit keeps the popsicle frozen.
pub const FROZEN_DELAY_MS: u64 = 2000;
/// Delay between consecutive melt stages.
pub const STAGE_DELAY_MS: u64 = 600;
/// Duration of the grow-in effect when reassembly completes.
pub const GROW_IN_MS: u64 = 800;
/// Probability that a completed melt chain ends in recycling.
pub const RECYCLE_CHANCE: f32 = 0.2;
/// Particle count of the melt burst.
pub const MELT_BURST_QUANTITY: u32 = 20;
/// Lifespan of the melt burst particles.
pub const MELT_BURST_LIFESPAN_MS: u64 = 800;

/// The popsicle behavior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopsicleState {
    /// Idle and vulnerable; dripping.
    Solid,
    /// Immobilized by a mismatched hit; thaws back to solid.
    Frozen,
    /// Melt stage 1 of 5.
    Melting,
    /// Melt stage 2 of 5.
    Crystallizing,
    /// Melt stage 3 of 5.
    Scaffolding,
    /// Melt stage 4 of 5.
    Reassembling,
    /// Melt stage 5 of 5; resolves to solid or recycled.
    Calibrating,
    /// Terminal: the body is reclaimed and the enemy removed.
    Recycled,
}

impl PopsicleState {
    /// The next melt stage, or `None` for states outside the chain and for
    /// the final stage (which resolves by roll, not by succession).
    #[must_use]
    pub const fn melt_successor(self) -> Option<Self> {
        match self {
            Self::Melting => Some(Self::Crystallizing),
            Self::Crystallizing => Some(Self::Scaffolding),
            Self::Scaffolding => Some(Self::Reassembling),
            Self::Reassembling => Some(Self::Calibrating),
            Self::Solid | Self::Frozen | Self::Calibrating | Self::Recycled => None,
        }
    }

    /// Returns `true` for the five melt stages.
    #[must_use]
    pub const fn is_melt_stage(self) -> bool {
        matches!(
            self,
            Self::Melting
                | Self::Crystallizing
                | Self::Scaffolding
                | Self::Reassembling
                | Self::Calibrating
        )
    }
}

/// How a melt-advance timer resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeltOutcome {
    /// Moved to the next melt stage; another timer is armed.
    Advanced(PopsicleState),
    /// Chain complete; back to solid with collider restored.
    Restored,
    /// Chain complete; the popsicle must be removed from the world.
    Recycled,
    /// Stale timer; the popsicle was not in a melt stage.
    Ignored,
}

/// Rolls the recycle branch at the end of a melt chain.
#[must_use]
pub fn recycle_roll(rng: &mut impl Rng) -> bool {
    rng.gen::<f32>() < RECYCLE_CHANCE
}

/// A flavored popsicle enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popsicle {
    /// Identifier assigned at spawn.
    pub id: EnemyId,
    /// Flavor, fixed at spawn.
    pub flavor: Flavor,
    /// World position.
    pub position: Vec2,
    /// Current velocity; zeroed while frozen.
    pub velocity: Vec2,
    /// Current body tint.
    pub tint: Tint,
    state: PopsicleState,
    collider_enabled: bool,
    drip_timer: TimerId,
    pending: Option<TimerId>,
}

impl Popsicle {
    /// Creates a solid popsicle. The caller arms the repeating drip timer
    /// and passes its id in.
    #[must_use]
    pub fn new(id: EnemyId, flavor: Flavor, position: Vec2, drip_timer: TimerId) -> Self {
        Self {
            id,
            flavor,
            position,
            velocity: Vec2::ZERO,
            tint: flavor.tint(),
            state: PopsicleState::Solid,
            collider_enabled: true,
            drip_timer,
            pending: None,
        }
    }

    /// Current behavior state.
    #[must_use]
    pub const fn state(&self) -> PopsicleState {
        self.state
    }

    /// Whether the body currently collides.
    #[must_use]
    pub const fn collider_enabled(&self) -> bool {
        self.collider_enabled
    }

    /// Drip drops spawn only while solid.
    #[must_use]
    pub const fn should_drip(&self) -> bool {
        matches!(self.state, PopsicleState::Solid)
    }

    /// All timer ids owned by this popsicle.
    #[must_use]
    pub fn timer_ids(&self) -> Vec<TimerId> {
        let mut ids = vec![self.drip_timer];
        if let Some(pending) = self.pending {
            ids.push(pending);
        }
        ids
    }

    /// Starts the melt chain. Returns `false` if the popsicle was not
    /// solid, in which case nothing changed.
    pub fn begin_melt(
        &mut self,
        scheduler: &mut Scheduler<TimerAction>,
        effects: &mut EffectLog,
    ) -> bool {
        if self.state != PopsicleState::Solid {
            return false;
        }
        self.state = PopsicleState::Melting;
        self.collider_enabled = false;
        effects.push(Effect::ParticleBurst {
            position: self.position,
            tint: self.flavor.tint(),
            quantity: MELT_BURST_QUANTITY,
            lifespan_ms: MELT_BURST_LIFESPAN_MS,
        });
        self.pending = Some(scheduler.schedule(STAGE_DELAY_MS, TimerAction::MeltAdvance(self.id)));
        trace!(enemy = %self.id, "melt chain started");
        true
    }

    /// Freezes the popsicle after a mismatched hit. Returns `false` if it
    /// was not solid.
    pub fn freeze(
        &mut self,
        scheduler: &mut Scheduler<TimerAction>,
        effects: &mut EffectLog,
    ) -> bool {
        if self.state != PopsicleState::Solid {
            return false;
        }
        self.state = PopsicleState::Frozen;
        self.velocity = Vec2::ZERO;
        self.tint = Tint::FROST;
        effects.push(Effect::TintChanged {
            enemy: self.id,
            tint: Tint::FROST,
        });
        self.pending = Some(scheduler.schedule(FROZEN_DELAY_MS, TimerAction::Thaw(self.id)));
        trace!(enemy = %self.id, "frozen");
        true
    }

    /// Thaw-timer handler. Restores the flavor tint and returns to solid.
    /// A stale timer (not frozen anymore) falls through.
    pub fn thaw(&mut self, effects: &mut EffectLog) {
        if self.state != PopsicleState::Frozen {
            return;
        }
        self.state = PopsicleState::Solid;
        self.tint = self.flavor.tint();
        self.pending = None;
        effects.push(Effect::TintChanged {
            enemy: self.id,
            tint: self.tint,
        });
    }

    /// Melt-advance timer handler.
    ///
    /// Walks one stage forward, or resolves the chain at the final stage:
    /// an 80 % roll restores the body (collider back on, grow-in effect),
    /// the remaining 20 % recycles it. The caller removes the enemy on
    /// [`MeltOutcome::Recycled`].
    pub fn advance_melt(
        &mut self,
        scheduler: &mut Scheduler<TimerAction>,
        effects: &mut EffectLog,
        rng: &mut impl Rng,
    ) -> MeltOutcome {
        if !self.state.is_melt_stage() {
            return MeltOutcome::Ignored;
        }

        if let Some(next) = self.state.melt_successor() {
            self.state = next;
            self.pending =
                Some(scheduler.schedule(STAGE_DELAY_MS, TimerAction::MeltAdvance(self.id)));
            trace!(enemy = %self.id, stage = ?next, "melt stage advanced");
            return MeltOutcome::Advanced(next);
        }

        // Final stage: resolve the chain.
        self.pending = None;
        if recycle_roll(rng) {
            self.state = PopsicleState::Recycled;
            trace!(enemy = %self.id, "recycled");
            MeltOutcome::Recycled
        } else {
            self.state = PopsicleState::Solid;
            self.collider_enabled = true;
            effects.push(Effect::GrowIn {
                enemy: self.id,
                duration_ms: GROW_IN_MS,
            });
            trace!(enemy = %self.id, "reassembled");
            MeltOutcome::Restored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fixture() -> (Popsicle, Scheduler<TimerAction>, EffectLog) {
        let mut scheduler = Scheduler::new();
        let drip = scheduler.schedule_repeating(DRIP_INTERVAL_MS, TimerAction::Drip(EnemyId::new(1)));
        let pop = Popsicle::new(EnemyId::new(1), Flavor::Cherry, Vec2::new(100.0, 200.0), drip);
        (pop, scheduler, EffectLog::new())
    }

    mod state_tests {
        use super::*;

        #[test]
        fn melt_chain_order() {
            let mut state = PopsicleState::Melting;
            let mut chain = vec![state];
            while let Some(next) = state.melt_successor() {
                chain.push(next);
                state = next;
            }
            assert_eq!(
                chain,
                [
                    PopsicleState::Melting,
                    PopsicleState::Crystallizing,
                    PopsicleState::Scaffolding,
                    PopsicleState::Reassembling,
                    PopsicleState::Calibrating,
                ]
            );
        }

        #[test]
        fn solid_and_frozen_are_not_melt_stages() {
            assert!(!PopsicleState::Solid.is_melt_stage());
            assert!(!PopsicleState::Frozen.is_melt_stage());
            assert!(!PopsicleState::Recycled.is_melt_stage());
            assert!(PopsicleState::Calibrating.is_melt_stage());
        }
    }

    mod melt_tests {
        use super::*;

        #[test]
        fn begin_melt_disables_collider_and_bursts() {
            let (mut pop, mut scheduler, mut effects) = fixture();

            assert!(pop.begin_melt(&mut scheduler, &mut effects));
            assert_eq!(pop.state(), PopsicleState::Melting);
            assert!(!pop.collider_enabled());

            let log = effects.take();
            assert!(matches!(
                log[0],
                Effect::ParticleBurst {
                    quantity: MELT_BURST_QUANTITY,
                    lifespan_ms: MELT_BURST_LIFESPAN_MS,
                    ..
                }
            ));
        }

        #[test]
        fn begin_melt_rejected_while_melting() {
            let (mut pop, mut scheduler, mut effects) = fixture();
            pop.begin_melt(&mut scheduler, &mut effects);
            effects.take();

            assert!(!pop.begin_melt(&mut scheduler, &mut effects));
            assert!(effects.is_empty());
            assert_eq!(pop.state(), PopsicleState::Melting);
        }

        #[test]
        fn advance_walks_one_stage_and_rearms() {
            let (mut pop, mut scheduler, mut effects) = fixture();
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            pop.begin_melt(&mut scheduler, &mut effects);

            let outcome = pop.advance_melt(&mut scheduler, &mut effects, &mut rng);
            assert_eq!(outcome, MeltOutcome::Advanced(PopsicleState::Crystallizing));
            assert!(pop.pending.is_some());
        }

        #[test]
        fn stale_advance_is_ignored() {
            let (mut pop, mut scheduler, mut effects) = fixture();
            let mut rng = ChaCha8Rng::seed_from_u64(0);

            let outcome = pop.advance_melt(&mut scheduler, &mut effects, &mut rng);
            assert_eq!(outcome, MeltOutcome::Ignored);
            assert_eq!(pop.state(), PopsicleState::Solid);
        }

        #[test]
        fn chain_resolves_after_final_stage() {
            let (mut pop, mut scheduler, mut effects) = fixture();
            let mut rng = ChaCha8Rng::seed_from_u64(0);
            pop.begin_melt(&mut scheduler, &mut effects);

            let mut last = MeltOutcome::Ignored;
            for _ in 0..5 {
                last = pop.advance_melt(&mut scheduler, &mut effects, &mut rng);
            }
            match last {
                MeltOutcome::Restored => {
                    assert_eq!(pop.state(), PopsicleState::Solid);
                    assert!(pop.collider_enabled());
                }
                MeltOutcome::Recycled => assert_eq!(pop.state(), PopsicleState::Recycled),
                other => panic!("chain did not resolve: {other:?}"),
            }
        }
    }

    mod freeze_tests {
        use super::*;

        #[test]
        fn freeze_zeroes_velocity_and_frosts_tint() {
            let (mut pop, mut scheduler, mut effects) = fixture();
            pop.velocity = Vec2::new(50.0, 0.0);

            assert!(pop.freeze(&mut scheduler, &mut effects));
            assert_eq!(pop.state(), PopsicleState::Frozen);
            assert_eq!(pop.velocity, Vec2::ZERO);
            assert_eq!(pop.tint, Tint::FROST);
        }

        #[test]
        fn thaw_restores_flavor_tint() {
            let (mut pop, mut scheduler, mut effects) = fixture();
            pop.freeze(&mut scheduler, &mut effects);

            pop.thaw(&mut effects);
            assert_eq!(pop.state(), PopsicleState::Solid);
            assert_eq!(pop.tint, Flavor::Cherry.tint());
        }

        #[test]
        fn stale_thaw_is_ignored() {
            let (mut pop, mut scheduler, mut effects) = fixture();
            pop.begin_melt(&mut scheduler, &mut effects);
            effects.take();

            pop.thaw(&mut effects);
            assert_eq!(pop.state(), PopsicleState::Melting);
            assert!(effects.is_empty());
        }

        #[test]
        fn freeze_rejected_while_frozen() {
            let (mut pop, mut scheduler, mut effects) = fixture();
            pop.freeze(&mut scheduler, &mut effects);

            assert!(!pop.freeze(&mut scheduler, &mut effects));
        }
    }

    mod drip_tests {
        use super::*;

        #[test]
        fn drips_only_while_solid() {
            let (mut pop, mut scheduler, mut effects) = fixture();
            assert!(pop.should_drip());

            pop.freeze(&mut scheduler, &mut effects);
            assert!(!pop.should_drip());

            pop.thaw(&mut effects);
            assert!(pop.should_drip());
        }
    }
}
