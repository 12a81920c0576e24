//! The world orchestrator.
//!
//! [`World`] owns everything a session needs: the timer scheduler, the
//! enemy and drop collections, the room graph, the unlock ledger, the
//! player, the effect log, and a seeded RNG. The host calls
//! [`World::step`] once per frame with the elapsed milliseconds and drains
//! visual side effects with [`World::take_effects`]; everything else is
//! explicit host-facing mutation (`hit`, `enter`, `unlock_gate`, ...).
//!
//! Two sessions constructed with the same seed and fed the same calls
//! produce identical state. There is no wall clock and no thread anywhere
//! in the core.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tempo::Scheduler;
use tracing::{debug, info};

use crate::effect::{Effect, EffectLog, Tint};
use crate::enemy::popsicle::{self, MeltOutcome};
use crate::enemy::turret;
use crate::enemy::{DamageFlavor, Enemy, EnemyId, Flavor, Popsicle, Stimulus, Turret, WorldFormat};
use crate::fusion::{fuse, Codec, FusionOutcome};
use crate::ledger::{GateKey, Ledger};
use crate::player::{Intent, Player};
use crate::room::defs::{RoomDef, RoomDefError};
use crate::room::{ActiveRoom, Rect, RoomGraph, RoomKey};

/// Player overlap footprint width.
pub const PLAYER_WIDTH: f32 = 32.0;
/// Player overlap footprint height.
pub const PLAYER_HEIGHT: f32 = 48.0;
/// How close the player must be to a switch to activate it.
pub const SWITCH_RANGE: f32 = 40.0;
/// Drip drops spawn this far below the emitting popsicle.
pub const DROP_SPAWN_OFFSET_Y: f32 = 20.0;
/// Downward speed of a drip drop in px/s.
pub const DROP_FALL_SPEED: f32 = 200.0;
/// Lifetime of a drip drop.
pub const DROP_LIFETIME_MS: u64 = 4000;

const DESTRUCTION_BURST_QUANTITY: u32 = 20;
const DESTRUCTION_BURST_LIFESPAN_MS: u64 = 800;

// =============================================================================
// Timer payloads
// =============================================================================

/// What a fired timer asks the world to do.
///
/// Payloads carry ids, never references: by the time a timer fires its
/// subject may be gone, and the dispatch re-checks liveness and expected
/// state before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// A popsicle's repeating drip tick.
    Drip(EnemyId),
    /// A popsicle's next melt stage is due.
    MeltAdvance(EnemyId),
    /// A frozen popsicle thaws.
    Thaw(EnemyId),
    /// A turret's repeating fire tick.
    TurretFire(EnemyId),
    /// A drop's lifetime ran out.
    ExpireDroplet(DropletId),
}

// =============================================================================
// Drops
// =============================================================================

/// Unique identifier for a drop, assigned at spawn and never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DropletId(u64);

impl DropletId {
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

impl fmt::Debug for DropletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DropletId({})", self.0)
    }
}

impl fmt::Display for DropletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transient projectile hazard, a popsicle drip or a turret bullet.
///
/// Drops live in one shared collection and expire on their own one-shot
/// timer; the core integrates their motion but leaves collision response
/// with the player to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Droplet {
    /// Current world position.
    pub position: Vec2,
    /// Velocity in px/s.
    pub velocity: Vec2,
    /// Render tint (the emitter's tint at spawn time).
    pub tint: Tint,
    expire_timer: tempo::TimerId,
}

// =============================================================================
// World
// =============================================================================

/// The complete headless game state for one session.
#[derive(Debug)]
pub struct World {
    scheduler: Scheduler<TimerAction>,
    enemies: BTreeMap<EnemyId, Enemy>,
    drops: BTreeMap<DropletId, Droplet>,
    rooms: RoomGraph,
    ledger: Ledger,
    player: Player,
    effects: EffectLog,
    rng: ChaCha8Rng,
    format: WorldFormat,
    next_enemy_id: u64,
    next_drop_id: u64,
}

impl World {
    /// Creates an empty world with a seeded RNG.
    ///
    /// The seed fully determines every probabilistic branch (currently only
    /// the melt-chain recycle roll).
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            scheduler: Scheduler::new(),
            enemies: BTreeMap::new(),
            drops: BTreeMap::new(),
            rooms: RoomGraph::new(),
            ledger: Ledger::new(),
            player: Player::default(),
            effects: EffectLog::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            format: WorldFormat::default(),
            next_enemy_id: 1,
            next_drop_id: 1,
        }
    }

    // -------------------------------------------------------------------------
    // Room registration and entry
    // -------------------------------------------------------------------------

    /// Registers a room definition.
    ///
    /// # Errors
    ///
    /// Rejects duplicate keys and invalid definitions; see
    /// [`RoomGraph::load`].
    pub fn load_room(&mut self, key: RoomKey, def: RoomDef) -> Result<(), RoomDefError> {
        self.rooms.load(key, def)
    }

    /// Parses and registers a room definition from JSON.
    ///
    /// # Errors
    ///
    /// Everything [`load_room`](Self::load_room) rejects, plus parse
    /// failures.
    pub fn load_room_json(&mut self, key: RoomKey, json: &str) -> Result<(), RoomDefError> {
        self.rooms.load_json(key, json)
    }

    /// Moves the player to room `key` at `spawn`.
    ///
    /// Tears down the previous room completely, including every spawned
    /// enemy and drop (their timers are cancelled in the same call), then
    /// instantiates the new room's entities. An unknown key is a
    /// recoverable no-op: nothing changes and the call reports `false`.
    pub fn enter(&mut self, key: &RoomKey, spawn: Vec2) -> bool {
        if !self.rooms.enter(key, &self.ledger, &self.player) {
            return false;
        }
        self.clear_spawned();
        self.player.room = Some(key.clone());
        self.player.position = spawn;
        true
    }

    fn clear_spawned(&mut self) {
        let owned: Vec<_> = self
            .enemies
            .values()
            .flat_map(Enemy::timer_ids)
            .chain(self.drops.values().map(|d| d.expire_timer))
            .collect();
        self.scheduler.cancel_all(owned);
        self.enemies.clear();
        self.drops.clear();
    }

    // -------------------------------------------------------------------------
    // Spawning and destruction
    // -------------------------------------------------------------------------

    /// Spawns a solid popsicle and arms its repeating drip timer.
    pub fn spawn_popsicle(&mut self, flavor: Flavor, position: Vec2) -> EnemyId {
        let id = self.next_enemy();
        let drip = self
            .scheduler
            .schedule_repeating(popsicle::DRIP_INTERVAL_MS, TimerAction::Drip(id));
        self.enemies
            .insert(id, Enemy::Popsicle(Popsicle::new(id, flavor, position, drip)));
        debug!(enemy = %id, ?flavor, "popsicle spawned");
        id
    }

    /// Spawns a turret and arms its repeating fire timer.
    pub fn spawn_turret(&mut self, position: Vec2) -> EnemyId {
        let id = self.next_enemy();
        let fire = self
            .scheduler
            .schedule_repeating(turret::FIRE_INTERVAL_MS, TimerAction::TurretFire(id));
        self.enemies
            .insert(id, Enemy::Turret(Turret::new(id, position, fire)));
        debug!(enemy = %id, "turret spawned");
        id
    }

    /// Removes an enemy and cancels every timer it owns, in the same call.
    ///
    /// Returns `false` if no such enemy exists.
    pub fn destroy_enemy(&mut self, id: EnemyId) -> bool {
        let Some(enemy) = self.enemies.remove(&id) else {
            return false;
        };
        self.scheduler.cancel_all(enemy.timer_ids());
        debug!(enemy = %id, "enemy destroyed");
        true
    }

    fn next_enemy(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id += 1;
        id
    }

    fn spawn_drop(&mut self, position: Vec2, velocity: Vec2, tint: Tint, lifetime_ms: u64) {
        let id = DropletId::new(self.next_drop_id);
        self.next_drop_id += 1;
        let expire_timer = self
            .scheduler
            .schedule(lifetime_ms, TimerAction::ExpireDroplet(id));
        self.drops.insert(
            id,
            Droplet {
                position,
                velocity,
                tint,
                expire_timer,
            },
        );
    }

    // -------------------------------------------------------------------------
    // Frame step
    // -------------------------------------------------------------------------

    /// Advances the world by `dt` milliseconds.
    ///
    /// Fires due timers in deterministic order, integrates drop and
    /// elevator motion, collects overlapped upgrade pickups (re-evaluating
    /// gates in the same step), and follows door transitions from the
    /// player's footprint.
    pub fn step(&mut self, dt: u64) {
        // Motion first: a droplet spawned by a timer this frame starts
        // moving next frame.
        self.integrate_drops(dt);
        self.rooms.update_elevators(dt);
        for (_, action) in self.scheduler.advance(dt) {
            self.dispatch(action);
        }
        self.collect_upgrades();
        self.follow_door_transition();
    }

    fn dispatch(&mut self, action: TimerAction) {
        match action {
            TimerAction::Drip(id) => {
                let Some(pop) = self.enemies.get(&id).and_then(Enemy::as_popsicle) else {
                    return;
                };
                if !pop.should_drip() {
                    return;
                }
                let position = pop.position + Vec2::new(0.0, DROP_SPAWN_OFFSET_Y);
                let tint = pop.tint;
                self.spawn_drop(
                    position,
                    Vec2::new(0.0, DROP_FALL_SPEED),
                    tint,
                    DROP_LIFETIME_MS,
                );
            }
            TimerAction::MeltAdvance(id) => {
                let Some(pop) = self.enemies.get_mut(&id).and_then(Enemy::as_popsicle_mut)
                else {
                    return;
                };
                let outcome = pop.advance_melt(&mut self.scheduler, &mut self.effects, &mut self.rng);
                if outcome == MeltOutcome::Recycled {
                    self.destroy_enemy(id);
                }
            }
            TimerAction::Thaw(id) => {
                if let Some(pop) = self.enemies.get_mut(&id).and_then(Enemy::as_popsicle_mut) {
                    pop.thaw(&mut self.effects);
                }
            }
            TimerAction::TurretFire(id) => {
                let Some(Enemy::Turret(t)) = self.enemies.get(&id) else {
                    return;
                };
                let origin = t.position;
                let velocity = t.aim(self.player.position);
                self.spawn_drop(origin, velocity, turret::BULLET_TINT, turret::BULLET_LIFETIME_MS);
            }
            TimerAction::ExpireDroplet(id) => {
                self.drops.remove(&id);
            }
        }
    }

    fn integrate_drops(&mut self, dt: u64) {
        #[allow(clippy::cast_precision_loss)]
        let secs = dt as f32 / 1000.0;
        for drop in self.drops.values_mut() {
            drop.position += drop.velocity * secs;
        }
    }

    fn collect_upgrades(&mut self) {
        let player_rect = self.player_rect();
        let Some(active) = self.rooms.active_mut() else {
            return;
        };

        let mut collected = Vec::new();
        active.upgrades.retain(|pickup| {
            if pickup.rect().overlaps(&player_rect) {
                collected.push(pickup.kind.clone());
                false
            } else {
                true
            }
        });

        if collected.is_empty() {
            return;
        }
        for kind in &collected {
            if self.player.grant_upgrade(kind) {
                info!(upgrade = %kind, "upgrade collected");
            }
        }
        self.rooms.refresh_gates(&self.ledger, &self.player);
    }

    fn follow_door_transition(&mut self) {
        let hit = self.rooms.door_transition(&self.player_rect());
        if let Some((target, spawn)) = hit {
            self.enter(&target, spawn);
        }
    }

    fn player_rect(&self) -> Rect {
        Rect::new(self.player.position, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    // -------------------------------------------------------------------------
    // Host-facing mutation
    // -------------------------------------------------------------------------

    /// Lands a hit of `flavor` on enemy `id`.
    ///
    /// The hit matches when the enemy's weakness equals either the hit's
    /// flavor or the currently active world format. A matched hit melts a
    /// popsicle or destroys a turret; a mismatched hit freezes a popsicle
    /// and bounces off a turret. Hits on a popsicle in any state other than
    /// solid change nothing. Returns `true` if the hit had any effect.
    pub fn hit(&mut self, id: EnemyId, flavor: DamageFlavor) -> bool {
        let Some(enemy) = self.enemies.get(&id) else {
            debug!(enemy = %id, "hit on unknown enemy, ignoring");
            return false;
        };
        let weakness = enemy.weakness();
        let position = enemy.position();
        let matched = weakness == Stimulus::Flavor(flavor)
            || weakness == Stimulus::Format(self.format);

        match self.enemies.get_mut(&id) {
            Some(Enemy::Popsicle(pop)) => {
                if matched {
                    pop.begin_melt(&mut self.scheduler, &mut self.effects)
                } else {
                    pop.freeze(&mut self.scheduler, &mut self.effects)
                }
            }
            Some(Enemy::Turret(_)) => {
                if !matched {
                    return false;
                }
                self.effects.push(Effect::ParticleBurst {
                    position,
                    tint: Tint::WHITE,
                    quantity: DESTRUCTION_BURST_QUANTITY,
                    lifespan_ms: DESTRUCTION_BURST_LIFESPAN_MS,
                });
                self.destroy_enemy(id)
            }
            None => false,
        }
    }

    /// Records an unlock-key in the ledger and re-evaluates gates.
    ///
    /// The distinguished main-exit key additionally clears every plain door
    /// in the active room. Gate re-evaluation runs on every call, repeat
    /// unlocks included.
    pub fn unlock_gate(&mut self, key: GateKey) {
        let main_exit = key.is_main_exit();
        if self.ledger.unlock(key) {
            info!(main_exit, "gate key recorded");
        }
        if main_exit {
            self.rooms.clear_doors();
        }
        self.rooms.refresh_gates(&self.ledger, &self.player);
    }

    /// Powers every not-yet-powered elevator in the active room. Returns
    /// the number newly powered.
    pub fn power_elevators(&mut self) -> usize {
        self.rooms.power_elevators()
    }

    /// Clears all static hazards in the active room.
    pub fn disable_hazards(&mut self) {
        self.rooms.disable_hazards();
    }

    /// Activates the switch closest to the player within interaction range.
    ///
    /// No-op when none is near or the nearest is already active. Returns
    /// `true` if a switch was newly activated.
    pub fn activate_nearby_switch(&mut self) -> bool {
        let Some(index) = self
            .rooms
            .nearest_switch_in_range(self.player.position, SWITCH_RANGE)
        else {
            return false;
        };
        self.rooms.activate_switch(index, &mut self.effects)
    }

    /// Applies one abstract input signal.
    pub fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::MoveLeft => self.player.facing = crate::player::Facing::Left,
            Intent::MoveRight => self.player.facing = crate::player::Facing::Right,
            Intent::Fire => self.effects.push(Effect::ProjectileLaunched {
                origin: self.player.position,
                facing: self.player.facing,
            }),
            Intent::Interact => {
                self.activate_nearby_switch();
            }
            // Vertical movement stays with the host's physics.
            Intent::Jump => {}
        }
    }

    /// Fuses two codecs and applies the outcome.
    ///
    /// Unlock records the main-exit key, Switch activates the switch
    /// nearest the player, Elevator powers elevators, Hazard clears
    /// hazards, Hallucination is purely visual. Returns the outcome, or
    /// `None` when the pair does not fuse.
    pub fn resolve_fusion(&mut self, a: Codec, b: Codec) -> Option<FusionOutcome> {
        let outcome = fuse(a, b)?;
        info!(?a, ?b, ?outcome, "codecs fused");
        match outcome {
            FusionOutcome::Unlock => self.unlock_gate(GateKey::main_exit()),
            FusionOutcome::Hallucination => self.effects.push(Effect::Hallucination),
            FusionOutcome::Switch => {
                self.activate_nearby_switch();
            }
            FusionOutcome::Elevator => {
                self.power_elevators();
            }
            FusionOutcome::Hazard => self.disable_hazards(),
        }
        Some(outcome)
    }

    /// Switches the world-wide presentation format.
    pub fn set_format(&mut self, format: WorldFormat) {
        self.format = format;
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Drains and returns all recorded visual effects in recording order.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.effects.take()
    }

    /// The enemy with id `id`, if it is alive.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }

    /// Mutable access to the enemy with id `id`, if it is alive.
    pub fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.get_mut(&id)
    }

    /// All live enemies, ordered by id.
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies.values()
    }

    /// All live drops, ordered by id.
    pub fn drops(&self) -> impl Iterator<Item = &Droplet> + '_ {
        self.drops.values()
    }

    /// Number of live drops.
    #[must_use]
    pub fn drop_count(&self) -> usize {
        self.drops.len()
    }

    /// The active room instance, if a room has been entered.
    #[must_use]
    pub fn active_room(&self) -> Option<&ActiveRoom> {
        self.rooms.active()
    }

    /// The unlock ledger.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable access to the player.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// The currently active world format.
    #[must_use]
    pub const fn format(&self) -> WorldFormat {
        self.format
    }

    /// Milliseconds of virtual time elapsed since construction.
    #[must_use]
    pub fn clock_ms(&self) -> u64 {
        self.scheduler.now()
    }
}
