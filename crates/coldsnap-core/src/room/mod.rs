//! Room graph and streaming manager.
//!
//! Room *definitions* are immutable and registered once before the session
//! starts. Room *instances* — the live platforms, doors, switches, hazards,
//! elevators, pickups, and gated obstacles — are created on entry and
//! destroyed on exit. Exactly one room is active at a time; entering a room
//! tears the previous instance down completely before instantiating the new
//! one. Full teardown/rebuild is a deliberate design choice: it costs a
//! re-allocation at room-transition frequency and rules out stale entity
//! leakage entirely.
//!
//! Gated obstacles are evaluated against the unlock ledger and the player's
//! upgrade set at entry, and re-evaluated after every ledger or upgrade
//! mutation — an already-satisfied obstacle must never survive a frame.

pub mod defs;

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::effect::{Effect, EffectLog};
use crate::ledger::{GateKey, Ledger};
use crate::player::Player;
use crate::puzzle::{LockDoor, Switch, SwitchActivation};

use defs::{
    DoorDef, RoomDef, RoomDefError, DEFAULT_ELEVATOR_DISTANCE, DEFAULT_ELEVATOR_SPEED,
    DEFAULT_ROOM_HEIGHT, DEFAULT_ROOM_WIDTH,
};

/// Doors anchor at their base: this is the overlap footprint width.
pub const DOOR_WIDTH: f32 = 32.0;
/// Door overlap footprint height.
pub const DOOR_HEIGHT: f32 = 64.0;
/// Overlap footprint of an upgrade pickup.
pub const UPGRADE_SIZE: f32 = 24.0;

/// Unique key identifying a room definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomKey(String);

impl RoomKey {
    /// Creates a key from a string.
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self(key.to_string())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RoomKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Axis-aligned rectangle, center + full size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Center point.
    pub center: Vec2,
    /// Full width and height.
    pub size: Vec2,
}

impl Rect {
    /// Creates a rectangle from its center and full size.
    #[must_use]
    pub const fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Returns `true` if `point` lies inside (inclusive of edges).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let half = self.size * 0.5;
        (point.x - self.center.x).abs() <= half.x && (point.y - self.center.y).abs() <= half.y
    }

    /// Returns `true` if the two rectangles overlap (inclusive of edges).
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        let dx = (self.center.x - other.center.x).abs();
        let dy = (self.center.y - other.center.y).abs();
        dx <= (self.size.x + other.size.x) * 0.5 && dy <= (self.size.y + other.size.y) * 0.5
    }
}

impl From<&defs::RectDef> for Rect {
    fn from(def: &defs::RectDef) -> Self {
        Self::new(Vec2::new(def.x, def.y), Vec2::new(def.width, def.height))
    }
}

/// A plain door: player overlap always triggers the transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    /// Base position (doors anchor at their base).
    pub position: Vec2,
    /// Destination room.
    pub target: RoomKey,
    /// Player spawn point in the destination room.
    pub spawn: Vec2,
    /// Rendered invisible when `true`; still functional.
    pub hidden: bool,
}

impl Door {
    fn from_def(def: &DoorDef) -> Self {
        Self {
            position: Vec2::new(def.x, def.y),
            target: RoomKey::new(&def.target),
            spawn: Vec2::new(def.start_x, def.start_y),
            hidden: def.hidden,
        }
    }

    /// Overlap footprint, anchored at the door's base.
    #[must_use]
    pub fn rect(&self) -> Rect {
        door_rect(self.position)
    }
}

/// Overlap footprint for a base-anchored door at `position`.
#[must_use]
pub fn door_rect(position: Vec2) -> Rect {
    Rect::new(
        Vec2::new(position.x, position.y - DOOR_HEIGHT * 0.5),
        Vec2::new(DOOR_WIDTH, DOOR_HEIGHT),
    )
}

/// An oscillating platform.
///
/// Unpowered elevators sit at their rest position. Once powered, an elevator
/// ping-pongs between rest and `rest − distance` at `speed` px/s, i.e. one
/// leg of travel takes `distance / speed` seconds. Powering is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elevator {
    /// Current platform footprint (the y coordinate moves while powered).
    pub rect: Rect,
    origin_y: f32,
    distance: f32,
    speed: f32,
    powered: bool,
    elapsed_ms: u64,
}

impl Elevator {
    fn from_def(def: &defs::ElevatorDef) -> Self {
        Self {
            rect: Rect::new(Vec2::new(def.x, def.y), Vec2::new(def.width, def.height)),
            origin_y: def.y,
            distance: def.distance.unwrap_or(DEFAULT_ELEVATOR_DISTANCE),
            speed: def.speed.unwrap_or(DEFAULT_ELEVATOR_SPEED),
            powered: false,
            elapsed_ms: 0,
        }
    }

    /// Starts the oscillation. Returns `true` if the elevator was newly
    /// powered; powering an already-powered elevator does not restart it.
    pub fn power(&mut self) -> bool {
        if self.powered {
            return false;
        }
        self.powered = true;
        true
    }

    /// Returns `true` once the elevator has been powered.
    #[must_use]
    pub const fn is_powered(&self) -> bool {
        self.powered
    }

    /// Advances the oscillation by `dt` milliseconds.
    ///
    /// No-op while unpowered. Motion is a triangle wave: rest → top over one
    /// leg duration, top → rest over the next.
    pub fn update(&mut self, dt: u64) {
        if !self.powered {
            return;
        }
        self.elapsed_ms += dt;

        let leg_ms = f64::from(self.distance / self.speed) * 1000.0;
        if leg_ms <= 0.0 {
            return;
        }
        let cycle_ms = leg_ms * 2.0;

        #[allow(clippy::cast_precision_loss)]
        let t = (self.elapsed_ms as f64) % cycle_ms;
        let frac = if t < leg_ms {
            t / leg_ms
        } else {
            (cycle_ms - t) / leg_ms
        };

        #[allow(clippy::cast_possible_truncation)]
        let offset = (self.distance as f64 * frac) as f32;
        self.rect.center.y = self.origin_y - offset;
    }
}

/// What a gated obstacle requires before it disappears.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateRequirement {
    /// A named upgrade owned by the player.
    Upgrade(String),
    /// A named unlock-key recorded in the ledger.
    Key(GateKey),
}

/// An obstacle removed once its requirement is satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateObstacle {
    /// Blocking footprint.
    pub rect: Rect,
    /// The requirement that removes it.
    pub requirement: GateRequirement,
}

impl GateObstacle {
    fn from_def(def: &defs::GateDef) -> Self {
        // Validation guarantees at least one requirement; upgrades win if a
        // definition carries both.
        let requirement = match (&def.upgrade, &def.key) {
            (Some(upgrade), _) => GateRequirement::Upgrade(upgrade.clone()),
            (None, Some(key)) => GateRequirement::Key(GateKey::new(key)),
            (None, None) => unreachable!("rejected by RoomDef::validate"),
        };
        Self {
            rect: Rect::new(Vec2::new(def.x, def.y), Vec2::new(def.width, def.height)),
            requirement,
        }
    }

    /// Returns `true` if the obstacle is already satisfied and should be
    /// removed.
    #[must_use]
    pub fn satisfied(&self, ledger: &Ledger, player: &Player) -> bool {
        match &self.requirement {
            GateRequirement::Upgrade(name) => player.has_upgrade(name),
            GateRequirement::Key(key) => ledger.is_unlocked(key),
        }
    }
}

/// A collectible upgrade waiting in the active room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradePickup {
    /// World position.
    pub position: Vec2,
    /// Upgrade name granted on pickup.
    pub kind: String,
}

impl UpgradePickup {
    /// Overlap footprint.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.position, Vec2::splat(UPGRADE_SIZE))
    }
}

/// The live entities of the currently active room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRoom {
    /// Key of the definition this instance was built from.
    pub key: RoomKey,
    /// World/camera bounds, `(width, height)`.
    pub bounds: Vec2,
    /// Static platforms.
    pub platforms: Vec<Rect>,
    /// Plain doors.
    pub doors: Vec<Door>,
    /// Lockable doors.
    pub locks: Vec<LockDoor>,
    /// Switches.
    pub switches: Vec<Switch>,
    /// Static damage zones.
    pub hazards: Vec<Rect>,
    /// Oscillating platforms.
    pub elevators: Vec<Elevator>,
    /// Collectible upgrades.
    pub upgrades: Vec<UpgradePickup>,
    /// Gated obstacles still unsatisfied.
    pub gates: Vec<GateObstacle>,
}

impl ActiveRoom {
    fn instantiate(key: RoomKey, def: &RoomDef) -> Self {
        Self {
            key,
            bounds: Vec2::new(
                def.width.unwrap_or(DEFAULT_ROOM_WIDTH),
                def.height.unwrap_or(DEFAULT_ROOM_HEIGHT),
            ),
            platforms: def.platforms.iter().map(Rect::from).collect(),
            doors: def.doors.iter().map(Door::from_def).collect(),
            locks: def
                .locks
                .iter()
                .map(|d| {
                    LockDoor::new(
                        Vec2::new(d.x, d.y),
                        RoomKey::new(&d.target),
                        Vec2::new(d.start_x, d.start_y),
                        d.hidden,
                    )
                })
                .collect(),
            switches: def
                .switches
                .iter()
                .map(|s| Switch::new(Vec2::new(s.x, s.y), s.target_lock))
                .collect(),
            hazards: def.hazards.iter().map(Rect::from).collect(),
            elevators: def.elevators.iter().map(Elevator::from_def).collect(),
            upgrades: def
                .upgrades
                .iter()
                .map(|u| UpgradePickup {
                    position: Vec2::new(u.x, u.y),
                    kind: u.kind.clone(),
                })
                .collect(),
            gates: def.gates.iter().map(GateObstacle::from_def).collect(),
        }
    }
}

/// Owns the room definitions and the single active room instance.
#[derive(Debug, Default)]
pub struct RoomGraph {
    rooms: BTreeMap<RoomKey, RoomDef>,
    active: Option<ActiveRoom>,
}

impl RoomGraph {
    /// Creates an empty graph with no active room.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a room definition.
    ///
    /// # Errors
    ///
    /// Rejects duplicate keys and definitions that fail
    /// [`RoomDef::validate`].
    pub fn load(&mut self, key: RoomKey, def: RoomDef) -> Result<(), RoomDefError> {
        if self.rooms.contains_key(&key) {
            return Err(RoomDefError::DuplicateKey(key));
        }
        def.validate(&key)?;
        self.rooms.insert(key, def);
        Ok(())
    }

    /// Parses and registers a room definition from JSON.
    ///
    /// # Errors
    ///
    /// Everything [`load`](Self::load) rejects, plus JSON parse failures.
    pub fn load_json(&mut self, key: RoomKey, json: &str) -> Result<(), RoomDefError> {
        let def = RoomDef::from_json(&key, json)?;
        self.load(key, def)
    }

    /// Returns `true` if a definition is registered under `key`.
    #[must_use]
    pub fn contains(&self, key: &RoomKey) -> bool {
        self.rooms.contains_key(key)
    }

    /// Number of registered room definitions.
    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// The active room instance, if a room has been entered.
    #[must_use]
    pub fn active(&self) -> Option<&ActiveRoom> {
        self.active.as_ref()
    }

    /// Mutable access to the active room instance.
    #[must_use]
    pub fn active_mut(&mut self) -> Option<&mut ActiveRoom> {
        self.active.as_mut()
    }

    /// Swaps the active room to `key`.
    ///
    /// Tears down the previous instance completely, instantiates the new
    /// room's entities, and removes any gated obstacle the ledger and player
    /// already satisfy. An unknown key is a recoverable configuration error:
    /// the active room is left untouched and the call reports `false`.
    pub fn enter(&mut self, key: &RoomKey, ledger: &Ledger, player: &Player) -> bool {
        let Some(def) = self.rooms.get(key) else {
            warn!(room = %key, "enter: unknown room key, ignoring");
            return false;
        };

        // Full clear, not incremental diffing.
        self.active = Some(ActiveRoom::instantiate(key.clone(), def));
        let removed = self.refresh_gates(ledger, player);
        info!(room = %key, gates_removed = removed, "entered room");
        true
    }

    /// Removes every instantiated gate whose requirement is now satisfied.
    ///
    /// Must run after every ledger or upgrade mutation, not only at room
    /// entry. Returns the number of gates removed.
    pub fn refresh_gates(&mut self, ledger: &Ledger, player: &Player) -> usize {
        let Some(active) = self.active.as_mut() else {
            return 0;
        };
        let before = active.gates.len();
        active.gates.retain(|gate| !gate.satisfied(ledger, player));
        let removed = before - active.gates.len();
        if removed > 0 {
            debug!(room = %active.key, removed, "gates satisfied and removed");
        }
        removed
    }

    /// Removes all plain doors from the active room (the main-exit unlock).
    pub fn clear_doors(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.doors.clear();
        }
    }

    /// Clears all static hazards in the active room.
    pub fn disable_hazards(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.hazards.clear();
        }
    }

    /// Powers every not-yet-powered elevator in the active room.
    ///
    /// Idempotent per elevator. Returns the number newly powered.
    pub fn power_elevators(&mut self) -> usize {
        let Some(active) = self.active.as_mut() else {
            return 0;
        };
        active.elevators.iter_mut().map(|e| e.power()).filter(|&powered| powered).count()
    }

    /// Advances powered elevators by `dt` milliseconds.
    pub fn update_elevators(&mut self, dt: u64) {
        if let Some(active) = self.active.as_mut() {
            for elevator in &mut active.elevators {
                elevator.update(dt);
            }
        }
    }

    /// Finds the transition the player's footprint currently triggers.
    ///
    /// Plain doors always transition; lock doors only once unlocked. Locked
    /// doors block silently — overlap with one is not an error.
    #[must_use]
    pub fn door_transition(&self, player_rect: &Rect) -> Option<(RoomKey, Vec2)> {
        let active = self.active.as_ref()?;

        for door in &active.doors {
            if door.rect().overlaps(player_rect) {
                return Some((door.target.clone(), door.spawn));
            }
        }
        for lock in &active.locks {
            if !lock.is_locked() && door_rect(lock.position).overlaps(player_rect) {
                return Some((lock.target.clone(), lock.spawn));
            }
        }
        None
    }

    /// Index of the switch nearest to `position` within `range`, if any.
    #[must_use]
    pub fn nearest_switch_in_range(&self, position: Vec2, range: f32) -> Option<usize> {
        let active = self.active.as_ref()?;
        active
            .switches
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s.position.distance_squared(position)))
            .filter(|(_, d2)| *d2 <= range * range)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
    }

    /// Activates the switch at `index`, unlocking its bound lock door on
    /// first activation.
    ///
    /// Returns `true` if the switch was newly activated. Out-of-range
    /// indices and repeat activations are no-ops.
    pub fn activate_switch(&mut self, index: usize, effects: &mut EffectLog) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let Some(switch) = active.switches.get_mut(index) else {
            return false;
        };

        match switch.activate() {
            SwitchActivation::AlreadyActive => false,
            SwitchActivation::Activated { target_lock } => {
                effects.push(Effect::SwitchLit {
                    position: switch.position,
                });
                match target_lock {
                    Some(lock_index) => {
                        if let Some(lock) = active.locks.get_mut(lock_index) {
                            lock.unlock();
                            effects.push(Effect::LockOpened {
                                position: lock.position,
                            });
                        }
                    }
                    None => {
                        debug!(room = %active.key, switch = index, "switch has no bound lock");
                    }
                }
                true
            }
        }
    }
}
