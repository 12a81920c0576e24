//! Persisted room definition format.
//!
//! Rooms are authored as one JSON record per room, camelCase field names.
//! Definitions are immutable once loaded; the streaming manager instantiates
//! live entities from them on every room entry.
//!
//! ```json
//! {
//!   "width": 1600,
//!   "platforms": [{ "x": 400, "y": 568, "width": 800, "height": 32 }],
//!   "doors": [{ "x": 780, "y": 500, "target": "hall", "startX": 50, "startY": 450 }],
//!   "locks": [{ "x": 400, "y": 500, "target": "vault", "startX": 60, "startY": 60 }],
//!   "switches": [{ "x": 200, "y": 540, "targetLock": 0 }],
//!   "gates": [{ "x": 600, "y": 520, "upgrade": "double-jump" }],
//!   "elevators": [{ "x": 300, "y": 400, "width": 96, "height": 16, "distance": 200 }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RoomKey;

/// Room width used when a definition omits `width`.
pub const DEFAULT_ROOM_WIDTH: f32 = 800.0;
/// Room height used when a definition omits `height`.
pub const DEFAULT_ROOM_HEIGHT: f32 = 600.0;
/// Elevator travel distance used when a definition omits `distance`.
pub const DEFAULT_ELEVATOR_DISTANCE: f32 = 100.0;
/// Elevator speed (px/s) used when a definition omits `speed`.
pub const DEFAULT_ELEVATOR_SPEED: f32 = 50.0;

/// Axis-aligned rectangle record (platforms and hazards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectDef {
    /// Center x.
    pub x: f32,
    /// Center y.
    pub y: f32,
    /// Full width.
    pub width: f32,
    /// Full height.
    pub height: f32,
}

/// Door record: a transition to another room.
///
/// The same record shape describes plain doors (`doors[]`) and lock doors
/// (`locks[]`); lock doors additionally start locked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorDef {
    /// Door x position.
    pub x: f32,
    /// Door y position.
    pub y: f32,
    /// Key of the destination room.
    pub target: String,
    /// Player spawn x in the destination room.
    pub start_x: f32,
    /// Player spawn y in the destination room.
    pub start_y: f32,
    /// Rendered invisible when `true`.
    #[serde(default)]
    pub hidden: bool,
}

/// Switch record, optionally bound to one lock door by index into `locks[]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchDef {
    /// Switch x position.
    pub x: f32,
    /// Switch y position.
    pub y: f32,
    /// Index of the lock door this switch unlocks, if any.
    #[serde(default)]
    pub target_lock: Option<usize>,
}

/// Elevator record: an oscillating platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevatorDef {
    /// Center x at rest.
    pub x: f32,
    /// Center y at rest (one end of the travel).
    pub y: f32,
    /// Platform width.
    pub width: f32,
    /// Platform height.
    pub height: f32,
    /// Vertical travel distance; defaults to [`DEFAULT_ELEVATOR_DISTANCE`].
    #[serde(default)]
    pub distance: Option<f32>,
    /// Travel speed in px/s; defaults to [`DEFAULT_ELEVATOR_SPEED`].
    #[serde(default)]
    pub speed: Option<f32>,
}

/// Collectible upgrade record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeDef {
    /// Pickup x position.
    pub x: f32,
    /// Pickup y position.
    pub y: f32,
    /// Upgrade name granted on pickup.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Gated obstacle record.
///
/// Exactly one of `upgrade` or `key` must be present; `key` also accepts the
/// legacy field name `codec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateDef {
    /// Obstacle center x.
    pub x: f32,
    /// Obstacle center y.
    pub y: f32,
    /// Gate width; defaults to a one-tile obstacle.
    #[serde(default = "default_gate_extent")]
    pub width: f32,
    /// Gate height; defaults to a one-tile obstacle.
    #[serde(default = "default_gate_extent")]
    pub height: f32,
    /// Name of the upgrade that satisfies this gate.
    #[serde(default)]
    pub upgrade: Option<String>,
    /// Unlock key that satisfies this gate.
    #[serde(default, alias = "codec")]
    pub key: Option<String>,
}

fn default_gate_extent() -> f32 {
    32.0
}

/// One room's immutable definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDef {
    /// Static platform rectangles.
    #[serde(default)]
    pub platforms: Vec<RectDef>,
    /// Plain doors.
    #[serde(default)]
    pub doors: Vec<DoorDef>,
    /// Lockable doors (start locked).
    #[serde(default)]
    pub locks: Vec<DoorDef>,
    /// Switches, each bound to at most one lock door.
    #[serde(default)]
    pub switches: Vec<SwitchDef>,
    /// Static damage zones.
    #[serde(default)]
    pub hazards: Vec<RectDef>,
    /// Oscillating platforms.
    #[serde(default)]
    pub elevators: Vec<ElevatorDef>,
    /// Collectible upgrades.
    #[serde(default)]
    pub upgrades: Vec<UpgradeDef>,
    /// Gated obstacles.
    #[serde(default)]
    pub gates: Vec<GateDef>,
    /// Room width; defaults to [`DEFAULT_ROOM_WIDTH`].
    #[serde(default)]
    pub width: Option<f32>,
    /// Room height; defaults to [`DEFAULT_ROOM_HEIGHT`].
    #[serde(default)]
    pub height: Option<f32>,
}

impl RoomDef {
    /// Parses a definition from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RoomDefError::Parse`] on malformed JSON.
    pub fn from_json(key: &RoomKey, json: &str) -> Result<Self, RoomDefError> {
        serde_json::from_str(json).map_err(|source| RoomDefError::Parse {
            room: key.clone(),
            source,
        })
    }

    /// Validates internal consistency of the definition.
    ///
    /// # Errors
    ///
    /// - [`RoomDefError::SwitchTargetOutOfRange`] if a switch binds a lock
    ///   index the room does not have.
    /// - [`RoomDefError::EmptyGate`] if a gate requires neither an upgrade
    ///   nor an unlock key.
    /// - [`RoomDefError::BadElevatorSpeed`] if an elevator declares a
    ///   non-positive speed.
    pub fn validate(&self, key: &RoomKey) -> Result<(), RoomDefError> {
        for (index, switch) in self.switches.iter().enumerate() {
            if let Some(target) = switch.target_lock {
                if target >= self.locks.len() {
                    return Err(RoomDefError::SwitchTargetOutOfRange {
                        room: key.clone(),
                        index,
                        target,
                        locks: self.locks.len(),
                    });
                }
            }
        }

        for (index, gate) in self.gates.iter().enumerate() {
            if gate.upgrade.is_none() && gate.key.is_none() {
                return Err(RoomDefError::EmptyGate {
                    room: key.clone(),
                    index,
                });
            }
        }

        for (index, elevator) in self.elevators.iter().enumerate() {
            if let Some(speed) = elevator.speed {
                if speed <= 0.0 {
                    return Err(RoomDefError::BadElevatorSpeed {
                        room: key.clone(),
                        index,
                        speed,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Errors raised while loading or validating room definitions.
///
/// These are configuration errors surfaced once at load time; runtime
/// malformed input (an unknown room key on entry, a switch with no target)
/// degrades to a logged no-op instead.
#[derive(Debug, Error)]
pub enum RoomDefError {
    /// Two definitions were registered under the same key.
    #[error("duplicate room key `{0}`")]
    DuplicateKey(RoomKey),

    /// A switch binds a lock-door index the room does not have.
    #[error("room `{room}`: switch {index} targets lock {target} but the room has {locks} locks")]
    SwitchTargetOutOfRange {
        /// Room being validated.
        room: RoomKey,
        /// Index of the offending switch.
        index: usize,
        /// The out-of-range lock index.
        target: usize,
        /// Number of locks the room declares.
        locks: usize,
    },

    /// A gate declares neither an upgrade nor an unlock-key requirement.
    #[error("room `{room}`: gate {index} requires neither an upgrade nor an unlock key")]
    EmptyGate {
        /// Room being validated.
        room: RoomKey,
        /// Index of the offending gate.
        index: usize,
    },

    /// An elevator declares a speed that cannot produce motion.
    #[error("room `{room}`: elevator {index} has non-positive speed {speed}")]
    BadElevatorSpeed {
        /// Room being validated.
        room: RoomKey,
        /// Index of the offending elevator.
        index: usize,
        /// The declared speed.
        speed: f32,
    },

    /// The definition JSON failed to parse.
    #[error("room `{room}`: invalid definition JSON")]
    Parse {
        /// Room being parsed.
        room: RoomKey,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}
