//! Factory functions for world and room test setup.

use glam::Vec2;

use crate::enemy::{Enemy, EnemyId, Popsicle, PopsicleState};
use crate::room::RoomKey;
use crate::world::World;

/// Room "a": a lock door bound to room "b" and a switch wired to unlock it.
pub const LOCKED_DOOR_ROOM: &str = r#"{
    "platforms": [{ "x": 400, "y": 568, "width": 800, "height": 32 }],
    "locks": [{ "x": 400, "y": 500, "target": "b", "startX": 50, "startY": 50 }],
    "switches": [{ "x": 200, "y": 540, "targetLock": 0 }]
}"#;

/// Room "b": an empty destination room.
pub const EMPTY_ROOM: &str = "{}";

/// Builds a world with the two-room locked-door scenario loaded and room
/// "a" entered at `spawn`.
pub fn locked_door_world(seed: u64, spawn: Vec2) -> World {
    let mut world = World::new(seed);
    world
        .load_room_json(RoomKey::new("a"), LOCKED_DOOR_ROOM)
        .unwrap();
    world.load_room_json(RoomKey::new("b"), EMPTY_ROOM).unwrap();
    assert!(world.enter(&RoomKey::new("a"), spawn));
    world
}

/// The popsicle behavior state of enemy `id`. Panics if the enemy is gone
/// or is not a popsicle.
pub fn popsicle_state(world: &World, id: EnemyId) -> PopsicleState {
    world
        .enemy(id)
        .and_then(Enemy::as_popsicle)
        .map(Popsicle::state)
        .unwrap()
}

/// Borrows enemy `id` as a popsicle. Panics if it is gone.
pub fn popsicle(world: &World, id: EnemyId) -> &Popsicle {
    world.enemy(id).and_then(Enemy::as_popsicle).unwrap()
}
