//! End-to-end tests across timers, enemies, rooms, and the ledger.

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::enemy::popsicle::{
    recycle_roll, DRIP_INTERVAL_MS, FROZEN_DELAY_MS, STAGE_DELAY_MS,
};
use crate::enemy::{DamageFlavor, Enemy, EnemyId, Flavor, PopsicleState};
use crate::ledger::GateKey;
use crate::room::RoomKey;
use crate::world::World;

use super::helpers::{locked_door_world, popsicle, popsicle_state};

// =============================================================================
// Melt chain timing
// =============================================================================

#[test]
fn melt_chain_walks_all_stages_on_schedule() {
    let mut world = World::new(3);
    let id = world.spawn_popsicle(Flavor::Cherry, Vec2::new(100.0, 100.0));

    assert!(world.hit(id, DamageFlavor::Fire));
    assert_eq!(popsicle_state(&world, id), PopsicleState::Melting);
    assert!(!popsicle(&world, id).collider_enabled());

    let stages = [
        PopsicleState::Crystallizing,
        PopsicleState::Scaffolding,
        PopsicleState::Reassembling,
        PopsicleState::Calibrating,
    ];
    for expected in stages {
        world.step(STAGE_DELAY_MS - 1);
        assert_ne!(popsicle_state(&world, id), expected, "one tick early");
        world.step(1);
        assert_eq!(popsicle_state(&world, id), expected);
        assert!(!popsicle(&world, id).collider_enabled(), "no collision mid-chain");
    }
}

#[test]
fn melt_resolution_restores_collision_or_removes() {
    let mut world = World::new(3);
    let id = world.spawn_popsicle(Flavor::Blueberry, Vec2::new(100.0, 100.0));
    world.hit(id, DamageFlavor::Fire);

    world.step(STAGE_DELAY_MS * 5);
    match world.enemy(id) {
        Some(_) => {
            assert_eq!(popsicle_state(&world, id), PopsicleState::Solid);
            assert!(popsicle(&world, id).collider_enabled());
            assert_eq!(popsicle(&world, id).tint, Flavor::Blueberry.tint());
        }
        None => {
            world.step(DRIP_INTERVAL_MS * 10);
            assert_eq!(world.drop_count(), 0, "recycled popsicle must stay silent");
        }
    }
}

// =============================================================================
// Freeze timing
// =============================================================================

#[test]
fn mismatched_hit_freezes_for_exactly_the_frozen_delay() {
    let mut world = World::new(0);
    let id = world.spawn_popsicle(Flavor::Cherry, Vec2::new(100.0, 100.0));
    if let Some(Enemy::Popsicle(pop)) = world.enemy_mut(id) {
        pop.velocity = Vec2::new(60.0, 0.0);
    }

    // Cherry is weak to fire; ice is the mismatch.
    assert!(world.hit(id, DamageFlavor::Ice));
    assert_eq!(popsicle_state(&world, id), PopsicleState::Frozen);
    assert_eq!(popsicle(&world, id).velocity, Vec2::ZERO);

    world.step(FROZEN_DELAY_MS - 1);
    assert_eq!(popsicle_state(&world, id), PopsicleState::Frozen, "one tick early");

    world.step(1);
    assert_eq!(popsicle_state(&world, id), PopsicleState::Solid);
    assert_eq!(popsicle(&world, id).tint, Flavor::Cherry.tint());
}

// =============================================================================
// Hits outside the solid state
// =============================================================================

proptest! {
    /// A hit landing in any state other than solid changes nothing, no
    /// matter which flavor it carries.
    #[test]
    fn hit_outside_solid_changes_nothing(
        freeze_first in any::<bool>(),
        stages_elapsed in 0_u64..5,
        second_flavor in prop_oneof![Just(DamageFlavor::Fire), Just(DamageFlavor::Ice)],
    ) {
        let mut world = World::new(11);
        let id = world.spawn_popsicle(Flavor::Cherry, Vec2::new(100.0, 100.0));

        if freeze_first {
            world.hit(id, DamageFlavor::Ice);
            // Still inside the frozen window.
            world.step((FROZEN_DELAY_MS - 1).min(stages_elapsed * STAGE_DELAY_MS));
        } else {
            world.hit(id, DamageFlavor::Fire);
            // Walk up to the final stage but never resolve the chain.
            world.step(stages_elapsed * STAGE_DELAY_MS);
        }

        let before = popsicle(&world, id).clone();
        world.take_effects();

        prop_assert!(!world.hit(id, second_flavor));
        prop_assert_eq!(popsicle(&world, id), &before);
        prop_assert!(world.take_effects().is_empty());
    }
}

// =============================================================================
// Recycle proportion
// =============================================================================

#[test]
fn recycle_roll_lands_near_one_in_five() {
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    let draws = 10_000;
    let recycled = (0..draws).filter(|_| recycle_roll(&mut rng)).count();

    #[allow(clippy::cast_precision_loss)]
    let proportion = recycled as f64 / f64::from(draws);
    assert!(
        (proportion - 0.2).abs() < 0.025,
        "recycle proportion {proportion} outside 20% +/- 2.5%"
    );
}

// =============================================================================
// Destruction silences timers
// =============================================================================

#[test]
fn destroyed_mid_chain_enemy_never_acts_again() {
    let mut world = World::new(5);
    let id = world.spawn_popsicle(Flavor::Lime, Vec2::new(100.0, 100.0));
    world.hit(id, DamageFlavor::Ice);
    world.step(STAGE_DELAY_MS);
    world.take_effects();

    assert!(world.destroy_enemy(id));

    world.step(60_000);
    assert_eq!(world.drop_count(), 0);
    assert!(world.take_effects().is_empty());
    assert!(world.enemy(id).is_none());
}

#[test]
fn destroying_one_enemy_leaves_siblings_running() {
    let mut world = World::new(5);
    let doomed = world.spawn_popsicle(Flavor::Cherry, Vec2::new(100.0, 100.0));
    let survivor = world.spawn_popsicle(Flavor::Lime, Vec2::new(300.0, 100.0));

    world.destroy_enemy(doomed);
    world.step(DRIP_INTERVAL_MS);

    assert!(world.enemy(survivor).is_some());
    assert_eq!(world.drop_count(), 1, "survivor still drips");
}

// =============================================================================
// Rooms, locks, and the ledger
// =============================================================================

#[test]
fn unknown_room_key_is_a_recoverable_noop() {
    let mut world = locked_door_world(0, Vec2::new(100.0, 100.0));
    let id = world.spawn_popsicle(Flavor::Cherry, Vec2::new(200.0, 200.0));

    assert!(!world.enter(&RoomKey::new("missing"), Vec2::ZERO));

    assert_eq!(world.player().room, Some(RoomKey::new("a")));
    assert!(world.enemy(id).is_some());
    assert_eq!(world.active_room().unwrap().key, RoomKey::new("a"));
}

#[test]
fn locked_door_blocks_until_its_switch_is_thrown() {
    // Spawn standing on the locked door.
    let mut world = locked_door_world(0, Vec2::new(400.0, 480.0));

    world.step(16);
    assert_eq!(world.player().room, Some(RoomKey::new("a")), "locked door holds");

    // Walk to the switch and throw it.
    world.player_mut().position = Vec2::new(200.0, 540.0);
    assert!(world.activate_nearby_switch());
    assert!(!world.active_room().unwrap().locks[0].is_locked());

    // Back onto the door: the transition now fires.
    world.player_mut().position = Vec2::new(400.0, 480.0);
    world.step(16);
    assert_eq!(world.player().room, Some(RoomKey::new("b")));
    assert_eq!(world.player().position, Vec2::new(50.0, 50.0));
}

#[test]
fn switch_out_of_range_does_nothing() {
    let mut world = locked_door_world(0, Vec2::new(700.0, 100.0));
    assert!(!world.activate_nearby_switch());
    assert!(world.active_room().unwrap().locks[0].is_locked());
}

#[test]
fn ledger_unlock_removes_gates_without_reentry() {
    let mut world = World::new(0);
    world
        .load_room_json(
            RoomKey::new("a"),
            r#"{ "gates": [{ "x": 300, "y": 300, "key": "west-wing" }] }"#,
        )
        .unwrap();
    world.enter(&RoomKey::new("a"), Vec2::new(100.0, 100.0));
    assert_eq!(world.active_room().unwrap().gates.len(), 1);

    world.unlock_gate(GateKey::new("west-wing"));

    assert!(world.active_room().unwrap().gates.is_empty());
    assert_eq!(world.player().room, Some(RoomKey::new("a")), "no re-entry happened");
}

// =============================================================================
// Turrets and world format
// =============================================================================

#[test]
fn turret_is_invulnerable_outside_its_format() {
    use crate::enemy::WorldFormat;

    let mut world = World::new(0);
    let id = world.spawn_turret(Vec2::new(300.0, 100.0));

    world.set_format(WorldFormat::Vhs);
    assert!(!world.hit(id, DamageFlavor::Fire));
    assert!(!world.hit(id, DamageFlavor::Ice));
    assert!(world.enemy(id).is_some());

    world.set_format(WorldFormat::EightMm);
    assert!(world.hit(id, DamageFlavor::Ice));
    assert!(world.enemy(id).is_none());

    // The fire timer died with it.
    world.step(60_000);
    assert_eq!(world.drop_count(), 0);
}

fn enemy_id_of_first(world: &World) -> Option<EnemyId> {
    world.enemies().next().map(Enemy::id)
}

#[test]
fn enemy_ids_are_never_reused() {
    let mut world = World::new(0);
    let first = world.spawn_popsicle(Flavor::Cherry, Vec2::ZERO);
    world.destroy_enemy(first);

    let second = world.spawn_turret(Vec2::ZERO);
    assert_ne!(first, second);
    assert_eq!(enemy_id_of_first(&world), Some(second));
}
