// Integration tests for the simulation core through its public API

use blobwar::config::SimConfig;
use blobwar::engine::{spawn_simulation, ChannelObserver, EnginePhase, SimEngine};
use blobwar::world::{Arena, BehaviorState, Population, World, MAX_HUNGER};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

fn seeded_world(seed: u64, population: i64, team_count: i64, food_count: i64) -> World {
    let config = SimConfig {
        min_size: 5.0,
        start_max_size: 12.0,
        max_size: 40.0,
        base_speed: 10.0,
    };
    let arena = Arena::new(250.0, 200.0).unwrap();
    let mut world = World::with_seed(config, arena, seed);
    world
        .reinitialize(Population::new(population, team_count, food_count).unwrap())
        .unwrap();
    world
}

#[test]
fn test_invariants_after_every_tick() {
    for seed in [1, 2, 3] {
        let mut world = seeded_world(seed, 60, 4, 120);
        let max_size = world.config().max_size;
        let arena = world.arena();

        for _ in 0..1500 {
            world.step(0.016);

            for e in world.entities() {
                assert!((0.0..=e.max_health).contains(&e.health));
                assert!((0.0..=MAX_HUNGER).contains(&e.hunger));
                assert!(e.width <= max_size);
                assert!((0.0..=100.0).contains(&e.team_need));
                if e.active {
                    assert!((0.0..=arena.width).contains(&e.x));
                    assert!((0.0..=arena.height).contains(&e.y));
                }
            }
        }
    }
}

#[test]
fn test_deactivated_entities_stay_addressable() {
    let mut world = seeded_world(9, 40, 2, 0);
    let ids: Vec<u32> = world.entities().iter().map(|e| e.id).collect();

    for _ in 0..3000 {
        world.step(0.05);
    }

    let after: Vec<u32> = world.entities().iter().map(|e| e.id).collect();
    assert_eq!(ids, after);
}

#[test]
fn test_deaths_are_permanent() {
    let mut world = seeded_world(4, 50, 5, 50);
    let mut dead = std::collections::HashSet::new();

    for _ in 0..2000 {
        world.step(0.05);
        for e in world.entities() {
            if dead.contains(&e.id) {
                assert!(!e.active, "entity {} came back to life", e.id);
            }
            if !e.active {
                dead.insert(e.id);
            }
        }
    }
}

#[test]
fn test_states_are_one_of_three() {
    let mut world = seeded_world(12, 30, 3, 30);
    for _ in 0..200 {
        world.step(0.016);
    }
    for e in world.entities().iter().filter(|e| e.active) {
        assert!(matches!(
            e.state,
            BehaviorState::SeekingFood
                | BehaviorState::AssistingTeammate
                | BehaviorState::SeekingWeakerEnemy
        ));
    }
}

#[tokio::test]
async fn test_live_engine_streams_to_observer() {
    let engine = Arc::new(SimEngine::new(seeded_world(5, 20, 2, 40)));
    assert_eq!(engine.phase(), EnginePhase::Idle);

    let (observer, mut rx) = ChannelObserver::new(1);
    engine.attach_observer(Arc::new(observer));
    let tasks = spawn_simulation(Arc::clone(&engine), Duration::from_millis(2));

    let mut previous = 0;
    for _ in 0..30 {
        let snapshot = timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(snapshot.tick > previous);
        assert_eq!(snapshot.entities.len(), 20);
        assert_eq!(snapshot.team_count, 2);
        previous = snapshot.tick;
    }

    tasks.abort();
}
