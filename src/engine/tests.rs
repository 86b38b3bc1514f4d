use super::*;
use crate::config::SimConfig;
use crate::world::{Arena, Population, World, WorldSnapshot};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::timeout;

fn make_engine(population: i64, team_count: i64, food_count: i64) -> Arc<SimEngine> {
    let arena = Arena {
        width: 400.0,
        height: 300.0,
    };
    let mut world = World::with_seed(SimConfig::default(), arena, 17);
    world
        .reinitialize(Population::new(population, team_count, food_count).unwrap())
        .unwrap();
    Arc::new(SimEngine::new(world))
}

/// Observer whose connection is already broken
struct BrokenObserver {
    attempts: AtomicUsize,
}

impl Observer for BrokenObserver {
    fn deliver<'a>(&'a self, _snapshot: &'a Arc<WorldSnapshot>) -> BoxFuture<'a, bool> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { false })
    }
}

#[tokio::test]
async fn test_idle_engine_does_not_tick() {
    let engine = make_engine(10, 2, 20);
    assert_eq!(engine.phase(), EnginePhase::Idle);

    let before = serde_json::to_vec(&*engine.snapshot().await).unwrap();
    for _ in 0..20 {
        assert!(engine.tick(0.016).await.is_none());
        let snapshot = engine.step_and_snapshot(0.016).await;
        assert_eq!(serde_json::to_vec(&*snapshot).unwrap(), before);
    }
}

#[tokio::test]
async fn test_running_engine_ticks() {
    let engine = make_engine(10, 2, 20);
    let (observer, _rx) = ChannelObserver::new(1);
    engine.attach_observer(Arc::new(observer));
    assert_eq!(engine.phase(), EnginePhase::Running);

    let first = engine.tick(0.016).await.unwrap();
    let second = engine.tick(0.016).await.unwrap();
    assert_eq!(first.tick, 1);
    assert_eq!(second.tick, 2);
    assert_eq!(second.team_count, 2);
}

#[tokio::test]
async fn test_phase_follows_observer_count() {
    let engine = make_engine(4, 2, 0);
    let (a, _rx_a) = ChannelObserver::new(1);
    let (b, _rx_b) = ChannelObserver::new(1);

    let id_a = engine.attach_observer(Arc::new(a));
    let id_b = engine.attach_observer(Arc::new(b));
    assert_eq!(engine.phase(), EnginePhase::Running);

    assert!(engine.detach_observer(&id_a));
    assert_eq!(engine.phase(), EnginePhase::Running);
    assert!(engine.detach_observer(&id_b));
    assert_eq!(engine.phase(), EnginePhase::Idle);
}

#[tokio::test]
async fn test_relay_detaches_failed_observer_only() {
    let registry = ObserverRegistry::new();
    let (healthy, mut rx) = ChannelObserver::new(1);
    let broken = Arc::new(BrokenObserver {
        attempts: AtomicUsize::new(0),
    });

    let healthy_id = registry.attach(Arc::new(healthy));
    let broken_id = registry.attach(broken.clone());

    let snapshot = Arc::new(WorldSnapshot {
        tick: 5,
        team_count: 1,
        entities: vec![],
        food: vec![],
    });

    assert_eq!(relay(&registry, &snapshot).await, 1);
    assert!(registry.contains(&healthy_id));
    assert!(!registry.contains(&broken_id));
    assert_eq!(rx.recv().await.unwrap().tick, 5);

    // Detached observers get nothing further
    assert_eq!(relay(&registry, &snapshot).await, 1);
    assert_eq!(broken.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_snapshots_arrive_in_order_without_gaps() {
    let engine = make_engine(12, 3, 30);
    let (observer, mut rx) = ChannelObserver::new(1);
    engine.attach_observer(Arc::new(observer));

    let tasks = spawn_simulation(Arc::clone(&engine), Duration::from_millis(1));

    let mut expected = 1;
    while expected <= 50 {
        let snapshot = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("snapshot within timeout")
            .expect("distributor alive");
        assert_eq!(snapshot.tick, expected);
        expected += 1;
    }

    tasks.abort();
}

#[tokio::test]
async fn test_slow_observer_applies_backpressure() {
    let engine = make_engine(5, 2, 5);
    let (observer, mut rx) = ChannelObserver::new(1);
    engine.attach_observer(Arc::new(observer));

    let tasks = spawn_simulation(Arc::clone(&engine), Duration::from_millis(1));

    // Nobody reads for a while: observer slot, distributor and handoff slot fill up
    tokio::time::sleep(Duration::from_millis(100)).await;
    let stalled_at = engine.snapshot().await.tick;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(engine.snapshot().await.tick, stalled_at);
    assert!(stalled_at <= 4);

    // Draining resumes production in order
    let first = rx.recv().await.unwrap();
    assert_eq!(first.tick, 1);
    let second = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
    assert_eq!(second.tick, 2);

    tasks.abort();
}

#[tokio::test]
async fn test_dropped_observer_is_detached_and_engine_goes_idle() {
    let engine = make_engine(6, 2, 10);
    let (observer, mut rx) = ChannelObserver::new(1);
    let id = engine.attach_observer(Arc::new(observer));

    let tasks = spawn_simulation(Arc::clone(&engine), Duration::from_millis(1));

    timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
    drop(rx);

    timeout(Duration::from_secs(5), async {
        while engine.observers().contains(&id) {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("observer detached");

    assert_eq!(engine.phase(), EnginePhase::Idle);
    tasks.abort();
}

#[tokio::test]
async fn test_settings_reinitialize_while_running() {
    let engine = make_engine(10, 2, 20);
    let (observer, mut rx) = ChannelObserver::new(1);
    engine.attach_observer(Arc::new(observer));

    let tasks = spawn_simulation(Arc::clone(&engine), Duration::from_millis(1));
    timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();

    let config = SimConfig {
        min_size: 6.0,
        start_max_size: 6.0,
        max_size: 12.0,
        base_speed: 5.0,
    };
    engine
        .apply_settings(Population::new(3, 3, 0).unwrap(), config)
        .await
        .unwrap();

    let snapshot = timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = rx.recv().await.unwrap();
            if snapshot.entities.len() == 3 {
                return snapshot;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(snapshot.team_count, 3);
    assert!(snapshot.food.is_empty());
    assert!(snapshot.entities.iter().all(|e| e.width <= 12.0));

    // Every later snapshot comes from the new world
    for _ in 0..10 {
        let snapshot = timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
        assert_eq!(snapshot.entities.len(), 3);
    }

    tasks.abort();
}

#[tokio::test]
async fn test_invalid_settings_rejected_without_state_change() {
    let engine = make_engine(8, 2, 10);
    let before = engine.snapshot().await;

    let bad_config = SimConfig {
        base_speed: 0.0,
        ..SimConfig::default()
    };
    let result = engine
        .apply_settings(Population::new(3, 1, 1).unwrap(), bad_config)
        .await;
    assert!(result.is_err());

    assert!(engine.resize(0.0, 100.0).await.is_err());
    assert_eq!(engine.snapshot().await, before);
}

#[tokio::test]
async fn test_resize_reinitializes_within_new_bounds() {
    let engine = make_engine(20, 2, 20);

    engine.resize(60.0, 30.0).await.unwrap();

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.entities.len(), 20);
    assert!(snapshot.entities.iter().all(|e| e.x <= 60.0 && e.y <= 30.0));
    assert!(snapshot.food.iter().all(|f| f.x <= 60.0 && f.y <= 30.0));
}

#[tokio::test]
async fn test_set_arena_bounds_waits_for_restart() {
    let engine = make_engine(20, 2, 0);
    let before = engine.snapshot().await;

    engine.set_arena_bounds(10.0, 10.0).await.unwrap();
    assert_eq!(engine.snapshot().await, before);

    engine.restart().await.unwrap();
    let after = engine.snapshot().await;
    assert!(after.entities.iter().all(|e| e.x <= 10.0 && e.y <= 10.0));
}

#[tokio::test]
async fn test_set_config_reinitializes() {
    let engine = make_engine(10, 2, 5);
    let (observer, _rx) = ChannelObserver::new(8);
    engine.attach_observer(Arc::new(observer));
    engine.tick(0.016).await.unwrap();

    let config = SimConfig {
        min_size: 2.0,
        start_max_size: 3.0,
        max_size: 4.0,
        base_speed: 1.0,
    };
    engine.set_config(config).await.unwrap();

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.tick, 0);
    assert!(snapshot
        .entities
        .iter()
        .all(|e| (2.0..=3.0).contains(&e.width)));
    assert_eq!(engine.with_world(|w| *w.config()).await, config);
}

#[tokio::test]
async fn test_attach_detach_during_distribution() {
    let engine = make_engine(10, 2, 10);
    let (anchor, mut anchor_rx) = ChannelObserver::new(1);
    engine.attach_observer(Arc::new(anchor));

    let tasks = spawn_simulation(Arc::clone(&engine), Duration::from_millis(1));

    let churn = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            for _ in 0..50 {
                let (observer, mut rx) = ChannelObserver::new(1);
                let id = engine.attach_observer(Arc::new(observer));
                let _ = timeout(Duration::from_millis(20), rx.recv()).await;
                engine.detach_observer(&id);
            }
        })
    };

    let mut last = 0;
    for _ in 0..100 {
        let snapshot = timeout(Duration::from_secs(5), anchor_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.tick, last + 1);
        last = snapshot.tick;
    }

    churn.await.unwrap();
    assert_eq!(engine.observers().len(), 1);
    tasks.abort();
}
