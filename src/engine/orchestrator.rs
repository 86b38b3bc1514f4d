use crate::config::{validate_sim, ConfigError, SimConfig};
use crate::engine::observer::{Observer, ObserverId, ObserverRegistry};
use crate::world::{Arena, Population, World, WorldSnapshot};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Whether ticks execute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnginePhase {
    /// No observers attached; ticks are skipped entirely
    Idle,
    /// At least one observer attached
    Running,
}

/// Tick orchestrator: owns the canonical world behind a single exclusive lock.
///
/// Ticks, reconfiguration and restarts all take the same lock, so a
/// reconfiguration never sees or leaves a half-stepped world.
pub struct SimEngine {
    world: Mutex<World>,
    observers: Arc<ObserverRegistry>,
}

impl SimEngine {
    pub fn new(world: World) -> Self {
        info!(
            entities = world.entities().len(),
            food = world.food().len(),
            "Simulation engine created"
        );
        Self {
            world: Mutex::new(world),
            observers: Arc::new(ObserverRegistry::new()),
        }
    }

    pub fn observers(&self) -> &Arc<ObserverRegistry> {
        &self.observers
    }

    pub fn phase(&self) -> EnginePhase {
        if self.observers.is_empty() {
            EnginePhase::Idle
        } else {
            EnginePhase::Running
        }
    }

    pub fn attach_observer(&self, observer: Arc<dyn Observer>) -> ObserverId {
        self.observers.attach(observer)
    }

    pub fn detach_observer(&self, id: &ObserverId) -> bool {
        self.observers.detach(id)
    }

    /// Store new arena bounds; they take effect on the next reinitialization.
    pub async fn set_arena_bounds(&self, width: f64, height: f64) -> Result<(), ConfigError> {
        self.world.lock().await.set_arena_bounds(width, height)
    }

    /// Replace tunables and reinitialize the world with the current counts.
    pub async fn set_config(&self, config: SimConfig) -> Result<(), ConfigError> {
        let mut world = self.world.lock().await;
        world.set_config(config)?;
        world.restart()
    }

    /// Replace both registries.
    pub async fn reinitialize(&self, population: Population) -> Result<(), ConfigError> {
        self.world.lock().await.reinitialize(population)
    }

    /// Reinitialize with the counts used last time.
    pub async fn restart(&self) -> Result<(), ConfigError> {
        self.world.lock().await.restart()
    }

    /// Apply new arena bounds and reinitialize, as one locked step.
    pub async fn resize(&self, width: f64, height: f64) -> Result<(), ConfigError> {
        let arena = Arena::new(width, height)?;
        let mut world = self.world.lock().await;
        world.set_arena_bounds(arena.width, arena.height)?;
        world.restart()
    }

    /// Replace tunables and counts and reinitialize, as one locked step.
    ///
    /// Tunables are validated before the lock is taken; a rejected change
    /// leaves the world as it was.
    pub async fn apply_settings(
        &self,
        population: Population,
        config: SimConfig,
    ) -> Result<(), ConfigError> {
        validate_sim(&config)?;
        let mut world = self.world.lock().await;
        world.set_config(config)?;
        world.reinitialize(population)
    }

    /// Advance one tick when Running, then capture the resulting world.
    ///
    /// While Idle the world is left untouched and the returned snapshot
    /// equals the previous one.
    pub async fn step_and_snapshot(&self, elapsed: f64) -> Arc<WorldSnapshot> {
        let mut world = self.world.lock().await;
        if self.phase() == EnginePhase::Running {
            world.step(elapsed);
            debug!(tick = world.tick(), active = world.active_entities(), "Tick complete");
        }
        Arc::new(world.snapshot())
    }

    /// Ticker entry point: `None` while Idle, otherwise the fresh snapshot.
    pub async fn tick(&self, elapsed: f64) -> Option<Arc<WorldSnapshot>> {
        if self.phase() == EnginePhase::Idle {
            return None;
        }
        Some(self.step_and_snapshot(elapsed).await)
    }

    /// Capture the current world without stepping.
    pub async fn snapshot(&self) -> Arc<WorldSnapshot> {
        Arc::new(self.world.lock().await.snapshot())
    }

    /// Run `f` against the world under the exclusive lock.
    pub async fn with_world<T>(&self, f: impl FnOnce(&mut World) -> T) -> T {
        let mut world = self.world.lock().await;
        f(&mut world)
    }
}

