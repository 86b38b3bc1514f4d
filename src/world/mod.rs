// Simulation world: registries, behavior and physics

pub mod behavior;
mod entity;
mod food;
pub mod physics;
mod spawn;

pub use entity::{
    BehaviorState, Entity, GROWTH_FACTOR, MAX_HEALTH, MAX_HUNGER, STEER_FORCE,
};
pub use food::{
    initialize_food, respawn_food, Food, FoodLifecycle, COARSE_RESPAWN_CHANCE,
    COARSE_RESPAWN_PERIOD, RESPAWN_CHANCE,
};
pub use spawn::initialize_entities;

use crate::config::{validate_arena, validate_sim, ConfigError, SimConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;


/// Arena extent. Entities are kept within `[0, width] x [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Result<Self, ConfigError> {
        validate_arena(width, height)?;
        Ok(Self { width, height })
    }
}

/// Upper bound on entities per world. Every tick pass is quadratic in it.
pub const MAX_POPULATION: usize = 5_000;

/// Upper bound on food items per world
pub const MAX_FOOD_COUNT: usize = 50_000;

/// Validated population/team/food counts used on every reinitialization
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Population {
    pub population: usize,
    pub team_count: u32,
    pub food_count: usize,
}

impl Population {
    /// Validate raw counts.
    ///
    /// Population and team count must be at least 1; zero food is allowed.
    /// Population is capped at `MAX_POPULATION`, food at `MAX_FOOD_COUNT`.
    pub fn new(population: i64, team_count: i64, food_count: i64) -> Result<Self, ConfigError> {
        if population < 1 {
            return Err(ConfigError::NonPositivePopulation(population));
        }
        if population > MAX_POPULATION as i64 {
            return Err(ConfigError::PopulationTooLarge {
                count: population,
                max: MAX_POPULATION,
            });
        }
        if team_count < 1 || team_count > u32::MAX as i64 {
            return Err(ConfigError::NonPositiveTeamCount(team_count));
        }
        if food_count < 0 {
            return Err(ConfigError::NegativeFoodCount(food_count));
        }
        if food_count > MAX_FOOD_COUNT as i64 {
            return Err(ConfigError::FoodCountTooLarge {
                count: food_count,
                max: MAX_FOOD_COUNT,
            });
        }
        Ok(Self {
            population: population as usize,
            team_count: team_count as u32,
            food_count: food_count as usize,
        })
    }
}

/// Immutable point-in-time view handed to observers
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    /// Executed ticks since the last reinitialization
    pub tick: u64,
    pub team_count: u32,
    pub entities: Vec<Entity>,
    pub food: Vec<Food>,
}

/// Canonical world state: both registries plus the settings that shaped them.
pub struct World {
    entities: Vec<Entity>,
    food: Vec<Food>,
    config: SimConfig,
    arena: Arena,
    population: Option<Population>,
    food_lifecycle: FoodLifecycle,
    tick: u64,
    rng: StdRng,
}

impl World {
    /// Empty world seeded from entropy
    pub fn new(config: SimConfig, arena: Arena) -> Self {
        Self::with_rng(config, arena, StdRng::from_entropy())
    }

    /// Empty world with a reproducible RNG
    pub fn with_seed(config: SimConfig, arena: Arena, seed: u64) -> Self {
        Self::with_rng(config, arena, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimConfig, arena: Arena, rng: StdRng) -> Self {
        Self {
            entities: Vec::new(),
            food: Vec::new(),
            config,
            arena,
            population: None,
            food_lifecycle: FoodLifecycle::new(),
            tick: 0,
            rng,
        }
    }

    /// Assemble a world from hand-placed registries, bypassing random spawn.
    pub fn from_parts(
        config: SimConfig,
        arena: Arena,
        entities: Vec<Entity>,
        food: Vec<Food>,
        team_count: u32,
        seed: u64,
    ) -> Self {
        let mut world = Self::with_seed(config, arena, seed);
        world.population = Some(Population {
            population: entities.len(),
            team_count,
            food_count: food.len(),
        });
        world.entities = entities;
        world.food = food;
        world
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    #[cfg(test)]
    pub(crate) fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn food(&self) -> &[Food] {
        &self.food
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn population(&self) -> Option<Population> {
        self.population
    }

    pub fn team_count(&self) -> u32 {
        self.population.map(|p| p.team_count).unwrap_or(0)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Store new arena bounds; they shape the next reinitialization.
    pub fn set_arena_bounds(&mut self, width: f64, height: f64) -> Result<(), ConfigError> {
        self.arena = Arena::new(width, height)?;
        Ok(())
    }

    /// Replace tunables; they shape the next reinitialization.
    pub fn set_config(&mut self, config: SimConfig) -> Result<(), ConfigError> {
        validate_sim(&config)?;
        self.config = config;
        Ok(())
    }

    /// Replace both registries with freshly randomized ones.
    ///
    /// On error nothing changes.
    pub fn reinitialize(&mut self, population: Population) -> Result<(), ConfigError> {
        validate_sim(&self.config)?;
        validate_arena(self.arena.width, self.arena.height)?;

        self.entities = initialize_entities(
            &mut self.rng,
            population.population,
            population.team_count,
            self.arena,
            &self.config,
        );
        self.food = initialize_food(&mut self.rng, population.food_count, self.arena);
        self.population = Some(population);
        self.food_lifecycle = FoodLifecycle::new();
        self.tick = 0;

        info!(
            population = population.population,
            team_count = population.team_count,
            food_count = population.food_count,
            arena_width = self.arena.width,
            arena_height = self.arena.height,
            "World reinitialized"
        );
        Ok(())
    }

    /// Reinitialize with the counts used last time.
    ///
    /// A world that was never initialized stays empty.
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        match self.population {
            Some(population) => self.reinitialize(population),
            None => Ok(()),
        }
    }

    /// Advance the whole world by one tick.
    ///
    /// Passes, each over all active entities in registry order: team-need,
    /// decide + act, food consumption, physics/interaction. Food lifecycle last.
    pub fn step(&mut self, elapsed: f64) {
        let count = self.entities.len();

        for index in 0..count {
            if self.entities[index].active {
                self.entities[index].team_need = behavior::evaluate_team_need(&self.entities, index);
            }
        }

        for index in 0..count {
            if self.entities[index].active {
                let state = behavior::decide(&self.entities[index]);
                behavior::act(&mut self.entities, &self.food, index, state);
            }
        }

        let max_size = self.config.max_size;
        for entity in self.entities.iter_mut().filter(|e| e.active) {
            behavior::consume_food(entity, &mut self.food, max_size);
        }

        for index in 0..count {
            physics::resolve(&mut self.entities, index, self.arena, &self.config, elapsed);
        }

        self.food_lifecycle
            .advance(&mut self.rng, &mut self.food, self.arena, elapsed);
        self.tick += 1;
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            team_count: self.team_count(),
            entities: self.entities.clone(),
            food: self.food.clone(),
        }
    }

    pub fn active_entities(&self) -> usize {
        self.entities.iter().filter(|e| e.active).count()
    }
}
