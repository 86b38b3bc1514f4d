use crate::world::Arena;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// Food sizes are drawn uniformly from this range
pub const FOOD_SIZE_MIN: f64 = 2.0;
pub const FOOD_SIZE_MAX: f64 = 5.0;

/// Per-tick chance that an inactive food item reappears
pub const RESPAWN_CHANCE: f64 = 0.001;

/// Chance used by the coarse pass, which runs once per `COARSE_RESPAWN_PERIOD`
pub const COARSE_RESPAWN_CHANCE: f64 = 0.01;

/// Simulated seconds between coarse respawn passes
pub const COARSE_RESPAWN_PERIOD: f64 = 5.0;

/// A consumable resource
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    /// Scales the healing an eater receives
    pub size: f64,
    pub active: bool,
}

impl Food {
    pub fn new(id: u32, x: f64, y: f64, size: f64) -> Self {
        Self {
            id,
            x,
            y,
            size,
            active: true,
        }
    }

    fn random<R: Rng>(rng: &mut R, id: u32, arena: Arena) -> Self {
        Self::new(
            id,
            rng.gen_range(0.0..=arena.width),
            rng.gen_range(0.0..=arena.height),
            rng.gen_range(FOOD_SIZE_MIN..=FOOD_SIZE_MAX),
        )
    }
}

/// Replace the whole food set with `count` fresh, active items.
pub fn initialize_food<R: Rng>(rng: &mut R, count: usize, arena: Arena) -> Vec<Food> {
    (1..=count as u32)
        .map(|id| Food::random(rng, id, arena))
        .collect()
}

/// Reactivate each inactive item independently with probability `chance`.
///
/// A respawned item keeps its id and gets a new position and size.
/// Returns how many items came back.
pub fn respawn_food<R: Rng>(rng: &mut R, food: &mut [Food], chance: f64, arena: Arena) -> usize {
    let mut respawned = 0;
    for item in food.iter_mut().filter(|f| !f.active) {
        if rng.gen::<f64>() < chance {
            *item = Food::random(rng, item.id, arena);
            respawned += 1;
            debug!(food_id = item.id, "Food respawned");
        }
    }
    respawned
}

/// Drives both respawn passes across ticks.
#[derive(Clone, Debug, Default)]
pub struct FoodLifecycle {
    /// Simulated time since the last coarse pass
    respawn_timer: f64,
}

impl FoodLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respawn_timer(&self) -> f64 {
        self.respawn_timer
    }

    /// Run the fine pass, then the coarse pass once the timer reaches its period.
    pub fn advance<R: Rng>(&mut self, rng: &mut R, food: &mut [Food], arena: Arena, elapsed: f64) {
        respawn_food(rng, food, RESPAWN_CHANCE, arena);

        self.respawn_timer += elapsed;
        if self.respawn_timer >= COARSE_RESPAWN_PERIOD {
            let respawned = respawn_food(rng, food, COARSE_RESPAWN_CHANCE, arena);
            debug!(respawned, "Coarse food respawn pass");
            self.respawn_timer = 0.0;
        }
    }
}
