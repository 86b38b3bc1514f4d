use crate::config::SimConfig;
use crate::world::{Arena, Entity};
use rand::Rng;

/// Initial velocity per axis is drawn from -SPAWN_SPEED..=SPAWN_SPEED
pub const SPAWN_SPEED: f64 = 10.0;

/// Replace the whole entity set with `population` freshly randomized agents.
///
/// Teams are assigned round-robin (`index % team_count`), so team sizes
/// differ by at most one. Callers validate that both counts are positive.
pub fn initialize_entities<R: Rng>(
    rng: &mut R,
    population: usize,
    team_count: u32,
    arena: Arena,
    config: &SimConfig,
) -> Vec<Entity> {
    let team_count = team_count.max(1);

    (0..population)
        .map(|index| {
            let width = rng.gen_range(config.min_size..=config.start_max_size);
            Entity::new(
                index as u32 + 1,
                rng.gen_range(0.0..=arena.width),
                rng.gen_range(0.0..=arena.height),
                width,
                index as u32 % team_count,
            )
            .with_velocity(
                rng.gen_range(-SPAWN_SPEED..=SPAWN_SPEED),
                rng.gen_range(-SPAWN_SPEED..=SPAWN_SPEED),
            )
        })
        .collect()
}
