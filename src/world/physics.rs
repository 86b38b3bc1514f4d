//! Movement integration and entity-vs-entity consumption.

use crate::config::SimConfig;
use crate::world::{Arena, Entity, GROWTH_FACTOR};
use tracing::{debug, info};

/// A rival is in reach within `CONSUME_REACH * consumer width`
pub const CONSUME_REACH: f64 = 1.5;

/// Damage dealt to a victim of equal width
pub const CONSUME_PENALTY: f64 = 40.0;

/// Share of the penalty the consumer takes itself
pub const SELF_DAMAGE_RATIO: f64 = 0.3;

/// Victim invulnerability is `INVULNERABILITY_BASE + consumer width / INVULNERABILITY_SIZE_DIVISOR`
pub const INVULNERABILITY_BASE: f64 = 1.0;
pub const INVULNERABILITY_SIZE_DIVISOR: f64 = 200.0;

/// Hunger lost per tick
pub const HUNGER_DECAY: f64 = 1.0;

/// Larger entities move slower: `base_speed / (1 + width / 100)`.
pub fn max_speed(base_speed: f64, width: f64) -> f64 {
    base_speed / (1.0 + width / 100.0)
}

/// Clamp each velocity axis independently to the size-derived cap.
pub fn clamp_speed(entity: &mut Entity, base_speed: f64) {
    let cap = max_speed(base_speed, entity.width);
    entity.vx = entity.vx.clamp(-cap, cap);
    entity.vy = entity.vy.clamp(-cap, cap);
}

/// Keep the entity inside the arena, reflecting velocity on the axis that hit a wall.
pub fn bounce_off_walls(entity: &mut Entity, arena: Arena) {
    if entity.x < 0.0 {
        entity.x = 0.0;
        entity.vx = -entity.vx;
    } else if entity.x + entity.width > arena.width {
        entity.x = arena.width - entity.width;
        entity.vx = -entity.vx;
    }

    if entity.y < 0.0 {
        entity.y = 0.0;
        entity.vy = -entity.vy;
    } else if entity.y + entity.height > arena.height {
        entity.y = arena.height - entity.height;
        entity.vy = -entity.vy;
    }
}

/// Damage every reachable, smaller, vulnerable rival of the entity at `index`.
///
/// Stops early when the consumer's own health runs out.
pub fn consume_rivals(entities: &mut [Entity], index: usize, max_size: f64) {
    for other in 0..entities.len() {
        if other == index {
            continue;
        }

        let (consumer, victim) = (&entities[index], &entities[other]);
        if !victim.active
            || victim.invulnerable
            || victim.team_id == consumer.team_id
            || victim.width >= consumer.width
        {
            continue;
        }

        let reach = CONSUME_REACH * consumer.width;
        if consumer.distance_squared_to(victim.x, victim.y) > reach * reach {
            continue;
        }

        let penalty = CONSUME_PENALTY * (victim.width / consumer.width);

        entities[other].take_damage(penalty);
        if entities[other].is_depleted() {
            entities[other].deactivate();
            info!(
                entity_id = entities[other].id,
                consumer_id = entities[index].id,
                "Entity consumed and deactivated"
            );
        }

        entities[index].take_damage(penalty * SELF_DAMAGE_RATIO);
        if entities[index].is_depleted() {
            entities[index].deactivate();
            info!(
                entity_id = entities[index].id,
                victim_id = entities[other].id,
                "Entity died after consuming a rival"
            );
            return;
        }

        entities[index].grow(GROWTH_FACTOR, max_size);
        let duration = INVULNERABILITY_BASE + entities[index].width / INVULNERABILITY_SIZE_DIVISOR;
        entities[other].make_invulnerable(duration);

        debug!(
            consumer_id = entities[index].id,
            consumer_team = entities[index].team_id,
            victim_id = entities[other].id,
            victim_team = entities[other].team_id,
            penalty,
            consumer_width = entities[index].width,
            consumer_health = entities[index].health,
            victim_health = entities[other].health,
            "Entity consumed rival"
        );
    }
}

/// Advance the entity at `index` by `elapsed` time units.
///
/// Order: invulnerability (early exit while invulnerable), assist cooldown,
/// integration, speed cap, wall bounce, consumption, hunger decay, death.
pub fn resolve(
    entities: &mut [Entity],
    index: usize,
    arena: Arena,
    config: &SimConfig,
    elapsed: f64,
) {
    let entity = &mut entities[index];
    if !entity.active {
        return;
    }

    if entity.invulnerable {
        entity.invulnerable_remaining -= elapsed;
        if entity.invulnerable_remaining <= 0.0 {
            entity.invulnerable = false;
            entity.invulnerable_remaining = 0.0;
            debug!(entity_id = entity.id, "Entity no longer invulnerable");
        }
        return;
    }

    if entity.assist_cooldown {
        entity.assist_cooldown_remaining -= elapsed;
        if entity.assist_cooldown_remaining <= 0.0 {
            entity.assist_cooldown = false;
            entity.assist_cooldown_remaining = 0.0;
        }
    }

    entity.x += entity.vx * elapsed;
    entity.y += entity.vy * elapsed;

    clamp_speed(entity, config.base_speed);
    bounce_off_walls(entity, arena);

    consume_rivals(entities, index, config.max_size);

    let entity = &mut entities[index];
    if !entity.active {
        return;
    }

    entity.decay_hunger(HUNGER_DECAY);

    if entity.is_depleted() {
        entity.deactivate();
        info!(entity_id = entity.id, "Entity deactivated, health depleted");
    }
}
