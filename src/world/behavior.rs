//! Per-entity decision logic.
//!
//! Deciding is kept apart from acting: [`decide`] is a pure function of the
//! entity's own state, [`act`] carries out the chosen behavior against the
//! registries. All nearest-candidate searches use the same rule: a candidate
//! replaces the current best only when it is strictly closer, so on exact
//! ties the first one in iteration order wins.

use crate::world::{BehaviorState, Entity, Food, GROWTH_FACTOR};
use tracing::debug;

/// Hunger above which food takes priority over everything else
pub const HUNGER_THRESHOLD: f64 = 80.0;

/// Team-need above which an entity tries to help a teammate
pub const TEAM_NEED_THRESHOLD: f64 = 50.0;

/// Teammates below this health count as wounded
pub const WOUNDED_HEALTH: f64 = 50.0;

/// Wounded teammates within this distance contribute to team-need
pub const TEAM_NEED_RADIUS: f64 = 100.0;

/// Cap on the team-need score
pub const MAX_TEAM_NEED: f64 = 100.0;

/// A teammate must be closer than this to be healed
pub const ASSIST_RADIUS: f64 = 4.0;

pub const ASSIST_HEAL: f64 = 0.1;

/// Time the healer waits before it may assist again
pub const ASSIST_COOLDOWN: f64 = 5.0;

/// Food is reachable within `FOOD_REACH * (food size + entity width)`
pub const FOOD_REACH: f64 = 1.2;

/// Healing per unit of food size
pub const FOOD_HEAL_PER_SIZE: f64 = 2.0;

/// Candidate with the smallest distance, first-seen on ties.
fn first_nearest(candidates: impl Iterator<Item = (usize, f64)>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, distance) in candidates {
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

fn is_wounded_teammate(entities: &[Entity], index: usize, other: usize) -> bool {
    let me = &entities[index];
    let mate = &entities[other];
    other != index && mate.active && mate.team_id == me.team_id && mate.health < WOUNDED_HEALTH
}

/// Sum of `(50 - health)` over nearby wounded teammates, capped at 100.
pub fn evaluate_team_need(entities: &[Entity], index: usize) -> f64 {
    let me = &entities[index];
    let need: f64 = (0..entities.len())
        .filter(|&other| is_wounded_teammate(entities, index, other))
        .filter(|&other| me.distance_to(&entities[other]) < TEAM_NEED_RADIUS)
        .map(|other| WOUNDED_HEALTH - entities[other].health)
        .sum();
    need.min(MAX_TEAM_NEED)
}

/// Pick this tick's behavior, in strict priority order.
pub fn decide(entity: &Entity) -> BehaviorState {
    if entity.hunger > HUNGER_THRESHOLD {
        BehaviorState::SeekingFood
    } else if entity.team_need > TEAM_NEED_THRESHOLD && !entity.assist_cooldown {
        BehaviorState::AssistingTeammate
    } else {
        BehaviorState::SeekingWeakerEnemy
    }
}

pub fn nearest_food(entity: &Entity, food: &[Food]) -> Option<usize> {
    first_nearest(
        food.iter()
            .enumerate()
            .filter(|(_, f)| f.active)
            .map(|(i, f)| (i, entity.distance_squared_to(f.x, f.y))),
    )
}

pub fn nearest_wounded_teammate(entities: &[Entity], index: usize) -> Option<usize> {
    let me = &entities[index];
    first_nearest(
        (0..entities.len())
            .filter(|&other| is_wounded_teammate(entities, index, other))
            .map(|other| (other, me.distance_to(&entities[other])))
            .filter(|&(_, distance)| distance < ASSIST_RADIUS),
    )
}

/// Nearest active entity on another team that is strictly smaller.
pub fn nearest_weaker_enemy(entities: &[Entity], index: usize) -> Option<usize> {
    let me = &entities[index];
    first_nearest(
        entities
            .iter()
            .enumerate()
            .filter(|&(other, e)| {
                other != index && e.active && e.team_id != me.team_id && e.width < me.width
            })
            .map(|(other, e)| (other, me.distance_squared_to(e.x, e.y))),
    )
}

/// Record and carry out `state` for the entity at `index`.
pub fn act(entities: &mut [Entity], food: &[Food], index: usize, state: BehaviorState) {
    entities[index].state = state;

    match state {
        BehaviorState::SeekingFood => {
            if let Some(target) = nearest_food(&entities[index], food) {
                let (x, y) = (food[target].x, food[target].y);
                entities[index].steer_toward(x, y);
            }
        }
        BehaviorState::AssistingTeammate => {
            if let Some(target) = nearest_wounded_teammate(entities, index) {
                entities[target].heal(ASSIST_HEAL);
                entities[index].start_assist_cooldown(ASSIST_COOLDOWN);
                debug!(
                    entity_id = entities[index].id,
                    teammate_id = entities[target].id,
                    health = entities[target].health,
                    "Assisted teammate"
                );
            }
        }
        BehaviorState::SeekingWeakerEnemy => {
            if let Some(target) = nearest_weaker_enemy(entities, index) {
                let (x, y) = (entities[target].x, entities[target].y);
                entities[index].steer_toward(x, y);
            }
        }
    }
}

/// Eat the first reachable active food item, if any.
///
/// At most one item per call. Returns the id of the eaten item.
pub fn consume_food(entity: &mut Entity, food: &mut [Food], max_size: f64) -> Option<u32> {
    let item = food.iter_mut().filter(|f| f.active).find(|f| {
        let reach = FOOD_REACH * (f.size + entity.width);
        entity.distance_squared_to(f.x, f.y) < reach * reach
    })?;

    item.active = false;
    entity.grow(GROWTH_FACTOR, max_size);
    entity.heal(FOOD_HEAL_PER_SIZE * item.size);
    entity.feed();

    debug!(
        entity_id = entity.id,
        food_id = item.id,
        width = entity.width,
        "Entity ate food"
    );
    Some(item.id)
}
