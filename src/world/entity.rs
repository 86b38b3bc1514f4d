use serde::Serialize;

/// Starting and maximum health of every entity
pub const MAX_HEALTH: f64 = 100.0;

/// Upper bound of the hunger scale
pub const MAX_HUNGER: f64 = 100.0;

/// Velocity added per tick when steering toward a target
pub const STEER_FORCE: f64 = 0.1;

/// Relative growth applied on every meal (food or rival)
pub const GROWTH_FACTOR: f64 = 0.1;

/// What an entity decided to do on its most recent tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum BehaviorState {
    SeekingFood,
    AssistingTeammate,
    #[default]
    SeekingWeakerEnemy,
}

/// One autonomous agent.
///
/// Width doubles as power in consumption comparisons. Height tracks width
/// (entities are drawn as circles), so both grow together.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Stable for the lifetime of the simulation, starting at 1
    pub id: u32,

    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,

    pub width: f64,
    pub height: f64,

    /// False once health reached zero. Never set back to true.
    pub active: bool,

    pub health: f64,
    pub max_health: f64,

    pub invulnerable: bool,
    pub invulnerable_remaining: f64,

    /// 0..=100, decays every tick, refilled by eating
    pub hunger: f64,

    pub team_id: u32,

    /// Recomputed from scratch every tick
    pub team_need: f64,

    pub assist_cooldown: bool,
    pub assist_cooldown_remaining: f64,

    pub state: BehaviorState,
}

impl Entity {
    /// Create a motionless, healthy, sated entity
    pub fn new(id: u32, x: f64, y: f64, width: f64, team_id: u32) -> Self {
        Self {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            width,
            height: width,
            active: true,
            health: MAX_HEALTH,
            max_health: MAX_HEALTH,
            invulnerable: false,
            invulnerable_remaining: 0.0,
            hunger: 0.0,
            team_id,
            team_need: 0.0,
            assist_cooldown: false,
            assist_cooldown_remaining: 0.0,
            state: BehaviorState::default(),
        }
    }

    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    pub fn distance_squared_to(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &Entity) -> f64 {
        self.distance_squared_to(other.x, other.y).sqrt()
    }

    /// Add a fixed-magnitude unit vector toward (x, y). No-op when already there.
    pub fn steer_toward(&mut self, x: f64, y: f64) {
        let dx = x - self.x;
        let dy = y - self.y;
        let length = (dx * dx + dy * dy).sqrt();
        if length != 0.0 {
            self.vx += dx / length * STEER_FORCE;
            self.vy += dy / length * STEER_FORCE;
        }
    }

    /// Grow by `factor` of the current width, never beyond `max_size`.
    pub fn grow(&mut self, factor: f64, max_size: f64) {
        self.width = (self.width * (1.0 + factor)).min(max_size);
        self.height = self.width;
    }

    pub fn heal(&mut self, amount: f64) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn take_damage(&mut self, amount: f64) {
        self.health = (self.health - amount).max(0.0);
    }

    pub fn feed(&mut self) {
        self.hunger = MAX_HUNGER;
    }

    pub fn decay_hunger(&mut self, amount: f64) {
        self.hunger = (self.hunger - amount).clamp(0.0, MAX_HUNGER);
    }

    pub fn make_invulnerable(&mut self, duration: f64) {
        self.invulnerable = true;
        self.invulnerable_remaining = duration;
    }

    pub fn start_assist_cooldown(&mut self, duration: f64) {
        self.assist_cooldown = true;
        self.assist_cooldown_remaining = duration;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_depleted(&self) -> bool {
        self.health <= 0.0
    }
}
