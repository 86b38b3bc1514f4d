mod validation;

pub use validation::{validate_arena, validate_sim, ConfigError};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete Blobwar configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlobwarConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub sim: SimConfig,
    #[serde(default)]
    pub ticker: TickerConfig,
}

/// HTTP/WebSocket server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Directory served at `/` (the canvas client). Not served when unset.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            static_dir: None,
        }
    }
}

/// Initial world shape. Counts are signed so that a negative value in the
/// file surfaces as a `ConfigError` instead of a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_arena_width")]
    pub arena_width: f64,
    #[serde(default = "default_arena_height")]
    pub arena_height: f64,
    #[serde(default = "default_population")]
    pub population: i64,
    #[serde(default = "default_team_count")]
    pub team_count: i64,
    #[serde(default = "default_food_count")]
    pub food_count: i64,
    /// Fixed RNG seed; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_arena_width() -> f64 {
    1000.0
}

fn default_arena_height() -> f64 {
    600.0
}

fn default_population() -> i64 {
    10
}

fn default_team_count() -> i64 {
    2
}

fn default_food_count() -> i64 {
    200
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            arena_width: default_arena_width(),
            arena_height: default_arena_height(),
            population: default_population(),
            team_count: default_team_count(),
            food_count: default_food_count(),
            seed: None,
        }
    }
}

/// Simulation tunables. Replaced as a whole; every replacement reinitializes
/// the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_min_size")]
    pub min_size: f64,
    #[serde(default = "default_start_max_size")]
    pub start_max_size: f64,
    #[serde(default = "default_max_size")]
    pub max_size: f64,
    #[serde(default = "default_base_speed")]
    pub base_speed: f64,
}

fn default_min_size() -> f64 {
    5.0
}

fn default_start_max_size() -> f64 {
    10.0
}

fn default_max_size() -> f64 {
    15.0
}

fn default_base_speed() -> f64 {
    10.0
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            start_max_size: default_start_max_size(),
            max_size: default_max_size(),
            base_speed: default_base_speed(),
        }
    }
}

/// Ticker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TickerConfig {
    /// Wake period of the ticker (~60Hz)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_interval_ms() -> u64 {
    16
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl TickerConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl BlobwarConfig {
    /// Apply env var overrides on top of file values.
    pub fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("BLOBWAR_BIND_ADDR") {
            if !addr.is_empty() {
                self.server.bind_addr = addr;
            }
        }
        if let Ok(v) = std::env::var("BLOBWAR_SEED") {
            if let Ok(seed) = v.parse::<u64>() {
                self.world.seed = Some(seed);
            }
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &Path) -> Result<BlobwarConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: BlobwarConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}
