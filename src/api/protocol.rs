use crate::config::{validate_sim, ConfigError, SimConfig};
use crate::world::Population;
use serde::Deserialize;

/// Client → Server control messages
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Client canvas changed size; the world restarts with the new bounds
    #[serde(rename = "resize")]
    Resize { width: f64, height: f64 },
    /// New counts and tunables; the world restarts with them
    #[serde(rename = "settings")]
    Settings(SettingsMessage),
    /// Any other message type (e.g. canvas clicks); ignored
    #[serde(other)]
    Unknown,
}

/// Payload of a `settings` control message
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsMessage {
    pub population: i64,
    pub team_count: i64,
    pub food_count: i64,
    pub min_size: f64,
    pub start_max_size: f64,
    pub max_size: f64,
    pub base_speed: f64,
}

impl SettingsMessage {
    /// Split into validated counts and tunables
    pub fn into_parts(self) -> Result<(Population, SimConfig), ConfigError> {
        let population = Population::new(self.population, self.team_count, self.food_count)?;
        let config = SimConfig {
            min_size: self.min_size,
            start_max_size: self.start_max_size,
            max_size: self.max_size,
            base_speed: self.base_speed,
        };
        validate_sim(&config)?;
        Ok((population, config))
    }
}

impl ControlMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
