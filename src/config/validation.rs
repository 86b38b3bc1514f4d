use super::SimConfig;
use std::fmt;

/// Rejected world parameters. A rejected change leaves the world untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositivePopulation(i64),
    NonPositiveTeamCount(i64),
    NegativeFoodCount(i64),
    PopulationTooLarge { count: i64, max: usize },
    FoodCountTooLarge { count: i64, max: usize },
    InvalidArena { width: f64, height: f64 },
    InvalidSize(&'static str, f64),
    SizeOrdering {
        min_size: f64,
        start_max_size: f64,
        max_size: f64,
    },
    NonPositiveBaseSpeed(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositivePopulation(n) => {
                write!(f, "population must be at least 1, got {}", n)
            }
            ConfigError::NonPositiveTeamCount(n) => {
                write!(f, "team count must be at least 1, got {}", n)
            }
            ConfigError::NegativeFoodCount(n) => {
                write!(f, "food count must not be negative, got {}", n)
            }
            ConfigError::PopulationTooLarge { count, max } => {
                write!(f, "population must be at most {}, got {}", max, count)
            }
            ConfigError::FoodCountTooLarge { count, max } => {
                write!(f, "food count must be at most {}, got {}", max, count)
            }
            ConfigError::InvalidArena { width, height } => {
                write!(f, "arena must have positive finite extent, got {}x{}", width, height)
            }
            ConfigError::InvalidSize(name, value) => {
                write!(f, "{} must be positive and finite, got {}", name, value)
            }
            ConfigError::SizeOrdering {
                min_size,
                start_max_size,
                max_size,
            } => write!(
                f,
                "sizes must satisfy min_size <= start_max_size <= max_size, got {} / {} / {}",
                min_size, start_max_size, max_size
            ),
            ConfigError::NonPositiveBaseSpeed(speed) => {
                write!(f, "base speed must be positive and finite, got {}", speed)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Validates simulation tunables.
///
/// Rules:
/// - every size is positive and finite
/// - min_size <= start_max_size <= max_size
/// - base_speed is positive and finite
pub fn validate_sim(config: &SimConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("min_size", config.min_size),
        ("start_max_size", config.start_max_size),
        ("max_size", config.max_size),
    ] {
        if !positive_finite(value) {
            return Err(ConfigError::InvalidSize(name, value));
        }
    }

    if config.min_size > config.start_max_size || config.start_max_size > config.max_size {
        return Err(ConfigError::SizeOrdering {
            min_size: config.min_size,
            start_max_size: config.start_max_size,
            max_size: config.max_size,
        });
    }

    if !positive_finite(config.base_speed) {
        return Err(ConfigError::NonPositiveBaseSpeed(config.base_speed));
    }

    Ok(())
}

/// Validates arena extent.
pub fn validate_arena(width: f64, height: f64) -> Result<(), ConfigError> {
    if positive_finite(width) && positive_finite(height) {
        Ok(())
    } else {
        Err(ConfigError::InvalidArena { width, height })
    }
}
