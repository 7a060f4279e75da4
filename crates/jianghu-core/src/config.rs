//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

fn default_threshold() -> u32 {
    100
}

fn default_tick_scale() -> f64 {
    1.0
}

fn default_crit_multiplier() -> f64 {
    1.5
}

fn default_max_steps() -> u32 {
    10_000
}

/// Run-wide tuning knobs, deserializable from a config file.
///
/// Every field has a serde default, so `{"rng_seed": 42}` is a complete
/// config.
///
/// # Example
///
/// ```
/// use jianghu_core::config::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"rng_seed": 42}"#).unwrap();
/// assert_eq!(config.atb_threshold, 100);
/// assert_eq!(config.crit_multiplier, 1.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seed for the battle's random source.
    #[serde(default)]
    pub rng_seed: u64,
    /// Time units a combatant must accumulate to act.
    #[serde(default = "default_threshold")]
    pub atb_threshold: u32,
    /// Agility multiplier per accumulation tick.
    #[serde(default = "default_tick_scale")]
    pub atb_tick_scale: f64,
    /// Damage multiplier on a critical strike.
    #[serde(default = "default_crit_multiplier")]
    pub crit_multiplier: f64,
    /// Safety bound on scheduling steps per battle.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rng_seed: 0,
            atb_threshold: default_threshold(),
            atb_tick_scale: default_tick_scale(),
            crit_multiplier: default_crit_multiplier(),
            max_steps: default_max_steps(),
        }
    }
}

impl EngineConfig {
    /// Checks the config invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidConfig`] when the threshold is zero,
    /// the tick scale is not a positive finite number, the critical
    /// multiplier is below one, or `max_steps` is zero.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.atb_threshold == 0 {
            return Err(DataError::InvalidConfig(
                "atb_threshold must be at least 1".to_string(),
            ));
        }
        if !self.atb_tick_scale.is_finite() || self.atb_tick_scale <= 0.0 {
            return Err(DataError::InvalidConfig(
                "atb_tick_scale must be positive and finite".to_string(),
            ));
        }
        if !self.crit_multiplier.is_finite() || self.crit_multiplier < 1.0 {
            return Err(DataError::InvalidConfig(
                "crit_multiplier must be at least 1".to_string(),
            ));
        }
        if self.max_steps == 0 {
            return Err(DataError::InvalidConfig(
                "max_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
