use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::is_yaml;

/// Tuning knobs for battle resolution. Every field has a default, so a
/// partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BattleConfig {
    pub crit_multiplier: f64,
    /// Minimum damage of a landed (non-miss) attack.
    pub damage_floor: i32,
    /// Mitigation is `100 / (100 + defense * defense_scale)`.
    pub defense_scale: f64,
    /// Opponent HP percentage under which it favours healing.
    pub low_health_pct: f64,
    pub heal_chance_low: f64,
    pub heal_chance_normal: f64,
    pub log_capacity: usize,
    pub opponent_delay_ms: u64,
    /// Safety cap for unattended simulations.
    pub max_turns: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            crit_multiplier: 1.75,
            damage_floor: 50,
            defense_scale: 10.0,
            low_health_pct: 40.0,
            heal_chance_low: 0.55,
            heal_chance_normal: 0.2,
            log_capacity: 4,
            opponent_delay_ms: 700,
            max_turns: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number >= {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be a probability in 0..=1, got {value}")]
    NotProbability { field: &'static str, value: f64 },
}

impl BattleConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read battle config: {}", path.display()))?;
        let cfg: BattleConfig = if is_yaml(path) {
            serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse battle config YAML: {}", path.display()))?
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse battle config JSON: {}", path.display()))?
        };
        cfg.validate()
            .with_context(|| format!("invalid battle config: {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let minimums = [
            ("crit_multiplier", self.crit_multiplier, 1.0),
            ("damage_floor", f64::from(self.damage_floor), 1.0),
            ("defense_scale", self.defense_scale, 0.0),
            ("low_health_pct", self.low_health_pct, 0.0),
            ("log_capacity", self.log_capacity as f64, 1.0),
        ];
        for (field, value, min) in minimums {
            if !value.is_finite() || value < min {
                return Err(ConfigError::BelowMinimum { field, min, value });
            }
        }
        for (field, value) in [
            ("heal_chance_low", self.heal_chance_low),
            ("heal_chance_normal", self.heal_chance_normal),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::NotProbability { field, value });
            }
        }
        Ok(())
    }

    pub fn opponent_delay(&self) -> Duration {
        Duration::from_millis(self.opponent_delay_ms)
    }
}
