//! Game configuration
//!
//! A read-only mapping of named options, loaded once at startup and consumed
//! by [`SessionConfig::resolve`] whenever a session starts. The core never
//! mutates it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::{DifficultyStrategy, Mode, SizeClass, TrajectoryPolicy};

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(f64),
    Text(String),
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

/// Named option table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    options: BTreeMap<String, OptionValue>,
}

impl Config {
    /// An empty table (every required option is missing)
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shipped balance values
    pub fn defaults() -> Self {
        let numbers: &[(&str, f64)] = &[
            ("world.width", 960.0),
            ("world.height", 720.0),
            ("world.spawn_margin", 96.0),
            ("player.size", 40.0),
            ("player.speed", 320.0),
            ("player.hearts", 5.0),
            ("projectile.small.size", 24.0),
            ("projectile.small.speed", 260.0),
            ("projectile.small.weight", 3.0),
            ("projectile.large.size", 48.0),
            ("projectile.large.speed", 200.0),
            ("projectile.large.weight", 1.0),
            ("projectile.large.warning", 0.6),
            ("spawn.aim_jitter", 120.0),
            ("normal.spawn_interval", 0.6),
            ("nightmare.spawn_interval", 0.5),
            ("nightmare.interval_step", 0.03),
            ("nightmare.step_seconds", 5.0),
            ("nightmare.interval_floor", 0.15),
            ("nightmare.hitbox_multiplier", 0.75),
            ("nightmare.speed_multiplier", 1.5),
            ("nightmare.size_multiplier", 1.5),
            ("nightmare.restore_first", 75.0),
            ("nightmare.restore_step", 150.0),
            ("leaderboard.size", 10.0),
            ("leaderboard.game_over_size", 5.0),
        ];

        let mut config = Self::empty();
        for &(key, value) in numbers {
            config = config.with(key, value);
        }
        config.with("spawn.trajectory", "aimed")
    }

    /// Parse a JSON object of options
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON options file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded {} options from {:?}", config.options.len(), path);
        Ok(config)
    }

    /// Overlay `other` on top of this table (other wins)
    pub fn merged(mut self, other: Config) -> Self {
        self.options.extend(other.options);
        self
    }

    /// Set one option, returning the updated table
    pub fn with(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// Remove one option, returning the updated table
    pub fn without(mut self, key: &str) -> Self {
        self.options.remove(key);
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    /// Required numeric option
    pub fn number(&self, key: &str) -> Result<f64, ConfigError> {
        match self.get(key) {
            Some(OptionValue::Number(value)) if value.is_finite() => Ok(*value),
            Some(_) => Err(ConfigError::WrongType {
                key: key.to_string(),
                expected: "finite number",
            }),
            None => Err(ConfigError::Missing(key.to_string())),
        }
    }

    /// Required text option
    pub fn text(&self, key: &str) -> Result<&str, ConfigError> {
        match self.get(key) {
            Some(OptionValue::Text(value)) => Ok(value),
            Some(_) => Err(ConfigError::WrongType {
                key: key.to_string(),
                expected: "string",
            }),
            None => Err(ConfigError::Missing(key.to_string())),
        }
    }

    /// Required option that must be strictly positive
    pub fn positive(&self, key: &str) -> Result<f32, ConfigError> {
        let value = self.number(key)?;
        if value <= 0.0 {
            return Err(invalid(key, "must be greater than zero"));
        }
        Ok(value as f32)
    }

    /// Required option that must be zero or positive
    pub fn non_negative(&self, key: &str) -> Result<f32, ConfigError> {
        let value = self.number(key)?;
        if value < 0.0 {
            return Err(invalid(key, "must not be negative"));
        }
        Ok(value as f32)
    }

    /// Required option that must be a whole, non-negative number
    pub fn count(&self, key: &str) -> Result<u32, ConfigError> {
        let value = self.number(key)?;
        if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
            return Err(invalid(key, "must be a whole number"));
        }
        Ok(value as u32)
    }
}

pub(crate) fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Play area dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    /// Band outside the play area where projectiles enter and leave
    pub spawn_margin: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerConfig {
    pub size: f32,
    pub speed: f32,
    pub hearts: u32,
}

/// Base parameters for one projectile size class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileClassConfig {
    pub size: f32,
    pub speed: f32,
    /// Relative spawn weight
    pub weight: f32,
    /// Telegraph time before the projectile enters (0 = none)
    pub warning: f32,
}

impl ProjectileClassConfig {
    fn resolve(config: &Config, class: SizeClass) -> Result<Self, ConfigError> {
        let prefix = match class {
            SizeClass::Small => "projectile.small",
            SizeClass::Large => "projectile.large",
        };
        let key = |name: &str| format!("{prefix}.{name}");

        // Only large projectiles are telegraphed
        let warning = match class {
            SizeClass::Small => 0.0,
            SizeClass::Large => config.non_negative(&key("warning"))?,
        };

        Ok(Self {
            size: config.positive(&key("size"))?,
            speed: config.positive(&key("speed"))?,
            weight: config.non_negative(&key("weight"))?,
            warning,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnConfig {
    pub trajectory: TrajectoryPolicy,
    /// Max offset (px) from the player's position when aiming
    pub aim_jitter: f32,
    pub small: ProjectileClassConfig,
    pub large: ProjectileClassConfig,
}

impl SpawnConfig {
    pub fn class(&self, class: SizeClass) -> &ProjectileClassConfig {
        match class {
            SizeClass::Small => &self.small,
            SizeClass::Large => &self.large,
        }
    }
}

/// Nightmare heart restoration milestones: `first`, then every `step` dodges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestorationRule {
    pub first: u32,
    pub step: u32,
}

/// Everything a session needs, resolved up front so a missing option can
/// never leave a half-built session behind.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub mode: Mode,
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub spawn: SpawnConfig,
    pub difficulty: DifficultyStrategy,
    pub restoration: Option<RestorationRule>,
    pub game_over_size: usize,
}

impl SessionConfig {
    pub fn resolve(config: &Config, mode: Mode) -> Result<Self, ConfigError> {
        let world = WorldConfig {
            width: config.positive("world.width")?,
            height: config.positive("world.height")?,
            spawn_margin: config.non_negative("world.spawn_margin")?,
        };
        let player = PlayerConfig {
            size: config.positive("player.size")?,
            speed: config.non_negative("player.speed")?,
            hearts: config.count("player.hearts")?,
        };
        if player.hearts == 0 {
            return Err(invalid("player.hearts", "must be at least 1"));
        }

        let trajectory_name = config.text("spawn.trajectory")?;
        let trajectory = TrajectoryPolicy::from_str(trajectory_name)
            .ok_or_else(|| invalid("spawn.trajectory", "expected `aimed` or `random`"))?;

        let small = ProjectileClassConfig::resolve(config, SizeClass::Small)?;
        let large = ProjectileClassConfig::resolve(config, SizeClass::Large)?;
        if small.weight + large.weight <= 0.0 {
            return Err(invalid(
                "projectile.small.weight",
                "size class weights must not both be zero",
            ));
        }

        // Projectiles must fit in the entry band or they would count as
        // dodged the moment they spawn
        let largest = small.size.max(large.size);
        let difficulty = DifficultyStrategy::from_config(config, mode)?;
        if world.spawn_margin < largest * difficulty.projectile_size_multiplier() {
            return Err(invalid(
                "world.spawn_margin",
                "must be at least the largest projectile size",
            ));
        }

        let restoration = match mode {
            Mode::Normal => None,
            Mode::Nightmare => {
                let rule = RestorationRule {
                    first: config.count("nightmare.restore_first")?,
                    step: config.count("nightmare.restore_step")?,
                };
                if rule.first == 0 || rule.step == 0 {
                    return Err(invalid(
                        "nightmare.restore_step",
                        "restoration milestones must be positive",
                    ));
                }
                Some(rule)
            }
        };

        Ok(Self {
            mode,
            world,
            player,
            spawn: SpawnConfig {
                trajectory,
                aim_jitter: config.non_negative("spawn.aim_jitter")?,
                small,
                large,
            },
            difficulty,
            restoration,
            game_over_size: config.count("leaderboard.game_over_size")? as usize,
        })
    }
}
