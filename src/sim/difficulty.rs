//! Difficulty strategies
//!
//! Selected once per session from the mode. Everything here is a pure
//! function of elapsed time and the resolved configuration.

use serde::{Deserialize, Serialize};

use super::state::{Mode, SizeClass};
use crate::config::{Config, invalid};
use crate::error::ConfigError;

/// Per-projectile scaling applied by a strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileParams {
    pub speed_multiplier: f32,
    pub size_multiplier: f32,
    pub damage: u32,
}

/// Nightmare spawn curve and scaling.
///
/// The interval drops linearly by `step` every `step_seconds` of elapsed
/// time and never goes below `floor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NightmareCurve {
    pub start: f32,
    pub step: f32,
    pub step_seconds: f32,
    pub floor: f32,
    pub hitbox_multiplier: f32,
    pub speed_multiplier: f32,
    pub size_multiplier: f32,
}

impl NightmareCurve {
    /// Number of completed decay steps at `elapsed`
    pub fn steps_at(&self, elapsed: f32) -> u32 {
        (elapsed.max(0.0) / self.step_seconds).floor() as u32
    }

    pub fn interval_at(&self, elapsed: f32) -> f32 {
        let decayed = self.start - self.step * self.steps_at(elapsed) as f32;
        decayed.max(self.floor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DifficultyStrategy {
    /// Constant spawn interval, base sizes and speeds
    Normal { interval: f32 },
    /// Accelerating spawns, faster and larger projectiles, smaller hitbox
    Nightmare(NightmareCurve),
}

impl DifficultyStrategy {
    pub fn from_config(config: &Config, mode: Mode) -> Result<Self, ConfigError> {
        match mode {
            Mode::Normal => Ok(DifficultyStrategy::Normal {
                interval: config.positive("normal.spawn_interval")?,
            }),
            Mode::Nightmare => {
                let curve = NightmareCurve {
                    start: config.positive("nightmare.spawn_interval")?,
                    step: config.non_negative("nightmare.interval_step")?,
                    step_seconds: config.positive("nightmare.step_seconds")?,
                    floor: config.positive("nightmare.interval_floor")?,
                    hitbox_multiplier: config.positive("nightmare.hitbox_multiplier")?,
                    speed_multiplier: config.positive("nightmare.speed_multiplier")?,
                    size_multiplier: config.positive("nightmare.size_multiplier")?,
                };
                if curve.floor > curve.start {
                    return Err(invalid(
                        "nightmare.interval_floor",
                        "must not exceed nightmare.spawn_interval",
                    ));
                }
                Ok(DifficultyStrategy::Nightmare(curve))
            }
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            DifficultyStrategy::Normal { .. } => Mode::Normal,
            DifficultyStrategy::Nightmare(_) => Mode::Nightmare,
        }
    }

    /// Seconds between spawns at `elapsed` seconds into the session
    pub fn spawn_interval(&self, elapsed: f32) -> f32 {
        match self {
            DifficultyStrategy::Normal { interval } => *interval,
            DifficultyStrategy::Nightmare(curve) => curve.interval_at(elapsed),
        }
    }

    pub fn projectile_params(&self, class: SizeClass) -> ProjectileParams {
        ProjectileParams {
            speed_multiplier: self.projectile_speed_multiplier(),
            size_multiplier: self.projectile_size_multiplier(),
            damage: class.damage(),
        }
    }

    pub fn player_hitbox_multiplier(&self) -> f32 {
        match self {
            DifficultyStrategy::Normal { .. } => 1.0,
            DifficultyStrategy::Nightmare(curve) => curve.hitbox_multiplier,
        }
    }

    pub fn projectile_speed_multiplier(&self) -> f32 {
        match self {
            DifficultyStrategy::Normal { .. } => 1.0,
            DifficultyStrategy::Nightmare(curve) => curve.speed_multiplier,
        }
    }

    pub fn projectile_size_multiplier(&self) -> f32 {
        match self {
            DifficultyStrategy::Normal { .. } => 1.0,
            DifficultyStrategy::Nightmare(curve) => curve.size_multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn nightmare() -> DifficultyStrategy {
        DifficultyStrategy::from_config(&Config::defaults(), Mode::Nightmare).unwrap()
    }

    #[test]
    fn test_normal_is_constant() {
        let normal = DifficultyStrategy::from_config(&Config::defaults(), Mode::Normal).unwrap();
        assert_eq!(normal.spawn_interval(0.0), normal.spawn_interval(600.0));
        assert_eq!(normal.player_hitbox_multiplier(), 1.0);
        let params = normal.projectile_params(SizeClass::Large);
        assert_eq!(params.speed_multiplier, 1.0);
        assert_eq!(params.damage, 2);
    }

    #[test]
    fn test_nightmare_scaling() {
        let strategy = nightmare();
        assert_eq!(strategy.mode(), Mode::Nightmare);
        assert_eq!(strategy.player_hitbox_multiplier(), 0.75);
        let params = strategy.projectile_params(SizeClass::Small);
        assert_eq!(params.speed_multiplier, 1.5);
        assert_eq!(params.size_multiplier, 1.5);
        assert_eq!(params.damage, 1);
    }

    #[test]
    fn test_nightmare_steps_every_five_seconds() {
        let strategy = nightmare();
        assert_eq!(strategy.spawn_interval(0.0), 0.5);
        assert_eq!(strategy.spawn_interval(4.99), 0.5);
        assert!((strategy.spawn_interval(5.0) - 0.47).abs() < 1e-6);
        assert!((strategy.spawn_interval(12.0) - 0.44).abs() < 1e-6);
        assert_eq!(strategy.spawn_interval(10_000.0), 0.15);
    }

    #[test]
    fn test_floor_above_start_rejected() {
        let config = Config::defaults().with("nightmare.interval_floor", 2.0);
        assert!(matches!(
            DifficultyStrategy::from_config(&config, Mode::Nightmare),
            Err(ConfigError::Invalid { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_nightmare_interval_monotonic_with_floor(t in 0.0f32..3600.0) {
            let strategy = nightmare();
            let now = strategy.spawn_interval(t);
            let earlier = strategy.spawn_interval((t - 5.0).max(0.0));
            prop_assert!(now <= earlier);
            prop_assert!(now >= 0.15);
        }
    }
}
