//! Spawn scheduling
//!
//! Accumulates frame time and emits a spawn order each time the current
//! difficulty interval elapses. Overshoot is carried into the next interval
//! so variable frame times do not drift the spawn rate.

use glam::Vec2;
use rand::Rng;

use super::difficulty::DifficultyStrategy;
use super::state::SizeClass;
use crate::config::{SpawnConfig, WorldConfig};

/// How new projectiles pick their heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrajectoryPolicy {
    /// Toward the player's current position, with jitter
    #[default]
    Aimed,
    /// Toward a uniformly random point in the play area
    Random,
}

impl TrajectoryPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "aimed" => Some(TrajectoryPolicy::Aimed),
            "random" => Some(TrajectoryPolicy::Random),
            _ => None,
        }
    }
}

/// A projectile the scheduler wants placed into the world
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnOrder {
    pub class: SizeClass,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub damage: u32,
    /// Telegraph time before the projectile enters (0 = immediate)
    pub warning: f32,
}

#[derive(Debug, Clone, Default)]
pub struct SpawnScheduler {
    /// Time since the last spawn
    accumulator: f32,
    spawned: u64,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Advance the accumulator by `dt` and push one order per elapsed interval
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        elapsed: f32,
        difficulty: &DifficultyStrategy,
        spawn: &SpawnConfig,
        world: &WorldConfig,
        player_pos: Vec2,
        rng: &mut impl Rng,
        out: &mut Vec<SpawnOrder>,
    ) {
        self.accumulator += dt;
        let interval = difficulty.spawn_interval(elapsed);
        if interval <= 0.0 {
            return;
        }

        while self.accumulator >= interval {
            self.accumulator -= interval;
            self.spawned += 1;
            let order = roll_projectile(difficulty, spawn, world, player_pos, rng);
            log::debug!(
                "spawn #{} {:?} at ({:.0}, {:.0}), interval {:.3}s",
                self.spawned,
                order.class,
                order.pos.x,
                order.pos.y,
                interval
            );
            out.push(order);
        }
    }
}

/// Pick size class, entry point and heading for one projectile
fn roll_projectile(
    difficulty: &DifficultyStrategy,
    spawn: &SpawnConfig,
    world: &WorldConfig,
    player_pos: Vec2,
    rng: &mut impl Rng,
) -> SpawnOrder {
    let total_weight = spawn.small.weight + spawn.large.weight;
    let class = if rng.random::<f32>() * total_weight < spawn.small.weight {
        SizeClass::Small
    } else {
        SizeClass::Large
    };

    let base = spawn.class(class);
    let params = difficulty.projectile_params(class);
    let size = base.size * params.size_multiplier;
    let speed = base.speed * params.speed_multiplier;

    // Centre sits just outside one edge of the play area, inside the entry band
    let half = size / 2.0;
    let (w, h) = (world.width, world.height);
    let pos = match rng.random_range(0..4u8) {
        0 => Vec2::new(-half, rng.random_range(0.0..=h)),
        1 => Vec2::new(w + half, rng.random_range(0.0..=h)),
        2 => Vec2::new(rng.random_range(0.0..=w), -half),
        _ => Vec2::new(rng.random_range(0.0..=w), h + half),
    };

    let target = match spawn.trajectory {
        TrajectoryPolicy::Aimed => {
            let j = spawn.aim_jitter;
            let offset = Vec2::new(rng.random_range(-j..=j), rng.random_range(-j..=j));
            (player_pos + offset).clamp(Vec2::ZERO, Vec2::new(w, h))
        }
        TrajectoryPolicy::Random => {
            Vec2::new(rng.random_range(0.0..=w), rng.random_range(0.0..=h))
        }
    };

    let centre = Vec2::new(w / 2.0, h / 2.0);
    let heading = (target - pos)
        .try_normalize()
        .unwrap_or_else(|| (centre - pos).normalize_or_zero());

    SpawnOrder {
        class,
        pos,
        vel: heading * speed,
        size,
        damage: params.damage,
        warning: base.warning,
    }
}
