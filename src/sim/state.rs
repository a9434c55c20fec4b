//! Game state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::collision::Aabb;
use super::spawn::SpawnScheduler;
use super::world::EntityWorld;
use crate::config::SessionConfig;

/// Top-level phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Mode selection
    Menu,
    /// A session is running
    Playing,
    /// Run ended, final score on screen
    GameOver,
    /// Leaderboard on screen
    HallOfFame,
}

/// Game mode, selects the difficulty strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Normal,
    Nightmare,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Nightmare => "nightmare",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(Mode::Normal),
            "nightmare" => Some(Mode::Nightmare),
            _ => None,
        }
    }
}

/// Projectile size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeClass {
    Small,
    Large,
}

impl SizeClass {
    /// Hearts removed on hit
    pub fn damage(&self) -> u32 {
        match self {
            SizeClass::Small => 1,
            SizeClass::Large => 2,
        }
    }
}

/// The player's avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Centre position
    pub pos: Vec2,
    /// Drawn size (also used for clamping to the play area)
    pub size: f32,
    /// Collision box side, `size` scaled by the mode's hitbox multiplier
    pub hitbox: f32,
    /// Pixels per second at full input
    pub speed: f32,
    pub hearts: u32,
    /// Starting hearts, for the HUD; nightmare restoration may go above it
    pub max_hearts: u32,
}

impl Player {
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, self.hitbox)
    }

    /// Remove hearts, never going below zero. Returns true when no hearts remain.
    pub fn apply_damage(&mut self, damage: u32) -> bool {
        self.hearts = self.hearts.saturating_sub(damage);
        self.hearts == 0
    }

    pub fn restore_heart(&mut self) {
        self.hearts = self.hearts.saturating_add(1);
    }

    pub fn is_dead(&self) -> bool {
        self.hearts == 0
    }
}

/// A projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub class: SizeClass,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub damage: u32,
}

impl Projectile {
    pub fn hitbox(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }
}

/// Warning marker shown where a large projectile is about to enter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telegraph {
    /// Seconds until the projectile is released
    pub remaining: f32,
    pub projectile: Projectile,
}

/// One continuous playthrough
#[derive(Debug, Clone)]
pub struct Session {
    pub config: SessionConfig,
    pub seed: u64,
    pub clock: Clock,
    pub world: EntityWorld,
    pub scheduler: SpawnScheduler,
    pub(crate) rng: Pcg32,
}

impl Session {
    pub fn new(config: SessionConfig, seed: u64) -> Self {
        let world = EntityWorld::new(
            &config.world,
            &config.player,
            config.difficulty.player_hitbox_multiplier(),
        );
        Self {
            config,
            seed,
            clock: Clock::new(),
            world,
            scheduler: SpawnScheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed
    }
}
