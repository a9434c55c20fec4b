//! Dodge Sim - simulation and difficulty engine for a 2D survival dodger
//!
//! Core modules:
//! - `sim`: Deterministic simulation (phases, spawning, movement, collisions, scoring)
//! - `config`: Named option table consumed at session start
//! - `highscores`: Score records and the leaderboard contract
//! - `persistence`: File-backed leaderboard storage
//! - `platform`: Input and renderer seams the host implements

pub mod config;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod sim;

pub use config::{Config, SessionConfig};
pub use error::{ConfigError, GameError, StoreError};
pub use highscores::{LeaderboardStore, MemoryLeaderboard, ScoreRecord};
pub use persistence::FileLeaderboard;
pub use sim::{GameStateMachine, Mode, Phase};

/// Game loop constants
pub mod consts {
    /// Fixed frame step used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Longest frame delta the simulation accepts; larger deltas are clamped
    pub const MAX_FRAME_DT: f32 = 0.1;
}
