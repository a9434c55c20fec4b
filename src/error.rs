//! Error types for the simulation core and its collaborators

use thiserror::Error;

use crate::sim::Phase;

/// Errors surfaced by the game state machine
#[derive(Debug, Error)]
pub enum GameError {
    /// A state machine operation was called from a phase that does not allow it.
    /// The machine is left unchanged.
    #[error("`{op}` is not valid in phase {phase:?}")]
    InvalidTransition { op: &'static str, phase: Phase },

    /// Session configuration could not be resolved; no session was created
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration lookup and loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required option `{0}` is missing")]
    Missing(String),

    #[error("option `{key}` must be a {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("option `{key}` is invalid: {reason}")]
    Invalid { key: String, reason: String },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Leaderboard persistence failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("leaderboard I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed leaderboard line {line}: {content:?}")]
    Malformed { line: usize, content: String },
}
