use std::fmt;
use std::path::PathBuf;

use crate::game::{Move, Side};

/// Why a move was rejected by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalReason {
    OutOfBounds,
    Occupied,
    WrongTurn { expected: Side },
}

impl fmt::Display for IllegalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalReason::OutOfBounds => write!(f, "outside the board"),
            IllegalReason::Occupied => write!(f, "cell is occupied"),
            IllegalReason::WrongTurn { expected } => {
                write!(f, "it is {}'s turn", expected.name())
            }
        }
    }
}

/// Errors raised while playing a game.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("illegal move {mv}: {reason}")]
    IllegalMove { mv: Move, reason: IllegalReason },

    #[error("player asked to move with no legal moves available")]
    NoLegalMove,

    #[error("invalid board: {0}")]
    InvalidBoard(String),

    #[error("input closed before a move was entered")]
    InputClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("invalid board {rows}x{cols} with k={k}: {reason}")]
    Board {
        rows: usize,
        cols: usize,
        k: usize,
        reason: &'static str,
    },

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Errors that can occur while saving or loading a value table.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("failed to read value table from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse value table from {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid state key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value table was trained on {found}, configured board is {expected}")]
    ShapeMismatch { expected: String, found: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("game aborted: {0}")]
    Game(#[from] GameError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}
