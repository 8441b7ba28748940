//! Error types
//!
//! Two families: `ActionError` is an in-tick policy outcome (a rejected move
//! start) and never fatal. `LoadError` covers malformed character documents
//! and settings, which are rejected before the first tick.

use thiserror::Error;

/// Why a move could not start
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("move `{0}` not found in move table")]
    MoveNotFound(String),

    #[error("insufficient meter: need {needed}, have {available}")]
    InsufficientMeter { needed: u32, available: u32 },

    #[error("combatant cannot act")]
    CannotAct,

    #[error("active move `{active}` cannot be cancelled")]
    NotCancelable { active: String },
}

/// Failure to load a character document or settings file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("move `{name}` has no frame data (startup + active + recovery must be > 0)")]
    EmptyFrameData { name: String },

    #[error("move `{name}` has invalid input notation `{notation}`: {reason}")]
    InvalidNotation {
        name: String,
        notation: String,
        reason: String,
    },

    #[error("move `{name}` frame data overflows a frame counter")]
    FrameDataOverflow { name: String },

    #[error("character `{character}` has more moves than a move id can index")]
    TooManyMoves { character: String },

    #[error("move `{name}` is tagged projectile but defines no hazard")]
    MissingHazard { name: String },

    #[error("duplicate move name `{0}`")]
    DuplicateMove(String),

    #[error("character stat `{field}` must be positive")]
    InvalidStat { field: &'static str },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("unknown character `{0}`")]
    UnknownCharacter(String),
}
