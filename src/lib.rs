//! Frame Fight - deterministic combat core for a 2D fighting game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (combatants, motion inputs, hazards, hit resolution)
//! - `settings`: Data-driven arena and rules tuning
//! - `roster`: Built-in character documents
//! - `replay`: Recorded input scripts and seeded input generation

pub mod error;
pub mod replay;
pub mod roster;
pub mod settings;
pub mod sim;

pub use error::{ActionError, LoadError};
pub use settings::{Rules, Settings};

/// Simulation constants and default tunables
pub mod consts {
    /// Fixed simulation rate (one tick per frame)
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;

    /// Ticks a combo survives without a new hit
    pub const COMBO_WINDOW_TICKS: u32 = 60;
    /// Maximum age of a directional sample in the motion buffer
    pub const MOTION_WINDOW_TICKS: u64 = 20;
    /// Ticks after a completed motion in which the button may still be pressed
    pub const MOTION_GRACE_TICKS: u64 = 6;

    /// Default character stats
    pub const DEFAULT_MAX_HEALTH: u32 = 1000;
    pub const DEFAULT_MAX_METER: u32 = 300;
    pub const DEFAULT_WALK_SPEED: f32 = 180.0;
    pub const DEFAULT_BACK_WALK_SPEED: f32 = 140.0;
    pub const DEFAULT_JUMP_VELOCITY: f32 = 900.0;
    pub const DEFAULT_BODY_WIDTH: f32 = 40.0;
    pub const DEFAULT_BODY_HEIGHT: f32 = 100.0;

    /// Default reach of a melee hitbox past the attacker's body edge
    pub const DEFAULT_MOVE_RANGE: f32 = 40.0;
    /// Default hazard collision radius
    pub const DEFAULT_HAZARD_RADIUS: f32 = 16.0;

    /// Arena defaults (pixels, y up)
    pub const ARENA_GROUND_Y: f32 = 0.0;
    pub const ARENA_HALF_WIDTH: f32 = 400.0;
    /// Gravity (pixels/s²)
    pub const GRAVITY: f32 = 2400.0;
    /// Grounded horizontal velocity multiplier per tick
    pub const FRICTION: f32 = 0.8;
    /// Horizontal speeds below this snap to zero on the ground
    pub const REST_THRESHOLD: f32 = 1.0;
}
