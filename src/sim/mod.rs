//! Deterministic combat simulation
//!
//! All combat logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - No wall clock, no unseeded randomness
//! - Stable iteration order (P1 before P2, hazards by id)
//! - No rendering, audio or device dependencies

pub mod arena;
pub mod collision;
pub mod fighter;
pub mod hazard;
pub mod hit;
pub mod input;
pub mod motion;
pub mod moves;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use arena::Arena;
pub use fighter::{OpponentInfo, TickOutcome, advance_tick, try_start_move};
pub use hazard::{Hazard, HazardId, HazardSpec};
pub use hit::{AttackProfile, HitOutcome, resolve_hit};
pub use input::{
    Button, ButtonSet, Direction, DirectionSet, FrameInputs, InputSample, InputSampler, RawInput,
    Stick,
};
pub use motion::{MotionMatcher, MotionWindow};
pub use moves::{
    CharacterDocument, CharacterStats, MoveCategory, MoveDefinition, MoveId, MoveInput, MovePhase,
    MoveTable, MoveTag,
};
pub use snapshot::{CombatSnapshot, CombatantView, HazardView};
pub use state::{
    CombatEvent, CombatState, Combatant, CombatantId, Facing, FighterState, Knockback,
};
pub use tick::{Checkpoint, Fight, MatchSetup, tick};
