//! Combatant state machine
//!
//! `advance_tick` runs one combatant through the fixed per-tick order:
//!
//! 1. stun decay
//! 2. move progression
//! 3. input resolution (special, super, normal, then movement)
//! 4. move start gate
//! 5. movement integration
//! 6. facing
//!
//! Cross-combatant effects (strikes, hazards) are applied by the driver, not
//! here. The opponent is only seen through an `OpponentInfo` snapshot taken
//! at the start of the tick.

use super::arena::Arena;
use super::input::{Direction, InputSample};
use super::motion::MotionMatcher;
use super::moves::{MoveId, MoveInput, MovePhase, MoveTable, MoveTag};
use super::state::{ActiveMove, Combatant, Facing, FighterState};
use crate::error::ActionError;

/// What a combatant may know about its opponent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpponentInfo {
    pub x: f32,
    /// Opponent has a move in progress or a live hazard
    pub threatening: bool,
}

/// Result of one combatant tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub started: Option<MoveId>,
    pub rejected: Option<ActionError>,
}

/// Advance one combatant by one tick
#[allow(clippy::too_many_arguments)]
pub fn advance_tick(
    fighter: &mut Combatant,
    input: &InputSample,
    opponent: &OpponentInfo,
    table: &MoveTable,
    motion: &MotionMatcher,
    arena: &Arena,
    tick: u64,
    dt: f32,
) -> TickOutcome {
    fighter.state_timer = fighter.state_timer.saturating_add(1);
    fighter.tick_combo_timer();

    decay_stun(fighter);
    progress_move(fighter, table);

    let dir = input.stick(fighter.facing);
    let mut outcome = TickOutcome::default();
    if !fighter.is_defeated() && !fighter.is_stunned() {
        if fighter.can_act {
            outcome = resolve_input(fighter, input, dir, opponent, table, motion, tick, true);
        } else if in_cancel_window(fighter, table) {
            outcome = resolve_input(fighter, input, dir, opponent, table, motion, tick, false);
        }
    }

    integrate(fighter, dir, arena, dt);
    fighter.facing = Facing::toward(fighter.pos.x, opponent.x, fighter.facing);
    outcome
}

fn decay_stun(fighter: &mut Combatant) {
    if fighter.hitstun_frames > 0 {
        fighter.hitstun_frames -= 1;
    }
    if fighter.blockstun_frames > 0 {
        fighter.blockstun_frames -= 1;
    }

    if fighter.hitstun_frames > 0 {
        fighter.can_act = false;
        fighter.set_state(FighterState::Hitstun);
    } else if fighter.blockstun_frames > 0 {
        fighter.can_act = false;
        fighter.set_state(FighterState::Blockstun);
    } else if matches!(fighter.state, FighterState::Hitstun | FighterState::Blockstun) {
        fighter.can_act = true;
        fighter.set_state(if fighter.grounded {
            FighterState::Idle
        } else {
            FighterState::Jumping
        });
    }
}

fn progress_move(fighter: &mut Combatant, table: &MoveTable) {
    let Some(active) = fighter.current_move.as_mut() else {
        return;
    };
    active.frame += 1;
    let total = table.get(active.id).map_or(0, |def| def.total_frames());
    if active.frame >= total {
        fighter.current_move = None;
        fighter.can_act = true;
        fighter.set_state(FighterState::Idle);
    }
}

/// Active move is in recovery and may be replaced
pub fn in_cancel_window(fighter: &Combatant, table: &MoveTable) -> bool {
    fighter
        .current_move
        .and_then(|active| table.get(active.id).map(|def| (def, active.frame)))
        .is_some_and(|(def, frame)| {
            def.has_tag(MoveTag::Cancelable) && def.phase_at(frame) == MovePhase::Recovery
        })
}

#[allow(clippy::too_many_arguments)]
fn resolve_input(
    fighter: &mut Combatant,
    input: &InputSample,
    dir: Direction,
    opponent: &OpponentInfo,
    table: &MoveTable,
    motion: &MotionMatcher,
    tick: u64,
    allow_movement: bool,
) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    if fighter.grounded {
        if let Some(id) = select_attack(fighter, input, dir, table, motion, tick) {
            // the matched category consumes the tick even if the gate refuses it
            match try_start_move(fighter, id, table) {
                Ok(()) => outcome.started = Some(id),
                Err(err) => {
                    log::debug!("{:?}: {} rejected: {}", fighter.id, table.name_of(id), err);
                    outcome.rejected = Some(err);
                }
            }
            return outcome;
        }
    }

    if allow_movement {
        apply_movement_input(fighter, dir, opponent);
    }
    outcome
}

/// Specials, then supers, then normals; first match wins
fn select_attack(
    fighter: &Combatant,
    input: &InputSample,
    dir: Direction,
    table: &MoveTable,
    motion: &MotionMatcher,
    tick: u64,
) -> Option<MoveId> {
    if input.just_pressed.is_empty() {
        return None;
    }
    motion
        .first_match(fighter.id, table, table.specials(), input, tick)
        .or_else(|| motion.first_match(fighter.id, table, table.supers(), input, tick))
        .or_else(|| select_normal(table, input, dir))
}

/// A normal whose held-direction requirement matches beats a plain one
fn select_normal(table: &MoveTable, input: &InputSample, dir: Direction) -> Option<MoveId> {
    let mut plain = None;
    for &id in table.normals() {
        let Some(MoveInput::Button { direction, button }) = table.input(id) else {
            continue;
        };
        if !button.matches(input.just_pressed) {
            continue;
        }
        match direction {
            Some(required) if direction_satisfies(*required, dir) => return Some(id),
            Some(_) => {}
            None => {
                plain.get_or_insert(id);
            }
        }
    }
    plain
}

fn direction_satisfies(required: Direction, held: Direction) -> bool {
    required == held || (required == Direction::Down && held.is_down())
}

/// Start a move if the gate allows it.
///
/// Allowed when idle and actionable, or when the active move is cancelable
/// and in recovery. Meter is debited only on success.
pub fn try_start_move(fighter: &mut Combatant, id: MoveId, table: &MoveTable) -> Result<(), ActionError> {
    let def = table.resolve(id)?;
    if fighter.is_stunned() || fighter.is_defeated() || !fighter.grounded {
        return Err(ActionError::CannotAct);
    }
    match fighter.current_move {
        Some(active) => {
            let current = table.resolve(active.id)?;
            let cancelable = current.has_tag(MoveTag::Cancelable)
                && current.phase_at(active.frame) == MovePhase::Recovery;
            if !cancelable {
                return Err(ActionError::NotCancelable {
                    active: current.name.clone(),
                });
            }
        }
        None if !fighter.can_act => return Err(ActionError::CannotAct),
        None => {}
    }
    fighter.spend_meter(def.meter_cost)?;

    fighter.current_move = Some(ActiveMove::new(id));
    fighter.can_act = false;
    fighter.is_blocking = false;
    fighter.vel.x = 0.0;
    fighter.set_state(FighterState::Attacking);
    fighter.state_timer = 0;
    log::debug!("{:?} starts {}", fighter.id, def.name);
    Ok(())
}

fn apply_movement_input(fighter: &mut Combatant, dir: Direction, opponent: &OpponentInfo) {
    if !fighter.grounded {
        return;
    }
    fighter.is_crouching = false;
    fighter.is_blocking = false;

    if dir.is_up() {
        let speed = if dir.is_back() {
            fighter.back_walk_speed
        } else {
            fighter.walk_speed
        };
        fighter.vel.x = dir.horizontal() as f32 * fighter.facing.sign() * speed;
        fighter.vel.y = fighter.jump_velocity;
        fighter.grounded = false;
        fighter.set_state(FighterState::Jumping);
    } else if dir.is_down() {
        fighter.is_crouching = true;
        fighter.is_blocking = dir.is_back();
        fighter.set_state(FighterState::Crouching);
    } else if dir.is_back() {
        fighter.is_blocking = true;
        fighter.set_state(if opponent.threatening {
            FighterState::Blocking
        } else {
            FighterState::Walking
        });
    } else if dir.is_forward() {
        fighter.set_state(FighterState::Walking);
    } else {
        fighter.set_state(FighterState::Idle);
    }
}

fn walk_velocity(fighter: &Combatant, dir: Direction) -> f32 {
    if fighter.state != FighterState::Walking {
        return 0.0;
    }
    let speed = if dir.is_back() {
        fighter.back_walk_speed
    } else {
        fighter.walk_speed
    };
    dir.horizontal() as f32 * fighter.facing.sign() * speed
}

fn integrate(fighter: &mut Combatant, dir: Direction, arena: &Arena, dt: f32) {
    if fighter.grounded {
        if fighter.can_act {
            fighter.vel.x = walk_velocity(fighter, dir);
        } else {
            fighter.vel.x *= arena.friction;
            if fighter.vel.x.abs() < arena.rest_threshold {
                fighter.vel.x = 0.0;
            }
        }
    } else {
        fighter.vel.y -= arena.gravity * dt;
    }

    fighter.pos += fighter.vel * dt;

    if !fighter.grounded && arena.is_on_ground(fighter.pos.y) && fighter.vel.y <= 0.0 {
        fighter.pos.y = arena.ground_y;
        fighter.vel.y = 0.0;
        fighter.grounded = true;
        if fighter.state == FighterState::Jumping {
            fighter.set_state(FighterState::Idle);
        }
    }

    let clamped = arena.clamp_x(fighter.pos.x, fighter.half_width);
    if clamped != fighter.pos.x {
        fighter.pos.x = clamped;
        fighter.vel.x = 0.0;
    }
}
