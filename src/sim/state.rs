//! Combat state and core simulation types
//!
//! All state that must be saved for replays and rollback lives here. Move
//! tables and settings are read-only inputs and are not part of the state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hazard::{Hazard, HazardId};
use super::motion::MotionMatcher;
use super::moves::{CharacterStats, MoveId, MovePhase, MoveTable, MoveTag};
use crate::error::ActionError;
use crate::settings::Settings;

/// Player slot; also the stable processing order (P1 before P2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CombatantId {
    P1,
    P2,
}

impl CombatantId {
    pub const ALL: [CombatantId; 2] = [CombatantId::P1, CombatantId::P2];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opponent(self) -> Self {
        match self {
            CombatantId::P1 => CombatantId::P2,
            CombatantId::P2 => CombatantId::P1,
        }
    }
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing from `x` toward `target_x`; unchanged when level
    pub fn toward(x: f32, target_x: f32, current: Facing) -> Facing {
        if target_x > x {
            Facing::Right
        } else if target_x < x {
            Facing::Left
        } else {
            current
        }
    }
}

/// Discrete combatant state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FighterState {
    Idle,
    Walking,
    Crouching,
    Jumping,
    Blocking,
    Attacking,
    Hitstun,
    Blockstun,
}

/// Progress of the move currently being executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMove {
    pub id: MoveId,
    /// Frames elapsed since the move started (0 on the starting tick)
    pub frame: u32,
    /// Melee strike already resolved for this execution
    pub connected: bool,
    /// Hazard already spawned for this execution
    pub hazard_spawned: bool,
}

impl ActiveMove {
    pub fn new(id: MoveId) -> Self {
        Self {
            id,
            frame: 0,
            connected: false,
            hazard_spawned: false,
        }
    }
}

/// How a landed hit moves the defender
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Knockback {
    /// Grounded push along x (signed)
    Push(f32),
    /// Knocked airborne with this velocity
    Launch(Vec2),
}

/// One fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub health: u32,
    pub max_health: u32,
    pub meter: u32,
    pub max_meter: u32,
    /// Feet position (y up)
    pub pos: Vec2,
    /// Velocity (pixels/s)
    pub vel: Vec2,
    pub grounded: bool,
    pub facing: Facing,
    pub state: FighterState,
    /// Ticks spent in the current state
    pub state_timer: u32,
    pub current_move: Option<ActiveMove>,
    pub hitstun_frames: u32,
    pub blockstun_frames: u32,
    pub is_blocking: bool,
    pub is_crouching: bool,
    pub can_act: bool,
    pub combo_count: u32,
    pub combo_timer: u32,
    pub walk_speed: f32,
    pub back_walk_speed: f32,
    pub jump_velocity: f32,
    pub half_width: f32,
    pub height: f32,
}

impl Combatant {
    pub fn new(id: CombatantId, stats: &CharacterStats, x: f32, ground_y: f32, facing: Facing) -> Self {
        Self {
            id,
            health: stats.max_health,
            max_health: stats.max_health,
            meter: 0,
            max_meter: stats.max_meter,
            pos: Vec2::new(x, ground_y),
            vel: Vec2::ZERO,
            grounded: true,
            facing,
            state: FighterState::Idle,
            state_timer: 0,
            current_move: None,
            hitstun_frames: 0,
            blockstun_frames: 0,
            is_blocking: false,
            is_crouching: false,
            can_act: true,
            combo_count: 0,
            combo_timer: 0,
            walk_speed: stats.walk_speed,
            back_walk_speed: stats.back_walk_speed,
            jump_velocity: stats.jump_velocity,
            half_width: stats.body_width / 2.0,
            height: stats.body_height,
        }
    }

    /// Restore round-start condition. Meter carries over between rounds.
    pub fn reset_for_round(&mut self, x: f32, ground_y: f32, facing: Facing) {
        self.health = self.max_health;
        self.pos = Vec2::new(x, ground_y);
        self.vel = Vec2::ZERO;
        self.grounded = true;
        self.facing = facing;
        self.state = FighterState::Idle;
        self.state_timer = 0;
        self.current_move = None;
        self.hitstun_frames = 0;
        self.blockstun_frames = 0;
        self.is_blocking = false;
        self.is_crouching = false;
        self.can_act = true;
        self.combo_count = 0;
        self.combo_timer = 0;
    }

    pub fn set_state(&mut self, state: FighterState) {
        if self.state != state {
            self.state = state;
            self.state_timer = 0;
        }
    }

    pub fn is_stunned(&self) -> bool {
        self.hitstun_frames > 0 || self.blockstun_frames > 0
    }

    pub fn is_attacking(&self) -> bool {
        self.current_move.is_some()
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Center of the body
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(0.0, self.height / 2.0)
    }

    /// Phase of the current move, if any
    pub fn move_phase(&self, table: &MoveTable) -> Option<MovePhase> {
        let active = self.current_move?;
        table.get(active.id).map(|def| def.phase_at(active.frame))
    }

    /// Reversal moves ignore strikes until they become active
    pub fn is_invulnerable(&self, table: &MoveTable) -> bool {
        self.current_move
            .and_then(|active| table.get(active.id).map(|def| (def, active.frame)))
            .is_some_and(|(def, frame)| {
                def.has_tag(MoveTag::Reversal) && def.phase_at(frame) == MovePhase::Startup
            })
    }

    /// Grant meter, capped at the maximum
    pub fn gain_meter(&mut self, amount: u32) {
        self.meter = self.meter.saturating_add(amount).min(self.max_meter);
    }

    /// Debit meter; rejected outright if there is not enough
    pub fn spend_meter(&mut self, cost: u32) -> Result<(), ActionError> {
        if cost > self.meter {
            return Err(ActionError::InsufficientMeter {
                needed: cost,
                available: self.meter,
            });
        }
        self.meter -= cost;
        Ok(())
    }

    /// Apply a landed hit. Returns the damage actually dealt.
    pub fn take_damage(&mut self, damage: u32, hitstun: u32, knockback: Knockback) -> u32 {
        let dealt = damage.min(self.health);
        self.health -= dealt;
        self.hitstun_frames = hitstun.max(1);
        self.blockstun_frames = 0;
        self.current_move = None;
        self.is_blocking = false;
        self.can_act = false;
        self.set_state(FighterState::Hitstun);
        match knockback {
            Knockback::Push(push) => self.vel.x = push,
            Knockback::Launch(vel) => {
                self.vel = vel;
                self.grounded = false;
            }
        }
        dealt
    }

    /// Apply a blocked hit. The guard stays up.
    pub fn take_blockstun(&mut self, frames: u32, push: f32) {
        self.blockstun_frames = frames.max(1);
        self.can_act = false;
        self.vel.x = push;
        self.set_state(FighterState::Blockstun);
    }

    /// Credit a landed hit to this combatant's combo. Returns the new count.
    pub fn register_combo_hit(&mut self, window: u32) -> u32 {
        self.combo_count += 1;
        self.combo_timer = window;
        self.combo_count
    }

    /// Count the combo timer down; the combo drops the tick it reaches zero
    pub fn tick_combo_timer(&mut self) {
        if self.combo_timer > 0 {
            self.combo_timer -= 1;
            if self.combo_timer == 0 {
                self.combo_count = 0;
            }
        }
    }
}

/// Notifications for the match controller and presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    MoveStarted {
        combatant: CombatantId,
        move_id: MoveId,
    },
    HitLanded {
        attacker: CombatantId,
        defender: CombatantId,
        damage: u32,
    },
    AttackBlocked {
        attacker: CombatantId,
        defender: CombatantId,
    },
    ComboExtended {
        attacker: CombatantId,
        count: u32,
    },
    HazardSpawned {
        owner: CombatantId,
        hazard: HazardId,
    },
    CombatantDefeated {
        combatant: CombatantId,
    },
}

/// Complete combat state for one arena (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Round number (1-based)
    pub round: u32,
    /// Both combatants, indexed by `CombatantId::index`
    pub combatants: [Combatant; 2],
    /// Live hazards (sorted by id, which is spawn order)
    pub hazards: Vec<Hazard>,
    pub motion: MotionMatcher,
    next_hazard_id: u32,
}

impl CombatState {
    pub fn new(stats: [&CharacterStats; 2], settings: &Settings) -> Self {
        let [x1, x2] = settings.start_positions();
        let ground = settings.arena.ground_y;
        let rules = &settings.rules;
        Self {
            time_ticks: 0,
            round: 1,
            combatants: [
                Combatant::new(CombatantId::P1, stats[0], x1, ground, Facing::Right),
                Combatant::new(CombatantId::P2, stats[1], x2, ground, Facing::Left),
            ],
            hazards: Vec::new(),
            motion: MotionMatcher::new(rules.motion_window_ticks, rules.motion_grace_ticks),
            next_hazard_id: 1,
        }
    }

    pub fn combatant(&self, id: CombatantId) -> &Combatant {
        &self.combatants[id.index()]
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> &mut Combatant {
        &mut self.combatants[id.index()]
    }

    /// Allocate a hazard id
    pub fn next_hazard_id(&mut self) -> HazardId {
        let id = HazardId(self.next_hazard_id);
        self.next_hazard_id += 1;
        id
    }

    /// Start the next round: full health, start positions, no hazards
    pub fn reset_round(&mut self, settings: &Settings) {
        let [x1, x2] = settings.start_positions();
        let ground = settings.arena.ground_y;
        self.combatants[0].reset_for_round(x1, ground, Facing::Right);
        self.combatants[1].reset_for_round(x2, ground, Facing::Left);
        self.hazards.clear();
        self.motion.reset();
        self.round += 1;
        log::info!("Round {} begins at tick {}", self.round, self.time_ticks);
    }

    /// Ensure hazards are sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.hazards.sort_by_key(|h| h.id);
    }
}

/// Mutable access to an attacker and its opponent at once
pub fn pair_mut(combatants: &mut [Combatant; 2], attacker: CombatantId) -> (&mut Combatant, &mut Combatant) {
    let (first, second) = combatants.split_at_mut(1);
    match attacker {
        CombatantId::P1 => (&mut first[0], &mut second[0]),
        CombatantId::P2 => (&mut second[0], &mut first[0]),
    }
}
