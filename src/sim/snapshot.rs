//! Read-only views of the combat state for presentation and logging

use glam::Vec2;
use serde::Serialize;

use super::hazard::{Hazard, HazardId};
use super::moves::{MovePhase, MoveTable};
use super::state::{CombatState, Combatant, CombatantId, Facing, FighterState};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantView {
    pub id: CombatantId,
    pub character: String,
    pub health: u32,
    pub max_health: u32,
    pub meter: u32,
    pub max_meter: u32,
    pub pos: Vec2,
    pub facing: Facing,
    pub state: FighterState,
    /// Name of the move in progress
    pub current_move: Option<String>,
    pub move_frame: Option<u32>,
    pub move_phase: Option<MovePhase>,
    pub hitstun_frames: u32,
    pub blockstun_frames: u32,
    pub is_blocking: bool,
    pub combo_count: u32,
}

impl CombatantView {
    pub fn build(c: &Combatant, table: &MoveTable) -> Self {
        Self {
            id: c.id,
            character: table.character().to_string(),
            health: c.health,
            max_health: c.max_health,
            meter: c.meter,
            max_meter: c.max_meter,
            pos: c.pos,
            facing: c.facing,
            state: c.state,
            current_move: c.current_move.map(|m| table.name_of(m.id).to_string()),
            move_frame: c.current_move.map(|m| m.frame),
            move_phase: c.move_phase(table),
            hitstun_frames: c.hitstun_frames,
            blockstun_frames: c.blockstun_frames,
            is_blocking: c.is_blocking,
            combo_count: c.combo_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardView {
    pub id: HazardId,
    pub owner: CombatantId,
    pub pos: Vec2,
    pub radius: f32,
    pub ticks_remaining: u32,
}

impl From<&Hazard> for HazardView {
    fn from(h: &Hazard) -> Self {
        Self {
            id: h.id,
            owner: h.owner,
            pos: h.pos,
            radius: h.radius,
            ticks_remaining: h.ticks_remaining,
        }
    }
}

/// Everything a renderer needs for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatSnapshot {
    pub tick: u64,
    pub round: u32,
    pub combatants: [CombatantView; 2],
    pub hazards: Vec<HazardView>,
    /// Set once a combatant has been defeated
    pub winner: Option<CombatantId>,
}

impl CombatSnapshot {
    pub fn build(state: &CombatState, tables: &[MoveTable; 2]) -> Self {
        let [p1, p2] = &state.combatants;
        let winner = match (p1.is_defeated(), p2.is_defeated()) {
            (false, true) => Some(CombatantId::P1),
            (true, false) => Some(CombatantId::P2),
            _ => None,
        };
        Self {
            tick: state.time_ticks,
            round: state.round,
            combatants: [
                CombatantView::build(p1, &tables[0]),
                CombatantView::build(p2, &tables[1]),
            ],
            hazards: state.hazards.iter().map(HazardView::from).collect(),
            winner,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
