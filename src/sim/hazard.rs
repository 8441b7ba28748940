//! Hazards: transient ranged attacks spawned by projectile moves
//!
//! A hazard owns its attack profile and the set of combatants it has already
//! struck. It resolves at most once per tick: a clash with an enemy hazard
//! or one strike. It expires at the end of the tick its lifetime runs out.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::hit::AttackProfile;
use super::state::{Combatant, CombatantId};
use crate::consts::DEFAULT_HAZARD_RADIUS;

/// Hazard parameters from a character document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardSpec {
    /// Horizontal speed along the owner's facing (pixels/s)
    pub speed: f32,
    /// Ticks before the hazard expires
    pub lifetime: u32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Falls under arena gravity
    #[serde(default)]
    pub gravity: bool,
    /// Initial upward speed (lobbed hazards)
    #[serde(default)]
    pub launch_speed: f32,
    /// Keeps going after a strike
    #[serde(default)]
    pub multi_hit: bool,
    /// Spawn point relative to the owner's feet, x along facing
    #[serde(default = "default_spawn_offset")]
    pub spawn_offset: Vec2,
}

fn default_radius() -> f32 {
    DEFAULT_HAZARD_RADIUS
}

fn default_spawn_offset() -> Vec2 {
    Vec2::new(50.0, 60.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HazardId(pub u32);

/// A live hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: HazardId,
    pub owner: CombatantId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub gravity: bool,
    pub multi_hit: bool,
    pub ticks_remaining: u32,
    pub attack: AttackProfile,
    /// Combatants already struck by this hazard
    pub hit_set: BTreeSet<CombatantId>,
    pub destroyed: bool,
}

impl Hazard {
    pub fn spawn(id: HazardId, owner: &Combatant, spec: &HazardSpec, attack: AttackProfile) -> Self {
        let dir = owner.facing.sign();
        Self {
            id,
            owner: owner.id,
            pos: owner.pos + Vec2::new(spec.spawn_offset.x * dir, spec.spawn_offset.y),
            vel: Vec2::new(spec.speed * dir, spec.launch_speed),
            radius: spec.radius,
            gravity: spec.gravity,
            multi_hit: spec.multi_hit,
            ticks_remaining: spec.lifetime,
            attack,
            hit_set: BTreeSet::new(),
            destroyed: false,
        }
    }

    /// Advance one tick: count down, integrate, and check the stage bounds
    pub fn step(&mut self, arena: &Arena, dt: f32) {
        if self.destroyed {
            return;
        }
        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);

        if self.gravity {
            self.vel.y -= arena.gravity * dt;
        }
        self.pos += self.vel * dt;

        let landed = self.gravity && arena.is_on_ground(self.pos.y - self.radius);
        if landed || !arena.contains(self.pos, self.radius) {
            self.destroyed = true;
        }
    }

    /// Destroy the hazard once its lifetime is spent. Runs after the strike
    /// check, so the last tick of a lifetime can still connect.
    pub fn expire_if_spent(&mut self) {
        if self.ticks_remaining == 0 {
            self.destroyed = true;
        }
    }

    /// Whether this hazard may still strike `target`
    pub fn can_strike(&self, target: CombatantId) -> bool {
        !self.destroyed && target != self.owner && !self.hit_set.contains(&target)
    }

    pub fn register_strike(&mut self, target: CombatantId) {
        self.hit_set.insert(target);
        if !self.multi_hit {
            self.destroyed = true;
        }
    }

    pub fn overlaps(&self, other: &Hazard) -> bool {
        self.pos.distance_squared(other.pos) < (self.radius + other.radius).powi(2)
    }
}

/// Destroy overlapping hazards with different owners, pairing in id order.
/// Returns the ids of the hazards that clashed.
pub fn resolve_clashes(hazards: &mut [Hazard]) -> Vec<HazardId> {
    let mut clashed = Vec::new();
    for i in 0..hazards.len() {
        for j in (i + 1)..hazards.len() {
            let (a, b) = (&hazards[i], &hazards[j]);
            if a.destroyed || b.destroyed || a.owner == b.owner || !a.overlaps(b) {
                continue;
            }
            hazards[i].destroyed = true;
            hazards[j].destroyed = true;
            clashed.push(hazards[i].id);
            clashed.push(hazards[j].id);
            break;
        }
    }
    clashed
}
