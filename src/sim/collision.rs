//! Collision checks between combatants and hazards
//!
//! Bodies are axis-aligned boxes standing on their feet position. Melee
//! hitboxes extend from the body center toward the facing direction; hazards
//! are circles tested against the body center.

use glam::Vec2;

use super::arena::Arena;
use super::hazard::Hazard;
use super::state::Combatant;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Overlap test; touching edges do not count
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Region of the body that can be struck
pub fn hurtbox(c: &Combatant) -> Aabb {
    Aabb::new(
        c.pos - Vec2::new(c.half_width, 0.0),
        c.pos + Vec2::new(c.half_width, c.height),
    )
}

/// Region covered by a melee attack with the given reach
pub fn melee_hitbox(attacker: &Combatant, range: f32) -> Aabb {
    let dir = attacker.facing.sign();
    let tip = attacker.pos.x + dir * (attacker.half_width + range);
    Aabb::new(
        Vec2::new(attacker.pos.x, attacker.pos.y),
        Vec2::new(tip, attacker.pos.y + attacker.height),
    )
}

/// True if a melee attack from `attacker` reaches `defender`
pub fn melee_contact(attacker: &Combatant, range: f32, defender: &Combatant) -> bool {
    melee_hitbox(attacker, range).intersects(&hurtbox(defender))
}

/// True if the hazard is closer to the body center than the combined size
pub fn hazard_contact(hazard: &Hazard, defender: &Combatant) -> bool {
    let reach = hazard.radius + defender.half_width;
    hazard.pos.distance_squared(defender.center()) < reach * reach
}

/// Push overlapping bodies apart symmetrically, then keep them on stage.
/// Returns the overlap that was removed.
pub fn separate_bodies(a: &mut Combatant, b: &mut Combatant, arena: &Arena) -> f32 {
    let min_gap = a.half_width + b.half_width;
    let dx = b.pos.x - a.pos.x;
    let overlap = min_gap - dx.abs();
    let vertical_overlap = a.pos.y < b.pos.y + b.height && b.pos.y < a.pos.y + a.height;
    if overlap <= 0.0 || !vertical_overlap {
        return 0.0;
    }

    // level bodies split by facing so the result never depends on argument order
    let dir = if dx != 0.0 { dx.signum() } else { a.facing.sign() };
    a.pos.x -= dir * overlap / 2.0;
    b.pos.x += dir * overlap / 2.0;
    a.pos.x = arena.clamp_x(a.pos.x, a.half_width);
    b.pos.x = arena.clamp_x(b.pos.x, b.half_width);

    // a body pinned at the wall pushes the other one the rest of the way
    let remaining = min_gap - (b.pos.x - a.pos.x).abs();
    if remaining > 0.0 {
        if arena.clamp_x(a.pos.x - dir * remaining, a.half_width) == a.pos.x {
            b.pos.x = arena.clamp_x(b.pos.x + dir * remaining, b.half_width);
        } else {
            a.pos.x = arena.clamp_x(a.pos.x - dir * remaining, a.half_width);
        }
    }
    overlap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazard::{HazardId, HazardSpec};
    use crate::sim::hit::AttackProfile;
    use crate::sim::moves::{CharacterStats, MoveCategory};
    use crate::sim::state::{CombatantId, Facing};

    fn fighter(id: CombatantId, x: f32, facing: Facing) -> Combatant {
        Combatant::new(id, &CharacterStats::default(), x, 0.0, facing)
    }

    #[test]
    fn test_melee_reaches_adjacent_opponent() {
        let a = fighter(CombatantId::P1, 0.0, Facing::Right);
        let d = fighter(CombatantId::P2, 40.0, Facing::Left);
        assert!(melee_contact(&a, 40.0, &d));

        let far = fighter(CombatantId::P2, 120.0, Facing::Left);
        assert!(!melee_contact(&a, 40.0, &far));
    }

    #[test]
    fn test_melee_only_hits_in_front() {
        let a = fighter(CombatantId::P1, 0.0, Facing::Left);
        let d = fighter(CombatantId::P2, 40.0, Facing::Left);
        assert!(!melee_contact(&a, 10.0, &d));
    }

    #[test]
    fn test_hazard_contact_uses_center() {
        let owner = fighter(CombatantId::P1, 0.0, Facing::Right);
        let target = fighter(CombatantId::P2, 60.0, Facing::Left);
        let spec = HazardSpec {
            speed: 300.0,
            lifetime: 60,
            radius: 16.0,
            gravity: false,
            launch_speed: 0.0,
            multi_hit: false,
            spawn_offset: Vec2::new(30.0, 50.0),
        };
        let attack = AttackProfile {
            damage: 10,
            hitstun: 10,
            blockstun: 5,
            category: MoveCategory::Special,
            tags: Default::default(),
        };
        let hazard = Hazard::spawn(HazardId(1), &owner, &spec, attack);
        // 30 units from the target's center, reach is 16 + 20
        assert!(hazard_contact(&hazard, &target));

        let far = fighter(CombatantId::P2, 100.0, Facing::Left);
        assert!(!hazard_contact(&hazard, &far));
    }

    #[test]
    fn test_separation_is_symmetric() {
        let arena = Arena::default();
        let mut a = fighter(CombatantId::P1, 0.0, Facing::Right);
        let mut b = fighter(CombatantId::P2, 20.0, Facing::Left);
        let removed = separate_bodies(&mut a, &mut b, &arena);
        assert_eq!(removed, 20.0);
        assert_eq!(a.pos.x, -10.0);
        assert_eq!(b.pos.x, 30.0);
    }

    #[test]
    fn test_separation_against_wall() {
        let arena = Arena::default();
        let mut a = fighter(CombatantId::P1, 370.0, Facing::Right);
        let mut b = fighter(CombatantId::P2, 380.0, Facing::Left);
        separate_bodies(&mut a, &mut b, &arena);
        assert_eq!(b.pos.x, 380.0);
        assert_eq!(a.pos.x, 340.0);
    }

    #[test]
    fn test_airborne_body_passes_over() {
        let arena = Arena::default();
        let mut a = fighter(CombatantId::P1, 0.0, Facing::Right);
        let mut b = fighter(CombatantId::P2, 10.0, Facing::Left);
        b.pos.y = 150.0;
        assert_eq!(separate_bodies(&mut a, &mut b, &arena), 0.0);
    }
}
