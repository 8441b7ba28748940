//! Hit resolution shared by melee strikes and hazards

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::moves::{MoveCategory, MoveDefinition, MoveTag};
use super::state::{CombatEvent, Combatant, Knockback};
use crate::settings::Rules;

/// What a strike does when it connects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    pub damage: u32,
    pub hitstun: u32,
    pub blockstun: u32,
    pub category: MoveCategory,
    pub tags: BTreeSet<MoveTag>,
}

impl AttackProfile {
    pub fn from_move(def: &MoveDefinition) -> Self {
        Self {
            damage: def.damage,
            hitstun: def.hitstun_frames(),
            blockstun: def.blockstun_frames(),
            category: def.category,
            tags: def.tags.clone(),
        }
    }

    pub fn has_tag(&self, tag: MoveTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn causes_knockdown(&self) -> bool {
        self.has_tag(MoveTag::Knockdown) || self.has_tag(MoveTag::Launcher)
    }

    /// True if this attack goes through the defender's current guard
    pub fn beats_guard(&self, defender: &Combatant) -> bool {
        self.has_tag(MoveTag::Unblockable)
            || (self.has_tag(MoveTag::Low) && !defender.is_crouching)
            || (self.has_tag(MoveTag::Overhead) && defender.is_crouching)
    }
}

/// Result of one resolved strike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    Hit { damage: u32, combo: u32, defeated: bool },
    Blocked,
}

/// Resolve `attack` against `defender`.
///
/// `push_dir` is the sign of the direction away from the attacker. Only a
/// landed hit extends the attacker's combo and grants meter; a blocked hit
/// credits nothing.
pub fn resolve_hit(
    attack: &AttackProfile,
    attacker: &mut Combatant,
    defender: &mut Combatant,
    push_dir: f32,
    rules: &Rules,
) -> HitOutcome {
    let guarding = defender.is_blocking && defender.grounded;
    if guarding && !attack.beats_guard(defender) {
        defender.take_blockstun(attack.blockstun, rules.block_pushback * push_dir);
        return HitOutcome::Blocked;
    }

    let knockback = if attack.causes_knockdown() {
        let launch = rules.knockdown_launch;
        Knockback::Launch(Vec2::new(launch.x * push_dir, launch.y))
    } else {
        Knockback::Push(rules.hit_pushback * push_dir)
    };
    let was_standing = !defender.is_defeated();
    let damage = defender.take_damage(attack.damage, attack.hitstun, knockback);

    let combo = attacker.register_combo_hit(rules.combo_window_ticks);
    attacker.gain_meter(rules.meter_gain.for_category(attack.category));

    HitOutcome::Hit {
        damage,
        combo,
        defeated: was_standing && defender.is_defeated(),
    }
}

/// Translate an outcome into controller events
pub fn outcome_events(outcome: HitOutcome, attacker: &Combatant, defender: &Combatant, events: &mut Vec<CombatEvent>) {
    match outcome {
        HitOutcome::Blocked => events.push(CombatEvent::AttackBlocked {
            attacker: attacker.id,
            defender: defender.id,
        }),
        HitOutcome::Hit {
            damage,
            combo,
            defeated,
        } => {
            events.push(CombatEvent::HitLanded {
                attacker: attacker.id,
                defender: defender.id,
                damage,
            });
            if combo > 1 {
                events.push(CombatEvent::ComboExtended {
                    attacker: attacker.id,
                    count: combo,
                });
            }
            if defeated {
                log::info!("{:?} defeated by {:?}", defender.id, attacker.id);
                events.push(CombatEvent::CombatantDefeated {
                    combatant: defender.id,
                });
            }
        }
    }
}
