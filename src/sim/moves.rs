//! Move table: per-character catalog of move definitions
//!
//! Loaded once from a character document and read-only afterwards. Names are
//! interned to `MoveId` at load so the tick never does string lookups.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::hazard::HazardSpec;
use super::input::{Button, ButtonSet, Direction};
use crate::consts::*;
use crate::error::{ActionError, LoadError};

/// Move category (also keys the meter gain table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    #[default]
    Normal,
    Special,
    Super,
}

/// Behavioural tags on a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveTag {
    /// May be replaced by another move during recovery
    Cancelable,
    /// Launches the defender into the air on hit
    Launcher,
    /// Must be blocked crouching
    Low,
    /// Must be blocked standing
    Overhead,
    /// Invulnerable during startup
    Reversal,
    /// Spawns a hazard on its first active frame instead of striking
    Projectile,
    /// Cannot be blocked
    Unblockable,
    /// Knocks the defender down on hit
    Knockdown,
}

/// Which button(s) satisfy an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSpec {
    Exact(Button),
    AnyPunch,
    AnyKick,
}

impl ButtonSpec {
    fn parse(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "LP" => ButtonSpec::Exact(Button::LightPunch),
            "HP" => ButtonSpec::Exact(Button::HeavyPunch),
            "LK" => ButtonSpec::Exact(Button::LightKick),
            "HK" => ButtonSpec::Exact(Button::HeavyKick),
            "P" => ButtonSpec::AnyPunch,
            "K" => ButtonSpec::AnyKick,
            _ => return None,
        })
    }

    /// True if any button in `pressed` satisfies this
    pub fn matches(&self, pressed: ButtonSet) -> bool {
        pressed.iter().any(|b| match self {
            ButtonSpec::Exact(want) => b == *want,
            ButtonSpec::AnyPunch => b.is_punch(),
            ButtonSpec::AnyKick => b.is_kick(),
        })
    }

    /// True if some single button satisfies both
    pub fn overlaps(&self, other: ButtonSpec) -> bool {
        Button::ALL.into_iter().any(|b| {
            let pressed = ButtonSet::EMPTY.with(b);
            self.matches(pressed) && other.matches(pressed)
        })
    }
}

/// True if every direction of `needle` appears in `haystack` in order,
/// with anything in between
fn contains_in_order(haystack: &[Direction], needle: &[Direction]) -> bool {
    let mut rest = haystack.iter();
    needle.iter().all(|want| rest.any(|dir| dir == want))
}

/// Parsed input notation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MoveInput {
    /// Not reachable from input (scripted only)
    #[default]
    None,
    /// Button press, optionally requiring a held direction (`2LK`, `6HP`)
    Button {
        direction: Option<Direction>,
        button: ButtonSpec,
    },
    /// Motion followed by a button (`236P`)
    Motion {
        sequence: Vec<Direction>,
        button: ButtonSpec,
    },
}

impl MoveInput {
    /// Parse numpad notation. `5` and an absent digit both mean "no direction".
    pub fn parse(notation: &str) -> Result<Self, String> {
        let notation = notation.trim();
        if notation.is_empty() {
            return Ok(MoveInput::None);
        }

        let split = notation
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| "missing button".to_string())?;
        let (digits, suffix) = notation.split_at(split);

        let button = ButtonSpec::parse(suffix).ok_or_else(|| format!("unknown button `{suffix}`"))?;
        let sequence = digits
            .bytes()
            .map(|d| Direction::from_numpad(d - b'0').ok_or_else(|| format!("invalid direction `{}`", d as char)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match sequence.as_slice() {
            [] => MoveInput::Button {
                direction: None,
                button,
            },
            [single] => MoveInput::Button {
                direction: (*single != Direction::Neutral).then_some(*single),
                button,
            },
            _ => MoveInput::Motion { sequence, button },
        })
    }
}

/// A single move's definition as written in a character document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDefinition {
    /// Filled from the map key at load
    #[serde(default)]
    pub name: String,
    /// Filled from the containing map at load
    #[serde(skip_deserializing, default)]
    pub category: MoveCategory,
    /// Numpad notation, e.g. `"236P"`
    #[serde(default)]
    pub input: String,
    pub damage: u32,
    pub startup_frames: u32,
    pub active_frames: u32,
    pub recovery_frames: u32,
    /// Frame advantage on block
    #[serde(default)]
    pub on_block: i32,
    /// Frame advantage on hit
    #[serde(default)]
    pub on_hit: i32,
    #[serde(default)]
    pub meter_cost: u32,
    #[serde(default)]
    pub tags: BTreeSet<MoveTag>,
    /// Hitbox reach past the body edge
    #[serde(default = "default_range")]
    pub range: f32,
    /// Explicit hitstun (derived from frame advantage when absent)
    #[serde(default)]
    pub hitstun: Option<u32>,
    /// Explicit blockstun (derived from frame advantage when absent)
    #[serde(default)]
    pub blockstun: Option<u32>,
    #[serde(default)]
    pub hazard: Option<HazardSpec>,
}

fn default_range() -> f32 {
    DEFAULT_MOVE_RANGE
}

/// Phase of a move at a given move frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovePhase {
    Startup,
    Active,
    Recovery,
}

impl MoveDefinition {
    /// Startup + active + recovery, or `None` if it does not fit a `u32`
    pub fn checked_total_frames(&self) -> Option<u32> {
        self.startup_frames
            .checked_add(self.active_frames)?
            .checked_add(self.recovery_frames)
    }

    pub fn total_frames(&self) -> u32 {
        self.checked_total_frames().unwrap_or(u32::MAX)
    }

    pub fn phase_at(&self, frame: u32) -> MovePhase {
        if frame < self.startup_frames {
            MovePhase::Startup
        } else if frame < self.startup_frames.saturating_add(self.active_frames) {
            MovePhase::Active
        } else {
            MovePhase::Recovery
        }
    }

    pub fn has_tag(&self, tag: MoveTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Stun that leaves the attacker `advantage` frames ahead once the move
    /// ends. The defender acts on the tick its stun runs out, so the whole
    /// active phase counts.
    fn stun_after_contact(&self, advantage: i32) -> u32 {
        let frames = i64::from(self.active_frames) + i64::from(self.recovery_frames) + i64::from(advantage);
        u32::try_from(frames.max(1)).unwrap_or(u32::MAX)
    }

    pub fn hitstun_frames(&self) -> u32 {
        self.hitstun.unwrap_or_else(|| self.stun_after_contact(self.on_hit))
    }

    pub fn blockstun_frames(&self) -> u32 {
        self.blockstun.unwrap_or_else(|| self.stun_after_contact(self.on_block))
    }
}

/// Character stat block
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterStats {
    pub max_health: u32,
    pub max_meter: u32,
    pub walk_speed: f32,
    pub back_walk_speed: f32,
    pub jump_velocity: f32,
    pub body_width: f32,
    pub body_height: f32,
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self {
            max_health: DEFAULT_MAX_HEALTH,
            max_meter: DEFAULT_MAX_METER,
            walk_speed: DEFAULT_WALK_SPEED,
            back_walk_speed: DEFAULT_BACK_WALK_SPEED,
            jump_velocity: DEFAULT_JUMP_VELOCITY,
            body_width: DEFAULT_BODY_WIDTH,
            body_height: DEFAULT_BODY_HEIGHT,
        }
    }
}

impl CharacterStats {
    fn validate(&self) -> Result<(), LoadError> {
        let checks = [
            ("maxHealth", self.max_health > 0),
            ("walkSpeed", self.walk_speed > 0.0),
            ("backWalkSpeed", self.back_walk_speed > 0.0),
            ("jumpVelocity", self.jump_velocity > 0.0),
            ("bodyWidth", self.body_width > 0.0),
            ("bodyHeight", self.body_height > 0.0),
        ];
        match checks.iter().find(|(_, ok)| !ok) {
            Some((field, _)) => Err(LoadError::InvalidStat { field: *field }),
            None => Ok(()),
        }
    }
}

/// Character document as stored on disk
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDocument {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub stats: CharacterStats,
    #[serde(default)]
    pub normals: BTreeMap<String, MoveDefinition>,
    #[serde(default)]
    pub specials: BTreeMap<String, MoveDefinition>,
    #[serde(default)]
    pub supers: BTreeMap<String, MoveDefinition>,
}

/// Interned move handle, valid for the table that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MoveId(pub u16);

/// Immutable, validated move catalog for one character
#[derive(Debug, Clone)]
pub struct MoveTable {
    character: String,
    display_name: String,
    stats: CharacterStats,
    moves: Vec<MoveDefinition>,
    inputs: Vec<MoveInput>,
    by_name: BTreeMap<String, MoveId>,
    normals: Vec<MoveId>,
    specials: Vec<MoveId>,
    supers: Vec<MoveId>,
}

impl MoveTable {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let doc: CharacterDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Validate a document and intern its moves
    pub fn from_document(doc: CharacterDocument) -> Result<Self, LoadError> {
        doc.stats.validate()?;

        let mut table = Self {
            display_name: doc.display_name.unwrap_or_else(|| doc.id.clone()),
            character: doc.id,
            stats: doc.stats,
            moves: Vec::new(),
            inputs: Vec::new(),
            by_name: BTreeMap::new(),
            normals: Vec::new(),
            specials: Vec::new(),
            supers: Vec::new(),
        };

        let groups = [
            (MoveCategory::Normal, doc.normals),
            (MoveCategory::Special, doc.specials),
            (MoveCategory::Super, doc.supers),
        ];
        for (category, group) in groups {
            for (name, mut def) in group {
                def.name = name;
                def.category = category;
                table.insert(def)?;
            }
        }

        // Longer motions first so 236236 is tried before the 236 it ends with
        let inputs = &table.inputs;
        let motion_len = |id: &MoveId| match &inputs[id.0 as usize] {
            MoveInput::Motion { sequence, .. } => sequence.len(),
            _ => 0,
        };
        table.specials.sort_by_key(|id| std::cmp::Reverse(motion_len(id)));
        table.supers.sort_by_key(|id| std::cmp::Reverse(motion_len(id)));

        for (super_id, special_id) in table.shadowed_supers() {
            log::warn!(
                "Super `{}` contains the motion of special `{}` on the same button; the special wins",
                table.name_of(super_id),
                table.name_of(special_id)
            );
        }

        log::debug!(
            "Loaded move table `{}`: {} normals, {} specials, {} supers",
            table.character,
            table.normals.len(),
            table.specials.len(),
            table.supers.len()
        );
        Ok(table)
    }

    fn insert(&mut self, def: MoveDefinition) -> Result<(), LoadError> {
        match def.checked_total_frames() {
            Some(0) => return Err(LoadError::EmptyFrameData { name: def.name }),
            None => return Err(LoadError::FrameDataOverflow { name: def.name }),
            Some(_) => {}
        }
        if def.has_tag(MoveTag::Projectile) && def.hazard.is_none() {
            return Err(LoadError::MissingHazard { name: def.name });
        }
        if self.by_name.contains_key(&def.name) {
            return Err(LoadError::DuplicateMove(def.name));
        }
        let input = MoveInput::parse(&def.input).map_err(|reason| LoadError::InvalidNotation {
            name: def.name.clone(),
            notation: def.input.clone(),
            reason,
        })?;
        if def.hazard.is_some() && !def.has_tag(MoveTag::Projectile) {
            log::warn!("Move `{}` defines a hazard but is not tagged projectile", def.name);
        }

        let id = u16::try_from(self.moves.len())
            .map(MoveId)
            .map_err(|_| LoadError::TooManyMoves {
                character: self.character.clone(),
            })?;
        match def.category {
            MoveCategory::Normal => self.normals.push(id),
            MoveCategory::Special => self.specials.push(id),
            MoveCategory::Super => self.supers.push(id),
        }
        self.by_name.insert(def.name.clone(), id);
        self.moves.push(def);
        self.inputs.push(input);
        Ok(())
    }

    pub fn character(&self) -> &str {
        &self.character
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn stats(&self) -> &CharacterStats {
        &self.stats
    }

    pub fn get(&self, id: MoveId) -> Option<&MoveDefinition> {
        self.moves.get(id.0 as usize)
    }

    pub fn input(&self, id: MoveId) -> Option<&MoveInput> {
        self.inputs.get(id.0 as usize)
    }

    /// Resolve a move name to its id
    pub fn lookup(&self, name: &str) -> Result<MoveId, ActionError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ActionError::MoveNotFound(name.to_string()))
    }

    /// Resolve an id, reporting ids foreign to this table as not found
    pub fn resolve(&self, id: MoveId) -> Result<&MoveDefinition, ActionError> {
        self.get(id)
            .ok_or_else(|| ActionError::MoveNotFound(format!("#{}", id.0)))
    }

    pub fn name_of(&self, id: MoveId) -> &str {
        self.get(id).map(|m| m.name.as_str()).unwrap_or("<unknown>")
    }

    pub fn normals(&self) -> &[MoveId] {
        &self.normals
    }

    pub fn specials(&self) -> &[MoveId] {
        &self.specials
    }

    pub fn supers(&self) -> &[MoveId] {
        &self.supers
    }

    /// Supers whose motion contains a special's motion on an overlapping
    /// button. Specials are tried first, so a clean input for such a super
    /// starts the special instead.
    pub fn shadowed_supers(&self) -> Vec<(MoveId, MoveId)> {
        let mut shadowed = Vec::new();
        for &super_id in &self.supers {
            let Some(MoveInput::Motion { sequence, button }) = self.input(super_id) else {
                continue;
            };
            for &special_id in &self.specials {
                let Some(MoveInput::Motion {
                    sequence: inner,
                    button: inner_button,
                }) = self.input(special_id)
                else {
                    continue;
                };
                if button.overlaps(*inner_button) && contains_in_order(sequence, inner) {
                    shadowed.push((super_id, special_id));
                }
            }
        }
        shadowed
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
