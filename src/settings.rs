//! Match settings: stage and rules tuning
//!
//! Loaded from JSON before a match starts. Every field has a default, so a
//! settings file only needs to name what it changes.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::LoadError;
use crate::sim::arena::Arena;
use crate::sim::moves::{CharacterStats, MoveCategory};

/// Meter granted to the attacker per landed hit, keyed by move category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterGain {
    pub normal: u32,
    pub special: u32,
    #[serde(rename = "super")]
    pub super_move: u32,
}

impl Default for MeterGain {
    fn default() -> Self {
        Self {
            normal: 20,
            special: 35,
            super_move: 0,
        }
    }
}

impl MeterGain {
    pub fn for_category(&self, category: MoveCategory) -> u32 {
        match category {
            MoveCategory::Normal => self.normal,
            MoveCategory::Special => self.special,
            MoveCategory::Super => self.super_move,
        }
    }
}

/// Combat rules shared by both combatants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Rules {
    /// Ticks a combo survives without a new hit
    pub combo_window_ticks: u32,
    /// Maximum age of a sample in the motion buffer
    pub motion_window_ticks: u64,
    /// Ticks after a completed motion in which its button still counts
    pub motion_grace_ticks: u64,
    pub meter_gain: MeterGain,
    /// Horizontal speed given to a defender on a grounded hit
    pub hit_pushback: f32,
    /// Horizontal speed given to a defender on block
    pub block_pushback: f32,
    /// Velocity given to a knocked-down defender (x is away from the attacker)
    pub knockdown_launch: Vec2,
    /// Distance of each start position from the arena center
    pub start_offset: f32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            combo_window_ticks: COMBO_WINDOW_TICKS,
            motion_window_ticks: MOTION_WINDOW_TICKS,
            motion_grace_ticks: MOTION_GRACE_TICKS,
            meter_gain: MeterGain::default(),
            hit_pushback: 120.0,
            block_pushback: 160.0,
            knockdown_launch: Vec2::new(160.0, 700.0),
            start_offset: 120.0,
        }
    }
}

/// Complete match configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub arena: Arena,
    pub rules: Rules,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        self.arena.validate().map_err(LoadError::InvalidSettings)?;

        let rules = &self.rules;
        if rules.combo_window_ticks == 0 {
            return Err(LoadError::InvalidSettings(
                "combo window must be at least one tick".to_string(),
            ));
        }
        if rules.motion_window_ticks == 0 {
            return Err(LoadError::InvalidSettings(
                "motion window must be at least one tick".to_string(),
            ));
        }
        if rules.motion_grace_ticks >= rules.motion_window_ticks {
            return Err(LoadError::InvalidSettings(format!(
                "motion grace ({}) must be shorter than the motion window ({})",
                rules.motion_grace_ticks, rules.motion_window_ticks
            )));
        }
        if rules.start_offset * 2.0 >= self.arena.width() {
            return Err(LoadError::InvalidSettings(format!(
                "start offset {} does not fit an arena {} wide",
                rules.start_offset,
                self.arena.width()
            )));
        }
        Ok(())
    }

    /// Check the stage against the two bodies that will fight on it
    pub fn validate_for(&self, stats: [&CharacterStats; 2]) -> Result<(), LoadError> {
        let width = self.arena.width();
        let [w1, w2] = stats.map(|s| s.body_width);
        if w1 + w2 > width {
            return Err(LoadError::InvalidSettings(format!(
                "arena {width} wide cannot hold bodies {w1} and {w2} wide side by side"
            )));
        }

        let [x1, x2] = self.start_positions();
        let x1 = self.arena.clamp_x(x1, w1 / 2.0);
        let x2 = self.arena.clamp_x(x2, w2 / 2.0);
        if x1 >= x2 {
            return Err(LoadError::InvalidSettings(format!(
                "start positions {x1} and {x2} cross once clamped to the arena"
            )));
        }
        Ok(())
    }

    /// Start position of each combatant, P1 on the left
    pub fn start_positions(&self) -> [f32; 2] {
        let center = (self.arena.left_bound + self.arena.right_bound) / 2.0;
        [center - self.rules.start_offset, center + self.rules.start_offset]
    }
}
