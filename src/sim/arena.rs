//! Stage constants: ground plane, horizontal bounds, gravity, friction

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Read-only stage description for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Arena {
    /// Height of the ground plane (y up)
    pub ground_y: f32,
    pub left_bound: f32,
    pub right_bound: f32,
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Grounded horizontal velocity multiplier applied per tick
    pub friction: f32,
    /// Grounded horizontal speeds below this snap to zero
    pub rest_threshold: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            ground_y: ARENA_GROUND_Y,
            left_bound: -ARENA_HALF_WIDTH,
            right_bound: ARENA_HALF_WIDTH,
            gravity: GRAVITY,
            friction: FRICTION,
            rest_threshold: REST_THRESHOLD,
        }
    }
}

impl Arena {
    pub fn width(&self) -> f32 {
        self.right_bound - self.left_bound
    }

    /// Clamp a body center so the whole body stays inside the stage
    #[inline]
    pub fn clamp_x(&self, x: f32, half_width: f32) -> f32 {
        x.clamp(self.left_bound + half_width, self.right_bound - half_width)
    }

    #[inline]
    pub fn is_on_ground(&self, y: f32) -> bool {
        y <= self.ground_y
    }

    /// True while a point (plus margin) is still on stage
    pub fn contains(&self, pos: Vec2, margin: f32) -> bool {
        pos.x >= self.left_bound - margin
            && pos.x <= self.right_bound + margin
            && pos.y >= self.ground_y - margin
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.width() <= 0.0 {
            return Err(format!(
                "arena bounds are inverted ({} .. {})",
                self.left_bound, self.right_bound
            ));
        }
        if self.gravity <= 0.0 {
            return Err("gravity must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(format!("friction {} must be within 0..=1", self.friction));
        }
        if self.rest_threshold < 0.0 {
            return Err("rest threshold must not be negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_keeps_body_inside() {
        let arena = Arena::default();
        assert_eq!(arena.clamp_x(1000.0, 20.0), 380.0);
        assert_eq!(arena.clamp_x(-1000.0, 20.0), -380.0);
        assert_eq!(arena.clamp_x(12.5, 20.0), 12.5);
    }

    #[test]
    fn test_contains_with_margin() {
        let arena = Arena::default();
        assert!(arena.contains(Vec2::new(0.0, 50.0), 0.0));
        assert!(!arena.contains(Vec2::new(420.0, 50.0), 0.0));
        assert!(arena.contains(Vec2::new(420.0, 50.0), 30.0));
        assert!(!arena.contains(Vec2::new(0.0, -10.0), 0.0));
    }

    #[test]
    fn test_validate() {
        assert!(Arena::default().validate().is_ok());
        let inverted = Arena {
            left_bound: 10.0,
            right_bound: -10.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
        let slippery = Arena {
            friction: 1.5,
            ..Default::default()
        };
        assert!(slippery.validate().is_err());
    }
}
