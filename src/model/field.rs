//! Pitch geometry used by candidate filters and scoring terms
//!
//! Coordinates follow the simulator: origin at the centre spot, our goal on
//! the negative x side. Kinematics never consult this.

use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

use super::constants::field;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldGeometry {
    pub half_length: f64,
    pub half_width: f64,
    pub penalty_area_length: f64,
    pub penalty_area_half_width: f64,
    pub goal_half_width: f64,
    pub center_circle_radius: f64,
}

impl Default for FieldGeometry {
    fn default() -> Self {
        Self {
            half_length: field::PITCH_HALF_LENGTH,
            half_width: field::PITCH_HALF_WIDTH,
            penalty_area_length: field::PENALTY_AREA_LENGTH,
            penalty_area_half_width: field::PENALTY_AREA_HALF_WIDTH,
            goal_half_width: field::GOAL_HALF_WIDTH,
            center_circle_radius: field::CENTER_CIRCLE_RADIUS,
        }
    }
}

impl FieldGeometry {
    /// Inside the touch and goal lines shrunk by `margin`
    pub fn contains(&self, p: Vec2, margin: f64) -> bool {
        p.x.abs() <= self.half_length - margin && p.y.abs() <= self.half_width - margin
    }

    pub fn our_goal(&self) -> Vec2 {
        Vec2::new(-self.half_length, 0.0)
    }

    pub fn their_goal(&self) -> Vec2 {
        Vec2::new(self.half_length, 0.0)
    }

    pub fn in_our_penalty_area(&self, p: Vec2) -> bool {
        p.x <= -self.half_length + self.penalty_area_length
            && p.x >= -self.half_length
            && p.y.abs() <= self.penalty_area_half_width
    }

    pub fn in_their_penalty_area(&self, p: Vec2) -> bool {
        p.x >= self.half_length - self.penalty_area_length
            && p.x <= self.half_length
            && p.y.abs() <= self.penalty_area_half_width
    }

    pub fn in_center_circle(&self, p: Vec2) -> bool {
        p.length() < self.center_circle_radius
    }

    /// Clamp a point into the pitch shrunk by `margin`
    pub fn clamp(&self, p: Vec2, margin: f64) -> Vec2 {
        let hl = (self.half_length - margin).max(0.0);
        let hw = (self.half_width - margin).max(0.0);
        Vec2::new(p.x.clamp(-hl, hl), p.y.clamp(-hw, hw))
    }
}
