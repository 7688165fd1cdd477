use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

use super::player::PlayerModel;
use super::stamina::StaminaState;

/// Position, velocity and body direction of an agent at one cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KinematicState {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Degrees, (-180, 180]
    pub body_angle: f64,
}

impl KinematicState {
    pub fn new(position: Vec2, velocity: Vec2, body_angle: f64) -> Self {
        Self {
            position,
            velocity,
            body_angle,
        }
    }
}

/// Read-only snapshot of one agent as the world model reports it
///
/// The observation ages count cycles since each quantity was last seen;
/// 0 means observed this cycle.
#[derive(Debug, Clone, Copy)]
pub struct AgentView<'a> {
    pub model: &'a PlayerModel,
    pub position: Vec2,
    pub velocity: Vec2,
    pub body_angle: f64,
    pub stamina: StaminaState,
    pub pos_count: u32,
    pub vel_count: u32,
    pub body_count: u32,
}

impl<'a> AgentView<'a> {
    /// Fully observed agent with full stamina
    pub fn new(model: &'a PlayerModel, position: Vec2, velocity: Vec2, body_angle: f64) -> Self {
        Self {
            model,
            position,
            velocity,
            body_angle,
            stamina: StaminaState::full(model),
            pos_count: 0,
            vel_count: 0,
            body_count: 0,
        }
    }

    pub fn with_stamina(mut self, stamina: StaminaState) -> Self {
        self.stamina = stamina;
        self
    }

    pub fn with_observation_age(mut self, pos_count: u32, vel_count: u32, body_count: u32) -> Self {
        self.pos_count = pos_count;
        self.vel_count = vel_count;
        self.body_count = body_count;
        self
    }

    #[inline]
    pub fn kinematic_state(&self) -> KinematicState {
        KinematicState::new(self.position, self.velocity, self.body_angle)
    }

    /// Where inertia alone carries the agent after `cycles`
    #[inline]
    pub fn inertia_point(&self, cycles: u32) -> Vec2 {
        self.position + self.model.inertia_travel(self.velocity, cycles)
    }
}
