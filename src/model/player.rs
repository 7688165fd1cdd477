//! Immutable per player-type physical model
//!
//! Combines [`PlayerTypeParams`] with the [`ServerParams`] it runs under and
//! precomputes the tables the reach simulators query every cycle.

use crate::util::{geometric_sum, normalize_angle, vec2::Vec2};

use super::constants::player::DASH_TABLE_SIZE;
use super::params::{PlayerTypeParams, ServerParams};

/// Physical model of one player type
#[derive(Debug, Clone)]
pub struct PlayerModel {
    params: PlayerTypeParams,
    server: ServerParams,
    real_speed_max: f64,
    kickable_area: f64,
    /// Cumulative distance covered by full-power dashes from rest, index i = after i+1 dashes
    dash_distance_table: Vec<f64>,
    /// Dash direction efficiency sampled at `dash_angle_step` from -180 degrees
    dir_rate_table: Vec<f64>,
}

impl PlayerModel {
    pub fn new(params: PlayerTypeParams, server: ServerParams) -> Self {
        let accel_max = server.max_dash_power * params.dash_power_rate * params.effort_max;
        let real_speed_max = if params.player_decay < 1.0 {
            (accel_max / (1.0 - params.player_decay)).min(params.player_speed_max)
        } else {
            params.player_speed_max
        };

        let mut dash_distance_table = Vec::with_capacity(DASH_TABLE_SIZE);
        let mut speed = 0.0;
        let mut dist = 0.0;
        for _ in 0..DASH_TABLE_SIZE {
            speed = (speed + accel_max).min(params.player_speed_max);
            dist += speed;
            dash_distance_table.push(dist);
            speed *= params.player_decay;
        }

        let dir_rate_table = if server.dash_angle_step > f64::EPSILON {
            let steps = (360.0 / server.dash_angle_step).round() as usize;
            (0..=steps)
                .map(|i| server.dash_dir_rate(-180.0 + i as f64 * server.dash_angle_step))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            kickable_area: params.player_size + params.kickable_margin + server.ball_size,
            params,
            server,
            real_speed_max,
            dash_distance_table,
            dir_rate_table,
        }
    }

    #[inline]
    pub fn params(&self) -> &PlayerTypeParams {
        &self.params
    }

    #[inline]
    pub fn server(&self) -> &ServerParams {
        &self.server
    }

    #[inline]
    pub fn decay(&self) -> f64 {
        self.params.player_decay
    }

    #[inline]
    pub fn dash_power_rate(&self) -> f64 {
        self.params.dash_power_rate
    }

    #[inline]
    pub fn speed_max(&self) -> f64 {
        self.params.player_speed_max
    }

    /// Highest speed reachable by sustained full-power forward dashes
    #[inline]
    pub fn real_speed_max(&self) -> f64 {
        self.real_speed_max
    }

    #[inline]
    pub fn kickable_area(&self) -> f64 {
        self.kickable_area
    }

    /// Dash efficiency for a direction relative to the body, from the discretized table
    pub fn dir_rate(&self, dir: f64) -> f64 {
        if self.dir_rate_table.is_empty() {
            return self.server.dash_dir_rate(dir);
        }
        let dir = normalize_angle(dir);
        let idx = ((dir + 180.0) / self.server.dash_angle_step).round() as usize;
        self.dir_rate_table[idx.min(self.dir_rate_table.len() - 1)]
    }

    /// Acceleration produced per unit of dash power
    #[inline]
    pub fn accel_rate(&self, effort: f64, dir: f64) -> f64 {
        self.params.dash_power_rate * effort * self.dir_rate(dir)
    }

    /// Rotation achieved by a turn command at the given speed
    #[inline]
    pub fn effective_turn(&self, moment: f64, speed: f64) -> f64 {
        self.server.clamp_moment(moment) / (1.0 + self.params.inertia_moment * speed)
    }

    /// Largest rotation achievable in one cycle at the given speed
    #[inline]
    pub fn max_turn(&self, speed: f64) -> f64 {
        self.effective_turn(self.server.max_moment, speed)
    }

    /// Moment needed to rotate by `angle` at the given speed, clamped to the server range
    #[inline]
    pub fn moment_for_turn(&self, angle: f64, speed: f64) -> f64 {
        self.server
            .clamp_moment(angle * (1.0 + self.params.inertia_moment * speed))
    }

    /// Cycles of full-power dashing from rest needed to cover `dist`
    pub fn cycles_to_reach_distance(&self, dist: f64) -> u32 {
        if dist <= 0.0 {
            return 0;
        }
        let idx = self.dash_distance_table.partition_point(|&d| d < dist);
        if idx < self.dash_distance_table.len() {
            return idx as u32 + 1;
        }
        let covered = self.dash_distance_table.last().copied().unwrap_or(0.0);
        let extra = ((dist - covered) / self.real_speed_max.max(f64::EPSILON)).ceil();
        self.dash_distance_table.len() as u32 + extra as u32
    }

    /// Displacement produced by inertia alone over `cycles`
    #[inline]
    pub fn inertia_travel(&self, velocity: Vec2, cycles: u32) -> Vec2 {
        velocity * geometric_sum(self.params.player_decay, cycles)
    }
}

impl Default for PlayerModel {
    fn default() -> Self {
        Self::new(PlayerTypeParams::default(), ServerParams::default())
    }
}
