//! Server and player-type parameter sets
//!
//! Both are plain data loaded once from configuration. Derived values live in
//! [`PlayerModel`](super::player::PlayerModel).

use serde::{Deserialize, Serialize};

use super::constants::{player, server};

/// Simulator server parameters that affect agent kinematics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerParams {
    pub max_dash_power: f64,
    pub min_dash_power: f64,
    pub max_moment: f64,
    pub min_moment: f64,
    pub dash_angle_step: f64,
    pub side_dash_rate: f64,
    pub back_dash_rate: f64,

    pub stamina_max: f64,
    pub stamina_capacity: f64,
    pub recover_dec_thr: f64,
    pub recover_dec: f64,
    pub recover_min: f64,
    pub effort_dec_thr: f64,
    pub effort_dec: f64,
    pub effort_inc_thr: f64,
    pub effort_inc: f64,

    pub ball_decay: f64,
    pub ball_speed_max: f64,
    pub ball_size: f64,
}

impl Default for ServerParams {
    fn default() -> Self {
        Self {
            max_dash_power: server::MAX_DASH_POWER,
            min_dash_power: server::MIN_DASH_POWER,
            max_moment: server::MAX_MOMENT,
            min_moment: server::MIN_MOMENT,
            dash_angle_step: server::DASH_ANGLE_STEP,
            side_dash_rate: server::SIDE_DASH_RATE,
            back_dash_rate: server::BACK_DASH_RATE,
            stamina_max: server::STAMINA_MAX,
            stamina_capacity: server::STAMINA_CAPACITY,
            recover_dec_thr: server::RECOVER_DEC_THR,
            recover_dec: server::RECOVER_DEC,
            recover_min: server::RECOVER_MIN,
            effort_dec_thr: server::EFFORT_DEC_THR,
            effort_dec: server::EFFORT_DEC,
            effort_inc_thr: server::EFFORT_INC_THR,
            effort_inc: server::EFFORT_INC,
            ball_decay: server::BALL_DECAY,
            ball_speed_max: server::BALL_SPEED_MAX,
            ball_size: server::BALL_SIZE,
        }
    }
}

impl ServerParams {
    /// Stamina level below which recovery decays
    #[inline]
    pub fn recover_dec_thr_value(&self) -> f64 {
        self.recover_dec_thr * self.stamina_max
    }

    #[inline]
    pub fn clamp_dash_power(&self, power: f64) -> f64 {
        power.clamp(self.min_dash_power, self.max_dash_power)
    }

    #[inline]
    pub fn clamp_moment(&self, moment: f64) -> f64 {
        moment.clamp(self.min_moment, self.max_moment)
    }

    /// Snap a dash direction onto the server's angle grid, in (-180, 180]
    pub fn discretize_dash_angle(&self, dir: f64) -> f64 {
        let dir = crate::util::normalize_angle(dir);
        if self.dash_angle_step <= f64::EPSILON {
            return dir;
        }
        crate::util::normalize_angle((dir / self.dash_angle_step).round() * self.dash_angle_step)
    }

    /// Dash efficiency for a direction relative to the body
    ///
    /// Linear from 1.0 at 0 degrees to `side_dash_rate` at 90 degrees, then to
    /// `back_dash_rate` at 180 degrees. Symmetric about the body axis.
    pub fn dash_dir_rate(&self, dir: f64) -> f64 {
        let abs_dir = crate::util::normalize_angle(dir).abs();
        if abs_dir > 90.0 {
            self.back_dash_rate
                - (self.back_dash_rate - self.side_dash_rate) * (1.0 - (abs_dir - 90.0) / 90.0)
        } else {
            self.side_dash_rate + (1.0 - self.side_dash_rate) * (1.0 - abs_dir / 90.0)
        }
    }
}

/// Per player-type physical parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTypeParams {
    pub id: i32,
    pub player_speed_max: f64,
    pub stamina_inc_max: f64,
    pub player_decay: f64,
    pub inertia_moment: f64,
    pub dash_power_rate: f64,
    pub player_size: f64,
    pub kickable_margin: f64,
    pub extra_stamina: f64,
    pub effort_max: f64,
    pub effort_min: f64,
}

impl Default for PlayerTypeParams {
    fn default() -> Self {
        Self {
            id: 0,
            player_speed_max: player::PLAYER_SPEED_MAX,
            stamina_inc_max: player::STAMINA_INC_MAX,
            player_decay: player::PLAYER_DECAY,
            inertia_moment: player::INERTIA_MOMENT,
            dash_power_rate: player::DASH_POWER_RATE,
            player_size: player::PLAYER_SIZE,
            kickable_margin: player::KICKABLE_MARGIN,
            extra_stamina: player::EXTRA_STAMINA,
            effort_max: player::EFFORT_MAX,
            effort_min: player::EFFORT_MIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_dir_rate_curve() {
        let sp = ServerParams::default();
        assert!((sp.dash_dir_rate(0.0) - 1.0).abs() < 1e-12);
        assert!((sp.dash_dir_rate(90.0) - sp.side_dash_rate).abs() < 1e-12);
        assert!((sp.dash_dir_rate(180.0) - sp.back_dash_rate).abs() < 1e-12);
        assert!((sp.dash_dir_rate(45.0) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_dash_dir_rate_symmetric() {
        let sp = ServerParams::default();
        for dir in [15.0, 60.0, 100.0, 135.0, 170.0] {
            assert!((sp.dash_dir_rate(dir) - sp.dash_dir_rate(-dir)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_discretize_dash_angle() {
        let sp = ServerParams {
            dash_angle_step: 45.0,
            ..Default::default()
        };
        assert_eq!(sp.discretize_dash_angle(30.0), 45.0);
        assert_eq!(sp.discretize_dash_angle(-100.0), -90.0);
        assert_eq!(sp.discretize_dash_angle(179.0), 180.0);
        assert_eq!(sp.discretize_dash_angle(-179.0), 180.0);
    }

    #[test]
    fn test_clamps() {
        let sp = ServerParams::default();
        assert_eq!(sp.clamp_dash_power(150.0), 100.0);
        assert_eq!(sp.clamp_dash_power(-150.0), -100.0);
        assert_eq!(sp.clamp_moment(-500.0), -180.0);
        assert!((sp.recover_dec_thr_value() - 2400.0).abs() < 1e-9);
    }

    #[test]
    fn test_params_deserialize_partial() {
        let params: PlayerTypeParams =
            serde_json::from_str(r#"{ "id": 3, "player_decay": 0.45 }"#).unwrap();
        assert_eq!(params.id, 3);
        assert_eq!(params.player_decay, 0.45);
        assert_eq!(params.dash_power_rate, player::DASH_POWER_RATE);
    }
}
