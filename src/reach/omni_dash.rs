//! Omni-directional dash reach simulation
//!
//! The agent never turns. Each cycle it picks, among a fixed set of dash
//! directions relative to its body, the dash that leaves it closest to the
//! target, with power solved from the velocity it would need to stop on the
//! target at the end of the plan.

use smallvec::SmallVec;
use tracing::trace;

use crate::model::agent::{AgentView, KinematicState};
use crate::model::constants::reach::DIST_EPS;
use crate::model::player::PlayerModel;
use crate::model::stamina::{safety_dash_power, StaminaState};
use crate::util::{geometric_sum, vec2::Vec2};

use super::kinematics::{apply_dash, dash_accel};
use super::{dash_lower_bound, ReachConfig, ReachQuery, ReachResult, ReachStrategy};

/// Finest direction step accepted, degrees
const MIN_ANGLE_STEP: f64 = 1.0;

/// One candidate dash direction relative to the body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashDirection {
    pub dir: f64,
    pub rate: f64,
}

/// A chosen dash command and the distance to target it leaves
#[derive(Debug, Clone, Copy, PartialEq)]
struct DashChoice {
    power: f64,
    dir: f64,
    dist: f64,
}

pub struct OmniDashSimulator<'a> {
    model: &'a PlayerModel,
    config: &'a ReachConfig,
    directions: SmallVec<[DashDirection; 32]>,
}

impl<'a> OmniDashSimulator<'a> {
    /// Directions are ordered 0, +step, -step, +2 step, ... so ties favour
    /// dashing closer to straight ahead
    pub fn new(model: &'a PlayerModel, config: &'a ReachConfig) -> Self {
        let step = config.omni_angle_step.max(MIN_ANGLE_STEP);
        let mut directions = SmallVec::new();
        directions.push(DashDirection {
            dir: 0.0,
            rate: model.dir_rate(0.0),
        });

        let mut k = 1.0;
        while k * step < 180.0 - 1.0e-9 {
            let dir = k * step;
            directions.push(DashDirection {
                dir,
                rate: model.dir_rate(dir),
            });
            directions.push(DashDirection {
                dir: -dir,
                rate: model.dir_rate(-dir),
            });
            k += 1.0;
        }
        directions.push(DashDirection {
            dir: 180.0,
            rate: model.dir_rate(180.0),
        });

        Self {
            model,
            config,
            directions,
        }
    }

    pub fn directions(&self) -> &[DashDirection] {
        &self.directions
    }

    pub fn simulate(&self, agent: &AgentView, query: &ReachQuery) -> ReachResult {
        self.simulate_within(agent, query, query.max_cycles)
    }

    /// Smallest cycle count up to `max_cycles` that reaches the target
    pub fn simulate_within(&self, agent: &AgentView, query: &ReachQuery, max_cycles: u32) -> ReachResult {
        let dist = agent.position.distance_to(query.target);
        if dist <= query.tolerance + DIST_EPS {
            return ReachResult::arrived(agent);
        }

        let lower = dash_lower_bound(self.model.real_speed_max(), dist, 0.0);
        for n in lower..=max_cycles {
            if let Some(result) = self.run_plan(agent, query, n) {
                trace!(plan = n, cycles = ?result.dash_cycles, "omni-dash plan reached target");
                return result;
            }
        }

        ReachResult::unreachable(agent, ReachStrategy::OmniDash)
    }

    fn run_plan(&self, agent: &AgentView, query: &ReachQuery, n: u32) -> Option<ReachResult> {
        let model = self.model;
        let target = query.target;
        let reach = query.tolerance + DIST_EPS;

        let mut state = agent.kinematic_state();
        let mut stamina = agent.stamina;
        let mut first: Option<(f64, f64)> = None;

        for step in 0..n {
            let remaining = n - step;
            let required_vel = (target - state.position) * (1.0 / geometric_sum(model.decay(), remaining));
            let required_accel = required_vel - state.velocity;

            let (power, dir) = self
                .best_dash(&state, &stamina, required_accel, target, query.allow_back_dash)
                .map_or((0.0, 0.0), |c| (c.power, c.dir));
            first.get_or_insert((power, dir));

            let prev = state.position;
            (state, stamina) = apply_dash(model, &state, &stamina, power, dir);

            if state.position.distance_to(target) <= reach
                || prev.segment_distance_to(state.position, target) <= reach
            {
                let (first_power, first_dir) = first.unwrap_or((power, dir));
                return Some(ReachResult {
                    turn_cycles: 0,
                    dash_cycles: Some(step + 1),
                    final_stamina: stamina,
                    first_dash_power: first_power,
                    first_dash_dir: first_dir,
                    final_body_angle: state.body_angle,
                    final_position: state.position,
                    strategy: ReachStrategy::OmniDash,
                });
            }
        }

        None
    }

    /// Dash that leaves the agent nearest the target; `None` means coast
    fn best_dash(
        &self,
        state: &KinematicState,
        stamina: &StaminaState,
        required_accel: Vec2,
        target: Vec2,
        allow_back_dash: bool,
    ) -> Option<DashChoice> {
        let model = self.model;
        let sp = model.server();
        let effort = stamina.effort;
        let mut best: Option<DashChoice> = None;

        for d in &self.directions {
            let unit = Vec2::polar(1.0, state.body_angle + d.dir);
            let projected = required_accel.dot(unit);
            let accel_rate = model.dash_power_rate() * effort * d.rate;
            if accel_rate <= f64::EPSILON {
                continue;
            }

            let mut options: SmallVec<[f64; 2]> = SmallVec::new();
            if projected > 0.0 {
                options.push((projected / accel_rate).min(sp.max_dash_power));
            }
            if allow_back_dash && sp.min_dash_power < 0.0 && projected < 0.0 {
                options.push((projected / accel_rate).max(sp.min_dash_power));
            }

            for power in options {
                let power = safety_dash_power(model, stamina, power, self.config.stamina_buffer);
                if power == 0.0 {
                    continue;
                }
                let accel = dash_accel(model, state.body_angle, effort, power, d.dir);
                let velocity = (state.velocity + accel).clamp_length(model.speed_max());
                let dist = (state.position + velocity).distance_to(target);
                if best.map_or(true, |b| dist < b.dist) {
                    best = Some(DashChoice {
                        power,
                        dir: d.dir,
                        dist,
                    });
                }
            }
        }

        best
    }
}

/// Convenience wrapper building a one-shot simulator
pub fn simulate_omni_dash(config: &ReachConfig, agent: &AgentView, query: &ReachQuery) -> ReachResult {
    OmniDashSimulator::new(agent.model, config).simulate(agent, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reach::turn_dash::simulate_turn_dash;

    #[test]
    fn test_direction_table() {
        let model = PlayerModel::default();
        let config = ReachConfig::default();
        let sim = OmniDashSimulator::new(&model, &config);
        let dirs = sim.directions();

        // 0, 11 pairs, 180
        assert_eq!(dirs.len(), 24);
        assert_eq!(dirs[0].dir, 0.0);
        assert_eq!(dirs[1].dir, 15.0);
        assert_eq!(dirs[2].dir, -15.0);
        assert_eq!(dirs.last().map(|d| d.dir), Some(180.0));
        assert!((dirs[0].rate - 1.0).abs() < 1e-12);
        assert!((dirs.last().map_or(0.0, |d| d.rate) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_straight_ahead_matches_turn_dash() {
        let model = PlayerModel::default();
        let config = ReachConfig::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let query = ReachQuery::new(Vec2::new(10.0, 0.0), 1.0, 50);

        let omni = simulate_omni_dash(&config, &agent, &query);
        assert_eq!(omni.turn_cycles, 0);
        assert_eq!(omni.dash_cycles, Some(10));
        assert_eq!(omni.first_dash_dir, 0.0);
        assert_eq!(omni.strategy, ReachStrategy::OmniDash);
    }

    #[test]
    fn test_sideways_target_without_turning() {
        let model = PlayerModel::default();
        let config = ReachConfig::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let query = ReachQuery::new(Vec2::new(0.0, 3.0), 0.5, 50);

        let omni = simulate_omni_dash(&config, &agent, &query);
        assert!(omni.is_reachable());
        assert_eq!(omni.turn_cycles, 0);
        assert_eq!(omni.final_body_angle, 0.0);
        assert!(omni.first_dash_dir > 0.0);
    }

    #[test]
    fn test_back_dash_only_when_allowed() {
        let model = PlayerModel::default();
        let config = ReachConfig::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let query = ReachQuery::new(Vec2::new(-4.0, 0.0), 0.5, 50);

        let forward_only = simulate_omni_dash(&config, &agent, &query);
        assert!(forward_only.first_dash_power >= 0.0);

        let with_back = simulate_omni_dash(&config, &agent, &query.with_back_dash(true));
        // Reverse power at dir 0 keeps the full rate, beating a 0.6 rate dash at 180
        assert!(with_back.first_dash_power < 0.0);
        assert!(with_back.total_cycles().unwrap() <= forward_only.total_cycles().unwrap());
    }

    #[test]
    fn test_within_budget_limit() {
        let model = PlayerModel::default();
        let config = ReachConfig::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let query = ReachQuery::new(Vec2::new(10.0, 0.0), 1.0, 50);
        let sim = OmniDashSimulator::new(&model, &config);

        assert!(!sim.simulate_within(&agent, &query, 9).is_reachable());
        assert_eq!(sim.simulate_within(&agent, &query, 10).dash_cycles, Some(10));
    }

    #[test]
    fn test_never_uses_stamina_below_safety() {
        let model = PlayerModel::default();
        let config = ReachConfig::default();
        let mut stamina = StaminaState::full(&model);
        stamina.stamina = 2450.0;
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0).with_stamina(stamina);
        let query = ReachQuery::new(Vec2::new(6.0, 0.0), 0.5, 100);

        let omni = simulate_omni_dash(&config, &agent, &query);
        assert!(omni.first_dash_power <= 50.0 + 1e-9);
    }

    #[test]
    fn test_close_diagonal_compares_with_turn_dash() {
        let model = PlayerModel::default();
        let config = ReachConfig::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::new(0.3, 0.0), 0.0);
        let query = ReachQuery::new(Vec2::new(2.0, 1.5), 0.5, 30);

        let omni = simulate_omni_dash(&config, &agent, &query);
        let turn_dash = simulate_turn_dash(&config, &agent, &query, false);
        assert!(omni.is_reachable());
        assert!(turn_dash.is_reachable());
    }
}
