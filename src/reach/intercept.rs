//! Ball intercept search
//!
//! Predicts the ball's free-rolling path and scans it for the first step at
//! which an agent can get the ball into its kickable area.

use serde::{Deserialize, Serialize};

use crate::model::agent::AgentView;
use crate::model::params::ServerParams;
use crate::util::{geometric_sum, vec2::Vec2};

use super::oracle::ReachOracle;
use super::{ReachQuery, ReachResult, RiskPosture};

/// Ball position and velocity at the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BallState {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl BallState {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
        }
    }

    /// Ball position after `step` cycles of free rolling
    #[inline]
    pub fn position_at(&self, step: u32, decay: f64) -> Vec2 {
        self.position + self.velocity * geometric_sum(decay, step)
    }

    #[inline]
    pub fn velocity_at(&self, step: u32, decay: f64) -> Vec2 {
        self.velocity * decay.powi(step as i32)
    }

    /// Predicted positions for steps `0..=max_steps`
    pub fn path(&self, server: &ServerParams, max_steps: u32) -> Vec<Vec2> {
        let velocity = self.velocity.clamp_length(server.ball_speed_max);
        let start = BallState::new(self.position, velocity);
        (0..=max_steps)
            .map(|step| start.position_at(step, server.ball_decay))
            .collect()
    }

    /// Where the ball comes to rest
    pub fn final_position(&self, decay: f64) -> Vec2 {
        if decay >= 1.0 {
            return self.position;
        }
        self.position + self.velocity * (1.0 / (1.0 - decay))
    }
}

/// First step at which an agent can play the ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intercept {
    pub step: u32,
    pub ball_position: Vec2,
    pub reach: ReachResult,
}

impl ReachOracle {
    /// Earliest intercept for the controlled agent within `max_steps`
    ///
    /// Each step races the agent against the ball, so it doubles as the
    /// omni-dash escalation deadline.
    pub fn self_intercept(&mut self, agent: &AgentView, ball: &BallState, max_steps: u32) -> Option<Intercept> {
        let tolerance = agent.model.kickable_area();
        let path = ball.path(agent.model.server(), max_steps);
        for (step, &ball_position) in path.iter().enumerate() {
            let step = step as u32;
            let query = ReachQuery::new(ball_position, tolerance, step)
                .with_back_dash(true)
                .with_deadline(step);
            let reach = self.self_reach(agent, &query);
            if reach.total_cycles().is_some_and(|n| n <= step) {
                return Some(Intercept {
                    step,
                    ball_position,
                    reach,
                });
            }
        }
        None
    }

    /// Earliest intercept estimate for another agent within `max_steps`
    pub fn other_intercept(
        &self,
        agent: &AgentView,
        ball: &BallState,
        max_steps: u32,
        posture: RiskPosture,
    ) -> Option<Intercept> {
        let tolerance = agent.model.kickable_area();
        let path = ball.path(agent.model.server(), max_steps);
        for (step, &ball_position) in path.iter().enumerate() {
            let step = step as u32;
            let query = ReachQuery::new(ball_position, tolerance, step);
            let reach = self.other_reach(agent, &query, posture);
            if reach.total_cycles().is_some_and(|n| n <= step) {
                return Some(Intercept {
                    step,
                    ball_position,
                    reach,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::PlayerModel;
    use crate::model::time::GameTime;
    use crate::reach::ReachConfig;
    use crate::search::budget::CycleBudget;

    fn oracle() -> ReachOracle {
        let mut oracle = ReachOracle::new(ReachConfig::default());
        oracle.begin_cycle(GameTime::new(1, 0), &CycleBudget::default());
        oracle
    }

    #[test]
    fn test_ball_path() {
        let sp = ServerParams::default();
        let ball = BallState::new(Vec2::ZERO, Vec2::new(2.0, 0.0));
        let path = ball.path(&sp, 3);
        assert_eq!(path.len(), 4);
        assert!(path[0].approx_eq(Vec2::ZERO, 1e-12));
        assert!(path[1].approx_eq(Vec2::new(2.0, 0.0), 1e-12));
        assert!(path[2].approx_eq(Vec2::new(3.88, 0.0), 1e-9));
        assert!((ball.velocity_at(2, sp.ball_decay).x - 2.0 * 0.94 * 0.94).abs() < 1e-12);
    }

    #[test]
    fn test_path_clamps_speed() {
        let sp = ServerParams::default();
        let ball = BallState::new(Vec2::ZERO, Vec2::new(10.0, 0.0));
        let path = ball.path(&sp, 1);
        assert!((path[1].x - sp.ball_speed_max).abs() < 1e-12);
    }

    #[test]
    fn test_final_position() {
        let ball = BallState::new(Vec2::ZERO, Vec2::new(1.2, 0.0));
        assert!(ball.final_position(0.94).approx_eq(Vec2::new(20.0, 0.0), 1e-9));
    }

    #[test]
    fn test_ball_at_feet_is_step_zero() {
        let model = PlayerModel::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let ball = BallState::new(Vec2::new(0.5, 0.0), Vec2::new(0.1, 0.0));
        let intercept = oracle().self_intercept(&agent, &ball, 30).unwrap();
        assert_eq!(intercept.step, 0);
        assert_eq!(intercept.reach.total_cycles(), Some(0));
    }

    #[test]
    fn test_ball_rolling_toward_agent() {
        let model = PlayerModel::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let ball = BallState::new(Vec2::new(10.0, 0.0), Vec2::new(-1.5, 0.0));
        let intercept = oracle().self_intercept(&agent, &ball, 30).unwrap();
        assert!(intercept.step > 0);
        assert!(intercept.step < 8);
        assert!(intercept.reach.total_cycles().unwrap() <= intercept.step);
    }

    #[test]
    fn test_fast_ball_away_is_missed() {
        let model = PlayerModel::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let ball = BallState::new(Vec2::new(3.0, 0.0), Vec2::new(3.0, 0.0));
        assert!(oracle().self_intercept(&agent, &ball, 10).is_none());
    }

    #[test]
    fn test_other_intercept_posture() {
        let model = PlayerModel::default();
        let opponent = AgentView::new(&model, Vec2::new(0.0, 5.0), Vec2::ZERO, -90.0)
            .with_observation_age(3, 3, 0);
        let ball = BallState::new(Vec2::new(-5.0, 0.0), Vec2::new(1.0, 0.0));
        let oracle = oracle();

        let cautious = oracle.other_intercept(&opponent, &ball, 30, RiskPosture::Cautious).unwrap();
        let bold = oracle.other_intercept(&opponent, &ball, 30, RiskPosture::Bold).unwrap();
        assert!(cautious.step <= bold.step);
    }
}
