//! Turn-then-dash reach simulation
//!
//! The agent first turns until its body (or its back, for reverse dashes)
//! points into the tolerance cone around the target, then dashes along that
//! axis. For each candidate dash count the per-cycle power is solved from the
//! geometric velocity series so the agent would stop on the target exactly at
//! the end of the plan. The first plan that gets the agent inside the
//! tolerance circle, onto the target's projection on the dash axis, or past
//! it, wins.

use tracing::trace;

use crate::model::agent::{AgentView, KinematicState};
use crate::model::constants::reach::DIST_EPS;
use crate::model::player::PlayerModel;
use crate::model::stamina::{safety_dash_power, StaminaState};
use crate::util::{geometric_sum, normalize_angle, vec2::Vec2};

use super::kinematics::{apply_dash, apply_inertia, apply_turn};
use super::{cone_angle, dash_lower_bound, ReachConfig, ReachQuery, ReachResult, ReachStrategy};

/// Required acceleration below this counts as a stalled plan
const ACCEL_EPS: f64 = 1.0e-4;

/// Simulate turning toward the target then dashing forward, or with
/// `back_dash`, turning away from it and dashing in reverse
pub fn simulate_turn_dash(
    config: &ReachConfig,
    agent: &AgentView,
    query: &ReachQuery,
    back_dash: bool,
) -> ReachResult {
    let model = agent.model;
    let target = query.target;
    let tolerance = query.tolerance;
    let strategy = if back_dash {
        ReachStrategy::BackDash
    } else {
        ReachStrategy::TurnDash
    };

    if agent.position.distance_to(target) <= tolerance + DIST_EPS {
        return ReachResult::arrived(agent);
    }

    let mut state = agent.kinematic_state();
    let mut stamina = agent.stamina;
    let mut n_turn = 0u32;

    loop {
        let rel = target - state.position;
        let dist = rel.length();
        if dist <= tolerance + DIST_EPS {
            // Drifted in while turning
            return ReachResult {
                turn_cycles: n_turn,
                dash_cycles: Some(0),
                final_stamina: stamina,
                first_dash_power: 0.0,
                first_dash_dir: 0.0,
                final_body_angle: state.body_angle,
                final_position: state.position,
                strategy,
            };
        }

        let axis = if back_dash {
            rel.direction() + 180.0
        } else {
            rel.direction()
        };
        let diff = normalize_angle(axis - state.body_angle);
        if diff.abs() <= cone_angle(dist, tolerance, config.min_cone_angle) {
            break;
        }
        if n_turn >= query.max_cycles {
            return ReachResult::unreachable(agent, strategy);
        }

        let moment = model.moment_for_turn(diff, state.velocity.length());
        state = apply_turn(model, &state, moment);
        stamina.simulate_wait(model);
        n_turn += 1;
    }

    let budget = query.max_cycles - n_turn;
    let dist = state.position.distance_to(target);
    let lower = dash_lower_bound(model.real_speed_max(), dist, tolerance);

    for n_dash in lower..=budget {
        if let Some(run) = run_dash_plan(config, model, &state, &stamina, query, n_dash, back_dash) {
            trace!(
                turn = n_turn,
                dash = run.cycles,
                plan = n_dash,
                back_dash,
                "turn-dash plan reached target"
            );
            return ReachResult {
                turn_cycles: n_turn,
                dash_cycles: Some(run.cycles),
                final_stamina: run.stamina,
                first_dash_power: run.first_power,
                first_dash_dir: 0.0,
                final_body_angle: run.state.body_angle,
                final_position: run.state.position,
                strategy,
            };
        }
    }

    ReachResult::unreachable(agent, strategy)
}

struct DashRun {
    cycles: u32,
    state: KinematicState,
    stamina: StaminaState,
    first_power: f64,
}

/// Dash along the body axis for `n_dash` cycles, aiming to stop on the target
fn run_dash_plan(
    config: &ReachConfig,
    model: &PlayerModel,
    start: &KinematicState,
    start_stamina: &StaminaState,
    query: &ReachQuery,
    n_dash: u32,
    back_dash: bool,
) -> Option<DashRun> {
    let target = query.target;
    let reach = query.tolerance + DIST_EPS;
    let decay = model.decay();
    let sp = model.server();

    let axis_angle = if back_dash {
        start.body_angle + 180.0
    } else {
        start.body_angle
    };
    let axis = Vec2::polar(1.0, axis_angle);

    let mut state = *start;
    let mut stamina = *start_stamina;
    let mut first_power = None;
    let mut prev_dist = state.position.distance_to(target);

    for step in 0..n_dash {
        let remaining = n_dash - step;
        let along = (target - state.position).dot(axis);
        let required_vel = along / geometric_sum(decay, remaining);
        let required_accel = required_vel - state.velocity.dot(axis);

        if required_accel <= ACCEL_EPS {
            // Inertia alone carries the agent onto the target's projection
            let (k, state, stamina) = coast(model, state, stamina, target, reach, remaining);
            return Some(DashRun {
                cycles: step + k,
                state,
                stamina,
                first_power: first_power.unwrap_or(0.0),
            });
        }

        let mut power = (required_accel / model.accel_rate(stamina.effort, 0.0)).min(sp.max_dash_power);
        if back_dash {
            power = (-power).max(sp.min_dash_power);
        }
        let power = safety_dash_power(model, &stamina, power, config.stamina_buffer);
        first_power.get_or_insert(power);

        let prev_pos = state.position;
        (state, stamina) = apply_dash(model, &state, &stamina, power, 0.0);

        let dist = state.position.distance_to(target);
        let passed = dist > prev_dist
            && (prev_pos.segment_distance_to(state.position, target) <= reach
                || (target - state.position).dot(axis) <= 0.0);
        if dist <= reach || passed {
            return Some(DashRun {
                cycles: step + 1,
                state,
                stamina,
                first_power: first_power.unwrap_or(power),
            });
        }
        prev_dist = dist;
    }

    None
}

/// Drift without dashing for at most `cycles`, stopping early if the
/// trajectory enters the tolerance circle
fn coast(
    model: &PlayerModel,
    mut state: KinematicState,
    mut stamina: StaminaState,
    target: Vec2,
    reach: f64,
    cycles: u32,
) -> (u32, KinematicState, StaminaState) {
    for k in 1..=cycles {
        let prev = state.position;
        state = apply_inertia(model, &state);
        stamina.simulate_wait(model);
        if prev.segment_distance_to(state.position, target) <= reach {
            return (k, state, stamina);
        }
    }
    (cycles, state, stamina)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::params::{PlayerTypeParams, ServerParams};

    fn config() -> ReachConfig {
        ReachConfig::default()
    }

    #[test]
    fn test_straight_ahead_run() {
        let model = PlayerModel::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let query = ReachQuery::new(Vec2::new(10.0, 0.0), 1.0, 50);
        let result = simulate_turn_dash(&config(), &agent, &query, false);

        assert_eq!(result.turn_cycles, 0);
        // 9.334 metres after ten full-power dashes, 8.334 after nine
        assert_eq!(result.dash_cycles, Some(10));
        assert_eq!(result.first_dash_power, 100.0);
        assert_eq!(result.strategy, ReachStrategy::TurnDash);
        assert!(result.final_position.distance_to(query.target) <= 1.0);
    }

    #[test]
    fn test_target_behind_needs_turn() {
        let model = PlayerModel::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let query = ReachQuery::new(Vec2::new(-10.0, 0.0), 1.0, 50);

        let forward = simulate_turn_dash(&config(), &agent, &query, false);
        assert_eq!(forward.turn_cycles, 1);
        assert_eq!(forward.dash_cycles, Some(10));
        assert!((forward.final_body_angle.abs() - 180.0).abs() < 1e-9);

        let back = simulate_turn_dash(&config(), &agent, &query, true);
        assert_eq!(back.turn_cycles, 0);
        assert_eq!(back.dash_cycles, Some(10));
        assert!(back.first_dash_power < 0.0);
        assert!(back.total_cycles() <= forward.total_cycles());
        assert!(back.final_stamina.stamina < forward.final_stamina.stamina);
    }

    #[test]
    fn test_within_tolerance_is_trivial() {
        let model = PlayerModel::default();
        let mut stamina = StaminaState::full(&model);
        stamina.stamina = 3210.0;
        let agent = AgentView::new(&model, Vec2::new(5.0, 5.0), Vec2::new(0.8, -0.3), 45.0)
            .with_stamina(stamina);
        let query = ReachQuery::new(Vec2::new(5.5, 5.0), 1.0, 10);

        for back_dash in [false, true] {
            let result = simulate_turn_dash(&config(), &agent, &query, back_dash);
            assert_eq!(result.turn_cycles, 0);
            assert_eq!(result.dash_cycles, Some(0));
            assert_eq!(result.final_stamina, stamina);
        }
    }

    #[test]
    fn test_unreachable_within_budget() {
        let model = PlayerModel::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let query = ReachQuery::new(Vec2::new(30.0, 0.0), 1.0, 10);
        let result = simulate_turn_dash(&config(), &agent, &query, false);
        assert!(!result.is_reachable());
        assert_eq!(result.total_cycles(), None);
    }

    #[test]
    fn test_zero_budget_with_turn_needed() {
        let model = PlayerModel::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let query = ReachQuery::new(Vec2::new(0.0, 5.0), 1.0, 0);
        assert!(!simulate_turn_dash(&config(), &agent, &query, false).is_reachable());
    }

    #[test]
    fn test_larger_tolerance_never_slower() {
        let model = PlayerModel::default();
        let agent = AgentView::new(&model, Vec2::new(-3.0, 2.0), Vec2::new(0.2, 0.1), 30.0);
        let target = Vec2::new(12.0, 6.0);

        let mut previous = u32::MAX;
        for tolerance in [0.5, 1.0, 2.0, 4.0] {
            let query = ReachQuery::new(target, tolerance, 50);
            let total = simulate_turn_dash(&config(), &agent, &query, false)
                .total_cycles()
                .unwrap();
            assert!(total <= previous, "tolerance {} took {}", tolerance, total);
            previous = total;
        }
    }

    #[test]
    fn test_more_dash_power_never_slower() {
        let weak = PlayerModel::new(
            PlayerTypeParams::default(),
            ServerParams {
                max_dash_power: 60.0,
                ..Default::default()
            },
        );
        let strong = PlayerModel::default();
        let query = ReachQuery::new(Vec2::new(15.0, 4.0), 1.0, 50);

        let slow = simulate_turn_dash(
            &config(),
            &AgentView::new(&weak, Vec2::ZERO, Vec2::ZERO, 0.0),
            &query,
            false,
        );
        let fast = simulate_turn_dash(
            &config(),
            &AgentView::new(&strong, Vec2::ZERO, Vec2::ZERO, 0.0),
            &query,
            false,
        );
        assert!(fast.total_cycles().unwrap() <= slow.total_cycles().unwrap());
    }

    #[test]
    fn test_low_stamina_never_faster() {
        let model = PlayerModel::default();
        let fresh = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        let mut tired_stamina = StaminaState::full(&model);
        tired_stamina.stamina = 2450.0;
        let tired = fresh.with_stamina(tired_stamina);
        let query = ReachQuery::new(Vec2::new(30.0, 0.0), 1.0, 400);

        let fresh_total = simulate_turn_dash(&config(), &fresh, &query, false)
            .total_cycles()
            .unwrap();
        let tired_result = simulate_turn_dash(&config(), &tired, &query, false);
        // Safety power caps the first dash near the sustainable recovery
        assert!(tired_result.first_dash_power < 100.0);
        assert!(tired_result.total_cycles().unwrap() > fresh_total);
    }

    #[test]
    fn test_moving_agent_overshoot_counts_as_reached() {
        let model = PlayerModel::default();
        // Running at top speed toward a point just ahead
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::new(1.0, 0.0), 0.0);
        let query = ReachQuery::new(Vec2::new(1.5, 0.0), 0.3, 10);
        let result = simulate_turn_dash(&config(), &agent, &query, false);
        assert!(result.is_reachable());
        assert!(result.total_cycles().unwrap() <= 2);
    }

    #[test]
    fn test_lateral_offset_inside_cone_stops_on_projection() {
        let model = PlayerModel::default();
        let agent = AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 0.0);
        // About 11 degrees off the body axis, inside the 15 degree cone floor
        let query = ReachQuery::new(Vec2::new(10.0, 2.0), 0.5, 50);
        let result = simulate_turn_dash(&config(), &agent, &query, false);

        assert!(result.is_reachable());
        assert_eq!(result.turn_cycles, 0);
        // The run ends on the target's projection onto the dash axis
        assert!((result.final_position.x - 10.0).abs() < 1e-3);
        assert!(result.final_position.y.abs() < 1e-9);
        assert!(result.final_position.distance_to(query.target) > query.tolerance);
    }
}
