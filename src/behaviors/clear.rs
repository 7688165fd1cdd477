//! Clearing the ball out of danger
//!
//! Kick targets fan out from the ball toward the opponent half. A target is
//! good when the ball gets there well before any opponent and lands far from
//! our goal.

use serde::Serialize;

use crate::model::agent::AgentView;
use crate::model::constants::behavior::{LINE_CUT_DISTANCE, OPPONENT_SIGMA};
use crate::model::field::FieldGeometry;
use crate::model::params::ServerParams;
use crate::reach::oracle::ReachOracle;
use crate::reach::{ReachQuery, RiskPosture};
use crate::search::filter::{Exclusion, FilterSet};
use crate::search::generator::{AngularFan, CandidateSource};
use crate::search::scoring::{opponent_proximity_penalty, race_margin_bonus};
use crate::search::{Candidate, CandidateSearch, Evaluation};
use crate::util::{geometric_sum, vec2::Vec2};

const FAN_HALF_SPAN: f64 = 75.0;
const FAN_ANGLE_STEP: f64 = 15.0;
const FAN_FIRST_RADIUS: f64 = 10.0;
const FAN_RADIAL_STEP: f64 = 5.0;
const FAN_MAX_RADIUS: f64 = 35.0;
const RACE_WEIGHT: f64 = 2.0;
const RACE_RATE: f64 = 0.3;
const ADVANCE_WEIGHT: f64 = 0.02;

#[derive(Debug, Clone, Copy)]
pub struct ClearSituation<'a> {
    pub ball: Vec2,
    pub opponents: &'a [AgentView<'a>],
    pub field: FieldGeometry,
    pub server: &'a ServerParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearAux {
    pub ball_cycles: u32,
    pub opponent_cycles: Option<u32>,
}

/// Cycles a full-speed kick needs to cover `dist`, `None` if it stops short
pub fn ball_travel_cycles(server: &ServerParams, dist: f64, max_cycles: u32) -> Option<u32> {
    (0..=max_cycles).find(|&n| server.ball_speed_max * geometric_sum(server.ball_decay, n) >= dist)
}

pub fn find_clear_target(
    oracle: &ReachOracle,
    search: &mut CandidateSearch,
    situation: &ClearSituation,
) -> Option<Candidate<ClearAux>> {
    let s = situation;
    let fan = AngularFan {
        origin: s.ball,
        base_angle: 0.0,
        half_span: FAN_HALF_SPAN,
        angle_step: FAN_ANGLE_STEP,
        first_radius: FAN_FIRST_RADIUS,
        radial_step: FAN_RADIAL_STEP,
        radial_growth: 1.0,
        max_radius: FAN_MAX_RADIUS,
    };

    let filters = FilterSet::new(s.field)
        .with(Exclusion::OutsidePitch { margin: 1.0 })
        .with(Exclusion::OurPenaltyArea);
    let filter = |p: Vec2| {
        filters.accepts(p)
            && !s
                .opponents
                .iter()
                .any(|o| s.ball.segment_distance_to(p, o.position) < LINE_CUT_DISTANCE)
    };

    let opponent_positions: Vec<Vec2> = s.opponents.iter().map(|o| o.position).collect();
    let max_cycles = search.limits().max_reach_cycles;

    let mut scorer = |point: Vec2| {
        let ball_cycles = ball_travel_cycles(s.server, s.ball.distance_to(point), max_cycles)?;
        let query = ReachQuery::new(point, 1.0, max_cycles);
        let opponent_cycles = s
            .opponents
            .iter()
            .filter_map(|o| oracle.other_reach(o, &query, RiskPosture::Cautious).total_cycles())
            .min();

        let race = opponent_cycles.map_or(1.0, |opp| race_margin_bonus(ball_cycles, opp, RACE_RATE));
        let score = RACE_WEIGHT * race + ADVANCE_WEIGHT * (point.x - s.ball.x)
            - opponent_proximity_penalty(point, &opponent_positions, OPPONENT_SIGMA);

        Some(Evaluation::new(
            score,
            ClearAux {
                ball_cycles,
                opponent_cycles,
            },
        ))
    };

    search.run_with_metrics(fan.candidates(), filter, &mut scorer, Some(oracle.metrics().as_ref()))
}
