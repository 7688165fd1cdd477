//! Pass-receive positioning
//!
//! Fans out around the receiver and picks a spot the receiver can reach
//! before any opponent, with a clear line from the ball.

use serde::Serialize;

use crate::model::agent::AgentView;
use crate::model::constants::behavior::{LINE_CUT_DISTANCE, MOVE_TOLERANCE, OPPONENT_SIGMA};
use crate::model::field::FieldGeometry;
use crate::reach::oracle::ReachOracle;
use crate::reach::{ReachQuery, RiskPosture};
use crate::search::filter::{Exclusion, FilterSet};
use crate::search::generator::{AngularFan, CandidateSource};
use crate::search::scoring::{goal_distance_term, opponent_proximity_penalty, race_margin_bonus};
use crate::search::{Candidate, CandidateSearch, Evaluation};
use crate::util::vec2::Vec2;

const FAN_ANGLE_STEP: f64 = 30.0;
const FAN_RADIAL_STEP: f64 = 2.0;
const FAN_MAX_RADIUS: f64 = 10.0;
/// Receive points closer than this to the ball are useless passes
const MIN_PASS_DISTANCE: f64 = 3.0;
const GOAL_WEIGHT: f64 = 0.05;
const CYCLE_WEIGHT: f64 = 0.02;
const RACE_RATE: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct ReceiveSituation<'a> {
    pub me: AgentView<'a>,
    pub ball: Vec2,
    pub opponents: &'a [AgentView<'a>],
    pub field: FieldGeometry,
    pub offside_x: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReceiveAux {
    pub self_cycles: u32,
    /// Fastest opponent, `None` when no opponent can get there in time
    pub opponent_cycles: Option<u32>,
}

pub fn find_receive_point(
    oracle: &mut ReachOracle,
    search: &mut CandidateSearch,
    situation: &ReceiveSituation,
) -> Option<Candidate<ReceiveAux>> {
    let s = situation;
    let fan = AngularFan::around(s.me.position, FAN_ANGLE_STEP, 0.0, FAN_RADIAL_STEP, FAN_MAX_RADIUS);

    let filters = FilterSet::new(s.field)
        .with(Exclusion::OutsidePitch { margin: 1.0 })
        .with(Exclusion::BeyondOffsideLine { x: s.offside_x })
        .with(Exclusion::NearPoint {
            point: s.ball,
            radius: MIN_PASS_DISTANCE,
        });
    let filter = |p: Vec2| {
        filters.accepts(p)
            && !s
                .opponents
                .iter()
                .any(|o| s.ball.segment_distance_to(p, o.position) < LINE_CUT_DISTANCE)
    };

    let opponent_positions: Vec<Vec2> = s.opponents.iter().map(|o| o.position).collect();
    let max_cycles = search.limits().max_reach_cycles;
    let metrics = oracle.metrics().clone();

    let mut scorer = |point: Vec2| {
        let query = ReachQuery::new(point, MOVE_TOLERANCE, max_cycles);
        let self_cycles = oracle.self_reach(&s.me, &query).total_cycles()?;
        let opponent_cycles = s
            .opponents
            .iter()
            .filter_map(|o| oracle.other_reach(o, &query, RiskPosture::Cautious).total_cycles())
            .min();

        let race = match opponent_cycles {
            Some(opp) if opp <= self_cycles => return None,
            Some(opp) => race_margin_bonus(self_cycles, opp, RACE_RATE),
            None => 1.0,
        };
        let score = race + goal_distance_term(point, s.field.their_goal(), GOAL_WEIGHT)
            - opponent_proximity_penalty(point, &opponent_positions, OPPONENT_SIGMA)
            - CYCLE_WEIGHT * self_cycles as f64;

        Some(Evaluation::new(
            score,
            ReceiveAux {
                self_cycles,
                opponent_cycles,
            },
        ))
    };

    search.run_with_metrics(fan.candidates(), filter, &mut scorer, Some(metrics.as_ref()))
}
