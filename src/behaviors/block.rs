//! Blocking an opponent dribbler
//!
//! Samples the dribbler's line toward our goal and takes the earliest point
//! on it that we reach no later than the dribbler does.

use serde::Serialize;

use crate::model::agent::AgentView;
use crate::model::constants::behavior::MOVE_TOLERANCE;
use crate::model::field::FieldGeometry;
use crate::reach::oracle::ReachOracle;
use crate::reach::{ReachQuery, RiskPosture};
use crate::search::filter::{Exclusion, FilterSet};
use crate::search::generator::{CandidateSource, PointCloud};
use crate::search::{Candidate, CandidateSearch, Evaluation};
use crate::util::vec2::Vec2;

/// Spacing of block points along the dribble line
const BLOCK_STEP: f64 = 1.0;
const MAX_BLOCK_DISTANCE: f64 = 30.0;

#[derive(Debug, Clone, Copy)]
pub struct BlockSituation<'a> {
    pub me: AgentView<'a>,
    pub dribbler: AgentView<'a>,
    pub field: FieldGeometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockAux {
    pub self_cycles: u32,
    pub dribbler_cycles: u32,
}

/// Points from the dribbler toward the centre of our goal, nearest first
pub fn dribble_line(dribbler: Vec2, field: &FieldGeometry) -> PointCloud {
    let goal = field.our_goal();
    let span = dribbler.distance_to(goal).min(MAX_BLOCK_DISTANCE);
    let dir = (goal - dribbler).normalize();
    let steps = (span / BLOCK_STEP).floor() as usize;
    (1..=steps)
        .map(|i| dribbler + dir * (i as f64 * BLOCK_STEP))
        .collect()
}

pub fn find_block_point(
    oracle: &mut ReachOracle,
    search: &mut CandidateSearch,
    situation: &BlockSituation,
) -> Option<Candidate<BlockAux>> {
    let s = situation;
    let line = dribble_line(s.dribbler.position, &s.field);
    let filters = FilterSet::new(s.field).with(Exclusion::OutsidePitch { margin: 0.0 });

    let max_cycles = search.limits().max_reach_cycles;
    let metrics = oracle.metrics().clone();

    let mut scorer = |point: Vec2| {
        let query = ReachQuery::new(point, MOVE_TOLERANCE, max_cycles);
        let dribbler_cycles = oracle
            .other_reach(&s.dribbler, &query, RiskPosture::Neutral)
            .total_cycles()
            .unwrap_or(max_cycles);
        let self_cycles = oracle.self_reach(&s.me, &query).total_cycles()?;
        if self_cycles > dribbler_cycles {
            return None;
        }
        // Earlier interception first, then less running
        let score = -(dribbler_cycles as f64) - 0.01 * self_cycles as f64;
        Some(Evaluation::new(
            score,
            BlockAux {
                self_cycles,
                dribbler_cycles,
            },
        ))
    };

    search.run_with_metrics(line.candidates(), filters.as_predicate(), &mut scorer, Some(metrics.as_ref()))
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
    fn test_dribble_line() {
        let field = FieldGeometry::default();
        let line = dribble_line(Vec2::new(-42.5, 0.0), &field);
        assert_eq!(line.0.len(), 10);
        assert!(line.0[0].approx_eq(Vec2::new(-43.5, 0.0), 1e-9));
        assert!(line.0[9].approx_eq(field.our_goal(), 1e-9));

        let long = dribble_line(Vec2::new(10.0, 0.0), &field);
        assert_eq!(long.0.len(), 30);
    }

    #[test]
    fn test_block_in_front_of_dribbler() {
        let model = PlayerModel::default();
        let situation = BlockSituation {
            me: AgentView::new(&model, Vec2::new(-15.0, 3.0), Vec2::ZERO, 180.0),
            dribbler: AgentView::new(&model, Vec2::ZERO, Vec2::ZERO, 180.0),
            field: FieldGeometry::default(),
        };
        let mut oracle = oracle();
        let mut search = CandidateSearch::default();

        let best = find_block_point(&mut oracle, &mut search, &situation).unwrap();
        assert!(best.point.x < 0.0 && best.point.x > -30.0);
        assert!(best.aux.self_cycles <= best.aux.dribbler_cycles);
    }

    #[test]
    fn test_too_far_behind_to_block() {
        let model = PlayerModel::default();
        let situation = BlockSituation {
            me: AgentView::new(&model, Vec2::new(30.0, 30.0), Vec2::ZERO, 0.0),
            dribbler: AgentView::new(&model, Vec2::new(-35.0, 0.0), Vec2::ZERO, 180.0),
            field: FieldGeometry::default(),
        };
        let mut oracle = oracle();
        let mut search = CandidateSearch::default();

        assert!(find_block_point(&mut oracle, &mut search, &situation).is_none());
        assert_eq!(search.stats().generated, 17);
    }
}
