//! Generate, filter, score and select
//!
//! A search runs the four phases in order within one decision cycle. Filters
//! run before any scoring so the reach simulators only see survivors. The
//! best candidate is the first one with the highest score; later candidates
//! replace it only when strictly better.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::metrics::Metrics;
use crate::search::budget::{BudgetStatus, CycleBudget};
use crate::model::constants::search::{MAX_CANDIDATES, NO_SOLUTION_SCORE};
use crate::util::vec2::Vec2;

/// Candidates generated beyond this are dropped before filtering
pub const MAX_GENERATED: usize = 4096;

/// A scored point plus whatever the scorer wants to hand back
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<A> {
    pub point: Vec2,
    pub score: f64,
    /// Position in generation order
    pub index: usize,
    pub aux: A,
}

/// Scorer output for one point
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation<A> {
    pub score: f64,
    pub aux: A,
}

impl<A> Evaluation<A> {
    pub fn new(score: f64, aux: A) -> Self {
        Self { score, aux }
    }
}

impl Evaluation<()> {
    pub fn score(score: f64) -> Self {
        Self { score, aux: () }
    }
}

/// Scores candidate points; `None` rejects the point outright
pub trait Scorer {
    type Aux;

    fn score(&mut self, point: Vec2) -> Option<Evaluation<Self::Aux>>;
}

impl<A, F> Scorer for F
where
    F: FnMut(Vec2) -> Option<Evaluation<A>>,
{
    type Aux = A;

    fn score(&mut self, point: Vec2) -> Option<Evaluation<A>> {
        self(point)
    }
}

/// Ceilings that keep a search inside the cycle budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Most candidates scored per search
    pub max_candidates: usize,
    /// Most candidates generated per search
    pub max_generated: usize,
    /// Reach horizon scorers should use
    pub max_reach_cycles: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_candidates: MAX_CANDIDATES,
            max_generated: MAX_GENERATED,
            max_reach_cycles: crate::model::constants::reach::MAX_CYCLES,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SearchPhase {
    #[default]
    Generate,
    Filter,
    Score,
    Select,
}

/// Counters for the most recent search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub phase: SearchPhase,
    pub generated: usize,
    pub filtered_out: usize,
    pub scored: usize,
    /// Scored but rejected: `None`, NaN or at/below the no-solution score
    pub rejected: usize,
    /// Survivors left unscored by the candidate ceiling
    pub truncated: usize,
}

/// Reusable candidate search
#[derive(Debug, Default)]
pub struct CandidateSearch {
    limits: SearchLimits,
    budget_status: BudgetStatus,
    stats: SearchStats,
}

impl CandidateSearch {
    pub fn new(limits: SearchLimits) -> Self {
        Self {
            limits,
            budget_status: BudgetStatus::default(),
            stats: SearchStats::default(),
        }
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Follow the cycle budget: the candidate ceiling shrinks while cycles
    /// run tight or over budget
    pub fn apply_budget(&mut self, budget: &CycleBudget) {
        self.budget_status = budget.status();
    }

    /// Candidate ceiling after budget scaling
    pub fn max_candidates(&self) -> usize {
        self.budget_status.scale_candidates(self.limits.max_candidates)
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Run one search, reporting counts into `metrics` when given
    pub fn run_with_metrics<S: Scorer>(
        &mut self,
        source: impl IntoIterator<Item = Vec2>,
        filter: impl FnMut(Vec2) -> bool,
        scorer: &mut S,
        metrics: Option<&Metrics>,
    ) -> Option<Candidate<S::Aux>> {
        let best = self.run(source, filter, scorer);
        if let Some(m) = metrics {
            Metrics::incr(&m.searches);
            Metrics::add(&m.candidates_generated, self.stats.generated as u64);
            Metrics::add(&m.candidates_filtered, self.stats.filtered_out as u64);
            Metrics::add(&m.candidates_scored, self.stats.scored as u64);
            if best.is_none() {
                Metrics::incr(&m.searches_without_result);
            }
        }
        best
    }

    pub fn run<S: Scorer>(
        &mut self,
        source: impl IntoIterator<Item = Vec2>,
        mut filter: impl FnMut(Vec2) -> bool,
        scorer: &mut S,
    ) -> Option<Candidate<S::Aux>> {
        self.stats = SearchStats::default();

        // Generate
        let generated: Vec<(usize, Vec2)> = source
            .into_iter()
            .take(self.limits.max_generated)
            .enumerate()
            .collect();
        self.stats.generated = generated.len();

        // Filter
        self.stats.phase = SearchPhase::Filter;
        let survivors: Vec<(usize, Vec2)> = generated.into_iter().filter(|&(_, p)| filter(p)).collect();
        self.stats.filtered_out = self.stats.generated - survivors.len();

        // Score
        self.stats.phase = SearchPhase::Score;
        let max_candidates = self.max_candidates();
        self.stats.truncated = survivors.len().saturating_sub(max_candidates);
        let mut best: Option<Candidate<S::Aux>> = None;
        for (index, point) in survivors.into_iter().take(max_candidates) {
            self.stats.scored += 1;
            let Some(eval) = scorer.score(point) else {
                self.stats.rejected += 1;
                continue;
            };
            if eval.score.is_nan() || eval.score <= NO_SOLUTION_SCORE {
                self.stats.rejected += 1;
                continue;
            }
            trace!(index, x = point.x, y = point.y, score = eval.score, "candidate scored");
            if best.as_ref().map_or(true, |b| eval.score > b.score) {
                best = Some(Candidate {
                    point,
                    score: eval.score,
                    index,
                    aux: eval.aux,
                });
            }
        }

        // Select
        self.stats.phase = SearchPhase::Select;
        debug!(
            generated = self.stats.generated,
            filtered_out = self.stats.filtered_out,
            scored = self.stats.scored,
            truncated = self.stats.truncated,
            rejected = self.stats.rejected,
            found = best.is_some(),
            "candidate search finished"
        );
        best
    }
}

/// One-shot search with default limits
pub fn find_best_candidate<S: Scorer>(
    source: impl IntoIterator<Item = Vec2>,
    mut scorer: S,
    filter: impl FnMut(Vec2) -> bool,
) -> Option<Candidate<S::Aux>> {
    CandidateSearch::new(SearchLimits::default()).run(source, filter, &mut scorer)
}
