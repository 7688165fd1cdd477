//! Reach-time oracle
//!
//! The controlled agent is simulated: turn-dash first (forward, plus reverse
//! when allowed), escalating to omni-dash only when the escalation policy asks
//! for it and the cycle budget allows. Other agents get a closed-form
//! estimate from the dash distance table plus a turn estimate, adjusted for
//! how long ago they were last seen.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tracing::debug;

use crate::metrics::Metrics;
use crate::model::agent::AgentView;
use crate::model::time::GameTime;
use crate::search::budget::CycleBudget;
use crate::search::cache::CycleCache;
use crate::util::normalize_angle;

use super::omni_dash::OmniDashSimulator;
use super::turn_dash::simulate_turn_dash;
use super::{cone_angle, QueryKey, ReachConfig, ReachQuery, ReachResult, ReachStrategy, RiskPosture};

/// Per-agent reach oracle owning the single-cycle result cache
#[derive(Debug)]
pub struct ReachOracle {
    config: ReachConfig,
    cache: CycleCache<QueryKey, ReachResult>,
    time: GameTime,
    omni_allowed: bool,
    metrics: Arc<Metrics>,
}

impl ReachOracle {
    pub fn new(config: ReachConfig) -> Self {
        Self::with_metrics(config, Arc::new(Metrics::new()))
    }

    pub fn with_metrics(config: ReachConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            config,
            cache: CycleCache::new(),
            time: GameTime::default(),
            omni_allowed: true,
            metrics,
        }
    }

    pub fn config(&self) -> &ReachConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn time(&self) -> GameTime {
        self.time
    }

    /// Start a decision cycle: cached results from other times are dropped and
    /// omni-dash is skipped while the cycle budget is tight
    pub fn begin_cycle(&mut self, time: GameTime, budget: &CycleBudget) {
        if self.cache.begin_cycle(time) {
            debug!(cycle = time.cycle, stopped = time.stopped, "reach cache invalidated");
        }
        self.time = time;
        self.omni_allowed = budget.status().allows_omni_dash();
    }

    /// Reach estimate for the controlled agent, cached for the current cycle
    ///
    /// The cache is keyed by query only, so it must be fed the same agent
    /// snapshot for the whole cycle.
    pub fn self_reach(&mut self, agent: &AgentView, query: &ReachQuery) -> ReachResult {
        Metrics::incr(&self.metrics.reach_queries);
        let key = query.key();
        if let Some(hit) = self.cache.get(self.time, &key) {
            Metrics::incr(&self.metrics.reach_cache_hits);
            return hit;
        }

        let result = simulate_self(&self.config, agent, query, self.omni_allowed, Some(self.metrics.as_ref()));
        if !result.is_reachable() {
            Metrics::incr(&self.metrics.unreachable_results);
        }
        self.cache.insert(self.time, key, result);
        result
    }

    /// Closed-form reach estimate for an agent whose commands are not observed
    pub fn other_reach(&self, agent: &AgentView, query: &ReachQuery, posture: RiskPosture) -> ReachResult {
        Metrics::incr(&self.metrics.estimated_queries);
        estimate_other_reach(&self.config, agent, query, posture)
    }
}

/// Uncached reach estimate for the controlled agent
pub fn estimate_reach_cycles(config: &ReachConfig, agent: &AgentView, query: &ReachQuery) -> ReachResult {
    simulate_self(config, agent, query, true, None)
}

fn simulate_self(
    config: &ReachConfig,
    agent: &AgentView,
    query: &ReachQuery,
    omni_allowed: bool,
    metrics: Option<&Metrics>,
) -> ReachResult {
    bump(metrics, |m| &m.turn_dash_runs);
    let mut best = simulate_turn_dash(config, agent, query, false);
    if best.strategy == ReachStrategy::Arrived {
        return best;
    }

    if query.allow_back_dash {
        bump(metrics, |m| &m.turn_dash_runs);
        let back = simulate_turn_dash(config, agent, query, true);
        if back.is_better_than(&best) {
            best = back;
        }
    }

    if omni_allowed && config.omni_escalation.should_escalate(&best, query.race_deadline) {
        // Omni-dash only matters if it strictly beats turn-dash
        let limit = best
            .total_cycles()
            .map_or(query.max_cycles, |total| total.saturating_sub(1).min(query.max_cycles));
        if limit > 0 {
            bump(metrics, |m| &m.omni_dash_runs);
            let omni = OmniDashSimulator::new(agent.model, config).simulate_within(agent, query, limit);
            debug!(
                turn_dash = ?best.total_cycles(),
                omni_dash = ?omni.total_cycles(),
                deadline = ?query.race_deadline,
                "omni-dash escalation"
            );
            if omni.is_better_than(&best) {
                bump(metrics, |m| &m.omni_dash_wins);
                best = omni;
            }
        }
    }

    best
}

fn bump(metrics: Option<&Metrics>, counter: impl FnOnce(&Metrics) -> &AtomicU64) {
    if let Some(m) = metrics {
        Metrics::incr(counter(m));
    }
}

/// Turn cycles needed before the body points into the tolerance cone
///
/// `None` when the cone cannot be reached within `max_turns`, including
/// when the agent has no turning moment at all.
fn estimate_turn_cycles(
    config: &ReachConfig,
    agent: &AgentView,
    dist: f64,
    tolerance: f64,
    target_dir: f64,
    max_turns: u32,
) -> Option<u32> {
    if agent.body_count > config.body_unknown_age {
        return Some(1);
    }

    let model = agent.model;
    let cone = cone_angle(dist, tolerance, config.min_cone_angle);
    let mut gap = normalize_angle(target_dir - agent.body_angle).abs();
    let mut speed = agent.velocity.length();
    let mut n = 0;
    while gap > cone {
        let turn = model.max_turn(speed);
        if n >= max_turns || turn <= f64::EPSILON {
            return None;
        }
        gap -= turn;
        speed *= model.decay();
        n += 1;
    }
    Some(n)
}

/// Dash table distance plus estimated turns, shifted by the observation age
pub fn estimate_other_reach(
    config: &ReachConfig,
    agent: &AgentView,
    query: &ReachQuery,
    posture: RiskPosture,
) -> ReachResult {
    let rel = query.target - agent.position;
    let dist = rel.length();
    if dist <= query.tolerance {
        return ReachResult::arrived(agent);
    }

    let Some(n_turn) = estimate_turn_cycles(config, agent, dist, query.tolerance, rel.direction(), query.max_cycles)
    else {
        return ReachResult::unreachable(agent, ReachStrategy::Estimated);
    };
    let n_dash = agent.model.cycles_to_reach_distance(dist - query.tolerance);
    let discount = agent.pos_count.min(config.stale_discount_cap);
    let base = n_turn + n_dash;
    let total = match posture {
        RiskPosture::Cautious => base.saturating_sub(discount),
        RiskPosture::Neutral => base,
        RiskPosture::Bold => base + discount,
    };

    if total > query.max_cycles {
        return ReachResult::unreachable(agent, ReachStrategy::Estimated);
    }

    let turn_cycles = n_turn.min(total);
    ReachResult {
        turn_cycles,
        dash_cycles: Some(total - turn_cycles),
        final_stamina: agent.stamina,
        first_dash_power: agent.model.server().max_dash_power,
        first_dash_dir: 0.0,
        final_body_angle: rel.direction(),
        final_position: query.target,
        strategy: ReachStrategy::Estimated,
    }
}
