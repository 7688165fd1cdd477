//! Prometheus-compatible counters for the decision core
//!
//! Counts reach simulations, cache behaviour and candidate searches so a host
//! process can expose them next to its own metrics. Rendering only; serving
//! the text is left to the host.

#[cfg(feature = "metrics_extended")]
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[cfg(feature = "metrics_extended")]
use parking_lot::RwLock;
use serde::Serialize;

/// Samples kept for cycle-time percentiles
#[cfg(feature = "metrics_extended")]
const CYCLE_HISTORY_LEN: usize = 1000;

/// Metrics registry shared by the oracle and the candidate search
#[derive(Debug)]
pub struct Metrics {
    // Reach oracle
    pub reach_queries: AtomicU64,
    pub reach_cache_hits: AtomicU64,
    pub turn_dash_runs: AtomicU64,
    pub omni_dash_runs: AtomicU64,
    /// Omni-dash beat turn-dash
    pub omni_dash_wins: AtomicU64,
    pub estimated_queries: AtomicU64,
    pub unreachable_results: AtomicU64,

    // Candidate search
    pub searches: AtomicU64,
    pub searches_without_result: AtomicU64,
    pub candidates_generated: AtomicU64,
    pub candidates_filtered: AtomicU64,
    pub candidates_scored: AtomicU64,

    // Decision cycle timing (microseconds)
    pub cycle_count: AtomicU64,
    pub cycle_time_us: AtomicU64,
    pub cycle_time_p95_us: AtomicU64,
    pub cycle_time_p99_us: AtomicU64,
    pub cycle_time_max_us: AtomicU64,
    pub budget_overruns: AtomicU64,

    #[cfg(feature = "metrics_extended")]
    cycle_history: RwLock<VecDeque<u64>>,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub reach_queries: u64,
    pub reach_cache_hits: u64,
    pub turn_dash_runs: u64,
    pub omni_dash_runs: u64,
    pub omni_dash_wins: u64,
    pub estimated_queries: u64,
    pub unreachable_results: u64,
    pub searches: u64,
    pub searches_without_result: u64,
    pub candidates_generated: u64,
    pub candidates_filtered: u64,
    pub candidates_scored: u64,
    pub cycle_count: u64,
    pub cycle_time_p95_us: u64,
    pub cycle_time_p99_us: u64,
    pub cycle_time_max_us: u64,
    pub budget_overruns: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            reach_queries: AtomicU64::new(0),
            reach_cache_hits: AtomicU64::new(0),
            turn_dash_runs: AtomicU64::new(0),
            omni_dash_runs: AtomicU64::new(0),
            omni_dash_wins: AtomicU64::new(0),
            estimated_queries: AtomicU64::new(0),
            unreachable_results: AtomicU64::new(0),
            searches: AtomicU64::new(0),
            searches_without_result: AtomicU64::new(0),
            candidates_generated: AtomicU64::new(0),
            candidates_filtered: AtomicU64::new(0),
            candidates_scored: AtomicU64::new(0),
            cycle_count: AtomicU64::new(0),
            cycle_time_us: AtomicU64::new(0),
            cycle_time_p95_us: AtomicU64::new(0),
            cycle_time_p99_us: AtomicU64::new(0),
            cycle_time_max_us: AtomicU64::new(0),
            budget_overruns: AtomicU64::new(0),
            #[cfg(feature = "metrics_extended")]
            cycle_history: RwLock::new(VecDeque::with_capacity(CYCLE_HISTORY_LEN)),
        }
    }

    #[inline]
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Record one decision cycle's wall time and refresh the percentiles
    pub fn record_cycle_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.cycle_time_us.store(us, Ordering::Relaxed);
        self.cycle_time_max_us.fetch_max(us, Ordering::Relaxed);
        self.cycle_count.fetch_add(1, Ordering::Relaxed);

        #[cfg(feature = "metrics_extended")]
        self.record_percentiles(us);
    }

    #[cfg(feature = "metrics_extended")]
    fn record_percentiles(&self, us: u64) {
        let mut history = self.cycle_history.write();
        history.push_back(us);
        while history.len() > CYCLE_HISTORY_LEN {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f64 * 0.95) as usize;
            let p99_idx = (sorted.len() as f64 * 0.99) as usize;

            self.cycle_time_p95_us
                .store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.cycle_time_p99_us
                .store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            reach_queries: load(&self.reach_queries),
            reach_cache_hits: load(&self.reach_cache_hits),
            turn_dash_runs: load(&self.turn_dash_runs),
            omni_dash_runs: load(&self.omni_dash_runs),
            omni_dash_wins: load(&self.omni_dash_wins),
            estimated_queries: load(&self.estimated_queries),
            unreachable_results: load(&self.unreachable_results),
            searches: load(&self.searches),
            searches_without_result: load(&self.searches_without_result),
            candidates_generated: load(&self.candidates_generated),
            candidates_filtered: load(&self.candidates_filtered),
            candidates_scored: load(&self.candidates_scored),
            cycle_count: load(&self.cycle_count),
            cycle_time_p95_us: load(&self.cycle_time_p95_us),
            cycle_time_p99_us: load(&self.cycle_time_p99_us),
            cycle_time_max_us: load(&self.cycle_time_max_us),
            budget_overruns: load(&self.budget_overruns),
        }
    }

    /// Prometheus text exposition format
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        let s = self.snapshot();

        metric!("soccer_reach_queries_total", "Reach queries for the controlled agent", "counter", s.reach_queries);
        metric!("soccer_reach_cache_hits_total", "Reach queries answered from the cycle cache", "counter", s.reach_cache_hits);
        metric!("soccer_reach_turn_dash_runs_total", "Turn-dash simulations run", "counter", s.turn_dash_runs);
        metric!("soccer_reach_omni_dash_runs_total", "Omni-dash simulations run", "counter", s.omni_dash_runs);
        metric!("soccer_reach_omni_dash_wins_total", "Omni-dash results that beat turn-dash", "counter", s.omni_dash_wins);
        metric!("soccer_reach_estimated_total", "Closed-form estimates for other agents", "counter", s.estimated_queries);
        metric!("soccer_reach_unreachable_total", "Queries unreachable within budget", "counter", s.unreachable_results);

        metric!("soccer_search_total", "Candidate searches run", "counter", s.searches);
        metric!("soccer_search_empty_total", "Searches that found no candidate", "counter", s.searches_without_result);
        metric!("soccer_search_generated_total", "Candidates generated", "counter", s.candidates_generated);
        metric!("soccer_search_filtered_total", "Candidates rejected by filters", "counter", s.candidates_filtered);
        metric!("soccer_search_scored_total", "Candidates scored", "counter", s.candidates_scored);

        metric!("soccer_cycle_count", "Decision cycles timed", "counter", s.cycle_count);
        metric!("soccer_cycle_time_microseconds", "Last decision cycle time", "gauge",
            self.cycle_time_us.load(Ordering::Relaxed));
        metric!("soccer_cycle_time_p95_microseconds", "95th percentile decision cycle time", "gauge", s.cycle_time_p95_us);
        metric!("soccer_cycle_time_p99_microseconds", "99th percentile decision cycle time", "gauge", s.cycle_time_p99_us);
        metric!("soccer_cycle_time_max_microseconds", "Maximum decision cycle time", "gauge", s.cycle_time_max_us);
        metric!("soccer_cycle_budget_overruns_total", "Decision cycles over the wall-clock budget", "counter", s.budget_overruns);

        output
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
