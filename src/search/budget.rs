//! Wall-clock budget tracking for decision cycles
//!
//! Tracks recent decision-cycle durations against the per-cycle budget and
//! provides signals for:
//! - Omni-dash escalation (skipped once cycles run tight)
//! - Candidate ceilings (shrunk while over budget)

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::metrics::Metrics;
use crate::model::constants::search::CYCLE_BUDGET_MS;

/// Budget pressure levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BudgetStatus {
    /// Well under budget
    #[default]
    Relaxed,
    Normal,
    /// Close to the budget, skip optional work
    Tight,
    /// Over budget on average
    Overrun,
}

impl BudgetStatus {
    pub fn allows_omni_dash(&self) -> bool {
        matches!(self, BudgetStatus::Relaxed | BudgetStatus::Normal)
    }

    /// Multiplier applied to candidate ceilings
    pub fn candidate_scale(&self) -> f64 {
        match self {
            BudgetStatus::Relaxed | BudgetStatus::Normal => 1.0,
            BudgetStatus::Tight => 0.5,
            BudgetStatus::Overrun => 0.25,
        }
    }

    /// Scale a candidate ceiling by this pressure, never below 1
    pub fn scale_candidates(&self, max_candidates: usize) -> usize {
        ((max_candidates as f64 * self.candidate_scale()) as usize).max(1)
    }
}

/// Rolling monitor of decision-cycle durations
#[derive(Debug)]
pub struct CycleBudget {
    durations: VecDeque<Duration>,
    max_samples: usize,
    budget: Duration,
    /// Below this fraction of budget = relaxed
    relaxed_threshold: f64,
    /// Above this fraction of budget = tight
    tight_threshold: f64,
    /// Above this fraction of budget = overrun
    overrun_threshold: f64,
    status: BudgetStatus,
    cycle_start: Option<Instant>,
}

impl CycleBudget {
    pub fn new(budget: Duration) -> Self {
        Self {
            durations: VecDeque::with_capacity(50),
            max_samples: 50,
            budget,
            relaxed_threshold: 0.3,
            tight_threshold: 0.7,
            overrun_threshold: 1.0,
            status: BudgetStatus::Relaxed,
            cycle_start: None,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Start timing a decision cycle
    pub fn cycle_start(&mut self) {
        self.cycle_start = Some(Instant::now());
    }

    /// Time spent in the current cycle so far
    pub fn elapsed(&self) -> Duration {
        self.cycle_start.map_or(Duration::ZERO, |start| start.elapsed())
    }

    /// Budget left in the current cycle
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    /// End timing a cycle and record it, reporting into `metrics` when given
    pub fn cycle_end(&mut self, metrics: Option<&Metrics>) {
        if let Some(start) = self.cycle_start.take() {
            let duration = start.elapsed();
            self.record(duration);
            if let Some(metrics) = metrics {
                metrics.record_cycle_time(duration);
                if duration > self.budget {
                    Metrics::incr(&metrics.budget_overruns);
                }
            }
        }
    }

    /// Record a cycle duration measured elsewhere
    pub fn record(&mut self, duration: Duration) {
        self.durations.push_back(duration);
        while self.durations.len() > self.max_samples {
            self.durations.pop_front();
        }
        self.update_status();
    }

    fn update_status(&mut self) {
        if self.durations.len() < 5 {
            return;
        }

        let ratio = self.average().as_secs_f64() / self.budget.as_secs_f64().max(f64::EPSILON);
        let previous = self.status;
        self.status = if ratio < self.relaxed_threshold {
            BudgetStatus::Relaxed
        } else if ratio < self.tight_threshold {
            BudgetStatus::Normal
        } else if ratio < self.overrun_threshold {
            BudgetStatus::Tight
        } else {
            BudgetStatus::Overrun
        };

        if self.status == BudgetStatus::Overrun && previous != BudgetStatus::Overrun {
            warn!(
                average_ms = self.average().as_secs_f64() * 1000.0,
                budget_ms = self.budget.as_secs_f64() * 1000.0,
                "decision cycles over budget"
            );
        }
    }

    pub fn average(&self) -> Duration {
        if self.durations.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.durations.iter().sum();
        sum / self.durations.len() as u32
    }

    pub fn status(&self) -> BudgetStatus {
        self.status
    }

    /// Budget usage as a percentage (0-100+)
    pub fn usage_percent(&self) -> f64 {
        self.average().as_secs_f64() / self.budget.as_secs_f64().max(f64::EPSILON) * 100.0
    }
}

impl Default for CycleBudget {
    fn default() -> Self {
        Self::new(Duration::from_millis(CYCLE_BUDGET_MS))
    }
}
