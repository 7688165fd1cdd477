//! Soccer Reach Library
//!
//! Reach-time simulation and candidate search for simulated soccer agents.
//! Given a read-only snapshot of an agent, the [`reach`] module answers "how
//! many cycles until this agent is within a radius of that point", and the
//! [`search`] module picks the best of many candidate points using those
//! answers.
//!
//! Everything here runs inside one decision cycle: loops are bounded, nothing
//! blocks, and failures are sentinel values rather than errors.
//!
//! # Features
//!
//! - `metrics_extended` - Rolling decision-time history with p95/p99 (enabled by default)
//! - `minimal` - Build without optional features for testing/debugging

pub mod behaviors;
pub mod config;
pub mod metrics;
pub mod model;
pub mod reach;
pub mod search;
pub mod util;

pub use config::{ConfigError, SimulatorConfig};
pub use model::agent::AgentView;
pub use model::player::PlayerModel;
pub use reach::oracle::{estimate_reach_cycles, ReachOracle};
pub use reach::{ReachQuery, ReachResult};
pub use search::find_best_candidate;
pub use util::vec2::Vec2;

/// Route `tracing` output to the test harness; safe to call from every test
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_test_writer()
        .try_init();
}
