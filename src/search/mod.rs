//! Candidate search framework
//!
//! Generators produce points, a [`filter::FilterSet`] drops the cheap
//! rejects, a [`candidate::Scorer`] rates the rest and the highest score wins.

pub mod budget;
pub mod cache;
pub mod candidate;
pub mod filter;
pub mod generator;
pub mod scoring;

pub use candidate::{find_best_candidate, Candidate, CandidateSearch, Evaluation, Scorer, SearchLimits, SearchStats};
pub use generator::{AngularFan, CandidateSource, Grid, PointCloud, Scatter};
