//! Cheap geometric rejections applied before any scoring

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::model::field::FieldGeometry;
use crate::util::vec2::Vec2;

/// One exclusion rule; a point matching any rule is rejected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Exclusion {
    /// Outside the pitch shrunk by `margin`
    OutsidePitch { margin: f64 },
    /// Inside the centre circle, e.g. for the defending side at kick-off
    CenterCircle,
    /// Further toward the opponent goal than the offside line
    BeyondOffsideLine { x: f64 },
    /// Within `radius` of `point`, e.g. too close to the ball
    NearPoint { point: Vec2, radius: f64 },
    OurPenaltyArea,
}

impl Exclusion {
    pub fn rejects(&self, field: &FieldGeometry, p: Vec2) -> bool {
        match *self {
            Exclusion::OutsidePitch { margin } => !field.contains(p, margin),
            Exclusion::CenterCircle => field.in_center_circle(p),
            Exclusion::BeyondOffsideLine { x } => p.x > x,
            Exclusion::NearPoint { point, radius } => p.distance_sq_to(point) < radius * radius,
            Exclusion::OurPenaltyArea => field.in_our_penalty_area(p),
        }
    }
}

/// Ordered set of exclusions evaluated cheapest-first as added
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    field: FieldGeometry,
    rules: SmallVec<[Exclusion; 4]>,
}

impl FilterSet {
    pub fn new(field: FieldGeometry) -> Self {
        Self {
            field,
            rules: SmallVec::new(),
        }
    }

    pub fn with(mut self, rule: Exclusion) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: Exclusion) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Exclusion] {
        &self.rules
    }

    pub fn accepts(&self, p: Vec2) -> bool {
        !self.rules.iter().any(|rule| rule.rejects(&self.field, p))
    }

    /// Predicate form for [`CandidateSearch::run`](super::candidate::CandidateSearch::run)
    pub fn as_predicate(&self) -> impl FnMut(Vec2) -> bool + '_ {
        move |p| self.accepts(p)
    }
}
