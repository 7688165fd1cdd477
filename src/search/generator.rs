//! Candidate point generators
//!
//! Every generator yields points lazily and in a fixed order, so repeated
//! searches over the same situation see the same generation indices and a
//! search ceiling stops generation instead of truncating a finished list.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// Upper bound on rings produced by a fan
const MAX_RINGS: usize = 64;

/// Anything that can produce a finite ordered sequence of candidate points
pub trait CandidateSource {
    fn candidates(&self) -> impl Iterator<Item = Vec2> + '_;
}

/// Rings of points fanning out from an origin around a base direction
///
/// Radii grow by `radial_step`, itself multiplied by `radial_growth` after
/// each ring. Within a ring, angles go centre first, then alternate sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularFan {
    pub origin: Vec2,
    /// Degrees
    pub base_angle: f64,
    /// Degrees either side of `base_angle`
    pub half_span: f64,
    pub angle_step: f64,
    pub first_radius: f64,
    pub radial_step: f64,
    pub radial_growth: f64,
    pub max_radius: f64,
}

impl AngularFan {
    /// Full circle around `origin`
    pub fn around(origin: Vec2, angle_step: f64, first_radius: f64, radial_step: f64, max_radius: f64) -> Self {
        Self {
            origin,
            base_angle: 0.0,
            half_span: 180.0,
            angle_step,
            first_radius,
            radial_step,
            radial_growth: 1.0,
            max_radius,
        }
    }

    fn offsets(&self) -> Vec<f64> {
        let mut offsets = vec![0.0];
        if self.angle_step <= f64::EPSILON {
            return offsets;
        }
        let mut a = self.angle_step;
        while a <= self.half_span + 1.0e-9 {
            offsets.push(a);
            // The two sides meet at 180 on a full circle
            if a < 180.0 - 1.0e-9 {
                offsets.push(-a);
            }
            a += self.angle_step;
        }
        offsets
    }

    /// Ring radii, innermost first
    fn radii(&self) -> impl Iterator<Item = f64> {
        let growth = self.radial_growth.max(1.0e-3);
        let max_radius = self.max_radius + 1.0e-9;
        std::iter::successors(Some((self.first_radius.max(0.0), self.radial_step)), move |&(radius, step)| {
            (step > f64::EPSILON).then(|| (radius + step, step * growth))
        })
        .take(MAX_RINGS)
        .map(|(radius, _)| radius)
        .take_while(move |&radius| radius <= max_radius)
    }
}

impl CandidateSource for AngularFan {
    fn candidates(&self) -> impl Iterator<Item = Vec2> + '_ {
        let offsets = self.offsets();
        self.radii().flat_map(move |radius| {
            // A zero radius ring is the origin alone
            let count = if radius <= f64::EPSILON { 1 } else { offsets.len() };
            let offsets = offsets.clone();
            (0..count).map(move |i| {
                if radius <= f64::EPSILON {
                    self.origin
                } else {
                    self.origin + Vec2::polar(radius, self.base_angle + offsets[i])
                }
            })
        })
    }
}

/// Rectangular lattice centred on a reference point, row by row from -y
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub center: Vec2,
    pub step: f64,
    pub half_cols: u32,
    pub half_rows: u32,
}

impl CandidateSource for Grid {
    fn candidates(&self) -> impl Iterator<Item = Vec2> + '_ {
        let cols = i64::from(self.half_cols);
        let rows = i64::from(self.half_rows);
        (-rows..=rows).flat_map(move |iy| {
            (-cols..=cols).map(move |ix| self.center + Vec2::new(ix as f64 * self.step, iy as f64 * self.step))
        })
    }
}

/// Seeded uniform sample of a disc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scatter {
    pub center: Vec2,
    pub radius: f64,
    pub count: usize,
    pub seed: u64,
}

impl CandidateSource for Scatter {
    fn candidates(&self) -> impl Iterator<Item = Vec2> + '_ {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.count).map(move |_| {
            let r = self.radius * rng.gen::<f64>().sqrt();
            let theta = rng.gen_range(-180.0..180.0);
            self.center + Vec2::polar(r, theta)
        })
    }
}

/// Externally supplied points, e.g. a Voronoi sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud(pub Vec<Vec2>);

impl CandidateSource for PointCloud {
    fn candidates(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Vec2> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Vec2>>(iter: I) -> Self {
        PointCloud(iter.into_iter().collect())
    }
}
