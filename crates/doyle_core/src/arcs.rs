//! Arc sampling and the gap-selection policies.
//!
//! An [`Arc`] is the portion of a circle between two of its intersection
//! points, always traversed in the mathematically shorter angular
//! direction. The [`ArcMode`] policies decide which consecutive-point arcs
//! of a circle are kept and which become gaps.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::SpiralError;
use crate::geom::{perp_distance, wrap_angle};
use crate::lattice::{Circle, CircleId};

/// Sample resolution of one arc (number of segments; points = steps + 1).
pub const DEFAULT_ARC_STEPS: usize = 16;

/// Degenerate-line threshold for circles sitting on the spiral center.
const LINE_EPS: f64 = 1e-6;

/// A sampled arc on one circle of the arena.
///
/// Points are sampled eagerly at construction: start and end are fixed for
/// the lifetime of the arc, so there is no cache to invalidate. The first
/// and last sample are exactly the given endpoints.
#[derive(Debug, Clone)]
pub struct Arc {
    pub circle: CircleId,
    pub start: Complex64,
    pub end: Complex64,
    pub steps: usize,
    points: Vec<Complex64>,
}

impl Arc {
    pub fn new(circle: &Circle, start: Complex64, end: Complex64, steps: usize) -> Self {
        let steps = steps.max(1);
        let start_angle = (start - circle.center).arg();
        // Delta clamped to (-pi, pi]: the shorter angular direction.
        let delta = wrap_angle((end - circle.center).arg() - start_angle);

        let mut points = Vec::with_capacity(steps + 1);
        points.push(start);
        for k in 1..steps {
            let angle = start_angle + delta * k as f64 / steps as f64;
            points.push(circle.center + Complex64::from_polar(circle.radius, angle));
        }
        points.push(end);

        Self {
            circle: circle.id,
            start,
            end,
            steps,
            points,
        }
    }

    pub fn points(&self) -> &[Complex64] {
        &self.points
    }

    /// Signed angular extent, negative for clockwise traversal.
    pub fn sweep(&self, center: Complex64) -> f64 {
        wrap_angle((self.end - center).arg() - (self.start - center).arg())
    }
}

/// Arc selection policy. Resolved once at configuration time; an unknown
/// mode name fails with [`SpiralError::InvalidArcMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcMode {
    Closest,
    Farthest,
    Alternating,
    All,
    Random,
    Symmetric,
    Angular,
}

impl Default for ArcMode {
    fn default() -> Self {
        ArcMode::Closest
    }
}

impl fmt::Display for ArcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArcMode::Closest => "closest",
            ArcMode::Farthest => "farthest",
            ArcMode::Alternating => "alternating",
            ArcMode::All => "all",
            ArcMode::Random => "random",
            ArcMode::Symmetric => "symmetric",
            ArcMode::Angular => "angular",
        };
        f.write_str(name)
    }
}

impl FromStr for ArcMode {
    type Err = SpiralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "closest" => Ok(ArcMode::Closest),
            "farthest" => Ok(ArcMode::Farthest),
            "alternating" => Ok(ArcMode::Alternating),
            "all" => Ok(ArcMode::All),
            "random" => Ok(ArcMode::Random),
            "symmetric" => Ok(ArcMode::Symmetric),
            "angular" => Ok(ArcMode::Angular),
            other => Err(SpiralError::InvalidArcMode(other.to_string())),
        }
    }
}

/// Selects the consecutive-point arcs of `circle` to keep, as index pairs
/// into the circle's sorted intersection list.
///
/// `num_gaps` arcs are dropped according to `mode`. A circle with fewer
/// than two intersection points contributes nothing.
pub fn select_arcs(
    circle: &Circle,
    reference: Complex64,
    num_gaps: usize,
    mode: ArcMode,
) -> Vec<(usize, usize)> {
    let pts: Vec<Complex64> = circle.intersections.iter().map(|i| i.point).collect();
    let n = pts.len();
    if n < 2 {
        return Vec::new();
    }

    let c = circle.center;
    let arcs: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
    let midpoints: Vec<Complex64> = arcs.iter().map(|&(i, j)| (pts[i] + pts[j]) / 2.0).collect();
    let line = reference - c;

    match mode {
        ArcMode::Closest | ArcMode::Farthest => {
            // Rank by perpendicular distance of each arc midpoint from the
            // line through the reference and the circle center.
            let distances: Vec<f64> = if line.norm() < LINE_EPS {
                midpoints.iter().map(|m| (m - reference).norm()).collect()
            } else {
                midpoints.iter().map(|m| perp_distance(*m, c, line)).collect()
            };
            let mut order: Vec<usize> = (0..n).collect();
            order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));
            if mode == ArcMode::Farthest {
                order.reverse();
            }
            order.into_iter().skip(num_gaps).map(|i| arcs[i]).collect()
        }

        ArcMode::Alternating => {
            if num_gaps >= n {
                return Vec::new();
            }
            let interval = (n / (num_gaps + 1)).max(1);
            (0..n).filter(|i| i % interval != 0).map(|i| arcs[i]).collect()
        }

        ArcMode::All => arcs,

        ArcMode::Random => {
            // Seeded by the circle id: the same circle always drops the
            // same arcs across runs.
            let mut rng = StdRng::seed_from_u64(circle.id as u64);
            let count = num_gaps.min(n);
            let skip: HashSet<usize> = rand::seq::index::sample(&mut rng, n, count)
                .into_iter()
                .collect();
            arcs.iter()
                .enumerate()
                .filter(|(i, _)| !skip.contains(i))
                .map(|(_, &arc)| arc)
                .collect()
        }

        ArcMode::Symmetric => {
            let target = if line.norm() < LINE_EPS { 0.0 } else { line.arg() };
            let diffs: Vec<f64> = midpoints
                .iter()
                .map(|m| wrap_angle((m - c).arg() - target).abs())
                .collect();
            let mut order: Vec<usize> = (0..n).collect();
            order.sort_by(|&a, &b| diffs[a].total_cmp(&diffs[b]));

            let mut skip: HashSet<usize> = HashSet::new();
            for &idx in order.iter().take(num_gaps / 2) {
                skip.insert(idx);
                // The antipodal counterpart: the arc starting at the
                // intersection point nearest the opposite direction.
                let opposite = (midpoints[idx] - c).arg() + std::f64::consts::PI;
                let mut opp_index = 0usize;
                let mut best = f64::INFINITY;
                for (i, p) in pts.iter().enumerate() {
                    let d = wrap_angle((p - c).arg() - opposite).abs();
                    if d < best {
                        best = d;
                        opp_index = i;
                    }
                }
                skip.insert(opp_index);
            }

            // Odd gap counts drop one extra arc where the circle crosses
            // the reference line.
            if num_gaps % 2 != 0 && line.norm() > LINE_EPS {
                let mut closest = 0usize;
                let mut best = f64::INFINITY;
                for (i, p) in pts.iter().enumerate() {
                    let d = perp_distance(*p, c, line);
                    if d < best {
                        best = d;
                        closest = i;
                    }
                }
                skip.insert(closest);
            }

            arcs.iter()
                .enumerate()
                .filter(|(i, _)| !skip.contains(i))
                .map(|(_, &arc)| arc)
                .collect()
        }

        ArcMode::Angular => {
            let target = if line.norm() < LINE_EPS { 0.0 } else { line.arg() };
            let diffs: Vec<f64> = midpoints
                .iter()
                .map(|m| wrap_angle((m - c).arg() - target).abs())
                .collect();
            let mut order: Vec<usize> = (0..n).collect();
            order.sort_by(|&a, &b| diffs[a].total_cmp(&diffs[b]));
            order.into_iter().skip(num_gaps).map(|i| arcs[i]).collect()
        }
    }
}
