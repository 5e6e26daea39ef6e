//! Pairwise circle intersection and neighbor recording.
//!
//! Candidates are pruned by center distance against the sum of radii, then
//! resolved with the classical circle-circle intersection formula. Each
//! circle accumulates its own point list independently; points are sorted
//! clockwise starting from the point nearest the spiral center.

use std::collections::HashSet;
use std::f64::consts::TAU;

use num_complex::Complex64;
use tracing::debug;

use crate::geom::{point_key, wrap_angle, POINT_EPS};
use crate::lattice::{Intersection, Lattice};

/// Tolerance band for both the candidate prune and tangency resolution.
pub const INTERSECT_TOL: f64 = 1e-3;

/// Intersection points of two circles: empty, one tangency point, or two.
pub fn circle_circle_intersections(
    c1: Complex64,
    r1: f64,
    c2: Complex64,
    r2: f64,
    tol: f64,
) -> Vec<Complex64> {
    let delta = c2 - c1;
    let d = delta.norm();
    let sum_r = r1 + r2;
    let diff_r = (r1 - r2).abs();

    if d > sum_r + tol || d < diff_r - tol || d < tol {
        return Vec::new();
    }

    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h_sq = r1 * r1 - a * a;
    if h_sq < -tol {
        return Vec::new();
    }
    let h = h_sq.max(0.0).sqrt();

    let mid = c1 + delta * (a / d);
    // Unit perpendicular to the center line.
    let perp = Complex64::new(-delta.im / d, delta.re / d);

    let mut points = vec![mid + perp * h];
    if h > tol {
        points.push(mid - perp * h);
    }
    points
}

/// Computes intersections and neighbor lists for every circle in the
/// arena, visible and closure circles alike.
pub fn compute_all_intersections(lattice: &mut Lattice, reference: Complex64) {
    let n = lattice.circles.len();
    let mut per_circle: Vec<Vec<Intersection>> = Vec::with_capacity(n);

    for i in 0..n {
        let ci = &lattice.circles[i];
        let mut seen: HashSet<(i64, i64)> = HashSet::new();
        let mut points: Vec<Intersection> = Vec::new();

        for (j, cj) in lattice.circles.iter().enumerate() {
            if i == j {
                continue;
            }
            // Coarse prune only; the exact formula below decides.
            if (ci.center - cj.center).norm() > ci.radius + cj.radius + INTERSECT_TOL {
                continue;
            }
            for p in
                circle_circle_intersections(ci.center, ci.radius, cj.center, cj.radius, INTERSECT_TOL)
            {
                if seen.insert(point_key(p)) {
                    points.push(Intersection { point: p, other: j });
                }
            }
        }

        sort_clockwise(&mut points, ci.center, reference);
        per_circle.push(points);
    }

    let mut hex_count = 0usize;
    for (circle, points) in lattice.circles.iter_mut().zip(per_circle) {
        circle.neighbors = ordered_neighbors(&points);
        if points.len() == 6 {
            hex_count += 1;
        }
        circle.intersections = points;
    }
    debug!(circles = n, hexagonal = hex_count, "intersections computed");
}

/// Sorts points clockwise around `center`, starting from the point nearest
/// `reference`, by signed angular offset from the start angle.
///
/// Symmetric lattices (p = q) put two points on each circle at exactly the
/// same distance from the reference, mirrored across the radial line, so
/// nearest-distance alone would pick the start on floating-point noise and
/// rotate the ordering of otherwise equivalent circles. Near-ties are
/// broken by signed angle from the inward radial direction, which is
/// invariant under the lattice's rotational symmetry.
fn sort_clockwise(points: &mut [Intersection], center: Complex64, reference: Complex64) {
    if points.is_empty() {
        return;
    }
    let nearest = points
        .iter()
        .map(|i| (i.point - reference).norm())
        .fold(f64::INFINITY, f64::min);
    let band = POINT_EPS * nearest.max(1.0);
    let inward = (reference - center).arg();
    let Some(start) = points
        .iter()
        .filter(|i| (i.point - reference).norm() - nearest <= band)
        .max_by(|a, b| {
            let ka = wrap_angle((a.point - center).arg() - inward);
            let kb = wrap_angle((b.point - center).arg() - inward);
            ka.total_cmp(&kb)
        })
        .map(|i| i.point)
    else {
        return;
    };
    let start_angle = (start - center).arg();
    points.sort_by(|a, b| {
        let ka = (start_angle - (a.point - center).arg()).rem_euclid(TAU);
        let kb = (start_angle - (b.point - center).arg()).rem_euclid(TAU);
        ka.total_cmp(&kb)
    });
}

/// Contributing circles in intersection order, first occurrence kept.
fn ordered_neighbors(points: &[Intersection]) -> Vec<usize> {
    let mut neighbors = Vec::new();
    for i in points {
        if !neighbors.contains(&i.other) {
            neighbors.push(i.other);
        }
    }
    neighbors
}
