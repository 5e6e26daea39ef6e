//! Complex-plane and polygon helpers shared across the engine.
//!
//! Points are `Complex64` throughout: the real part is x, the imaginary
//! part is y. All tolerance-sensitive comparisons in the engine go through
//! the fixed epsilon bands defined here.

use std::f64::consts::{PI, TAU};

use num_complex::Complex64;

/// Endpoint-equality tolerance used by the outline stitcher.
pub const POINT_EPS: f64 = 1e-6;

/// Unit complex number at the given angle.
pub fn rotor(angle: f64) -> Complex64 {
    Complex64::from_polar(1.0, angle)
}

/// Wraps an angle into (-pi, pi].
pub fn wrap_angle(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Perpendicular distance from `point` to the line through `origin` with
/// direction `line`. Callers must ensure `line` is non-degenerate.
pub fn perp_distance(point: Complex64, origin: Complex64, line: Complex64) -> f64 {
    (line.conj() * (point - origin)).im.abs() / line.norm()
}

/// Truncated 6-decimal coordinate key, used to deduplicate intersection
/// points that differ only by floating-point noise.
pub fn point_key(p: Complex64) -> (i64, i64) {
    ((p.re * 1e6).trunc() as i64, (p.im * 1e6).trunc() as i64)
}

/// Shoelace area of a polygon (absolute value). The closing edge is
/// implicit; a repeated first point is tolerated.
pub fn polygon_area(points: &[Complex64]) -> f64 {
    let n = effective_len(points);
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += a.re * b.im - b.re * a.im;
    }
    twice.abs() / 2.0
}

/// Vertex centroid of a polygon (mean of the distinct vertices).
pub fn polygon_centroid(points: &[Complex64]) -> Complex64 {
    let n = effective_len(points);
    if n == 0 {
        return Complex64::new(0.0, 0.0);
    }
    points[..n].iter().sum::<Complex64>() / n as f64
}

/// Even-odd ray-cast point-in-polygon test.
pub fn point_in_polygon(p: Complex64, polygon: &[Complex64]) -> bool {
    let n = effective_len(polygon);
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (polygon[i].re, polygon[i].im);
        let (xj, yj) = (polygon[j].re, polygon[j].im);
        if ((yi > p.im) != (yj > p.im))
            && (p.re < (xj - xi) * (p.im - yi) / (yj - yi + 1e-300) + xi)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Number of vertices once a repeated closing point is dropped.
pub fn effective_len(points: &[Complex64]) -> usize {
    let n = points.len();
    if n > 1 && (points[0] - points[n - 1]).norm() < 1e-9 {
        n - 1
    } else {
        n
    }
}
