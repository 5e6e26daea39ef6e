//! Parallel line-fill generation clipped to an outline polygon.
//!
//! Produces plain segment lists; turning them into strokes is the
//! renderer's business. Lines are spaced perpendicular to their direction
//! and clipped to the polygon with an even-odd rule, so concave outlines
//! hatch correctly.

use num_complex::Complex64;

use crate::geom::{effective_len, point_in_polygon, polygon_centroid, rotor};

const EPS: f64 = 1e-10;

/// One clipped hatch segment.
pub type Segment = (Complex64, Complex64);

/// Generates parallel line segments covering `outline` at the given
/// spacing and angle (degrees), optionally inset inward by `offset`.
/// Degenerate inputs (fewer than 3 vertices, non-positive spacing) yield
/// an empty list.
pub fn line_fill_segments(
    outline: &[Complex64],
    spacing: f64,
    angle_deg: f64,
    offset: f64,
) -> Vec<Segment> {
    if spacing <= 0.0 {
        return Vec::new();
    }
    let n = effective_len(outline);
    if n < 3 {
        return Vec::new();
    }

    let polygon: Vec<Complex64> = if offset > 0.0 {
        inset_polygon(&outline[..n], offset)
    } else {
        outline[..n].to_vec()
    };

    let centroid = polygon_centroid(&polygon);
    let bbox_diag = bounding_diagonal(&polygon);
    if bbox_diag <= 0.0 {
        return Vec::new();
    }

    let direction = rotor(angle_deg.to_radians());
    let perp = direction * Complex64::new(0.0, 1.0);
    let span = direction * (bbox_diag * 2.0);
    let num_lines = (bbox_diag / spacing) as i64 + 3;

    let mut segments = Vec::new();
    let mut hits: Vec<(f64, Complex64)> = Vec::new();

    for idx in -num_lines..=num_lines {
        let shift = perp * (idx as f64 * spacing);
        let start = centroid - span + shift;
        let end = centroid + span + shift;

        hits.clear();
        for j in 0..polygon.len() {
            let p3 = polygon[j];
            let p4 = polygon[(j + 1) % polygon.len()];
            if let Some(hit) = segment_intersection(start, end, p3, p4) {
                hits.push(hit);
            }
        }
        if hits.len() < 2 {
            continue;
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-9);

        // Even-odd pairing; keep spans whose midpoint is interior.
        for pair in hits.chunks_exact(2) {
            let (a, b) = (pair[0].1, pair[1].1);
            if point_in_polygon((a + b) / 2.0, &polygon) {
                segments.push((a, b));
            }
        }
    }
    segments
}

/// Intersection of segment p1-p2 with segment p3-p4, returned as the
/// parameter along p1-p2 plus the point itself.
fn segment_intersection(
    p1: Complex64,
    p2: Complex64,
    p3: Complex64,
    p4: Complex64,
) -> Option<(f64, Complex64)> {
    let denom = (p1.re - p2.re) * (p3.im - p4.im) - (p1.im - p2.im) * (p3.re - p4.re);
    if denom.abs() < EPS {
        return None;
    }
    let t = ((p1.re - p3.re) * (p3.im - p4.im) - (p1.im - p3.im) * (p3.re - p4.re)) / denom;
    let u = -((p1.re - p2.re) * (p1.im - p3.im) - (p1.im - p2.im) * (p1.re - p3.re)) / denom;
    if !(-EPS..=1.0 + EPS).contains(&t) || !(-EPS..=1.0 + EPS).contains(&u) {
        return None;
    }
    Some((t, p1 + (p2 - p1) * t))
}

/// Shrinks a polygon toward its vertex centroid by `offset` distance.
fn inset_polygon(polygon: &[Complex64], offset: f64) -> Vec<Complex64> {
    let centroid = polygon_centroid(polygon);
    polygon
        .iter()
        .map(|&p| {
            let toward = centroid - p;
            let dist = toward.norm();
            if dist <= offset {
                centroid
            } else {
                p + toward * (offset / dist)
            }
        })
        .collect()
}

fn bounding_diagonal(polygon: &[Complex64]) -> f64 {
    let mut min = polygon[0];
    let mut max = polygon[0];
    for p in polygon {
        min = Complex64::new(min.re.min(p.re), min.im.min(p.im));
        max = Complex64::new(max.re.max(p.re), max.im.max(p.im));
    }
    (max - min).norm()
}
