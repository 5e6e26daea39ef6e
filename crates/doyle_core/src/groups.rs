//! Arc groups and the closed-outline stitcher.
//!
//! Each interior circle of the packing yields one group of kept arcs,
//! completed by arcs borrowed from four of its hexagonal neighbors.
//! Closure circles yield boundary groups that bridge the outermost cells.
//! A group's arcs carry no meaningful insertion order; the stitcher
//! reconstructs one closed polygon from the endpoint graph.

use std::collections::{HashMap, VecDeque};

use num_complex::Complex64;
use tracing::debug;

use crate::arcs::{select_arcs, Arc, ArcMode, DEFAULT_ARC_STEPS};
use crate::geom::POINT_EPS;
use crate::lattice::{CircleId, Lattice};
use crate::rings::RingMap;

/// Clockwise neighbor offsets and the index of the arc borrowed from each.
///
/// This table encodes the hexagonal adjacency convention of the packing;
/// it is a fixed constant, reproduced rather than derived.
const NEIGHBOR_BORROW: [(i64, i64); 4] = [(-1, -3), (-2, -2), (-5, 1), (-6, 0)];

#[derive(Debug, Clone)]
pub struct ArcGroup {
    pub id: usize,
    pub name: String,
    /// The circle this group was built around; `None` only for synthetic
    /// groups.
    pub base_circle: Option<CircleId>,
    /// Ring rank of the base circle; `None` marks boundary closure groups.
    pub ring_index: Option<usize>,
    arcs: Vec<Arc>,
    outline: Option<Vec<Complex64>>,
}

impl ArcGroup {
    pub fn new(id: usize, name: String, base_circle: Option<CircleId>) -> Self {
        Self {
            id,
            name,
            base_circle,
            ring_index: None,
            arcs: Vec::new(),
            outline: None,
        }
    }

    /// Appends an arc and invalidates the cached outline.
    pub fn push_arc(&mut self, arc: Arc) {
        self.arcs.push(arc);
        self.outline = None;
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    /// The group's single closed outline polygon, stitched from the
    /// accumulated arcs and cached until the next arc insertion.
    pub fn closed_outline(&mut self) -> &[Complex64] {
        if self.outline.is_none() {
            self.outline = Some(stitch_outline(&self.arcs));
        }
        self.outline.as_deref().unwrap_or(&[])
    }

    pub fn is_boundary(&self) -> bool {
        self.ring_index.is_none()
    }
}

/// Builds all arc groups for one render: interior-circle groups, boundary
/// closure groups, and the neighbor-extension pass.
pub fn build_groups(
    lattice: &Lattice,
    reference: Complex64,
    mode: ArcMode,
    num_gaps: usize,
    rings: &RingMap,
) -> Vec<ArcGroup> {
    let mut groups: Vec<ArcGroup> = Vec::new();
    let mut group_of: HashMap<CircleId, usize> = HashMap::new();

    // Interior circles: exactly six intersection points gate membership.
    for circle in lattice.visible() {
        if circle.intersections.len() != 6 {
            continue;
        }
        let kept = select_arcs(circle, reference, num_gaps, mode);
        if kept.is_empty() {
            continue;
        }
        let mut group = ArcGroup::new(
            groups.len(),
            format!("circle_{}", circle.id),
            Some(circle.id),
        );
        group.ring_index = rings.rank(circle.radius);
        for (i, j) in kept {
            group.push_arc(Arc::new(
                circle,
                circle.intersections[i].point,
                circle.intersections[j].point,
                DEFAULT_ARC_STEPS,
            ));
        }
        group_of.insert(circle.id, groups.len());
        groups.push(group);
    }

    // Closure circles bridge the outer boundary with their 2nd and 3rd
    // center-nearest arcs.
    for circle in lattice.closure() {
        let pts: Vec<Complex64> = circle.intersections.iter().map(|i| i.point).collect();
        let n = pts.len();
        if n < 2 {
            continue;
        }
        let mut ranked: Vec<(f64, usize, usize)> = (0..n)
            .map(|i| {
                let j = (i + 1) % n;
                let midpoint = (pts[i] + pts[j]) / 2.0;
                ((midpoint - reference).norm(), i, j)
            })
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut group = ArcGroup::new(groups.len(), format!("outer_{}", circle.id), Some(circle.id));
        for &(_, i, j) in ranked.iter().skip(1).take(2) {
            group.push_arc(Arc::new(circle, pts[i], pts[j], DEFAULT_ARC_STEPS));
        }
        groups.push(group);
    }

    // Neighbor extension: borrow one arc from each of four clockwise
    // neighbors to close the hexagonal cell outline.
    for circle in lattice.visible() {
        let Some(&group_idx) = group_of.get(&circle.id) else {
            continue;
        };
        if circle.neighbors.len() != 6 {
            continue;
        }
        for (offset, borrow) in NEIGHBOR_BORROW {
            let neighbor_id = circle.neighbors[offset.rem_euclid(6) as usize];
            let neighbor = &lattice.circles[neighbor_id];
            let all = select_arcs(neighbor, reference, 0, ArcMode::All);
            if all.is_empty() {
                continue;
            }
            let (i, j) = all[borrow.rem_euclid(all.len() as i64) as usize];
            groups[group_idx].push_arc(Arc::new(
                neighbor,
                neighbor.intersections[i].point,
                neighbor.intersections[j].point,
                DEFAULT_ARC_STEPS,
            ));
        }
    }

    debug!(
        groups = groups.len(),
        boundary = groups.iter().filter(|g| g.is_boundary()).count(),
        "arc groups built"
    );
    groups
}

/// Stitches a set of arcs into one closed polygon.
///
/// Seeds with the longest arc, then repeatedly attaches any arc whose
/// endpoint matches an open end of the chain within tolerance, reversing
/// as needed. Arcs that never match are attached by nearest-endpoint
/// proximity rather than dropped. The result is always explicitly closed:
/// a first/last match within tolerance is snapped, otherwise the first
/// point is repeated at the end.
fn stitch_outline(arcs: &[Arc]) -> Vec<Complex64> {
    if arcs.is_empty() {
        return Vec::new();
    }

    let mut remaining: Vec<Vec<Complex64>> = arcs.iter().map(|a| a.points().to_vec()).collect();
    let seed = remaining
        .iter()
        .enumerate()
        .max_by_key(|(_, pts)| pts.len())
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut chain: VecDeque<Complex64> = remaining.swap_remove(seed).into();

    while !remaining.is_empty() {
        let head = chain[0];
        let tail = chain[chain.len() - 1];

        let matched = remaining.iter().position(|piece| {
            let first = piece[0];
            let last = piece[piece.len() - 1];
            close(first, tail) || close(last, tail) || close(last, head) || close(first, head)
        });

        if let Some(idx) = matched {
            let piece = remaining.swap_remove(idx);
            let first = piece[0];
            let last = piece[piece.len() - 1];
            if close(first, tail) {
                chain.extend(piece.into_iter().skip(1));
            } else if close(last, tail) {
                chain.extend(piece.into_iter().rev().skip(1));
            } else if close(last, head) {
                for p in piece.into_iter().rev().skip(1) {
                    chain.push_front(p);
                }
            } else {
                for p in piece.into_iter().skip(1) {
                    chain.push_front(p);
                }
            }
            continue;
        }

        // No endpoint matches: fall back to the globally nearest endpoint.
        let mut best = (0usize, Attach::ForwardTail, f64::INFINITY);
        for (idx, piece) in remaining.iter().enumerate() {
            let first = piece[0];
            let last = piece[piece.len() - 1];
            for (attach, dist) in [
                (Attach::ForwardTail, (first - tail).norm()),
                (Attach::ReversedTail, (last - tail).norm()),
                (Attach::ForwardHead, (last - head).norm()),
                (Attach::ReversedHead, (first - head).norm()),
            ] {
                if dist < best.2 {
                    best = (idx, attach, dist);
                }
            }
        }
        let piece = remaining.swap_remove(best.0);
        match best.1 {
            Attach::ForwardTail => chain.extend(piece),
            Attach::ReversedTail => chain.extend(piece.into_iter().rev()),
            Attach::ForwardHead => {
                for p in piece.into_iter().rev() {
                    chain.push_front(p);
                }
            }
            Attach::ReversedHead => {
                for p in piece {
                    chain.push_front(p);
                }
            }
        }
    }

    let mut outline: Vec<Complex64> = chain.into();
    let n = outline.len();
    if n > 1 {
        if close(outline[0], outline[n - 1]) {
            outline[n - 1] = outline[0];
        } else {
            outline.push(outline[0]);
        }
    }
    outline
}

#[derive(Clone, Copy)]
enum Attach {
    ForwardTail,
    ReversedTail,
    ForwardHead,
    ReversedHead,
}

fn close(a: Complex64, b: Complex64) -> bool {
    (a - b).norm() <= POINT_EPS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{Circle, Intersection};

    fn circle_with_points(id: usize, center: Complex64, angles: &[f64]) -> Circle {
        let intersections = angles
            .iter()
            .enumerate()
            .map(|(k, &a)| Intersection {
                point: center + Complex64::from_polar(1.0, a),
                other: 100 + k,
            })
            .collect();
        Circle {
            id,
            center,
            radius: 1.0,
            visible: true,
            intersections,
            neighbors: Vec::new(),
        }
    }

    fn full_circle_arcs(circle: &Circle) -> Vec<Arc> {
        let n = circle.intersections.len();
        (0..n)
            .map(|i| {
                Arc::new(
                    circle,
                    circle.intersections[i].point,
                    circle.intersections[(i + 1) % n].point,
                    8,
                )
            })
            .collect()
    }

    #[test]
    fn stitching_is_independent_of_insertion_order() {
        use std::f64::consts::TAU;
        let angles: Vec<f64> = (0..6).map(|k| TAU * k as f64 / 6.0).collect();
        let circle = circle_with_points(0, Complex64::new(2.0, 1.0), &angles);
        let arcs = full_circle_arcs(&circle);

        let mut forward = ArcGroup::new(0, "fwd".into(), Some(0));
        for arc in arcs.clone() {
            forward.push_arc(arc);
        }
        let mut shuffled = ArcGroup::new(1, "rev".into(), Some(0));
        for arc in [4, 1, 5, 0, 3, 2].map(|i| arcs[i].clone()) {
            shuffled.push_arc(arc);
        }

        let a = forward.closed_outline().to_vec();
        let b = shuffled.closed_outline().to_vec();
        assert_eq!(a.len(), b.len());
        assert!(close(a[0], a[a.len() - 1]), "outline must close");
        assert!(close(b[0], b[b.len() - 1]));
        assert!(
            (crate::geom::polygon_area(&a) - crate::geom::polygon_area(&b)).abs() < 1e-9,
            "same cycle regardless of insertion order"
        );
    }

    #[test]
    fn stitcher_is_idempotent_through_the_cache() {
        use std::f64::consts::TAU;
        let angles: Vec<f64> = (0..6).map(|k| TAU * k as f64 / 6.0).collect();
        let circle = circle_with_points(0, Complex64::new(0.0, 0.0), &angles);
        let mut group = ArcGroup::new(0, "g".into(), Some(0));
        for arc in full_circle_arcs(&circle) {
            group.push_arc(arc);
        }

        let first = group.closed_outline().to_vec();
        let second = group.closed_outline().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn pushing_an_arc_invalidates_the_outline() {
        use std::f64::consts::TAU;
        let angles: Vec<f64> = (0..6).map(|k| TAU * k as f64 / 6.0).collect();
        let circle = circle_with_points(0, Complex64::new(0.0, 0.0), &angles);
        let arcs = full_circle_arcs(&circle);

        let mut group = ArcGroup::new(0, "g".into(), Some(0));
        for arc in arcs[..3].iter().cloned() {
            group.push_arc(arc);
        }
        let partial = group.closed_outline().len();
        for arc in arcs[3..].iter().cloned() {
            group.push_arc(arc);
        }
        assert!(group.closed_outline().len() > partial);
    }

    #[test]
    fn snapping_closes_an_almost_closed_chain() {
        use std::f64::consts::TAU;
        let angles: Vec<f64> = (0..6).map(|k| TAU * k as f64 / 6.0).collect();
        let circle = circle_with_points(0, Complex64::new(0.0, 0.0), &angles);
        let mut group = ArcGroup::new(0, "g".into(), Some(0));
        for arc in full_circle_arcs(&circle) {
            group.push_arc(arc);
        }
        let outline = group.closed_outline();
        assert_eq!(outline[0], outline[outline.len() - 1]);
    }

    #[test]
    fn reversed_arcs_are_reoriented_while_stitching() {
        // Three segments forming a triangle, one inserted reversed.
        let a = Complex64::new(0.0, 0.0);
        let b = Complex64::new(1.0, 0.0);
        let c = Complex64::new(0.5, 1.0);
        let circle = Circle {
            id: 0,
            center: Complex64::new(0.5, 0.4),
            radius: 1.0,
            visible: true,
            intersections: Vec::new(),
            neighbors: Vec::new(),
        };
        // Arc sampling is circular; use steps=1 so only the endpoints count.
        let ab = Arc::new(&circle, a, b, 1);
        let cb = Arc::new(&circle, c, b, 1);
        let ca = Arc::new(&circle, c, a, 1);

        let mut group = ArcGroup::new(0, "tri".into(), None);
        group.push_arc(ab);
        group.push_arc(cb);
        group.push_arc(ca);
        let outline = group.closed_outline();
        assert_eq!(outline.len(), 4);
        assert_eq!(outline[0], outline[3]);
    }
}
