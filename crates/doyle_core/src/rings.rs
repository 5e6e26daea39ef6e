//! Ring classification: circles sharing a radius form one concentric ring.

use std::collections::BTreeMap;

use crate::lattice::Circle;

/// Ring index exported for boundary closure groups, outside the normal
/// rank space.
pub const BOUNDARY_RING: i64 = -1;

/// Mapping from rounded radius to zero-based rank, ordered by increasing
/// radius. Radii are rounded to six decimals before comparison.
#[derive(Debug, Clone, Default)]
pub struct RingMap {
    ranks: BTreeMap<i64, usize>,
}

impl RingMap {
    /// Classifies the given circles by radius. Callers feed in the circles
    /// eligible for interior groups; closure circles and under-connected
    /// edge circles stay outside the rank space.
    pub fn classify<'a>(circles: impl Iterator<Item = &'a Circle>) -> Self {
        let mut ranks: BTreeMap<i64, usize> = BTreeMap::new();
        for circle in circles {
            ranks.insert(radius_key(circle.radius), 0);
        }
        for (rank, (_, slot)) in ranks.iter_mut().enumerate() {
            *slot = rank;
        }
        RingMap { ranks }
    }

    pub fn rank(&self, radius: f64) -> Option<usize> {
        self.ranks.get(&radius_key(radius)).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

fn radius_key(radius: f64) -> i64 {
    (radius * 1e6).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn circle(radius: f64) -> Circle {
        Circle {
            id: 0,
            center: Complex64::new(0.0, 0.0),
            radius,
            visible: true,
            intersections: Vec::new(),
            neighbors: Vec::new(),
        }
    }

    #[test]
    fn ranks_increase_with_radius() {
        let circles = [circle(3.0), circle(1.0), circle(2.0), circle(1.0)];
        let rings = RingMap::classify(circles.iter());
        assert_eq!(rings.len(), 3);
        assert_eq!(rings.rank(1.0), Some(0));
        assert_eq!(rings.rank(2.0), Some(1));
        assert_eq!(rings.rank(3.0), Some(2));
        assert_eq!(rings.rank(4.0), None);
    }

    #[test]
    fn radii_equal_within_rounding_share_a_ring() {
        let circles = [circle(1.0), circle(1.0 + 4e-7)];
        let rings = RingMap::classify(circles.iter());
        assert_eq!(rings.len(), 1);
    }
}
