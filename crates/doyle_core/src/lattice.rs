//! Lattice generation: expands circles along the spiral arms.
//!
//! Circles live in an arena and are addressed by dense [`CircleId`]
//! indices; arcs and neighbor lists refer back into the arena by index
//! rather than holding live references.

use num_complex::Complex64;
use tracing::debug;

use crate::geom::rotor;
use crate::solver::SpiralRoot;

/// Dense index into a [`Lattice`] arena, unique within one engine run.
pub type CircleId = usize;

/// One intersection point on a circle together with the circle that
/// produced it.
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    pub point: Complex64,
    pub other: CircleId,
}

#[derive(Debug, Clone)]
pub struct Circle {
    pub id: CircleId,
    pub center: Complex64,
    pub radius: f64,
    /// Closure-ring circles are generated invisible: they participate in
    /// intersection geometry but are excluded from primitive display.
    pub visible: bool,
    /// Intersection points, sorted clockwise from the point nearest the
    /// spiral center once the intersection pass has run.
    pub intersections: Vec<Intersection>,
    /// Contributing circles in the same clockwise order, deduplicated.
    pub neighbors: Vec<CircleId>,
}

/// Arena of all circles of one render: the visible lattice followed by the
/// invisible closure ring.
#[derive(Debug, Clone, Default)]
pub struct Lattice {
    pub circles: Vec<Circle>,
}

impl Lattice {
    /// Expands the circle lattice from a solved root.
    ///
    /// Each of the `q` arms walks outward by repeated multiplication by `a`
    /// while the scaled modulus stays below `max_distance`, and inward by
    /// repeated division while the modulus stays above `1/scale`. A second
    /// pass appends one invisible closure circle per arm, one step beyond
    /// the last visible circle.
    pub fn generate(root: &SpiralRoot, q: u32, t: f64, max_distance: f64) -> Self {
        let scale = root.mod_a.powf(t);
        let w = rotor(root.arg_a * t);
        let min_modulus = 1.0 / scale;
        let a = root.a;

        let mut lattice = Lattice::default();

        let mut start = root.a;
        for _ in 0..q {
            let mut v = start;
            while v.norm() * scale < max_distance {
                lattice.push(scale * v * w, root.r * scale * v.norm(), true);
                v *= a;
            }

            let mut v = start / a;
            while v.norm() > min_modulus {
                lattice.push(scale * v * w, root.r * scale * v.norm(), true);
                v /= a;
            }

            start *= root.b;
        }

        let visible = lattice.circles.len();

        // Closure ring: one extra circle per arm, bounded generously so a
        // step landing just past max_distance is still included.
        let mut start = root.a;
        for _ in 0..q {
            let mut v = start;
            while v.norm() * scale < max_distance {
                v *= a;
            }
            if v.norm() * scale < max_distance * a.norm() * 2.0 {
                lattice.push(scale * v * w, root.r * scale * v.norm(), false);
            }
            start *= root.b;
        }

        debug!(
            visible,
            closure = lattice.circles.len() - visible,
            "lattice generated"
        );
        lattice
    }

    fn push(&mut self, center: Complex64, radius: f64, visible: bool) -> CircleId {
        let id = self.circles.len();
        self.circles.push(Circle {
            id,
            center,
            radius,
            visible,
            intersections: Vec::new(),
            neighbors: Vec::new(),
        });
        id
    }

    pub fn visible(&self) -> impl Iterator<Item = &Circle> {
        self.circles.iter().filter(|c| c.visible)
    }

    pub fn closure(&self) -> impl Iterator<Item = &Circle> {
        self.circles.iter().filter(|c| !c.visible)
    }
}
