//! The `doyle_core` crate computes Doyle spiral circle packings and turns
//! them into drawable arc-group geometry.
//!
//! Key components:
//! - **Solver**: damped Newton iteration for the spiral root of a `(p, q)` pair.
//! - **Lattice**: circle arena expanded along the spiral arms, plus the invisible closure ring.
//! - **Intersections**: exact circle-circle intersection points, sorted clockwise per circle.
//! - **Arc groups**: arc selection modes, neighbor borrowing, and the closed-outline stitcher.
//! - **Export**: serializable geometry records with ring ranks and pattern-derived angles.

pub mod arcs;
pub mod error;
pub mod geom;
pub mod groups;
pub mod hatch;
pub mod intersect;
pub mod lattice;
pub mod pattern;
pub mod rings;
pub mod solver;
pub mod spiral;

pub use arcs::ArcMode;
pub use error::SpiralError;
pub use pattern::PatternAnimation;
pub use spiral::{DoyleSpiral, SpiralConfig, SpiralGeometry};
