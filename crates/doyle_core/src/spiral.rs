//! The engine façade: configuration, the render pipeline, and the
//! exported geometry record.
//!
//! One [`DoyleSpiral`] owns all state of a single render: the solved root,
//! the circle arena, the ring ranks, and the arc groups. Re-rendering the
//! same instance is a no-op; a parameter change requires a fresh engine.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::arcs::ArcMode;
use crate::error::SpiralError;
use crate::geom::polygon_centroid;
use crate::groups::{build_groups, ArcGroup};
use crate::intersect::compute_all_intersections;
use crate::lattice::{Circle, Lattice};
use crate::pattern::PatternAnimation;
use crate::rings::{RingMap, BOUNDARY_RING};
use crate::solver::{solve, SpiralRoot};

/// The spiral center: reference point for intersection sorting and arc
/// selection.
pub const SPIRAL_CENTER: Complex64 = Complex64::new(0.0, 0.0);

/// Engine construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiralConfig {
    pub p: u32,
    pub q: u32,
    /// Continuous spiral parameter: zoom/rotation "time".
    pub t: f64,
    /// Maximum distance from the center for generated circles.
    pub max_distance: f64,
    pub arc_mode: ArcMode,
    /// Number of arcs per circle left undrawn.
    pub num_gaps: usize,
    pub pattern: PatternAnimation,
    /// Per-ring angle increment fed to the pattern, in degrees.
    pub pattern_angle: f64,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            p: 16,
            q: 16,
            t: 0.0,
            max_distance: 2000.0,
            arc_mode: ArcMode::Closest,
            num_gaps: 2,
            pattern: PatternAnimation::Ring,
            pattern_angle: 15.0,
        }
    }
}

/// Exported geometry: the sole boundary artifact of the engine. Contains
/// no rendering primitives; downstream consumers derive paths and colors
/// from the outlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiralGeometry {
    pub p: u32,
    pub q: u32,
    pub t: f64,
    pub max_distance: f64,
    pub arc_mode: ArcMode,
    pub num_gaps: usize,
    #[serde(rename = "arcgroups")]
    pub arc_groups: Vec<GroupGeometry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupGeometry {
    pub id: usize,
    pub name: String,
    /// Ring rank, or [`BOUNDARY_RING`] for closure groups.
    pub ring_index: i64,
    /// Derived line/fill angle in degrees.
    pub angle: f64,
    /// The closed outline as ordered coordinate pairs.
    pub outline: Vec<[f64; 2]>,
    /// Number of arcs composing the group.
    pub arc_count: usize,
}

/// Doyle spiral engine. Single-threaded; all entities are created fresh
/// per instance and dropped with it.
#[derive(Debug)]
pub struct DoyleSpiral {
    config: SpiralConfig,
    root: SpiralRoot,
    lattice: Lattice,
    rings: RingMap,
    groups: Vec<ArcGroup>,
    generated: bool,
}

impl DoyleSpiral {
    /// Solves the spiral root for the configured (p, q). Fails with
    /// [`SpiralError::DivergedSolve`] when no valid root exists.
    pub fn new(config: SpiralConfig) -> Result<Self, SpiralError> {
        let root = solve(config.p, config.q)?;
        Ok(Self {
            config,
            root,
            lattice: Lattice::default(),
            rings: RingMap::default(),
            groups: Vec::new(),
            generated: false,
        })
    }

    pub fn config(&self) -> &SpiralConfig {
        &self.config
    }

    pub fn root(&self) -> &SpiralRoot {
        &self.root
    }

    pub fn circles(&self) -> &[Circle] {
        &self.lattice.circles
    }

    pub fn groups(&self) -> &[ArcGroup] {
        &self.groups
    }

    /// Runs the full pipeline: lattice generation, intersections, ring
    /// classification and arc-group construction. Idempotent once run.
    pub fn render(&mut self) {
        if self.generated {
            return;
        }
        self.lattice = Lattice::generate(
            &self.root,
            self.config.q,
            self.config.t,
            self.config.max_distance,
        );
        compute_all_intersections(&mut self.lattice, SPIRAL_CENTER);
        // Ranks are assigned over the circles that can form interior
        // groups, so the smallest grouped ring is always rank 0.
        self.rings = RingMap::classify(
            self.lattice
                .visible()
                .filter(|c| c.intersections.len() == 6),
        );
        self.groups = build_groups(
            &self.lattice,
            SPIRAL_CENTER,
            self.config.arc_mode,
            self.config.num_gaps,
            &self.rings,
        );
        self.generated = true;
        info!(
            p = self.config.p,
            q = self.config.q,
            circles = self.lattice.circles.len(),
            rings = self.rings.len(),
            groups = self.groups.len(),
            "spiral rendered"
        );
    }

    /// The exported geometry record. Fails with
    /// [`SpiralError::GeometryNotReady`] when no arc groups exist, so
    /// callers can tell "not yet rendered" from "rendered but empty".
    pub fn geometry(&mut self) -> Result<SpiralGeometry, SpiralError> {
        if self.groups.is_empty() {
            return Err(SpiralError::GeometryNotReady);
        }

        let mut records = Vec::with_capacity(self.groups.len());
        for group in &mut self.groups {
            let outline = group.closed_outline().to_vec();
            let centroid = polygon_centroid(&outline);
            let angle =
                self.config
                    .pattern
                    .group_angle(self.config.pattern_angle, group.ring_index, centroid);
            records.push(GroupGeometry {
                id: group.id,
                name: group.name.clone(),
                ring_index: group.ring_index.map_or(BOUNDARY_RING, |r| r as i64),
                angle,
                outline: outline.iter().map(|p| [p.re, p.im]).collect(),
                arc_count: group.arcs().len(),
            });
        }

        Ok(SpiralGeometry {
            p: self.config.p,
            q: self.config.q,
            t: self.config.t,
            max_distance: self.config.max_distance,
            arc_mode: self.config.arc_mode,
            num_gaps: self.config.num_gaps,
            arc_groups: records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcs::select_arcs;
    use crate::geom::{polygon_area, POINT_EPS};
    use std::collections::HashMap;
    use std::f64::consts::TAU;

    fn rendered(config: SpiralConfig) -> DoyleSpiral {
        let mut spiral = DoyleSpiral::new(config).expect("root should solve");
        spiral.render();
        spiral
    }

    #[test]
    fn geometry_before_render_is_not_ready() {
        let mut spiral = DoyleSpiral::new(SpiralConfig::default()).expect("root should solve");
        assert!(matches!(
            spiral.geometry(),
            Err(SpiralError::GeometryNotReady)
        ));
    }

    #[test]
    fn render_is_idempotent() {
        let mut spiral = rendered(SpiralConfig::default());
        let circles = spiral.circles().len();
        let groups = spiral.groups().len();
        spiral.render();
        assert_eq!(spiral.circles().len(), circles);
        assert_eq!(spiral.groups().len(), groups);
    }

    #[test]
    fn default_scenario_produces_an_innermost_closed_group() {
        // p=16, q=16, t=0, max_distance=2000, closest, 2 gaps.
        let mut spiral = rendered(SpiralConfig::default());
        let geometry = spiral.geometry().expect("geometry should export");

        let inner: Vec<_> = geometry
            .arc_groups
            .iter()
            .filter(|g| g.ring_index == 0)
            .collect();
        assert!(!inner.is_empty(), "ring 0 must contain at least one group");

        for group in inner {
            let distinct: Vec<[f64; 2]> = {
                let mut pts = group.outline.clone();
                pts.dedup();
                pts
            };
            assert!(distinct.len() >= 3, "outline must have at least 3 points");
            let first = group.outline[0];
            let last = group.outline[group.outline.len() - 1];
            let gap = ((first[0] - last[0]).powi(2) + (first[1] - last[1]).powi(2)).sqrt();
            assert!(gap <= POINT_EPS, "outline must close");
        }
    }

    #[test]
    fn interior_outlines_close_within_tolerance() {
        let mut spiral = rendered(SpiralConfig::default());
        for group in &mut spiral.groups {
            if group.is_boundary() {
                continue;
            }
            let outline = group.closed_outline();
            assert!(outline.len() >= 3);
            let first = outline[0];
            let last = outline[outline.len() - 1];
            assert!(
                (first - last).norm() <= POINT_EPS,
                "group {} does not close (gap {})",
                group.name,
                (first - last).norm()
            );
        }
    }

    #[test]
    fn all_mode_arcs_cover_the_full_circle() {
        let spiral = rendered(SpiralConfig::default());
        let circle = spiral
            .circles()
            .iter()
            .find(|c| c.visible && c.intersections.len() == 6)
            .expect("an interior circle exists");

        let kept = select_arcs(circle, SPIRAL_CENTER, 0, ArcMode::All);
        assert_eq!(kept.len(), 6);

        let total: f64 = kept
            .iter()
            .map(|&(i, j)| {
                let a0 = (circle.intersections[i].point - circle.center).arg();
                let a1 = (circle.intersections[j].point - circle.center).arg();
                crate::geom::wrap_angle(a1 - a0).abs()
            })
            .sum();
        assert!(
            (total - TAU).abs() < 1e-6,
            "six consecutive arcs must span the whole circle, got {total}"
        );
    }

    fn assert_ring_area_spread(p: u32, q: u32) {
        let mut spiral = rendered(SpiralConfig {
            p,
            q,
            ..SpiralConfig::default()
        });

        let mut areas: HashMap<usize, Vec<f64>> = HashMap::new();
        for group in &mut spiral.groups {
            let Some(ring) = group.ring_index else { continue };
            let area = polygon_area(group.closed_outline());
            assert!(area > 0.0);
            areas.entry(ring).or_default().push(area);
        }
        assert!(!areas.is_empty());

        for (ring, values) in areas {
            if values.len() < 2 {
                continue;
            }
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(0.0, f64::max);
            let spread = (max - min) / min;
            assert!(
                spread < 1e-3,
                "ring {ring} of ({p}, {q}) has area spread {spread}"
            );
        }
    }

    #[test]
    fn ring_areas_are_uniform_for_asymmetric_parameters() {
        assert_ring_area_spread(7, 6);
    }

    #[test]
    fn ring_areas_are_uniform_for_symmetric_parameters() {
        assert_ring_area_spread(6, 6);
    }

    #[test]
    fn exported_record_serializes_with_the_legacy_group_key() -> anyhow::Result<()> {
        let mut spiral = rendered(SpiralConfig::default());
        let geometry = spiral.geometry()?;
        let json = serde_json::to_value(&geometry)?;

        assert_eq!(json["p"], 16);
        assert_eq!(json["max_distance"], 2000.0);
        assert_eq!(json["arc_mode"], "closest");
        let groups = json["arcgroups"].as_array().expect("arcgroups array");
        assert!(!groups.is_empty());
        assert!(groups[0]["outline"].as_array().is_some());

        // Boundary groups carry the sentinel ring index.
        assert!(geometry
            .arc_groups
            .iter()
            .any(|g| g.ring_index == BOUNDARY_RING));
        Ok(())
    }

    #[test]
    fn boundary_groups_are_excluded_from_ring_ranks() {
        let mut spiral = rendered(SpiralConfig::default());
        let geometry = spiral.geometry().expect("geometry should export");
        let ring_count = spiral.rings.len() as i64;
        for group in &geometry.arc_groups {
            assert!(group.ring_index == BOUNDARY_RING || group.ring_index < ring_count);
            if group.name.starts_with("outer_") {
                assert_eq!(group.ring_index, BOUNDARY_RING);
            }
        }
    }
}
