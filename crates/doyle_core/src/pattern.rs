//! Per-group line/fill angle derivation.
//!
//! Animation patterns assign each arc group an angle in degrees from its
//! ring index and the polar coordinates of its outline centroid. Consumers
//! use the angle to phase line hatching or timeline effects; the geometry
//! itself is unaffected.

use std::f64::consts::TAU;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Golden angle in degrees.
pub const GOLDEN_ANGLE_DEG: f64 = 137.50776405003785;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternAnimation {
    /// Angle grows linearly with the ring index. The default.
    Ring,
    /// Follows the logarithmic spiral: angular position plus a log-radial
    /// sweep.
    LogSpiral,
    /// Triangular-number cascade over the rings.
    CurvatureCascade,
    /// Golden-angle starburst per ring.
    GoldenSector,
    /// Phase ripples outward with distance from the spiral focus.
    RippleFocus,
    /// Alternate phase between adjacent angular sectors.
    ArmInterleaving,
    /// Ring phase overlaid with a half-rate angular scan.
    QuasiMoire,
}

impl Default for PatternAnimation {
    fn default() -> Self {
        PatternAnimation::Ring
    }
}

impl PatternAnimation {
    /// Resolves a pattern name, accepting the legacy display aliases.
    /// Unknown names fall back to [`PatternAnimation::Ring`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "ring" | "rings" => PatternAnimation::Ring,
            "log_spiral" | "log-spiral sweep" => PatternAnimation::LogSpiral,
            "curvature_cascade" | "curvature cascade" => PatternAnimation::CurvatureCascade,
            "golden_sector" | "golden sector starburst" => PatternAnimation::GoldenSector,
            "ripple_focus" | "ripple from focus" => PatternAnimation::RippleFocus,
            "arm_interleaving" | "arm interleaving" => PatternAnimation::ArmInterleaving,
            "quasi_moire" | "quasi-moiré stripe scan" => PatternAnimation::QuasiMoire,
            _ => PatternAnimation::Ring,
        }
    }

    /// Angle in degrees for a group with the given ring index and outline
    /// centroid. `step_deg` is the configured per-ring increment; boundary
    /// groups (no ring index) are treated as ring 0.
    pub fn group_angle(self, step_deg: f64, ring_index: Option<usize>, centroid: Complex64) -> f64 {
        let ring = ring_index.unwrap_or(0) as f64;
        let radius = centroid.norm();
        let theta = centroid.arg();
        match self {
            PatternAnimation::Ring => ring * step_deg,
            PatternAnimation::LogSpiral => theta.to_degrees() + step_deg * radius.max(1e-9).ln(),
            PatternAnimation::CurvatureCascade => step_deg * ring * (ring + 1.0) / 2.0,
            PatternAnimation::GoldenSector => (ring * GOLDEN_ANGLE_DEG).rem_euclid(360.0),
            PatternAnimation::RippleFocus => step_deg * radius,
            PatternAnimation::ArmInterleaving => {
                let sector = (theta.rem_euclid(TAU) / (TAU / 6.0)).floor() as i64;
                ring * step_deg + if sector % 2 == 0 { 0.0 } else { 90.0 }
            }
            PatternAnimation::QuasiMoire => ring * step_deg + theta.to_degrees() / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_pattern_scales_with_ring_index() {
        let centroid = Complex64::new(3.0, 4.0);
        assert_eq!(
            PatternAnimation::Ring.group_angle(15.0, Some(0), centroid),
            0.0
        );
        assert_eq!(
            PatternAnimation::Ring.group_angle(15.0, Some(4), centroid),
            60.0
        );
        // Boundary groups behave as ring 0.
        assert_eq!(PatternAnimation::Ring.group_angle(15.0, None, centroid), 0.0);
    }

    #[test]
    fn name_resolution_accepts_aliases_and_defaults_to_ring() {
        assert_eq!(PatternAnimation::from_name("rings"), PatternAnimation::Ring);
        assert_eq!(
            PatternAnimation::from_name("log-spiral sweep"),
            PatternAnimation::LogSpiral
        );
        assert_eq!(
            PatternAnimation::from_name(" Golden Sector Starburst "),
            PatternAnimation::GoldenSector
        );
        assert_eq!(
            PatternAnimation::from_name("not-a-pattern"),
            PatternAnimation::Ring
        );
    }

    #[test]
    fn golden_sector_wraps_into_a_full_turn() {
        for ring in 0..12 {
            let angle = PatternAnimation::GoldenSector.group_angle(
                15.0,
                Some(ring),
                Complex64::new(1.0, 0.0),
            );
            assert!((0.0..360.0).contains(&angle));
        }
    }
}
