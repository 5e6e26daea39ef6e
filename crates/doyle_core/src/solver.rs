//! Root solver for the Doyle spiral consistency equations.
//!
//! A Doyle spiral with parameters (p, q) is fixed by a radial variable z
//! and an angular variable t satisfying the equality of three tangency
//! ratios. We solve the 2D system with a damped Newton iteration using a
//! finite-difference Jacobian, then derive the complex generators a and b
//! and the base radius.

use std::f64::consts::TAU;

use nalgebra::{Matrix2, Vector2};
use num_complex::Complex64;
use tracing::debug;

use crate::error::SpiralError;

/// Upper bound on Newton iterations before the current iterate is accepted.
pub const MAX_ITERATIONS: usize = 80;
/// Infinity-norm residual at which the iteration stops early.
pub const RESIDUAL_TOL: f64 = 1e-14;

const FD_STEP: f64 = 1e-6;
const MAX_BACKTRACKS: usize = 8;

/// Solved spiral generators. Immutable once computed for a given (p, q).
#[derive(Debug, Clone, Copy)]
pub struct SpiralRoot {
    /// Step generator along an arm.
    pub a: Complex64,
    /// Step generator between arms.
    pub b: Complex64,
    /// Base circle radius (relative to the modulus of the lattice value).
    pub r: f64,
    /// Modulus of `a`: the radial variable z of the solve.
    pub mod_a: f64,
    /// Argument of `a`: the angular variable t of the solve.
    pub arg_a: f64,
}

/// Squared distance between the lattice value at (z, t) and its image
/// under the (p, q) rotation.
fn separation(z: f64, t: f64, p: f64, q: f64) -> f64 {
    let w = z.powf(p / q);
    let s = (p * t + TAU) / q;
    (z * t.cos() - w * s.cos()).powi(2) + (z * t.sin() - w * s.sin()).powi(2)
}

fn radius_scale(z: f64, p: f64, q: f64) -> f64 {
    (z + z.powf(p / q)).powi(2)
}

/// Tangency ratio: squared radius of the circle sitting between the two
/// lattice values, relative to their moduli.
fn ratio(z: f64, t: f64, p: f64, q: f64) -> f64 {
    separation(z, t, p, q) / radius_scale(z, p, q)
}

/// The two residual equations: all three tangency ratios must agree.
fn residual(z: f64, t: f64, p: f64, q: f64) -> Vector2<f64> {
    let base = ratio(z, t, 0.0, 1.0);
    Vector2::new(
        base - ratio(z, t, p, q),
        base - ratio(z.powf(p / q), (p * t + TAU) / q, 0.0, 1.0),
    )
}

/// Solves the Doyle system for (p, q).
///
/// Fails with [`SpiralError::DivergedSolve`] when the residual becomes
/// non-finite or the Jacobian degenerates; reaching the iteration cap with
/// a finite residual is accepted as converged-enough.
pub fn solve(p: u32, q: u32) -> Result<SpiralRoot, SpiralError> {
    let (pf, qf) = (p as f64, q as f64);
    let diverged = |residual: f64| SpiralError::DivergedSolve { p, q, residual };

    let mut x = Vector2::new(2.0, 0.0);
    let mut f = residual(x[0], x[1], pf, qf);
    let mut iterations = 0usize;

    while iterations < MAX_ITERATIONS {
        let norm = f.amax();
        if !norm.is_finite() {
            return Err(diverged(norm));
        }
        if norm < RESIDUAL_TOL {
            break;
        }

        // Forward-difference Jacobian, one column per variable.
        let fz = residual(x[0] + FD_STEP, x[1], pf, qf);
        let ft = residual(x[0], x[1] + FD_STEP, pf, qf);
        let jacobian = Matrix2::new(
            (fz[0] - f[0]) / FD_STEP,
            (ft[0] - f[0]) / FD_STEP,
            (fz[1] - f[1]) / FD_STEP,
            (ft[1] - f[1]) / FD_STEP,
        );
        let step = jacobian.lu().solve(&f).ok_or_else(|| diverged(norm))?;

        // Backtracking line search; the radial variable must stay positive.
        let mut lambda = 1.0;
        let mut next = None;
        for _ in 0..=MAX_BACKTRACKS {
            let candidate = x - step * lambda;
            if candidate[0] > 0.0 {
                let fc = residual(candidate[0], candidate[1], pf, qf);
                let fc_norm = fc.amax();
                if !fc_norm.is_finite() {
                    return Err(diverged(fc_norm));
                }
                next = Some((candidate, fc));
                if fc_norm < norm {
                    break;
                }
            }
            lambda *= 0.5;
        }

        match next {
            Some((candidate, fc)) => {
                x = candidate;
                f = fc;
            }
            // Every damped step left the positive-z half plane; keep the
            // current iterate as the answer.
            None => break,
        }
        iterations += 1;
    }

    let final_norm = f.amax();
    if !final_norm.is_finite() {
        return Err(diverged(final_norm));
    }

    let (z, t) = (x[0], x[1]);
    let root = SpiralRoot {
        a: Complex64::from_polar(z, t),
        b: Complex64::from_polar(z.powf(pf / qf), (pf * t + TAU) / qf),
        r: ratio(z, t, 0.0, 1.0).sqrt(),
        mod_a: z,
        arg_a: t,
    };
    debug!(p, q, iterations, residual = final_norm, "doyle root solved");
    Ok(root)
}
