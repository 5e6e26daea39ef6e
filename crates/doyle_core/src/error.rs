use thiserror::Error;

/// Errors surfaced at the engine boundary.
///
/// Degenerate circles (fewer than two intersection points) are not an error:
/// the arc selector returns an empty set and the circle simply contributes
/// nothing to the packing.
#[derive(Debug, Clone, Error)]
pub enum SpiralError {
    /// The Newton iteration for the spiral generators produced a non-finite
    /// residual. No partial root is usable, so engine construction aborts.
    #[error("Doyle root solve diverged for p={p}, q={q} (residual {residual})")]
    DivergedSolve { p: u32, q: u32, residual: f64 },

    /// An arc selection mode name could not be resolved to a known mode.
    #[error("unknown arc selection mode '{0}'")]
    InvalidArcMode(String),

    /// Exported geometry was requested before any arc groups were produced.
    #[error("geometry requested before any arc groups were generated")]
    GeometryNotReady,
}
