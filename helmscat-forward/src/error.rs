//! Error types for the forward operator
//!
//! Configuration, convergence, and degenerate-map failures are detectable
//! before the expensive linear solve and abort early with the offending
//! parameter in the message. Solver failures propagate from the FE layer
//! without retry; whether to reject the corresponding shape sample is the
//! caller's decision.

use helmscat_fem::SolveError;
use thiserror::Error;

/// Failure modes of an observation evaluation
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Invalid geometric ordering or parameter value
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The mode-truncation series failed to reach the variance threshold
    #[error(
        "mode expansion reached {partial:.6} of required {required:.6} variance \
         within {cutoff} terms (epsilon = {epsilon}, scale = {scale})"
    )]
    Convergence {
        partial: f64,
        required: f64,
        cutoff: usize,
        epsilon: f64,
        scale: f64,
    },

    /// The coordinate map folded: det(Jac) ≤ 0 at a sampled point
    #[error(
        "coordinate map degenerate: det(Jac) = {det:.6e} at ({x:.4}, {y:.4}); \
         radial perturbation too large for the reference radius"
    )]
    DegenerateMap { det: f64, x: f64, y: f64 },

    /// The linear solve failed (singular or inconsistent system)
    #[error("linear solve failed: {0}")]
    Solver(#[from] SolveError),
}
