//! Truncation of the boundary-perturbation expansion
//!
//! The random boundary displacement is a Fourier series whose mode j is
//! damped by a weight w(j); truncation keeps the smallest J modes capturing
//! 95% of the total variance. Two weightings exist:
//!
//! - correlation-length form: w(j) = 1 + s·j^(2+ε), sums taken numerically
//!   up to a fixed cutoff
//! - power-law form: w(j) = j^(2+ε), sums known in closed form through the
//!   Riemann zeta function
//!
//! Both regimes share the same lazily evaluated term sequence; only the
//! weight function differs. The truncation is computed once per context and
//! the resulting (J, Σ) pair is held constant afterwards, which keeps every
//! later evaluation reproducible.

use crate::config::CorrelationParameters;
use crate::error::ForwardError;
use spec_math::Zeta;

/// Hard cutoff for the numerically summed series
pub const MODE_CUTOFF: usize = 1_000_000;

/// Fraction of the total variance the truncated expansion must capture
pub const VARIANCE_FRACTION: f64 = 0.95;

/// Mode weight function selecting between the two series forms
#[derive(Debug, Clone, Copy)]
pub struct ModeWeights {
    char_len: bool,
    scale: f64,
    epsilon: f64,
}

impl ModeWeights {
    pub fn new(corr: &CorrelationParameters) -> Self {
        Self {
            char_len: corr.char_len,
            scale: corr.scale,
            epsilon: corr.epsilon,
        }
    }

    /// Damping weight w(j) of mode j ≥ 1
    #[inline]
    pub fn weight(&self, j: usize) -> f64 {
        let power = (j as f64).powf(2.0 + self.epsilon);
        if self.char_len {
            1.0 + self.scale * power
        } else {
            power
        }
    }

    /// Lazy sequence of amplitude terms 1/w(j), j = 1, 2, ...
    fn amplitude_terms(&self) -> impl Iterator<Item = f64> + '_ {
        (1..).map(move |j| 1.0 / self.weight(j))
    }
}

/// Truncated expansion: mode count J and normalizing sum Σ
#[derive(Debug, Clone)]
pub struct Expansion {
    /// Number of retained modes J
    pub modes: usize,
    /// Normalizing sum Σ of the amplitude series
    pub normalizer: f64,
    /// Weight function shared with the radial field evaluation
    pub weights: ModeWeights,
}

/// Riemann zeta ζ(x) for x > 1
fn riemann_zeta(x: f64) -> f64 {
    x.zetac() + 1.0
}

/// Determine the truncation (J, Σ) for the given correlation parameters.
///
/// J is the smallest mode count whose accumulated variance reaches
/// [`VARIANCE_FRACTION`] of the full variance sum; failing to reach it
/// within [`MODE_CUTOFF`] terms indicates pathological (ε, s) and is a
/// convergence error.
pub fn truncate_expansion(corr: &CorrelationParameters) -> Result<Expansion, ForwardError> {
    let weights = ModeWeights::new(corr);
    let order = 2.0 + corr.epsilon;

    let (normalizer, variance_total) = if corr.char_len {
        let normalizer: f64 = weights.amplitude_terms().take(MODE_CUTOFF).sum();
        let variance: f64 = weights
            .amplitude_terms()
            .take(MODE_CUTOFF)
            .map(|t| t * t)
            .sum();
        (normalizer, variance)
    } else {
        (riemann_zeta(order), riemann_zeta(2.0 * order))
    };

    let required = VARIANCE_FRACTION * variance_total;
    let mut partial = 0.0;
    for (j, term) in weights.amplitude_terms().take(MODE_CUTOFF).enumerate() {
        partial += term * term;
        if partial >= required {
            let modes = j + 1;
            log::info!(
                "mode truncation: J = {}, normalizer = {:.6}, variance fraction {:.4}",
                modes,
                normalizer,
                partial / variance_total
            );
            return Ok(Expansion {
                modes,
                normalizer,
                weights,
            });
        }
    }

    Err(ForwardError::Convergence {
        partial,
        required,
        cutoff: MODE_CUTOFF,
        epsilon: corr.epsilon,
        scale: corr.scale,
    })
}
