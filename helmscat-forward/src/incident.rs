//! Incident plane wave
//!
//! The incoming field in the exterior medium is
//! u_i(x) = exp(i κ d·x) with κ = κ₀ √(n_out/α_out); its radial normal
//! derivative enters the coupling-circle flux term of the load vector.

use crate::config::FieldParameters;
use num_complex::Complex64;

/// Incident plane wave in the exterior medium
#[derive(Debug, Clone, Copy)]
pub struct IncidentWave {
    wavenumber: f64,
    direction: [f64; 2],
}

impl IncidentWave {
    pub fn new(field: &FieldParameters) -> Self {
        Self {
            wavenumber: field.exterior_wavenumber(),
            direction: field.direction,
        }
    }

    /// Field value u_i(x, y)
    pub fn value(&self, x: f64, y: f64) -> Complex64 {
        let phase = self.wavenumber * (self.direction[0] * x + self.direction[1] * y);
        Complex64::from_polar(1.0, phase)
    }

    /// Radial normal derivative ∂u_i/∂ρ = iκ (x·d)/ρ · u_i
    pub fn radial_derivative(&self, x: f64, y: f64) -> Complex64 {
        let rho = x.hypot(y);
        if rho < f64::EPSILON {
            return Complex64::new(0.0, 0.0);
        }
        let projection = x * self.direction[0] + y * self.direction[1];
        Complex64::new(0.0, self.wavenumber * projection / rho) * self.value(x, y)
    }
}
