//! Radial boundary-perturbation field
//!
//! For a shape realization Y (2J coefficients, one cosine/sine pair per
//! mode), the boundary displacement is the band-limited periodic function
//!
//! ```text
//! radial(φ) = r0/(4Σ) · Σ_{j=1}^{J} [Y_{2j-1} cos(jφ) + Y_{2j} sin(jφ)] / w(j)
//! ```
//!
//! The r0/(4Σ) scaling bounds |radial| ≤ r0/4 for coefficients in [-1, 1],
//! which keeps the deformed boundary clear of the inner identity region.
//! Cartesian partial derivatives follow from the chain rule through the
//! polar angle, with x and y entering through ∓ y/ρ², ± x/ρ².

use crate::error::ForwardError;
use crate::expansion::Expansion;

/// Radial displacement field for one shape realization
#[derive(Debug, Clone, Copy)]
pub struct RadialField<'a> {
    expansion: &'a Expansion,
    r_scatterer: f64,
    coefficients: &'a [f64],
}

impl<'a> RadialField<'a> {
    /// Bind a shape realization to the truncated expansion.
    ///
    /// `coefficients` must hold exactly 2J values, ordered as
    /// (cos, sin) pairs per mode.
    pub fn new(
        expansion: &'a Expansion,
        r_scatterer: f64,
        coefficients: &'a [f64],
    ) -> Result<Self, ForwardError> {
        let expected = 2 * expansion.modes;
        if coefficients.len() != expected {
            return Err(ForwardError::Configuration(format!(
                "shape parameter vector must have length {expected} (2 per mode), \
                 got {}",
                coefficients.len()
            )));
        }
        Ok(Self {
            expansion,
            r_scatterer,
            coefficients,
        })
    }

    #[inline]
    fn amplitude(&self) -> f64 {
        self.r_scatterer / (4.0 * self.expansion.normalizer)
    }

    /// Displacement radial(φ)
    pub fn value(&self, phi: f64) -> f64 {
        let mut sum = 0.0;
        for j in 1..=self.expansion.modes {
            let arg = j as f64 * phi;
            let (cos_coeff, sin_coeff) = (self.coefficients[2 * j - 2], self.coefficients[2 * j - 1]);
            sum += (cos_coeff * arg.cos() + sin_coeff * arg.sin()) / self.expansion.weights.weight(j);
        }
        sum * self.amplitude()
    }

    /// The angular sum Σ [Y_{2j-1} sin(jφ) − Y_{2j} cos(jφ)] · j / w(j)
    /// entering both Cartesian derivatives
    fn angular_sum(&self, phi: f64) -> f64 {
        let mut sum = 0.0;
        for j in 1..=self.expansion.modes {
            let arg = j as f64 * phi;
            let (cos_coeff, sin_coeff) = (self.coefficients[2 * j - 2], self.coefficients[2 * j - 1]);
            sum += (cos_coeff * arg.sin() - sin_coeff * arg.cos()) * j as f64
                / self.expansion.weights.weight(j);
        }
        sum
    }

    /// Cartesian gradient (∂radial/∂x, ∂radial/∂y) at a point.
    ///
    /// The origin is a removable singularity of the chain rule; it is never
    /// reached in practice (the mollifier zeroes the displacement there) but
    /// the division is guarded regardless.
    pub fn gradient(&self, x: f64, y: f64) -> (f64, f64) {
        let rho_sqr = x * x + y * y;
        if rho_sqr < f64::EPSILON {
            return (0.0, 0.0);
        }
        let phi = y.atan2(x);
        let scaled = self.angular_sum(phi) * self.amplitude() / rho_sqr;
        (y * scaled, -x * scaled)
    }

    /// Perturbed physical boundary radius r0 + radial(φ)
    pub fn boundary_radius(&self, phi: f64) -> f64 {
        self.r_scatterer + self.value(phi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorrelationParameters;
    use crate::expansion::truncate_expansion;
    use std::f64::consts::PI;

    fn expansion() -> Expansion {
        truncate_expansion(&CorrelationParameters {
            epsilon: 0.001,
            char_len: true,
            scale: 0.2,
        })
        .unwrap()
    }

    fn alternating_shape(modes: usize) -> Vec<f64> {
        (0..2 * modes)
            .map(|i| if i % 2 == 0 { 0.8 } else { -0.5 })
            .collect()
    }

    #[test]
    fn test_rejects_wrong_length() {
        let expansion = expansion();
        let y = vec![0.0; 2 * expansion.modes + 1];
        assert!(matches!(
            RadialField::new(&expansion, 1.0, &y),
            Err(ForwardError::Configuration(_))
        ));
    }

    #[test]
    fn test_periodicity() {
        let expansion = expansion();
        let y = alternating_shape(expansion.modes);
        let field = RadialField::new(&expansion, 1.0, &y).unwrap();

        for k in 0..32 {
            let phi = -PI + 2.0 * PI * k as f64 / 32.0;
            assert!(
                (field.value(phi) - field.value(phi + 2.0 * PI)).abs() < 1e-12,
                "radial not 2π-periodic at φ = {}",
                phi
            );
        }
    }

    #[test]
    fn test_zero_shape_gives_zero_field() {
        let expansion = expansion();
        let y = vec![0.0; 2 * expansion.modes];
        let field = RadialField::new(&expansion, 1.0, &y).unwrap();

        assert_eq!(field.value(0.7), 0.0);
        assert_eq!(field.gradient(1.5, -0.3), (0.0, 0.0));
        assert_eq!(field.boundary_radius(2.0), 1.0);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let expansion = expansion();
        let y = alternating_shape(expansion.modes);
        let field = RadialField::new(&expansion, 1.0, &y).unwrap();

        let h = 1e-6;
        for &(x, yy) in &[(1.3, 0.4), (-0.8, 0.9), (0.2, -1.7), (2.5, 2.5)] {
            let value_at = |px: f64, py: f64| field.value(py.atan2(px));
            let fd_x = (value_at(x + h, yy) - value_at(x - h, yy)) / (2.0 * h);
            let fd_y = (value_at(x, yy + h) - value_at(x, yy - h)) / (2.0 * h);
            let (dx, dy) = field.gradient(x, yy);
            assert!(
                (dx - fd_x).abs() < 1e-6,
                "∂x mismatch at ({}, {}): {} vs {}",
                x,
                yy,
                dx,
                fd_x
            );
            assert!(
                (dy - fd_y).abs() < 1e-6,
                "∂y mismatch at ({}, {}): {} vs {}",
                x,
                yy,
                dy,
                fd_y
            );
        }
    }

    #[test]
    fn test_origin_gradient_guarded() {
        let expansion = expansion();
        let y = alternating_shape(expansion.modes);
        let field = RadialField::new(&expansion, 1.0, &y).unwrap();
        assert_eq!(field.gradient(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_displacement_bounded_by_quarter_radius() {
        // Unit-bounded coefficients: |radial| ≤ r0 Σ|terms| / (4Σ) ≤ r0/4
        let expansion = expansion();
        let y = vec![1.0; 2 * expansion.modes];
        let field = RadialField::new(&expansion, 1.0, &y).unwrap();

        for k in 0..256 {
            let phi = 2.0 * PI * k as f64 / 256.0;
            // cos + sin of the same mode can reach √2 jointly, hence the
            // slack factor over the plain r0/4 bound
            assert!(field.value(phi).abs() <= 2.0_f64.sqrt() * 0.25 + 1e-12);
        }
    }
}
