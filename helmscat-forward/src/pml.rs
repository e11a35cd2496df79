//! Radial PML through complex coordinate stretching
//!
//! Between R̃ and R_PML the radial coordinate is stretched into the complex
//! plane by d(ρ) = 1 + iσ(ρ)/(2πf), with σ ramping linearly from 0 to the
//! peak damping. The tangential direction is stretched by the path-averaged
//! factor d̄(ρ) = 1 + iσ̄(ρ)/(2πf), where σ̄ is the mean of σ along the ray
//! from the origin; inside the layer the average of the linear ramp is the
//! quadratic closed form, beyond the layer it decays like 1/ρ towards the
//! saturated value.
//!
//! In Cartesian components the stretched Helmholtz operator picks up the
//! tensor A below in the gradient term and the scalar d·d̄ in the mass term.
//! Inside R̃ both reduce to the identity and the equation is untouched.

use num_complex::Complex64;
use std::f64::consts::PI;

/// PML tensor entries at one point (A is symmetric)
#[derive(Debug, Clone, Copy)]
pub struct PmlTensor {
    pub xx: Complex64,
    pub xy: Complex64,
    pub yy: Complex64,
}

impl PmlTensor {
    pub const IDENTITY: PmlTensor = PmlTensor {
        xx: Complex64::new(1.0, 0.0),
        xy: Complex64::new(0.0, 0.0),
        yy: Complex64::new(1.0, 0.0),
    };
}

/// Radial complex-stretching profile of the absorbing layer
#[derive(Debug, Clone, Copy)]
pub struct PmlStretching {
    sigma_pml: f64,
    r_start: f64,
    r_outer: f64,
    frequency: f64,
}

impl PmlStretching {
    pub fn new(sigma_pml: f64, r_start: f64, r_outer: f64, frequency: f64) -> Self {
        Self {
            sigma_pml,
            r_start,
            r_outer,
            frequency,
        }
    }

    /// Damping profile σ(ρ): zero inside R̃, linear ramp to the peak at
    /// R_PML, saturated beyond
    pub fn damping(&self, rho: f64) -> f64 {
        let ramp = (rho - self.r_start) / (self.r_outer - self.r_start);
        self.sigma_pml * ramp.clamp(0.0, 1.0)
    }

    /// Path-averaged damping σ̄(ρ) = (1/ρ) ∫₀^ρ σ(t) dt
    pub fn damping_mean(&self, rho: f64) -> f64 {
        if rho <= self.r_start {
            0.0
        } else if rho <= self.r_outer {
            self.sigma_pml * (rho - self.r_start).powi(2)
                / (2.0 * rho * (self.r_outer - self.r_start))
        } else {
            self.sigma_pml * (1.0 - (self.r_outer + self.r_start) / (2.0 * rho))
        }
    }

    /// Radial stretching factor d(ρ) = 1 + iσ(ρ)/(2πf)
    pub fn stretch(&self, rho: f64) -> Complex64 {
        Complex64::new(1.0, self.damping(rho) / (2.0 * PI * self.frequency))
    }

    /// Tangential stretching factor d̄(ρ) = 1 + iσ̄(ρ)/(2πf)
    pub fn stretch_mean(&self, rho: f64) -> Complex64 {
        Complex64::new(1.0, self.damping_mean(rho) / (2.0 * PI * self.frequency))
    }

    /// Cartesian stretching tensor A at a point
    pub fn tensor(&self, x: f64, y: f64) -> PmlTensor {
        let rho = x.hypot(y);
        let phi = y.atan2(x);
        let d = self.stretch(rho);
        let d_mean = self.stretch_mean(rho);

        let radial_ratio = d_mean / d;
        let tangential_ratio = d / d_mean;
        let (sin, cos) = phi.sin_cos();

        PmlTensor {
            xx: radial_ratio * cos * cos + tangential_ratio * sin * sin,
            xy: (radial_ratio - tangential_ratio) * cos * sin,
            yy: tangential_ratio * cos * cos + radial_ratio * sin * sin,
        }
    }

    /// Scalar mass-term multiplier d(ρ)·d̄(ρ)
    pub fn scale(&self, rho: f64) -> Complex64 {
        self.stretch(rho) * self.stretch_mean(rho)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn layer() -> PmlStretching {
        PmlStretching::new(1e4, 7.5, 11.0, 1e9)
    }

    #[test]
    fn test_identity_inside_layer() {
        let pml = layer();
        for rho in [0.0, 1.0, 5.0, 7.5] {
            assert_eq!(pml.damping(rho), 0.0);
            assert_eq!(pml.damping_mean(rho), 0.0);
            assert_eq!(pml.scale(rho), Complex64::new(1.0, 0.0));
        }
        let a = pml.tensor(3.0, 4.0);
        assert_relative_eq!(a.xx.re, 1.0, epsilon = 1e-14);
        assert_relative_eq!(a.yy.re, 1.0, epsilon = 1e-14);
        assert!(a.xy.norm() < 1e-14);
    }

    #[test]
    fn test_damping_ramp() {
        let pml = layer();
        assert_relative_eq!(pml.damping(9.25), 0.5e4);
        assert_relative_eq!(pml.damping(11.0), 1e4);
        // Saturates past the outer radius
        assert_relative_eq!(pml.damping(15.0), 1e4);
    }

    #[test]
    fn test_damping_mean_continuity() {
        let pml = layer();
        let eps = 1e-9;

        // At the layer entry σ̄ joins zero
        assert!(pml.damping_mean(7.5 + eps) < 1e-6);

        // Across the outer edge the two closed forms agree
        let inside = pml.damping_mean(11.0 - eps);
        let outside = pml.damping_mean(11.0 + eps);
        assert_relative_eq!(inside, outside, max_relative = 1e-6);

        // Beyond the layer: σ_PML (1 − (R_PML + R̃)/(2ρ))
        let expected = 1e4 * (1.0 - (11.0 + 7.5) / (2.0 * 20.0));
        assert_relative_eq!(pml.damping_mean(20.0), expected);
    }

    #[test]
    fn test_damping_mean_is_path_average() {
        // σ̄(ρ)·ρ must equal the numerically integrated ramp
        let pml = layer();
        let rho = 10.0;
        let n = 200_000;
        let mut integral = 0.0;
        for i in 0..n {
            let t = rho * (i as f64 + 0.5) / n as f64;
            integral += pml.damping(t) * rho / n as f64;
        }
        assert_relative_eq!(pml.damping_mean(rho) * rho, integral, max_relative = 1e-6);
    }

    #[test]
    fn test_tensor_on_axes() {
        // On the x-axis the radial direction is x: Axx = d̄/d, Ayy = d/d̄
        let pml = layer();
        let rho = 10.0;
        let a = pml.tensor(rho, 0.0);
        let expected_xx = pml.stretch_mean(rho) / pml.stretch(rho);
        let expected_yy = pml.stretch(rho) / pml.stretch_mean(rho);
        assert!((a.xx - expected_xx).norm() < 1e-14);
        assert!((a.yy - expected_yy).norm() < 1e-14);
        assert!(a.xy.norm() < 1e-14);

        // On the y-axis the roles swap
        let a = pml.tensor(0.0, rho);
        assert!((a.xx - expected_yy).norm() < 1e-14);
        assert!((a.yy - expected_xx).norm() < 1e-14);
    }

    #[test]
    fn test_tensor_rotation_invariant_determinant() {
        // det A = 1 for every angle: the stretching is area-preserving in
        // the tensor sense (d̄/d · d/d̄ = 1)
        let pml = layer();
        for k in 0..16 {
            let phi = 2.0 * PI * k as f64 / 16.0;
            let a = pml.tensor(10.0 * phi.cos(), 10.0 * phi.sin());
            let det = a.xx * a.yy - a.xy * a.xy;
            assert!((det - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_scale_accumulates_damping() {
        let pml = layer();
        let s = pml.scale(11.0);
        assert!(s.im > 0.0);
        assert!(s.re <= 1.0 + 1e-12);
    }
}
