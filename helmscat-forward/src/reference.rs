//! Analytic scattering by a homogeneous circular obstacle
//!
//! Partial-wave (Bessel/Hankel) series for a penetrable circular cylinder
//! with refractive and material contrast, hit by a unit plane wave traveling
//! along +x. This is the closed-form counterpart of the unperturbed (Y = 0)
//! geometry and anchors the end-to-end regression of the forward operator.
//!
//! Expansion of the incident wave:
//! ```text
//! exp(i k x) = Σ_n ε_n iⁿ J_n(k r) cos(nθ),   ε_0 = 1, ε_n = 2
//! ```
//! The transmission conditions (continuity of u and of α ∂u/∂ρ across the
//! circle ρ = a) determine the scattered-wave coefficients a_n, giving
//! ```text
//! u_s(r, θ) = Σ_n ε_n iⁿ a_n H_n⁽¹⁾(k_out r) cos(nθ)
//! ```

use num_complex::Complex64;
use spec_math::Bessel;

fn bessel_j(n: usize, x: f64) -> f64 {
    x.bessel_jv(n as f64)
}

fn bessel_y(n: usize, x: f64) -> f64 {
    x.bessel_yv(n as f64)
}

/// J_n'(x) via the recurrence J_n' = J_{n-1} − (n/x) J_n
fn bessel_j_prime(n: usize, x: f64) -> f64 {
    if n == 0 {
        -bessel_j(1, x)
    } else {
        bessel_j(n - 1, x) - n as f64 / x * bessel_j(n, x)
    }
}

fn bessel_y_prime(n: usize, x: f64) -> f64 {
    if n == 0 {
        -bessel_y(1, x)
    } else {
        bessel_y(n - 1, x) - n as f64 / x * bessel_y(n, x)
    }
}

fn hankel1(n: usize, x: f64) -> Complex64 {
    Complex64::new(bessel_j(n, x), bessel_y(n, x))
}

fn hankel1_prime(n: usize, x: f64) -> Complex64 {
    Complex64::new(bessel_j_prime(n, x), bessel_y_prime(n, x))
}

/// Scattering setup for a homogeneous penetrable circle
#[derive(Debug, Clone, Copy)]
pub struct CircleScattering {
    /// Exterior wavenumber κ₀ √(n_out/α_out)
    pub wavenumber_out: f64,
    /// Interior wavenumber κ₀ √(n_in/α_in)
    pub wavenumber_in: f64,
    /// Exterior material constant
    pub alpha_out: f64,
    /// Interior material constant
    pub alpha_in: f64,
    /// Circle radius
    pub radius: f64,
    /// Number of series terms (2·ka + 10 is usually plenty)
    pub num_terms: usize,
}

impl CircleScattering {
    /// Scattered-wave coefficient a_n from the transmission conditions
    fn coefficient(&self, n: usize) -> Complex64 {
        let ka_out = self.wavenumber_out * self.radius;
        let ka_in = self.wavenumber_in * self.radius;

        let j_in = bessel_j(n, ka_in);
        let dj_in = bessel_j_prime(n, ka_in);
        let j_out = bessel_j(n, ka_out);
        let dj_out = bessel_j_prime(n, ka_out);
        let h_out = hankel1(n, ka_out);
        let dh_out = hankel1_prime(n, ka_out);

        let flux_in = self.alpha_in * self.wavenumber_in;
        let flux_out = self.alpha_out * self.wavenumber_out;

        let numerator = flux_in * dj_in * j_out - flux_out * j_in * dj_out;
        let denominator = flux_out * dh_out * j_in - Complex64::new(flux_in * dj_in, 0.0) * h_out;
        Complex64::new(numerator, 0.0) / denominator
    }

    /// Scattered field u_s at polar coordinates (r, θ), r ≥ radius
    pub fn scattered_field(&self, r: f64, theta: f64) -> Complex64 {
        let kr = self.wavenumber_out * r;
        let mut total = Complex64::new(0.0, 0.0);

        for n in 0..self.num_terms {
            let neumann = if n == 0 { 1.0 } else { 2.0 };
            let i_pow = Complex64::new(0.0, 1.0).powu(n as u32);
            total += i_pow
                * self.coefficient(n)
                * hankel1(n, kr)
                * (neumann * (n as f64 * theta).cos());
        }
        total
    }
}
