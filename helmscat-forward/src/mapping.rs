//! Mollified domain map, its Jacobian, and the pulled-back coefficients
//!
//! The reference disk of radius R is deformed so that the circle ρ = r0
//! traces the perturbed boundary r0 + radial(φ), while the map stays the
//! identity on the core ρ ≤ r0/4 and outside ρ = R. Radially the map is
//! piecewise rational in ρ with mollifier weights
//!
//! ```text
//! m1(ρ) = (4ρ − r0)/(3 r0)   on (r0/4, r0]
//! m2(ρ) = (R − ρ)/(R − r0)   on (r0, R]
//! ```
//!
//! Both branch pairs agree at ρ = r0/4, at the perturbed boundary, and at
//! ρ = R, so the map is a continuous piecewise-smooth bijection of the disk
//! onto itself.
//!
//! The Jacobian entries are the closed-form derivatives of this construction
//! through (ρ, φ), evaluated at the reference radial function and its
//! Cartesian derivatives. Their exact algebraic form is load-bearing: the
//! pulled-back tensor and wavenumber derive from them, and the unperturbed
//! realization must reduce them to the identity (checked by tests, not by
//! re-derivation).

use crate::error::ForwardError;
use crate::expansion::Expansion;
use crate::radial::RadialField;

/// Radial band of the piecewise map
///
/// Bands are keyed by radius against (inner, middle, outer) breakpoints:
/// the identity core, the band carrying the boundary deformation, the band
/// relaxing the deformation back to zero, and the untouched exterior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapRegion {
    /// ρ ≤ inner: identity around the coordinate singularity
    Core,
    /// inner < ρ ≤ middle: deformation band
    Perturbation,
    /// middle < ρ ≤ outer: relaxation back to the identity
    Relaxation,
    /// ρ > outer: identity
    Identity,
}

impl MapRegion {
    /// Classify a radius against band breakpoints
    pub fn classify(rho: f64, inner: f64, middle: f64, outer: f64) -> Self {
        if rho <= inner {
            MapRegion::Core
        } else if rho <= middle {
            MapRegion::Perturbation
        } else if rho <= outer {
            MapRegion::Relaxation
        } else {
            MapRegion::Identity
        }
    }
}

/// 2×2 Jacobian of the domain map at one point
#[derive(Debug, Clone, Copy)]
pub struct Jacobian2 {
    pub xx: f64,
    pub xy: f64,
    pub yx: f64,
    pub yy: f64,
}

impl Jacobian2 {
    pub const IDENTITY: Jacobian2 = Jacobian2 {
        xx: 1.0,
        xy: 0.0,
        yx: 0.0,
        yy: 1.0,
    };

    /// Determinant
    pub fn det(&self) -> f64 {
        self.xx * self.yy - self.xy * self.yx
    }

    /// Pulled-back diffusion tensor and wavenumber scaling.
    ///
    /// Returns `None` when the determinant is not positive, meaning the map
    /// has folded and every derived coefficient would be meaningless.
    pub fn pullback(&self) -> Option<PulledBackCoefficients> {
        let det = self.det();
        if det <= 0.0 {
            return None;
        }
        Some(PulledBackCoefficients {
            alpha_xx: (self.xy * self.xy + self.yy * self.yy) / det,
            alpha_xy: -(self.xx * self.xy + self.yx * self.yy) / det,
            alpha_yy: (self.xx * self.xx + self.yx * self.yx) / det,
            kappa_sqrd: det,
        })
    }
}

/// Pulled-back coefficients transplanting the Helmholtz operator onto the
/// reference domain: symmetric tensor α̂ and scalar κ̂² = det(Jac)
#[derive(Debug, Clone, Copy)]
pub struct PulledBackCoefficients {
    pub alpha_xx: f64,
    pub alpha_xy: f64,
    pub alpha_yy: f64,
    pub kappa_sqrd: f64,
}

impl PulledBackCoefficients {
    pub const IDENTITY: PulledBackCoefficients = PulledBackCoefficients {
        alpha_xx: 1.0,
        alpha_xy: 0.0,
        alpha_yy: 1.0,
        kappa_sqrd: 1.0,
    };
}

/// The mollified diffeomorphism for one shape realization
#[derive(Debug, Clone, Copy)]
pub struct DomainMap<'a> {
    radial: RadialField<'a>,
    r_scatterer: f64,
    r_map: f64,
}

impl<'a> DomainMap<'a> {
    pub fn new(
        expansion: &'a Expansion,
        r_scatterer: f64,
        r_map: f64,
        coefficients: &'a [f64],
    ) -> Result<Self, ForwardError> {
        Ok(Self {
            radial: RadialField::new(expansion, r_scatterer, coefficients)?,
            r_scatterer,
            r_map,
        })
    }

    /// Radius of the identity core, r0/4
    pub fn core_radius(&self) -> f64 {
        self.r_scatterer / 4.0
    }

    /// The bound radial displacement field
    pub fn radial(&self) -> &RadialField<'a> {
        &self.radial
    }

    /// Map a reference point to the physical (deformed) domain
    pub fn to_physical(&self, x: f64, y: f64) -> [f64; 2] {
        let rho = x.hypot(y);
        let phi = y.atan2(x);
        let (r0, r_map) = (self.r_scatterer, self.r_map);

        let mapped = match MapRegion::classify(rho, self.core_radius(), r0, r_map) {
            MapRegion::Core | MapRegion::Identity => rho,
            MapRegion::Perturbation => {
                let boundary = self.radial.boundary_radius(phi);
                (rho * (4.0 * boundary - r0) - r0 * (boundary - r0)) / (3.0 * r0)
            }
            MapRegion::Relaxation => {
                let boundary = self.radial.boundary_radius(phi);
                (rho * (r_map - boundary) + r_map * (boundary - r0)) / (r_map - r0)
            }
        };
        [mapped * phi.cos(), mapped * phi.sin()]
    }

    /// Map a physical point back to the reference domain (Φ⁻¹).
    ///
    /// Used to place measurement kernels: a detector at physical radius r1
    /// lands at the reference point whose image under the deformation is
    /// the detector location.
    pub fn to_reference(&self, x: f64, y: f64) -> [f64; 2] {
        let rho = x.hypot(y);
        let phi = y.atan2(x);
        let (r0, r_map) = (self.r_scatterer, self.r_map);
        let boundary = self.radial.boundary_radius(phi);

        let mapped = match MapRegion::classify(rho, self.core_radius(), boundary, r_map) {
            MapRegion::Core | MapRegion::Identity => rho,
            MapRegion::Perturbation => r0 * (3.0 * rho + boundary - r0) / (4.0 * boundary - r0),
            MapRegion::Relaxation => {
                (rho * (r_map - r0) - r_map * (boundary - r0)) / (r_map - boundary)
            }
        };
        [mapped * phi.cos(), mapped * phi.sin()]
    }

    /// Jacobian of the deformation at a reference point.
    ///
    /// Case split on the reference radius; each entry combines the radial
    /// displacement and its Cartesian derivatives with the mollifier of the
    /// band the point falls in.
    pub fn jacobian(&self, x: f64, y: f64) -> Jacobian2 {
        let rho = x.hypot(y);
        let (r0, r_map) = (self.r_scatterer, self.r_map);

        let region = MapRegion::classify(rho, self.core_radius(), r0, r_map);
        let (ramp, mollifier) = match region {
            MapRegion::Core | MapRegion::Identity => return Jacobian2::IDENTITY,
            // d(m1)/dρ = 4/(3 r0), d(m2)/dρ = −1/(R − r0)
            MapRegion::Perturbation => (4.0 / (3.0 * r0), (4.0 * rho - r0) / (3.0 * r0)),
            MapRegion::Relaxation => (-1.0 / (r_map - r0), (r_map - rho) / (r_map - r0)),
        };

        let phi = y.atan2(x);
        let displacement = self.radial.value(phi);
        let (displacement_dx, displacement_dy) = self.radial.gradient(x, y);

        let (ux, uy) = (x / rho, y / rho);
        let rho_cub = rho * rho * rho;

        Jacobian2 {
            xx: 1.0
                + ramp * x * ux / rho * displacement
                + mollifier * (y * y / rho_cub * displacement + ux * displacement_dx),
            xy: ramp * y * ux / rho * displacement
                + mollifier * (-x * y / rho_cub * displacement + ux * displacement_dy),
            yx: ramp * x * uy / rho * displacement
                + mollifier * (-x * y / rho_cub * displacement + uy * displacement_dx),
            yy: 1.0
                + ramp * y * uy / rho * displacement
                + mollifier * (x * x / rho_cub * displacement + uy * displacement_dy),
        }
    }
}
