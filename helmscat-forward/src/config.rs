//! Simulation configuration
//!
//! All parameters are optional in the sense that `Default` supplies the
//! reference values (lengths in cm, frequencies in Hz). A configuration is
//! validated once when a [`crate::SimulationContext`] is built.

use crate::error::ForwardError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Which of the two parallel pipelines a context runs
///
/// Both share every formula; they differ only in mesh resolution. `Data`
/// synthesizes ground-truth measurements on a finer mesh, `Inversion` is the
/// cheap instance evaluated repeatedly inside an outer inversion loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineKind {
    /// High-resolution instance for synthetic ground-truth data
    Data,
    /// Coarser instance for repeated forward evaluations
    Inversion,
}

/// Physical field and PML parameters, immutable per simulation instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldParameters {
    /// Frequency of the incoming wave in Hz
    pub frequency: f64,
    /// Wave speed in cm/s
    pub wave_speed: f64,
    /// Material constant inside the scatterer
    pub alpha_in: f64,
    /// Material constant outside the scatterer
    pub alpha_out: f64,
    /// Refractive index inside the scatterer
    pub n_in: f64,
    /// Refractive index outside the scatterer
    pub n_out: f64,
    /// Unit propagation direction of the incoming wave
    pub direction: [f64; 2],
    /// Inner radius of the absorbing layer (R̃) in cm
    pub r_pml_start: f64,
    /// Outer truncation radius (R_PML) in cm
    pub r_pml_outer: f64,
    /// Peak damping of the absorbing layer
    pub sigma_pml: f64,
}

impl Default for FieldParameters {
    fn default() -> Self {
        Self {
            frequency: 1e9,
            wave_speed: 3e10,
            alpha_in: 1.0,
            alpha_out: 1.0,
            n_in: 0.9,
            n_out: 1.0,
            direction: [1.0, 0.0],
            r_pml_start: 7.5,
            r_pml_outer: 11.0,
            sigma_pml: 1e4,
        }
    }
}

impl FieldParameters {
    /// Free-space wavenumber κ₀ = 2πf/c
    pub fn wavenumber(&self) -> f64 {
        2.0 * PI * self.frequency / self.wave_speed
    }

    /// Effective wavenumber of the exterior medium, κ₀·√(n_out/α_out)
    pub fn exterior_wavenumber(&self) -> f64 {
        self.wavenumber() * (self.n_out / self.alpha_out).sqrt()
    }
}

/// Radii of the reference geometry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeometryParameters {
    /// Reference scatterer radius r0 in cm
    pub r_scatterer: f64,
    /// Radius of the detector ring in the physical domain, in cm.
    /// Must lie strictly between the perturbed boundary and `r_map`.
    pub r_measure: f64,
    /// Outer radius R of the coordinate-transformation domain in cm
    pub r_map: f64,
}

impl Default for GeometryParameters {
    fn default() -> Self {
        Self {
            r_scatterer: 1.0,
            r_measure: 6.0,
            r_map: 7.0,
        }
    }
}

/// Parameters of the boundary-perturbation expansion
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CorrelationParameters {
    /// Small positive decay exponent keeping the mode sums convergent
    pub epsilon: f64,
    /// Selects the correlation-length weighting over the pure power law
    pub char_len: bool,
    /// Scaled correlation length s
    pub scale: f64,
}

impl Default for CorrelationParameters {
    fn default() -> Self {
        Self {
            epsilon: 0.001,
            char_len: false,
            scale: 0.001,
        }
    }
}

/// Complete configuration of a forward operator instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardConfig {
    pub field: FieldParameters,
    pub geometry: GeometryParameters,
    pub correlation: CorrelationParameters,
    /// Number K of detector points on the measurement ring
    pub num_detectors: usize,
    /// Width of the measurement smoothing kernel; solved for at
    /// construction time when absent
    pub sigma_smooth: Option<f64>,
    /// Characteristic mesh cell size; derived from the frequency and the
    /// pipeline kind when absent
    pub cell_size: Option<f64>,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            field: FieldParameters::default(),
            geometry: GeometryParameters::default(),
            correlation: CorrelationParameters::default(),
            num_detectors: 15,
            sigma_smooth: None,
            cell_size: None,
        }
    }
}

/// Frequency-derived mesh resolution, h(f) = √((1/8)² (10⁹/f)³)
pub fn reference_cell_size(frequency: f64) -> f64 {
    ((1.0 / 8.0_f64).powi(2) * (1e9 / frequency).powi(3)).sqrt()
}

impl ForwardConfig {
    /// Mesh cell size for a pipeline: the explicit override when present,
    /// otherwise the frequency-derived default, halved for the data instance.
    pub fn cell_size_for(&self, kind: PipelineKind) -> f64 {
        if let Some(h) = self.cell_size {
            return h;
        }
        let h = reference_cell_size(self.field.frequency);
        match kind {
            PipelineKind::Data => 0.5 * h,
            PipelineKind::Inversion => h,
        }
    }

    /// Check the geometric ordering and parameter ranges.
    pub fn validate(&self) -> Result<(), ForwardError> {
        let f = &self.field;
        let g = &self.geometry;
        let c = &self.correlation;

        if f.frequency <= 0.0 || f.wave_speed <= 0.0 {
            return Err(ForwardError::Configuration(format!(
                "frequency and wave speed must be positive (frequency = {}, wave_speed = {})",
                f.frequency, f.wave_speed
            )));
        }
        if f.alpha_in <= 0.0 || f.alpha_out <= 0.0 || f.n_in <= 0.0 || f.n_out <= 0.0 {
            return Err(ForwardError::Configuration(format!(
                "material constants must be positive (alpha = {}/{}, n = {}/{})",
                f.alpha_in, f.alpha_out, f.n_in, f.n_out
            )));
        }
        let norm = f.direction[0].hypot(f.direction[1]);
        if (norm - 1.0).abs() > 1e-8 {
            return Err(ForwardError::Configuration(format!(
                "propagation direction must be a unit vector, |dir| = {norm}"
            )));
        }
        if f.sigma_pml <= 0.0 {
            return Err(ForwardError::Configuration(format!(
                "PML damping must be positive, sigma_pml = {}",
                f.sigma_pml
            )));
        }
        if !(g.r_scatterer > 0.0 && g.r_scatterer < g.r_map) {
            return Err(ForwardError::Configuration(format!(
                "radii must satisfy 0 < r_scatterer < r_map, got r_scatterer = {}, r_map = {}",
                g.r_scatterer, g.r_map
            )));
        }
        if !(g.r_measure > g.r_scatterer && g.r_measure < g.r_map) {
            return Err(ForwardError::Configuration(format!(
                "detector radius must satisfy r_scatterer < r_measure < r_map, \
                 got r_measure = {}",
                g.r_measure
            )));
        }
        if !(g.r_map <= f.r_pml_start && f.r_pml_start < f.r_pml_outer) {
            return Err(ForwardError::Configuration(format!(
                "PML radii must satisfy r_map <= r_pml_start < r_pml_outer, \
                 got r_map = {}, r_pml_start = {}, r_pml_outer = {}",
                g.r_map, f.r_pml_start, f.r_pml_outer
            )));
        }
        if c.epsilon <= 0.0 {
            return Err(ForwardError::Configuration(format!(
                "decay exponent must be positive, epsilon = {}",
                c.epsilon
            )));
        }
        if c.char_len && c.scale <= 0.0 {
            return Err(ForwardError::Configuration(format!(
                "correlation scale must be positive, scale = {}",
                c.scale
            )));
        }
        if self.num_detectors == 0 {
            return Err(ForwardError::Configuration(
                "at least one detector point is required".into(),
            ));
        }
        if let Some(h) = self.cell_size {
            if h <= 0.0 {
                return Err(ForwardError::Configuration(format!(
                    "mesh cell size must be positive, cell_size = {h}"
                )));
            }
        }
        if let Some(sigma) = self.sigma_smooth {
            if sigma <= 0.0 {
                return Err(ForwardError::Configuration(format!(
                    "smoothing width must be positive, sigma_smooth = {sigma}"
                )));
            }
        }
        Ok(())
    }
}
