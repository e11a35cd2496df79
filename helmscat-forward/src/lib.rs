//! Forward observation operator for 2D Helmholtz scattering off randomly
//! shaped obstacles
//!
//! The scatterer boundary is a random perturbation of a reference circle,
//! parameterized by a truncated Fourier expansion with damped mode weights.
//! Instead of remeshing the perturbed domain, a mollified diffeomorphism
//! pulls the Helmholtz equation back onto a fixed reference disk: the
//! deformation enters the weak form through a pulled-back diffusion tensor
//! and wavenumber scaling derived from the analytic Jacobian of the map.
//! Radiation conditions are imposed by a radial PML between R̃ and R_PML,
//! and measurements are smoothed point evaluations of the scattered field
//! at a ring of detectors, mapped back through the inverse deformation.
//!
//! # Pipelines
//!
//! Two instances share all formulas and differ only in mesh resolution:
//! a fine [`PipelineKind::Data`] context for synthesizing ground-truth
//! observations and a coarser [`PipelineKind::Inversion`] context for the
//! repeated evaluations of an outer inversion loop. Each is an independent
//! [`SimulationContext`]; there is no shared global state.
//!
//! # Example
//!
//! ```no_run
//! use helmscat_forward::{ForwardConfig, PipelineKind, SimulationContext};
//!
//! let config = ForwardConfig::default();
//! let mut context = SimulationContext::new(PipelineKind::Inversion, config)?;
//! let shape = vec![0.0; 2 * context.mode_count()];
//! let measurements = context.observe(&shape)?;
//! assert_eq!(measurements.len(), context.num_detectors());
//! # Ok::<(), helmscat_forward::ForwardError>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod expansion;
pub mod incident;
pub mod mapping;
pub mod pml;
pub mod radial;
pub mod reference;

pub use config::{
    CorrelationParameters, FieldParameters, ForwardConfig, GeometryParameters, PipelineKind,
};
pub use context::{SimulationContext, synthesize_data};
pub use error::ForwardError;
pub use expansion::{Expansion, ModeWeights, truncate_expansion};
pub use incident::IncidentWave;
pub use mapping::{DomainMap, Jacobian2, MapRegion, PulledBackCoefficients};
pub use pml::{PmlStretching, PmlTensor};
pub use radial::RadialField;
pub use reference::CircleScattering;
