//! # Cellsino Core
//!
//! Synthesises ground-truth sinograms for optical diffraction tomography and
//! fluorescence tomography. A phantom is rotated through the acquisition
//! angles and every pose is imaged onto a 2D detector.
//!
//! ## Architecture
//!
//! Field images are produced by the [`propagator::Propagator`] strategies,
//! which delegate the physics of a single sphere to a
//! [`cellsino_optics::SphereModel`] and multiply the fields of all spheres.
//! Fluorescence images are produced by the analytic
//! [`fluorescence::FluorescenceProjector`]. The [`sinogram::Sinogram`]
//! orchestrator drives the acquisition loop and hands every frame to a
//! [`series::SeriesWriter`], either in memory or appended to a file.
//!
//! ## Modules
//!
//! - [`types`]: Detector geometry, imaging modes, frames, and outputs.
//! - [`acquisition`]: Angles, times, displacements, and run parameters.
//! - [`fluorescence`]: Column-integrated fluorescence projection.
//! - [`propagator`]: Projection and Rytov field propagators.
//! - [`sinogram`]: The acquisition loop.
//! - [`series`]: Frame sinks (in-memory stacks, JSON Lines files).
//! - [`progress`]: Shared progress counters.

pub mod acquisition;
pub mod fluorescence;
pub mod progress;
pub mod propagator;
pub mod series;
pub mod sinogram;
pub mod types;

use cellsino_geometry::GeometryError;
use cellsino_optics::OpticsError;
use thiserror::Error;

pub use acquisition::{Acquisition, Angles, Displacements, Times};
pub use propagator::{Propagator, PropagatorKind};
pub use sinogram::Sinogram;
pub use types::{Detector, Mode, SinogramOutput, SinogramStack};

/// Errors that can occur while computing a sinogram.
///
/// Configuration errors are raised before any frame is computed.
#[derive(Debug, Error)]
pub enum SinogramError {
    #[error("Invalid element in `mode`: `{0}`")]
    InvalidMode(String),

    #[error("No `mode` specified")]
    NoMode,

    #[error("Unknown propagator '{0}'")]
    UnknownPropagator(String),

    #[error("Expected {expected} displacements (one per angle), got {got}")]
    DisplacementCount { expected: usize, got: usize },

    #[error("Expected {expected} frame times (one per angle), got {got}")]
    TimesCount { expected: usize, got: usize },

    #[error("Invalid displacement standard deviation: {0}")]
    InvalidSigma(f64),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Optics model error: {0}")]
    Optics(#[from] OpticsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialisation error: {0}")]
    Serialization(#[from] serde_json::Error),
}
