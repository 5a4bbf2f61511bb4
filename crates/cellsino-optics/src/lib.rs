//! # Cellsino Optics
//!
//! Optical models for the field transmitted through a single homogeneous
//! sphere. All models implement the [`SphereModel`](provider::SphereModel)
//! trait, which turns a [`SphereRequest`](provider::SphereRequest) into a
//! complex field on the detector grid, normalised to the incident field.
//!
//! ## Available models
//!
//! | Model | Module | Approximation |
//! |-------|--------|---------------|
//! | Projection | [`projection`] | Straight-ray phase accumulation |
//! | Rytov | [`rytov`] | First-order Rytov, Fourier diffraction theorem |

pub mod projection;
pub mod provider;
pub mod rytov;

pub use projection::ProjectionModel;
pub use provider::{OpticsError, SphereModel, SphereRequest};
pub use rytov::RytovModel;
