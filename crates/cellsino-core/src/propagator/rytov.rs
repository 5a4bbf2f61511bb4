//! Rytov propagator.
//!
//! The detector plane passes through the coordinate origin, so a sphere at
//! depth `z` is refocused by `-z`. The radius sampling grows with the ratio
//! of the field of view to the sphere radius, so that small spheres are
//! resolved as finely as large ones.

use cellsino_geometry::elements::SphereView;
use cellsino_optics::{RytovModel, SphereModel, SphereRequest};

use super::{sphere_placement, Propagator};
use crate::types::Detector;

/// Radius sampling of a sphere that fills the detector.
pub const BASE_SAMPLING: f64 = 150.0;

/// Propagator using the Rytov approximation for every sphere.
pub struct RytovPropagator {
    model: Box<dyn SphereModel>,
    /// Radius sampling of a sphere whose radius equals the field of view.
    pub base_sampling: f64,
}

impl RytovPropagator {
    /// Use a custom single-sphere model.
    pub fn with_model(model: Box<dyn SphereModel>) -> Self {
        Self {
            model,
            base_sampling: BASE_SAMPLING,
        }
    }

    pub fn with_base_sampling(mut self, base_sampling: f64) -> Self {
        self.base_sampling = base_sampling;
        self
    }

    /// Pixels per radius handed to the model.
    pub fn radius_sampling(&self, radius: f64, detector: &Detector) -> f64 {
        let edge = *detector.grid_size.iter().max().unwrap_or(&1) as f64;
        self.base_sampling / (edge * detector.pixel_size / radius)
    }
}

impl Default for RytovPropagator {
    fn default() -> Self {
        Self::with_model(Box::new(RytovModel::default()))
    }
}

impl Propagator for RytovPropagator {
    fn name(&self) -> &str {
        "rytov"
    }

    fn model(&self) -> &dyn SphereModel {
        self.model.as_ref()
    }

    fn sphere_request(
        &self,
        sphere: &SphereView,
        detector: &Detector,
        wavelength: f64,
    ) -> SphereRequest {
        let (center, depth) = sphere_placement(sphere, detector);
        SphereRequest {
            radius: sphere.radius,
            sphere_index: sphere.object_index,
            medium_index: sphere.medium_index,
            wavelength,
            pixel_size: detector.pixel_size,
            grid_size: detector.grid_size,
            center,
            focus: -depth,
            radius_sampling: Some(self.radius_sampling(sphere.radius, detector)),
        }
    }
}
