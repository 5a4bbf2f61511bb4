//! Straight-ray propagator.

use cellsino_geometry::elements::SphereView;
use cellsino_optics::{ProjectionModel, SphereModel, SphereRequest};

use super::{sphere_placement, Propagator};
use crate::types::Detector;

/// Propagator using the projection approximation for every sphere.
pub struct ProjectionPropagator {
    model: Box<dyn SphereModel>,
}

impl ProjectionPropagator {
    /// Use a custom single-sphere model.
    pub fn with_model(model: Box<dyn SphereModel>) -> Self {
        Self { model }
    }
}

impl Default for ProjectionPropagator {
    fn default() -> Self {
        Self::with_model(Box::new(ProjectionModel))
    }
}

impl Propagator for ProjectionPropagator {
    fn name(&self) -> &str {
        "projection"
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
        let (center, _) = sphere_placement(sphere, detector);
        SphereRequest {
            radius: sphere.radius,
            sphere_index: sphere.object_index,
            medium_index: sphere.medium_index,
            wavelength,
            pixel_size: detector.pixel_size,
            grid_size: detector.grid_size,
            center,
            focus: 0.0,
            radius_sampling: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cellsino_geometry::{Element, Phantom};
    use std::f64::consts::PI;

    #[test]
    fn test_center_phase_of_single_sphere() {
        let mut phantom = Phantom::new(1.335);
        phantom.append(Element::sphere(1.345, 1.335, 0.0, [0.0; 3], 3e-6));
        let detector = Detector::new([21, 21], 0.5e-6);
        let field = ProjectionPropagator::default()
            .propagate(&phantom, &detector, 500e-9)
            .unwrap();
        let expected = 2.0 * PI / 500e-9 * 0.01 * 6e-6;
        assert_relative_eq!(field[[10, 10]].arg(), expected, epsilon = 1e-9);
        assert_relative_eq!(field[[10, 10]].norm(), 1.0, epsilon = 1e-12);
        assert_eq!(field[[0, 0]].arg(), 0.0);
    }

    #[test]
    fn test_request_uses_displaced_center() {
        let sphere = Element::sphere(1.36, 1.335, 0.0, [1e-6, -2e-6, 4e-6], 1e-6);
        let detector = Detector::new([10, 12], 1e-6).with_displacement([0.5, 1.0]);
        let request = ProjectionPropagator::default().sphere_request(
            &sphere.as_sphere().unwrap(),
            &detector,
            600e-9,
        );
        assert_relative_eq!(request.center[0], 4.5 + 0.5 + 1.0, epsilon = 1e-12);
        assert_relative_eq!(request.center[1], 5.5 + 1.0 - 2.0, epsilon = 1e-12);
        assert_eq!(request.radius_sampling, None);
    }
}
