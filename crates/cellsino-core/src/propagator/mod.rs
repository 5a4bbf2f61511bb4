//! Field propagators.
//!
//! A propagator turns a posed phantom into the complex field on the
//! detector. The phantom is approximated as a product of independent
//! spheres: the field starts as the unit plane wave and is multiplied by the
//! normalised field of every sphere. Strategies differ only in which
//! [`SphereModel`] they use and which parameters they hand it.

pub mod projection;
pub mod rytov;

use std::fmt;
use std::str::FromStr;

use cellsino_geometry::elements::SphereView;
use cellsino_geometry::Phantom;
use cellsino_optics::{OpticsError, SphereModel, SphereRequest};
use log::{debug, warn};
use ndarray::Array2;
use num_complex::Complex64;

use crate::types::Detector;
use crate::SinogramError;

pub use projection::ProjectionPropagator;
pub use rytov::RytovPropagator;

/// Strategy that computes the detector field of a phantom.
pub trait Propagator: Send + Sync {
    /// Short identifier of the strategy.
    fn name(&self) -> &str;

    /// The single-sphere model this strategy delegates to.
    fn model(&self) -> &dyn SphereModel;

    /// Model parameters for one sphere on the given detector.
    fn sphere_request(
        &self,
        sphere: &SphereView,
        detector: &Detector,
        wavelength: f64,
    ) -> SphereRequest;

    /// Field of the whole phantom, relative to the incident wave.
    fn propagate(
        &self,
        phantom: &Phantom,
        detector: &Detector,
        wavelength: f64,
    ) -> Result<Array2<Complex64>, OpticsError> {
        let model = self.model();
        debug!(
            "{} propagator: {} elements through the {} model",
            self.name(),
            phantom.len(),
            model.name()
        );
        let mut field = Array2::from_elem(detector.dim(), Complex64::new(1.0, 0.0));
        for element in phantom {
            let Some(sphere) = element.as_sphere() else {
                warn!(
                    "Skipping {} element in {} propagator ({} model)",
                    element.kind(),
                    self.name(),
                    model.name()
                );
                continue;
            };
            let request = self.sphere_request(&sphere, detector, wavelength);
            field *= &model.field(&request)?;
        }
        Ok(field)
    }
}

/// Lateral position (pixels) and depth (m) of a sphere on the detector.
pub(crate) fn sphere_placement(sphere: &SphereView, detector: &Detector) -> ([f64; 2], f64) {
    let [x, y, depth_px] = detector.project_point(&sphere.center);
    ([x, y], depth_px * detector.pixel_size)
}

/// Available propagation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropagatorKind {
    /// Straight-ray phase accumulation.
    Projection,
    /// First-order Rytov approximation with diffraction.
    #[default]
    Rytov,
}

impl PropagatorKind {
    pub const ALL: [PropagatorKind; 2] = [PropagatorKind::Projection, PropagatorKind::Rytov];

    /// Names of all registered propagators.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.name()).collect()
    }

    pub fn name(self) -> &'static str {
        match self {
            PropagatorKind::Projection => "projection",
            PropagatorKind::Rytov => "rytov",
        }
    }

    /// Instantiate the strategy with its default model.
    pub fn build(self) -> Box<dyn Propagator> {
        match self {
            PropagatorKind::Projection => Box::new(ProjectionPropagator::default()),
            PropagatorKind::Rytov => Box::new(RytovPropagator::default()),
        }
    }
}

impl FromStr for PropagatorKind {
    type Err = SinogramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "projection" => Ok(PropagatorKind::Projection),
            "rytov" => Ok(PropagatorKind::Rytov),
            _ => Err(SinogramError::UnknownPropagator(s.to_string())),
        }
    }
}

impl fmt::Display for PropagatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellsino_geometry::Element;

    #[test]
    fn test_registry_round_trip() {
        for kind in PropagatorKind::ALL {
            assert_eq!(kind.name().parse::<PropagatorKind>().unwrap(), kind);
            let propagator = kind.build();
            assert_eq!(propagator.name(), kind.name());
            assert_eq!(propagator.model().name(), kind.name());
        }
        assert_eq!(PropagatorKind::names(), vec!["projection", "rytov"]);
        assert_eq!(PropagatorKind::default(), PropagatorKind::Rytov);
        assert!(matches!(
            "born".parse::<PropagatorKind>(),
            Err(SinogramError::UnknownPropagator(ref n)) if n == "born"
        ));
    }

    #[test]
    fn test_empty_phantom_is_plane_wave() {
        let detector = Detector::new([8, 6], 1e-6);
        for kind in PropagatorKind::ALL {
            let field = kind.build().propagate(&Phantom::new(1.333), &detector, 550e-9).unwrap();
            assert_eq!(field.dim(), (8, 6));
            assert!(field.iter().all(|v| *v == Complex64::new(1.0, 0.0)));
        }
    }

    #[test]
    fn test_fields_multiply() {
        let detector = Detector::new([32, 32], 0.5e-6);
        let a = Element::sphere(1.36, 1.335, 0.0, [-2e-6, 0.0, 0.0], 2e-6);
        let b = Element::sphere(1.35, 1.335, 0.0, [2e-6, 1e-6, 0.0], 1.5e-6);
        let propagator = PropagatorKind::Projection.build();

        let mut both = Phantom::new(1.335);
        both.extend([a.clone(), b.clone()]);
        let mut only_a = Phantom::new(1.335);
        only_a.append(a);
        let mut only_b = Phantom::new(1.335);
        only_b.append(b);

        let fab = propagator.propagate(&both, &detector, 550e-9).unwrap();
        let fa = propagator.propagate(&only_a, &detector, 550e-9).unwrap();
        let fb = propagator.propagate(&only_b, &detector, 550e-9).unwrap();
        for ((ab, a), b) in fab.iter().zip(fa.iter()).zip(fb.iter()) {
            assert!((ab - a * b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_wavelength_propagates_error() {
        let mut phantom = Phantom::new(1.335);
        phantom.append(Element::sphere(1.36, 1.335, 0.0, [0.0; 3], 2e-6));
        let result = PropagatorKind::Projection
            .build()
            .propagate(&phantom, &Detector::new([8, 8], 1e-6), 0.0);
        assert!(matches!(
            result,
            Err(OpticsError::InvalidParameter { name: "wavelength", .. })
        ));
    }
}
