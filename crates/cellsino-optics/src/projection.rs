//! Projection approximation.
//!
//! Light is assumed to travel along straight lines through the sphere. The
//! phase at a detector pixel is the optical path difference accumulated
//! along the chord through the sphere:
//!
//! $$\phi(x, y) = \frac{2\pi}{\lambda} (n_s - n_m)\, 2\sqrt{R^2 - \rho^2}$$
//!
//! where $\rho$ is the lateral distance from the sphere centre. The
//! amplitude is left unchanged.

use ndarray::Array2;
use num_complex::Complex64;

use crate::provider::{OpticsError, SphereModel, SphereRequest};

/// Chord length (in pixels) through a sphere of radius `radius_px` at a
/// lateral offset `(dx, dy)` pixels from its centre; zero outside the
/// sphere's footprint.
pub fn chord_length_px(radius_px: f64, dx: f64, dy: f64) -> f64 {
    let r_sq = radius_px * radius_px - dx * dx - dy * dy;
    if r_sq > 0.0 {
        2.0 * r_sq.sqrt()
    } else {
        0.0
    }
}

/// Straight-ray phase model of a sphere.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionModel;

impl SphereModel for ProjectionModel {
    fn name(&self) -> &str {
        "projection"
    }

    fn field(&self, request: &SphereRequest) -> Result<Array2<Complex64>, OpticsError> {
        request.validate()?;
        if request.is_degenerate() {
            return Ok(request.unit_field());
        }

        let [cx, cy] = request.center;
        let radius_px = request.radius / request.pixel_size;
        // phase per pixel of chord length
        let phase_per_px = 2.0 * std::f64::consts::PI / request.wavelength
            * (request.sphere_index - request.medium_index)
            * request.pixel_size;

        let dim = (request.grid_size[0], request.grid_size[1]);
        Ok(Array2::from_shape_fn(dim, |(x, y)| {
            let chord = chord_length_px(radius_px, x as f64 - cx, y as f64 - cy);
            if chord > 0.0 {
                Complex64::from_polar(1.0, phase_per_px * chord)
            } else {
                Complex64::new(1.0, 0.0)
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn request() -> SphereRequest {
        SphereRequest {
            radius: 5e-6,
            sphere_index: 1.36,
            medium_index: 1.335,
            wavelength: 550e-9,
            pixel_size: 0.5e-6,
            grid_size: [41, 41],
            center: [20.0, 20.0],
            focus: 0.0,
            radius_sampling: None,
        }
    }

    #[test]
    fn test_chord_length() {
        assert_eq!(chord_length_px(3.0, 0.0, 0.0), 6.0);
        assert_eq!(chord_length_px(3.0, 3.0, 0.0), 0.0);
        assert_eq!(chord_length_px(3.0, 3.0, 3.0), 0.0);
        assert_relative_eq!(chord_length_px(5.0, 3.0, 0.0), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_center_phase_matches_diameter() {
        let req = request();
        let field = ProjectionModel.field(&req).unwrap();
        let delta_n = req.sphere_index - req.medium_index;
        let expected = 2.0 * PI / req.wavelength * delta_n * 2.0 * req.radius;
        assert_relative_eq!(field[[20, 20]].arg(), expected, max_relative = 1e-12);
        assert_relative_eq!(field[[20, 20]].norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_background_is_unity() {
        let field = ProjectionModel.field(&request()).unwrap();
        assert_eq!(field[[0, 0]], Complex64::new(1.0, 0.0));
        assert_eq!(field[[40, 20]], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_degenerate_radius_yields_ones() {
        let req = SphereRequest {
            radius: -1.0,
            ..request()
        };
        let field = ProjectionModel.field(&req).unwrap();
        assert!(field.iter().all(|v| *v == Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_invalid_wavelength_rejected() {
        let req = SphereRequest {
            wavelength: 0.0,
            ..request()
        };
        assert!(matches!(
            ProjectionModel.field(&req),
            Err(OpticsError::InvalidParameter { name: "wavelength", .. })
        ));
    }
}
