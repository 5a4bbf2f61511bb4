//! Single-sphere field model trait.
//!
//! The propagators in `cellsino-core` delegate the physics of one sphere to
//! a [`SphereModel`]. Fields are returned relative to the incident plane
//! wave, so the background is `1 + 0i` and fields of several spheres can be
//! multiplied.

use ndarray::Array2;
use num_complex::Complex64;
use thiserror::Error;

/// Errors from sphere models.
#[derive(Debug, Error)]
pub enum OpticsError {
    #[error("Invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Invalid grid size {0:?}")]
    InvalidGrid([usize; 2]),
}

/// Everything a model needs to compute the field of one sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereRequest {
    /// Sphere radius (m).
    pub radius: f64,
    /// Refractive index of the sphere.
    pub sphere_index: f64,
    /// Refractive index of the surrounding medium.
    pub medium_index: f64,
    /// Vacuum wavelength (m).
    pub wavelength: f64,
    /// Detector pixel size (m).
    pub pixel_size: f64,
    /// Detector grid size in pixels.
    pub grid_size: [usize; 2],
    /// Sphere centre on the detector (pixels, fractional).
    pub center: [f64; 2],
    /// Distance from the sphere centre to the detector plane along the
    /// optical axis (m). Ignored by models without propagation.
    pub focus: f64,
    /// Pixels used to sample the sphere radius. `None` samples at the
    /// detector pixel size.
    pub radius_sampling: Option<f64>,
}

impl SphereRequest {
    /// Check the parameters that no model can work without.
    pub fn validate(&self) -> Result<(), OpticsError> {
        let positive = [
            ("wavelength", self.wavelength),
            ("pixel_size", self.pixel_size),
            ("medium_index", self.medium_index),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(OpticsError::InvalidParameter { name, value });
            }
        }
        let finite = [
            ("sphere_index", self.sphere_index),
            ("center_x", self.center[0]),
            ("center_y", self.center[1]),
            ("focus", self.focus),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(OpticsError::InvalidParameter { name, value });
            }
        }
        if self.grid_size.iter().any(|&n| n == 0) {
            return Err(OpticsError::InvalidGrid(self.grid_size));
        }
        Ok(())
    }

    /// Whether the sphere is too small to have any effect.
    pub fn is_degenerate(&self) -> bool {
        !(self.radius > 0.0) || matches!(self.radius_sampling, Some(s) if !(s > 0.0))
    }

    /// Wavenumber in the medium, $k_m = 2\pi n_m / \lambda$ (1/m).
    pub fn medium_wavenumber(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.medium_index / self.wavelength
    }

    /// A field of ones (no sphere) on the detector grid.
    pub fn unit_field(&self) -> Array2<Complex64> {
        Array2::from_elem(
            (self.grid_size[0], self.grid_size[1]),
            Complex64::new(1.0, 0.0),
        )
    }
}

/// Computes the transmitted field of a single sphere.
pub trait SphereModel: Send + Sync {
    /// Human-readable name of the model.
    fn name(&self) -> &str;

    /// Field on the detector grid, normalised to the incident field.
    ///
    /// Degenerate spheres (non-positive radius or radius sampling) yield a
    /// field of ones.
    fn field(&self, request: &SphereRequest) -> Result<Array2<Complex64>, OpticsError>;
}
