//! Geometric elements of a phantom.
//!
//! An [`Element`] pairs an analytic [`Shape`] with optical properties. Its
//! geometry is carried by a point set (`points`), which is what rigid
//! transforms act on; a sphere has exactly one point, its centre. Elements
//! have value semantics: transforming one returns a new element.

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::grid::VoxelGrid;
use crate::raster;
use crate::transform::{Pose, Transform};
use crate::GeometryError;

/// The analytic shape of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    /// A homogeneous sphere centred on the element's single point.
    Sphere {
        /// Radius (m).
        radius: f64,
    },
    /// A bare point set; each point occupies one voxel.
    Points,
}

/// A geometric element with refractive index and fluorescence brightness.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Refractive index inside the element.
    pub object_index: f64,
    /// Refractive index of the surrounding medium.
    pub medium_index: f64,
    /// Fluorescence brightness per unit path length (may be negative).
    pub fl_brightness: f64,
    /// Coordinates describing the element (m). Never empty.
    points: Vec<[f64; 3]>,
    /// Analytic shape.
    pub shape: Shape,
}

/// A view of a spherical element after dispatch on [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereView {
    pub center: [f64; 3],
    pub radius: f64,
    pub object_index: f64,
    pub medium_index: f64,
    pub fl_brightness: f64,
}

impl Element {
    /// Create a sphere element.
    pub fn sphere(
        object_index: f64,
        medium_index: f64,
        fl_brightness: f64,
        center: [f64; 3],
        radius: f64,
    ) -> Self {
        Self {
            object_index,
            medium_index,
            fl_brightness,
            points: vec![center],
            shape: Shape::Sphere { radius },
        }
    }

    /// Create a point-set element.
    pub fn from_points(
        object_index: f64,
        medium_index: f64,
        fl_brightness: f64,
        points: Vec<[f64; 3]>,
    ) -> Result<Self, GeometryError> {
        if points.is_empty() {
            return Err(GeometryError::EmptyPoints);
        }
        Ok(Self {
            object_index,
            medium_index,
            fl_brightness,
            points,
            shape: Shape::Points,
        })
    }

    /// The point set, shape (N, 3).
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// The first point; the centre for spheres.
    pub fn center(&self) -> [f64; 3] {
        self.points[0]
    }

    /// Short name of the shape kind, used in log messages.
    pub fn kind(&self) -> &'static str {
        match self.shape {
            Shape::Sphere { .. } => "sphere",
            Shape::Points => "points",
        }
    }

    /// Returns the sphere parameters if this element is a sphere.
    pub fn as_sphere(&self) -> Option<SphereView> {
        match self.shape {
            Shape::Sphere { radius } => Some(SphereView {
                center: self.center(),
                radius,
                object_index: self.object_index,
                medium_index: self.medium_index,
                fl_brightness: self.fl_brightness,
            }),
            Shape::Points => None,
        }
    }

    /// Rotate and translate the element (rotation first).
    ///
    /// Returns a new element; `self` is left untouched.
    pub fn transform(&self, pose: &Pose) -> Element {
        self.transformed_by(&Transform::from_pose(pose))
    }

    /// Apply an arbitrary rigid transform to all points.
    pub fn transformed_by(&self, transform: &Transform) -> Element {
        Element {
            points: self.points.iter().map(|p| transform.apply(p)).collect(),
            ..self.clone()
        }
    }

    /// Rasterise this element alone.
    ///
    /// Returns `(refractive_index, fluorescence)` volumes shaped like `grid`:
    /// `object_index` and `fl_brightness` inside the element, `medium_index`
    /// and zero elsewhere.
    pub fn draw(&self, grid: &VoxelGrid) -> (Array3<f64>, Array3<f64>) {
        let mut ri = Array3::from_elem(grid.dim(), self.medium_index);
        let mut fl = Array3::zeros(grid.dim());
        for idx in raster::covered_voxels(self, grid) {
            ri[idx] = self.object_index;
            fl[idx] = self.fl_brightness;
        }
        (ri, fl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_translation_leaves_original_untouched() {
        let el = Element::from_points(1.36, 1.335, 0.0, vec![[0.0, 0.0, 0.0]]).unwrap();
        let moved = el.transform(&Pose::translation(1.0, 2.0, -3.0));

        assert_eq!(moved.points()[0], [1.0, 2.0, -3.0]);
        assert_eq!(el.points()[0], [0.0, 0.0, 0.0]);
        assert_eq!(moved.object_index, 1.36);
        assert_eq!(moved.medium_index, 1.335);
    }

    #[test]
    fn test_translation_moves_every_point() {
        let pts = vec![[0.0, 0.0, 0.0], [1.0, -1.0, 0.5], [2.0, 3.0, -4.0]];
        let el = Element::from_points(1.4, 1.33, 1.0, pts.clone()).unwrap();
        let moved = el.transform(&Pose::translation(0.5, -0.25, 2.0));
        for (a, b) in pts.iter().zip(moved.points()) {
            assert_abs_diff_eq!(b[0], a[0] + 0.5, epsilon = 1e-15);
            assert_abs_diff_eq!(b[1], a[1] - 0.25, epsilon = 1e-15);
            assert_abs_diff_eq!(b[2], a[2] + 2.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_sphere_keeps_radius_under_transform() {
        let s = Element::sphere(1.4, 1.335, 2.0, [1e-6, 0.0, 0.0], 3e-6);
        let t = s.transform(&Pose::rotation(0.3, 0.2, 0.1));
        let view = t.as_sphere().unwrap();
        assert_eq!(view.radius, 3e-6);
        assert_eq!(view.fl_brightness, 2.0);
        assert_eq!(t.points().len(), 1);
    }

    #[test]
    fn test_empty_points_rejected() {
        let err = Element::from_points(1.4, 1.33, 0.0, vec![]).unwrap_err();
        assert!(matches!(err, GeometryError::EmptyPoints));
    }

    #[test]
    fn test_points_element_is_not_a_sphere() {
        let el = Element::from_points(1.4, 1.33, 0.0, vec![[0.0; 3]]).unwrap();
        assert!(el.as_sphere().is_none());
        assert_eq!(el.kind(), "points");
    }
}
