//! Rigid transformations for rotating and positioning elements.
//!
//! A [`Transform`] is a homogeneous 4×4 matrix, so that a rotation followed
//! by a translation is applied to a point set in a single product. Sinogram
//! acquisition only ever composes rotations and translations, and rotation
//! always precedes translation.
//!
//! ## Rotation convention
//!
//! Three angles describe the pose of a phantom:
//!
//! - `rot_main`: the sinogram acquisition angle. It acts about the x-axis of
//!   the point arrays and is negated, so the sinogram can be handed to
//!   diffraction tomography reconstruction without transposing it.
//! - `rot_in_plane`: rotation about the z-axis (optical axis), i.e. within
//!   the imaging plane.
//! - `rot_perp_plane`: rotation about the y-axis, perpendicular to the
//!   imaging plane.
//!
//! The composed rotation is $R = R_y(\beta)\,R_z(\gamma)\,R_x(-\alpha)$ with
//! $\alpha$ = `rot_main`, $\beta$ = `rot_perp_plane`, $\gamma$ = `rot_in_plane`.

use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Translation and rotation angles of a rigid motion.
///
/// All fields default to zero; lengths are in metres, angles in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub rot_main: f64,
    pub rot_in_plane: f64,
    pub rot_perp_plane: f64,
}

impl Pose {
    /// A pure translation.
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            ..Default::default()
        }
    }

    /// A pure rotation.
    pub fn rotation(rot_main: f64, rot_in_plane: f64, rot_perp_plane: f64) -> Self {
        Self {
            rot_main,
            rot_in_plane,
            rot_perp_plane,
            ..Default::default()
        }
    }
}

/// A rigid transformation in homogeneous coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// 4x4 homogeneous matrix (rotation block + translation column).
    pub matrix: Matrix4<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }
}

impl Transform {
    /// Create a pure translation.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vector3::new(dx, dy, dz)),
        }
    }

    /// Create the acquisition rotation $R_y(\beta) R_z(\gamma) R_x(-\alpha)$.
    pub fn rotation(rot_main: f64, rot_in_plane: f64, rot_perp_plane: f64) -> Self {
        let r = rot_y(rot_perp_plane) * rot_z(rot_in_plane) * rot_x(-rot_main);
        Self {
            matrix: r.to_homogeneous(),
        }
    }

    /// Rotation followed by translation, as described by `pose`.
    pub fn from_pose(pose: &Pose) -> Self {
        Self::rotation(pose.rot_main, pose.rot_in_plane, pose.rot_perp_plane)
            .then(&Self::translation(pose.x, pose.y, pose.z))
    }

    /// Apply this transformation to a 3D point.
    pub fn apply(&self, point: &[f64; 3]) -> [f64; 3] {
        let v = self.matrix * Vector4::new(point[0], point[1], point[2], 1.0);
        [v.x, v.y, v.z]
    }

    /// Compose two transforms: self followed by other.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            matrix: other.matrix * self.matrix,
        }
    }

    /// The 3x3 rotation block.
    pub fn rotation_part(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// The translation column.
    pub fn translation_part(&self) -> Vector3<f64> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Exact inverse of a rigid transform: $[R^T \mid -R^T t]$.
    pub fn inverse(&self) -> Transform {
        let rt = self.rotation_part().transpose();
        let t = -(rt * self.translation_part());
        let mut matrix = rt.to_homogeneous();
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&t);
        Transform { matrix }
    }
}

#[rustfmt::skip]
fn rot_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, c, -s,
        0.0, s, c,
    )
}

#[rustfmt::skip]
fn rot_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, 0.0, s,
        0.0, 1.0, 0.0,
        -s, 0.0, c,
    )
}

#[rustfmt::skip]
fn rot_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, -s, 0.0,
        s, c, 0.0,
        0.0, 0.0, 1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn assert_point_eq(a: [f64; 3], b: [f64; 3]) {
        for i in 0..3 {
            assert_abs_diff_eq!(a[i], b[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_identity_transform() {
        let t = Transform::default();
        assert_point_eq(t.apply(&[1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_pure_translation() {
        let t = Transform::from_pose(&Pose::translation(1.0, 2.0, -3.0));
        assert_point_eq(t.apply(&[0.0, 0.0, 0.0]), [1.0, 2.0, -3.0]);
        assert_point_eq(t.apply(&[0.5, -1.0, 2.0]), [1.5, 1.0, -1.0]);
    }

    #[test]
    fn test_main_rotation_is_negated_about_x() {
        let t = Transform::rotation(FRAC_PI_2, 0.0, 0.0);
        assert_point_eq(t.apply(&[0.0, 1.0, 0.0]), [0.0, 0.0, -1.0]);
        assert_point_eq(t.apply(&[0.0, 0.0, 1.0]), [0.0, 1.0, 0.0]);
        // x is the rotation axis
        assert_point_eq(t.apply(&[2.0, 0.0, 0.0]), [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_in_plane_and_perpendicular_axes() {
        let in_plane = Transform::rotation(0.0, FRAC_PI_2, 0.0);
        assert_point_eq(in_plane.apply(&[1.0, 0.0, 0.0]), [0.0, 1.0, 0.0]);

        let perp = Transform::rotation(0.0, 0.0, FRAC_PI_2);
        assert_point_eq(perp.apply(&[1.0, 0.0, 0.0]), [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_main_rotation_applied_before_in_plane() {
        let t = Transform::rotation(FRAC_PI_2, FRAC_PI_2, 0.0);
        // Rx(-pi/2) takes z to y, then Rz(pi/2) takes y to -x.
        assert_point_eq(t.apply(&[0.0, 0.0, 1.0]), [-1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_rotation_precedes_translation() {
        let pose = Pose {
            x: 1.0,
            rot_in_plane: FRAC_PI_2,
            ..Default::default()
        };
        let t = Transform::from_pose(&pose);
        assert_point_eq(t.apply(&[1.0, 0.0, 0.0]), [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_inverse_round_trip() {
        let pose = Pose {
            x: 0.3,
            y: -1.2,
            z: 2.5,
            rot_main: 0.7,
            rot_in_plane: -0.4,
            rot_perp_plane: 1.9,
        };
        let t = Transform::from_pose(&pose);
        let back = t.then(&t.inverse());
        let p = [1.5, -0.25, 4.0];
        assert_point_eq(back.apply(&p), p);
    }
}
