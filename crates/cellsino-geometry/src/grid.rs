//! Grid conventions shared by voxel volumes and detector images.
//!
//! The coordinate origin is the geometric centre of the grid. Along an axis
//! of length $L$ the origin sits at index $L/2 - 0.5$: between the two
//! central cells for even $L$, on the central cell for odd $L$. Cells are
//! isotropic with edge length `pixel_size`.

use std::ops::Range;

use crate::GeometryError;

/// Index of the coordinate origin along an axis of `len` cells.
pub fn grid_center(len: usize) -> f64 {
    len as f64 / 2.0 - 0.5
}

/// A discretised 3D volume, indexed `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelGrid {
    /// Number of voxels along x, y, z.
    pub shape: [usize; 3],
    /// Edge length of a voxel (m).
    pub pixel_size: f64,
}

impl VoxelGrid {
    pub fn new(shape: [usize; 3], pixel_size: f64) -> Result<Self, GeometryError> {
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(GeometryError::InvalidGrid(format!(
                "pixel size must be positive, got {pixel_size}"
            )));
        }
        if shape.iter().any(|&n| n == 0) {
            return Err(GeometryError::InvalidGrid(format!(
                "grid shape must be non-zero, got {shape:?}"
            )));
        }
        Ok(Self { shape, pixel_size })
    }

    /// Shape as an ndarray dimension tuple.
    pub fn dim(&self) -> (usize, usize, usize) {
        (self.shape[0], self.shape[1], self.shape[2])
    }

    /// Total number of voxels.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fractional index of the coordinate origin along each axis.
    pub fn origin(&self) -> [f64; 3] {
        [
            grid_center(self.shape[0]),
            grid_center(self.shape[1]),
            grid_center(self.shape[2]),
        ]
    }

    /// Physical position (m) of a voxel centre.
    pub fn position(&self, idx: [usize; 3]) -> [f64; 3] {
        let o = self.origin();
        [
            (idx[0] as f64 - o[0]) * self.pixel_size,
            (idx[1] as f64 - o[1]) * self.pixel_size,
            (idx[2] as f64 - o[2]) * self.pixel_size,
        ]
    }

    /// Voxel whose centre is nearest to `point`, if it lies inside the grid.
    pub fn nearest_index(&self, point: &[f64; 3]) -> Option<[usize; 3]> {
        let o = self.origin();
        let mut idx = [0usize; 3];
        for axis in 0..3 {
            let f = (point[axis] / self.pixel_size + o[axis]).round();
            if !(f >= 0.0 && f < self.shape[axis] as f64) {
                return None;
            }
            idx[axis] = f as usize;
        }
        Some(idx)
    }

    /// Index range along `axis` covering all voxel centres in `[lo, hi]`.
    ///
    /// The range is padded by one voxel on each side and clamped to the grid,
    /// so callers must still test membership exactly.
    pub fn index_range(&self, axis: usize, lo: f64, hi: f64) -> Range<usize> {
        let o = self.origin()[axis];
        let len = self.shape[axis];
        let start = (lo / self.pixel_size + o).floor() - 1.0;
        let end = (hi / self.pixel_size + o).ceil() + 2.0;
        if !(start.is_finite() && end.is_finite()) || end <= 0.0 || start >= len as f64 {
            return 0..0;
        }
        let start = start.max(0.0) as usize;
        let end = (end as usize).min(len);
        start..end.max(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_center_even_and_odd() {
        assert_eq!(grid_center(4), 1.5);
        assert_eq!(grid_center(5), 2.0);
        assert_eq!(grid_center(250), 124.5);
    }

    #[test]
    fn test_position_is_symmetric_about_origin() {
        let grid = VoxelGrid::new([4, 5, 6], 0.5).unwrap();
        let p0 = grid.position([0, 0, 0]);
        let p1 = grid.position([3, 4, 5]);
        assert_eq!(p0, [-0.75, -1.0, -1.25]);
        assert_eq!(p1, [0.75, 1.0, 1.25]);
        assert_eq!(grid.position([1, 2, 2])[1], 0.0);
    }

    #[test]
    fn test_nearest_index_outside_grid() {
        let grid = VoxelGrid::new([5, 5, 5], 1.0).unwrap();
        assert_eq!(grid.nearest_index(&[0.0, 0.0, 0.0]), Some([2, 2, 2]));
        assert_eq!(grid.nearest_index(&[10.0, 0.0, 0.0]), None);
        assert_eq!(grid.nearest_index(&[0.0, -2.6, 0.0]), None);
    }

    #[test]
    fn test_index_range_clamped() {
        let grid = VoxelGrid::new([10, 10, 10], 1.0).unwrap();
        assert_eq!(grid.index_range(0, -100.0, 100.0), 0..10);
        assert!(grid.index_range(0, 50.0, 60.0).is_empty());
        let r = grid.index_range(1, -1.0, 1.0);
        assert!(r.start <= 4 && r.end >= 6);
    }

    #[test]
    fn test_invalid_grid() {
        assert!(VoxelGrid::new([0, 1, 1], 1.0).is_err());
        assert!(VoxelGrid::new([1, 1, 1], 0.0).is_err());
    }
}
