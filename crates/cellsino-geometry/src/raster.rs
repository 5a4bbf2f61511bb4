//! Rasterisation of elements and phantoms onto a voxel grid.
//!
//! A voxel belongs to a sphere when the squared distance between its centre
//! and the sphere centre does not exceed $r^2$. Only voxels inside the
//! sphere's bounding box are tested.
//!
//! Phantoms are composed additively: starting from a volume filled with the
//! phantom's medium index, every element adds `object_index - medium_index`
//! inside its own shape, and its brightness to the fluorescence volume.
//! Both sums commute, so the composed volumes do not depend on element
//! order. Layered structures are encoded through index and brightness
//! offsets instead (see [`crate::phantoms::SimpleCell`]).

use log::debug;
use ndarray::Array3;

use crate::elements::{Element, Shape};
use crate::grid::VoxelGrid;
use crate::phantom::Phantom;

/// Indices `[x, y, z]` of the voxels covered by `element`.
pub fn covered_voxels(element: &Element, grid: &VoxelGrid) -> Vec<[usize; 3]> {
    match element.shape {
        Shape::Sphere { radius } => sphere_voxels(&element.center(), radius, grid),
        Shape::Points => element
            .points()
            .iter()
            .filter_map(|p| grid.nearest_index(p))
            .collect(),
    }
}

fn sphere_voxels(center: &[f64; 3], radius: f64, grid: &VoxelGrid) -> Vec<[usize; 3]> {
    if !(radius > 0.0) {
        return Vec::new();
    }
    let r_sq = radius * radius;
    let xs = grid.index_range(0, center[0] - radius, center[0] + radius);
    let ys = grid.index_range(1, center[1] - radius, center[1] + radius);
    let zs = grid.index_range(2, center[2] - radius, center[2] + radius);

    let mut voxels = Vec::new();
    for ix in xs {
        for iy in ys.clone() {
            for iz in zs.clone() {
                let p = grid.position([ix, iy, iz]);
                let dx = p[0] - center[0];
                let dy = p[1] - center[1];
                let dz = p[2] - center[2];
                if dx * dx + dy * dy + dz * dz <= r_sq {
                    voxels.push([ix, iy, iz]);
                }
            }
        }
    }
    voxels
}

/// Rasterise a phantom into `(refractive_index, fluorescence)` volumes.
pub fn draw_phantom(phantom: &Phantom, grid: &VoxelGrid) -> (Array3<f64>, Array3<f64>) {
    let mut ri = Array3::from_elem(grid.dim(), phantom.medium_index);
    let mut fl = Array3::zeros(grid.dim());
    for (i, element) in phantom.iter().enumerate() {
        let offset = element.object_index - element.medium_index;
        let voxels = covered_voxels(element, grid);
        debug!("Element {} ({}): {} voxels", i, element.kind(), voxels.len());
        for idx in voxels {
            ri[idx] += offset;
            fl[idx] += element.fl_brightness;
        }
    }
    (ri, fl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_sphere_voxel_count_matches_volume() {
        let grid = VoxelGrid::new([40, 40, 40], 1.0).unwrap();
        let sphere = Element::sphere(1.4, 1.33, 1.0, [0.0, 0.0, 0.0], 10.0);
        let count = covered_voxels(&sphere, &grid).len() as f64;

        // (4/3) pi r^3 ~ 4189 voxels.
        let expected = 4.0 / 3.0 * PI * 1000.0;
        assert!(
            (count - expected).abs() / expected < 0.05,
            "voxel count {count} too far from {expected}"
        );
    }

    #[test]
    fn test_all_voxels_inside_sphere() {
        let grid = VoxelGrid::new([20, 20, 20], 0.5).unwrap();
        let center = [1.0, -0.5, 0.75];
        let sphere = Element::sphere(1.4, 1.33, 1.0, center, 2.5);
        for idx in covered_voxels(&sphere, &grid) {
            let p = grid.position(idx);
            let d_sq: f64 = (0..3).map(|i| (p[i] - center[i]).powi(2)).sum();
            assert!(d_sq <= 2.5 * 2.5 + 1e-12);
        }
    }

    #[test]
    fn test_sphere_outside_grid_draws_nothing() {
        let grid = VoxelGrid::new([10, 10, 10], 1.0).unwrap();
        let sphere = Element::sphere(1.4, 1.33, 1.0, [100.0, 0.0, 0.0], 3.0);
        assert!(covered_voxels(&sphere, &grid).is_empty());
        let zero = Element::sphere(1.4, 1.33, 1.0, [0.0, 0.0, 0.0], 0.0);
        assert!(covered_voxels(&zero, &grid).is_empty());
    }

    #[test]
    fn test_points_element_marks_single_voxels() {
        let grid = VoxelGrid::new([5, 5, 5], 1.0).unwrap();
        let el = Element::from_points(1.5, 1.33, 2.0, vec![[0.0, 0.0, 0.0], [1.0, -1.0, 2.0]])
            .unwrap();
        let (ri, fl) = el.draw(&grid);
        assert_eq!(ri[[2, 2, 2]], 1.5);
        assert_eq!(ri[[3, 1, 4]], 1.5);
        assert_eq!(fl[[3, 1, 4]], 2.0);
        assert_eq!(ri[[0, 0, 0]], 1.33);
        assert_eq!(fl.sum(), 4.0);
    }
}
