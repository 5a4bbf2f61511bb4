//! Phantoms: ordered compositions of elements forming one specimen.

use ndarray::Array3;

use crate::elements::Element;
use crate::grid::VoxelGrid;
use crate::raster;
use crate::transform::{Pose, Transform};

/// A virtual specimen made of elements embedded in a medium.
#[derive(Debug, Clone, PartialEq)]
pub struct Phantom {
    /// Refractive index of the surrounding medium.
    pub medium_index: f64,
    elements: Vec<Element>,
}

impl Phantom {
    /// Create an empty phantom in a medium.
    pub fn new(medium_index: f64) -> Self {
        Self {
            medium_index,
            elements: Vec::new(),
        }
    }

    /// Add an element at the end of the composition.
    pub fn append(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Apply the same rigid motion to every element.
    ///
    /// Returns a new phantom with the same medium index.
    pub fn transform(&self, pose: &Pose) -> Phantom {
        let t = Transform::from_pose(pose);
        Phantom {
            medium_index: self.medium_index,
            elements: self.elements.iter().map(|el| el.transformed_by(&t)).collect(),
        }
    }

    /// Rasterise into `(refractive_index, fluorescence)` volumes.
    pub fn draw(&self, grid: &VoxelGrid) -> (Array3<f64>, Array3<f64>) {
        raster::draw_phantom(self, grid)
    }
}

impl<'a> IntoIterator for &'a Phantom {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl Extend<Element> for Phantom {
    fn extend<I: IntoIterator<Item = Element>>(&mut self, iter: I) {
        self.elements.extend(iter);
    }
}
