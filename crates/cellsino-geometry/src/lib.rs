//! # Cellsino Geometry
//!
//! Geometry handling for the cellsino framework. This crate provides:
//!
//! - **Elements** ([`elements`]): Analytic shapes (spheres, point sets)
//!   carrying a refractive index, a surrounding medium index, and a
//!   fluorescence brightness.
//! - **Transformations** ([`transform`]): Rigid rotate-then-translate
//!   transforms in homogeneous coordinates, following the sinogram
//!   acquisition convention.
//! - **Grids** ([`grid`]): The centre-origin convention shared by voxel
//!   volumes and detector images.
//! - **Rasterisation** ([`raster`]): Converts elements into refractive index
//!   and fluorescence volumes.
//! - **Phantoms** ([`phantom`], [`phantoms`]): Ordered compositions of
//!   elements and the named preset registry.

pub mod elements;
pub mod grid;
pub mod phantom;
pub mod phantoms;
pub mod raster;
pub mod transform;

use thiserror::Error;

pub use elements::{Element, Shape};
pub use grid::VoxelGrid;
pub use phantom::Phantom;
pub use phantoms::PhantomKind;
pub use transform::{Pose, Transform};

/// Errors raised while building geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("An element needs at least one point")]
    EmptyPoints,

    #[error("Unknown phantom '{0}'")]
    UnknownPhantom(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
}
