//! Core types shared across the acquisition pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cellsino_geometry::grid::grid_center;
use ndarray::{Array2, Array3};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::SinogramError;

/// Detector of one frame: grid, pixel size, and lateral displacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detector {
    /// Number of pixels along x and y.
    pub grid_size: [usize; 2],
    /// Pixel size (m).
    pub pixel_size: f64,
    /// Lateral displacement of the specimen (pixels).
    pub displacement: [f64; 2],
}

impl Detector {
    pub fn new(grid_size: [usize; 2], pixel_size: f64) -> Self {
        Self {
            grid_size,
            pixel_size,
            displacement: [0.0, 0.0],
        }
    }

    pub fn with_displacement(mut self, displacement: [f64; 2]) -> Self {
        self.displacement = displacement;
        self
    }

    pub fn dim(&self) -> (usize, usize) {
        (self.grid_size[0], self.grid_size[1])
    }

    /// Origin of the coordinate system on the detector (pixels), including
    /// the displacement.
    pub fn center(&self) -> [f64; 2] {
        [
            grid_center(self.grid_size[0]) + self.displacement[0],
            grid_center(self.grid_size[1]) + self.displacement[1],
        ]
    }

    /// Position of a 3D point on the detector, `[x, y, depth]` in pixels.
    ///
    /// The depth is measured from the detector (focal) plane through the
    /// coordinate origin.
    pub fn project_point(&self, point: &[f64; 3]) -> [f64; 3] {
        let c = self.center();
        [
            c[0] + point[0] / self.pixel_size,
            c[1] + point[1] / self.pixel_size,
            point[2] / self.pixel_size,
        ]
    }
}

/// An imaging modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Complex transmitted field (quantitative phase imaging).
    Field,
    /// Fluorescence intensity.
    Fluorescence,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Field, Mode::Fluorescence];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Field => "field",
            Mode::Fluorescence => "fluorescence",
        }
    }

    /// Parse a list of mode names, rejecting unknown names and empty lists.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Mode>, SinogramError> {
        let modes = names
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<Mode>, _>>()?;
        if modes.is_empty() {
            return Err(SinogramError::NoMode);
        }
        Ok(modes)
    }
}

impl FromStr for Mode {
    type Err = SinogramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "field" => Ok(Mode::Field),
            "fluorescence" => Ok(Mode::Fluorescence),
            other => Err(SinogramError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Acquisition metadata attached to every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SinogramMeta {
    /// Pixel size (m).
    pub pixel_size: f64,
    /// Vacuum wavelength (m).
    pub wavelength: f64,
    /// Refractive index of the medium.
    pub medium_index: f64,
}

/// One complex field image, tagged with its acquisition angle and time.
#[derive(Debug, Clone)]
pub struct FieldFrame {
    pub index: usize,
    pub angle: f64,
    pub time: f64,
    pub field: Array2<Complex64>,
}

/// One fluorescence image, tagged with its acquisition angle and time.
#[derive(Debug, Clone)]
pub struct FluorescenceFrame {
    pub index: usize,
    pub angle: f64,
    pub time: f64,
    pub fluorescence: Array2<f64>,
}

/// Sinogram volumes held in memory, shape `(angles, x, y)`.
///
/// Only the requested modalities are populated.
#[derive(Debug, Clone)]
pub struct SinogramStack {
    pub angles: Vec<f64>,
    pub times: Vec<f64>,
    pub meta: SinogramMeta,
    pub field: Option<Array3<Complex64>>,
    pub fluorescence: Option<Array3<f64>>,
}

/// Result of a sinogram computation.
#[derive(Debug, Clone)]
pub enum SinogramOutput {
    /// All frames accumulated in memory.
    InMemory(SinogramStack),
    /// Frames were appended to the file at this path.
    Persisted(PathBuf),
}

impl SinogramOutput {
    pub fn into_stack(self) -> Option<SinogramStack> {
        match self {
            SinogramOutput::InMemory(stack) => Some(stack),
            SinogramOutput::Persisted(_) => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SinogramOutput::InMemory(_) => None,
            SinogramOutput::Persisted(path) => Some(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_center_even_odd() {
        assert_eq!(Detector::new([4, 5], 1.0).center(), [1.5, 2.0]);
        let shifted = Detector::new([25, 25], 1.0).with_displacement([1.0, -0.5]);
        assert_eq!(shifted.center(), [13.0, 11.5]);
    }

    #[test]
    fn test_project_point_scales_by_pixel_size() {
        let det = Detector::new([10, 10], 0.5e-6);
        let p = det.project_point(&[1e-6, -0.5e-6, 2e-6]);
        assert!((p[0] - 6.5).abs() < 1e-12);
        assert!((p[1] - 3.5).abs() < 1e-12);
        assert!((p[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!(
            Mode::parse_list(&["fluorescence", "field"]).unwrap(),
            vec![Mode::Fluorescence, Mode::Field]
        );
        assert!(matches!(
            Mode::parse_list(&["field", "phase"]),
            Err(SinogramError::InvalidMode(ref m)) if m == "phase"
        ));
        let empty: [&str; 0] = [];
        assert!(matches!(Mode::parse_list(&empty), Err(SinogramError::NoMode)));
    }
}
