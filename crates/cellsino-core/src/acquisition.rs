//! Acquisition parameters.
//!
//! Angles, frame times, and lateral displacements can each be given
//! explicitly or generated. They are resolved into one value per frame
//! before any image is computed, so configuration errors surface early.

use std::f64::consts::PI;
use std::path::PathBuf;

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::propagator::PropagatorKind;
use crate::types::Mode;
use crate::SinogramError;

/// Rotation angles about the main axis (rad).
#[derive(Debug, Clone, PartialEq)]
pub enum Angles {
    /// `n` equidistant angles covering `[0, 2π)`.
    Count(usize),
    /// Explicit angles.
    Explicit(Vec<f64>),
}

impl Angles {
    pub fn resolve(&self) -> Vec<f64> {
        match self {
            Angles::Count(n) => (0..*n).map(|k| 2.0 * PI * k as f64 / *n as f64).collect(),
            Angles::Explicit(angles) => angles.clone(),
        }
    }
}

impl Default for Angles {
    fn default() -> Self {
        Angles::Count(180)
    }
}

/// Acquisition time of each frame (s).
#[derive(Debug, Clone, PartialEq)]
pub enum Times {
    /// Frames spread evenly over `[0, duration)`.
    Duration(f64),
    /// Explicit times, one per angle.
    Explicit(Vec<f64>),
}

impl Times {
    pub fn resolve(&self, frames: usize) -> Result<Vec<f64>, SinogramError> {
        match self {
            Times::Duration(duration) => Ok((0..frames)
                .map(|k| duration * k as f64 / frames as f64)
                .collect()),
            Times::Explicit(times) if times.len() == frames => Ok(times.clone()),
            Times::Explicit(times) => Err(SinogramError::TimesCount {
                expected: frames,
                got: times.len(),
            }),
        }
    }
}

impl Default for Times {
    fn default() -> Self {
        Times::Duration(3.0)
    }
}

/// Lateral displacement of the specimen on the detector (pixels).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Displacements {
    /// No displacement.
    #[default]
    None,
    /// Independent normal draws for x and y with zero mean.
    Gaussian { sigma: f64 },
    /// Explicit `(dx, dy)` pairs, one per angle.
    Explicit(Vec<[f64; 2]>),
}

impl Displacements {
    /// One displacement per frame. Gaussian draws are taken frame by frame,
    /// x before y.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        frames: usize,
        rng: &mut R,
    ) -> Result<Vec<[f64; 2]>, SinogramError> {
        match self {
            Displacements::None => Ok(vec![[0.0, 0.0]; frames]),
            Displacements::Gaussian { sigma } => {
                let normal =
                    Normal::new(0.0, *sigma).map_err(|_| SinogramError::InvalidSigma(*sigma))?;
                Ok((0..frames)
                    .map(|_| {
                        let dx = normal.sample(rng);
                        let dy = normal.sample(rng);
                        [dx, dy]
                    })
                    .collect())
            }
            Displacements::Explicit(d) if d.len() == frames => Ok(d.clone()),
            Displacements::Explicit(d) => Err(SinogramError::DisplacementCount {
                expected: frames,
                got: d.len(),
            }),
        }
    }
}

/// Everything that describes one acquisition run.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub angles: Angles,
    /// Rotation of the rotational axis in the detector plane (rad).
    pub axis_roll: f64,
    pub displacements: Displacements,
    pub times: Times,
    /// Requested modalities.
    pub modes: Vec<Mode>,
    pub propagator: PropagatorKind,
    /// Photobleaching decay constant (1/s); zero disables bleaching.
    pub bleach_decay: f64,
    /// Constant background of the fluorescence images.
    pub fluorescence_background: f64,
    /// Append frames to this file instead of keeping them in memory.
    pub path: Option<PathBuf>,
    /// Seed of the random generator used for displacements.
    pub seed: u64,
}

impl Default for Acquisition {
    fn default() -> Self {
        Self {
            angles: Angles::default(),
            axis_roll: 0.0,
            displacements: Displacements::None,
            times: Times::default(),
            modes: Mode::ALL.to_vec(),
            propagator: PropagatorKind::default(),
            bleach_decay: 0.0,
            fluorescence_background: 0.0,
            path: None,
            seed: 47,
        }
    }
}

impl Acquisition {
    pub fn with_angles(mut self, angles: Angles) -> Self {
        self.angles = angles;
        self
    }

    pub fn with_modes(mut self, modes: Vec<Mode>) -> Self {
        self.modes = modes;
        self
    }

    /// Set the modalities from their names.
    pub fn with_mode_names<S: AsRef<str>>(self, names: &[S]) -> Result<Self, SinogramError> {
        Ok(self.with_modes(Mode::parse_list(names)?))
    }

    pub fn with_displacements(mut self, displacements: Displacements) -> Self {
        self.displacements = displacements;
        self
    }

    pub fn with_times(mut self, times: Times) -> Self {
        self.times = times;
        self
    }

    pub fn with_propagator(mut self, propagator: PropagatorKind) -> Self {
        self.propagator = propagator;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn wants(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }

    /// Bleaching factor of a frame taken at `time`.
    pub fn bleach_factor(&self, time: f64) -> f64 {
        (-self.bleach_decay * time).exp()
    }
}
