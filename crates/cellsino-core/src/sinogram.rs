//! The acquisition loop.

use std::time::Instant;

use cellsino_geometry::{Phantom, PhantomKind, Pose};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::acquisition::Acquisition;
use crate::fluorescence::FluorescenceProjector;
use crate::progress::Progress;
use crate::propagator::Propagator;
use crate::series::{JsonLinesWriter, MemorySeries, SeriesWriter};
use crate::types::{
    Detector, FieldFrame, FluorescenceFrame, Mode, SinogramMeta, SinogramOutput,
};
use crate::SinogramError;

/// A phantom on a detector, ready to be rotated through an acquisition.
#[derive(Debug, Clone)]
pub struct Sinogram {
    pub phantom: Phantom,
    /// Vacuum wavelength (m).
    pub wavelength: f64,
    /// Detector pixel size (m).
    pub pixel_size: f64,
    pub grid_size: [usize; 2],
}

/// Per-frame parameters resolved from an [`Acquisition`].
struct FramePlan {
    angles: Vec<f64>,
    times: Vec<f64>,
    displacements: Vec<[f64; 2]>,
    propagator: Option<Box<dyn Propagator>>,
    fluorescence: bool,
}

impl Sinogram {
    pub fn new(phantom: Phantom, wavelength: f64, pixel_size: f64, grid_size: [usize; 2]) -> Self {
        Self {
            phantom,
            wavelength,
            pixel_size,
            grid_size,
        }
    }

    /// Build a sinogram of a registered phantom with default parameters.
    pub fn from_registry(
        name: &str,
        wavelength: f64,
        pixel_size: f64,
        grid_size: [usize; 2],
    ) -> Result<Self, SinogramError> {
        let kind: PhantomKind = name.parse()?;
        Ok(Self::new(kind.build(), wavelength, pixel_size, grid_size))
    }

    pub fn meta(&self) -> SinogramMeta {
        SinogramMeta {
            pixel_size: self.pixel_size,
            wavelength: self.wavelength,
            medium_index: self.phantom.medium_index,
        }
    }

    fn detector(&self, displacement: [f64; 2]) -> Detector {
        Detector::new(self.grid_size, self.pixel_size).with_displacement(displacement)
    }

    /// Compute the sinogram, seeding the displacement generator from
    /// `acquisition.seed`.
    pub fn compute(
        &self,
        acquisition: &Acquisition,
        progress: Progress<'_>,
    ) -> Result<SinogramOutput, SinogramError> {
        let mut rng = StdRng::seed_from_u64(acquisition.seed);
        self.compute_with_rng(acquisition, progress, &mut rng)
    }

    /// Compute the sinogram with a caller-provided random generator.
    ///
    /// Frames go to `acquisition.path` if set and are returned in memory
    /// otherwise.
    pub fn compute_with_rng<R: Rng + ?Sized>(
        &self,
        acquisition: &Acquisition,
        progress: Progress<'_>,
        rng: &mut R,
    ) -> Result<SinogramOutput, SinogramError> {
        let plan = self.plan(acquisition, rng)?;
        match &acquisition.path {
            Some(path) => {
                let mut writer = JsonLinesWriter::new(path);
                self.run(&plan, acquisition, progress, &mut writer)?;
                Ok(SinogramOutput::Persisted(path.clone()))
            }
            None => {
                let mut series = MemorySeries::new(
                    plan.angles.len(),
                    self.grid_size,
                    plan.propagator.is_some(),
                    plan.fluorescence,
                );
                self.run(&plan, acquisition, progress, &mut series)?;
                Ok(SinogramOutput::InMemory(series.into_stack(
                    plan.angles,
                    plan.times,
                    self.meta(),
                )))
            }
        }
    }

    /// Compute the sinogram into a custom writer.
    pub fn compute_into<R: Rng + ?Sized>(
        &self,
        acquisition: &Acquisition,
        progress: Progress<'_>,
        rng: &mut R,
        writer: &mut dyn SeriesWriter,
    ) -> Result<(), SinogramError> {
        let plan = self.plan(acquisition, rng)?;
        self.run(&plan, acquisition, progress, writer)
    }

    /// Validate the acquisition and resolve per-frame parameters.
    fn plan<R: Rng + ?Sized>(
        &self,
        acquisition: &Acquisition,
        rng: &mut R,
    ) -> Result<FramePlan, SinogramError> {
        if acquisition.modes.is_empty() {
            return Err(SinogramError::NoMode);
        }
        let angles = acquisition.angles.resolve();
        let times = acquisition.times.resolve(angles.len())?;
        let displacements = acquisition.displacements.resolve(angles.len(), rng)?;
        let propagator = acquisition
            .wants(Mode::Field)
            .then(|| acquisition.propagator.build());
        Ok(FramePlan {
            angles,
            times,
            displacements,
            propagator,
            fluorescence: acquisition.wants(Mode::Fluorescence),
        })
    }

    fn run(
        &self,
        plan: &FramePlan,
        acquisition: &Acquisition,
        progress: Progress<'_>,
        writer: &mut dyn SeriesWriter,
    ) -> Result<(), SinogramError> {
        let frames = plan.angles.len();
        let meta = self.meta();
        info!(
            "Computing {} frames on a {}x{} grid (modes: {:?}, propagator: {})",
            frames, self.grid_size[0], self.grid_size[1], acquisition.modes, acquisition.propagator
        );
        progress.add_total(frames);
        let start = Instant::now();

        for (index, &angle) in plan.angles.iter().enumerate() {
            let time = plan.times[index];
            let pose = Pose::rotation(angle, acquisition.axis_roll, 0.0);
            let posed = self.phantom.transform(&pose);
            let detector = self.detector(plan.displacements[index]);

            if let Some(propagator) = &plan.propagator {
                let field = propagator.propagate(&posed, &detector, self.wavelength)?;
                writer.append_field(
                    &FieldFrame {
                        index,
                        angle,
                        time,
                        field,
                    },
                    &meta,
                )?;
            }

            if plan.fluorescence {
                let fluorescence = FluorescenceProjector::new(detector)
                    .with_bleach_factor(acquisition.bleach_factor(time))
                    .with_background(acquisition.fluorescence_background)
                    .project(&posed);
                writer.append_fluorescence(
                    &FluorescenceFrame {
                        index,
                        angle,
                        time,
                        fluorescence,
                    },
                    &meta,
                )?;
            }

            progress.frame_done();
            debug!(
                "Frame {}/{}: angle={:.4} rad, t={:.3} s, displacement={:?}",
                index + 1,
                frames,
                angle,
                time,
                detector.displacement
            );
        }

        info!("Sinogram complete in {:.2?}", start.elapsed());
        Ok(())
    }
}
