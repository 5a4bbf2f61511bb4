//! Job runner: builds the phantom, detector and acquisition from a parsed
//! configuration and drives the computation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use cellsino_core::progress::{Progress, ProgressSink};
use cellsino_core::{
    Acquisition, Angles, Displacements, Mode, PropagatorKind, Sinogram, SinogramOutput, Times,
};
use cellsino_geometry::phantoms::SimpleCell;
use cellsino_geometry::{Element, Phantom, PhantomKind, VoxelGrid};

use crate::config::{AnglesSpec, DisplacementSpec, JobConfig, TimesSpec};

/// Build the phantom described by the `[setup]`, `[simple_cell]` and
/// `[[sphere]]` sections.
pub fn build_phantom(job: &JobConfig) -> Result<Phantom> {
    let name = job.setup.phantom.as_str();
    let mut phantom = if name.trim().eq_ignore_ascii_case("custom") {
        if job.simple_cell.is_some() {
            anyhow::bail!("`[simple_cell]` overrides need phantom = \"simple cell\"");
        }
        Phantom::new(job.setup.medium_index)
    } else {
        let kind: PhantomKind = name.parse().with_context(|| {
            format!("Valid phantoms: custom, {}", PhantomKind::names().join(", "))
        })?;
        match (kind, job.simple_cell) {
            (PhantomKind::SimpleCell, Some(cell)) => cell.build(),
            (kind, _) => kind.build(),
        }
    };

    for (i, sphere) in job.sphere.iter().enumerate() {
        if !(sphere.radius > 0.0) {
            anyhow::bail!("Sphere {}: radius must be positive, got {}", i, sphere.radius);
        }
        phantom.append(Element::sphere(
            sphere.object_index,
            sphere.medium_index.unwrap_or(phantom.medium_index),
            sphere.fl_brightness,
            sphere.center,
            sphere.radius,
        ));
    }

    if let Some(pose) = &job.setup.pose {
        phantom = phantom.transform(pose);
    }
    Ok(phantom)
}

pub fn build_sinogram(job: &JobConfig) -> Result<Sinogram> {
    let setup = &job.setup;
    if !(setup.wavelength > 0.0) {
        anyhow::bail!("`wavelength` must be positive, got {}", setup.wavelength);
    }
    if !(setup.pixel_size > 0.0) {
        anyhow::bail!("`pixel_size` must be positive, got {}", setup.pixel_size);
    }
    if setup.grid_size.contains(&0) {
        anyhow::bail!("`grid_size` must be non-zero, got {:?}", setup.grid_size);
    }
    Ok(Sinogram::new(
        build_phantom(job)?,
        setup.wavelength,
        setup.pixel_size,
        setup.grid_size,
    ))
}

/// Translate the `[acquisition]` section, writing frames to `path`.
pub fn build_acquisition(job: &JobConfig, path: Option<PathBuf>) -> Result<Acquisition> {
    let acq = &job.acquisition;
    let propagator: PropagatorKind = acq.propagator.parse().with_context(|| {
        format!("Valid propagators: {}", PropagatorKind::names().join(", "))
    })?;
    let modes = Mode::parse_list(&acq.mode[..]).context("Valid modes: field, fluorescence")?;

    Ok(Acquisition {
        angles: match &acq.angles {
            AnglesSpec::Count(n) => Angles::Count(*n),
            AnglesSpec::List(a) => Angles::Explicit(a.clone()),
        },
        axis_roll: acq.axis_roll,
        displacements: match &acq.displacement {
            None => Displacements::None,
            Some(DisplacementSpec::Sigma(sigma)) => Displacements::Gaussian { sigma: *sigma },
            Some(DisplacementSpec::List(d)) => Displacements::Explicit(d.clone()),
        },
        times: match &acq.times {
            TimesSpec::Duration(d) => Times::Duration(*d),
            TimesSpec::List(t) => Times::Explicit(t.clone()),
        },
        modes,
        propagator,
        bleach_decay: acq.bleach_decay,
        fluorescence_background: acq.fluorescence_background,
        path,
        seed: acq.seed,
    })
}

/// Check that every per-frame parameter resolves, without computing
/// anything. Returns the number of frames.
pub fn validate(job: &JobConfig) -> Result<usize> {
    build_sinogram(job)?;
    let acquisition = build_acquisition(job, None)?;
    let frames = acquisition.angles.resolve().len();
    acquisition.times.resolve(frames)?;
    acquisition
        .displacements
        .resolve(frames, &mut StdRng::seed_from_u64(acquisition.seed))?;
    Ok(frames)
}

/// Moves the bar forward.
struct BarPosition<'a>(&'a ProgressBar);

impl ProgressSink for BarPosition<'_> {
    fn add(&self, delta: u64) {
        self.0.inc(delta);
    }
}

/// Grows the bar's length.
struct BarLength<'a>(&'a ProgressBar);

impl ProgressSink for BarLength<'_> {
    fn add(&self, delta: u64) {
        self.0.inc_length(delta);
    }
}

/// Compute the sinogram of a job and append its frames to `path`.
pub fn run_job(job: &JobConfig, path: &Path) -> Result<PathBuf> {
    let sinogram = build_sinogram(job)?;
    let acquisition = build_acquisition(job, Some(path.to_path_buf()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    println!(
        "  Phantom: {} elements, medium index {}",
        sinogram.phantom.len(),
        sinogram.phantom.medium_index
    );
    println!(
        "  Detector: {}x{} px at {:.3e} m, wavelength {:.3e} m",
        sinogram.grid_size[0], sinogram.grid_size[1], sinogram.pixel_size, sinogram.wavelength
    );

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("=> "),
    );
    bar.set_message("Frames");

    let completed = BarPosition(&bar);
    let total = BarLength(&bar);
    let output = sinogram
        .compute(&acquisition, Progress::new(&completed, &total))
        .with_context(|| format!("Computing sinogram into {}", path.display()))?;
    bar.finish();

    match output {
        SinogramOutput::Persisted(written) => {
            info!("Frames appended to {}", written.display());
            Ok(written)
        }
        SinogramOutput::InMemory(_) => anyhow::bail!("Sinogram was not written to disk"),
    }
}

/// Ground-truth volumes written by the `draw` command.
#[derive(Serialize)]
struct GroundTruth {
    pixel_size: f64,
    medium_index: f64,
    ri: Array3<f64>,
    fl: Array3<f64>,
}

/// Rasterise the job's phantom on a cubic-pixel grid and write the
/// refractive index and fluorescence volumes as JSON.
pub fn draw_ground_truth(job: &JobConfig, depth: Option<usize>, path: &Path) -> Result<()> {
    let phantom = build_phantom(job)?;
    let [gx, gy] = job.setup.grid_size;
    let gz = depth.unwrap_or(gx.max(gy));
    let grid = VoxelGrid::new([gx, gy, gz], job.setup.pixel_size)?;

    println!("  Rasterising {} elements on {}x{}x{} voxels", phantom.len(), gx, gy, gz);
    let (ri, fl) = phantom.draw(&grid);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let truth = GroundTruth {
        pixel_size: grid.pixel_size,
        medium_index: phantom.medium_index,
        ri,
        fl,
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("Creating {}", path.display()))?;
    serde_json::to_writer(std::io::BufWriter::new(file), &truth)?;
    println!("Ground truth written to: {}", path.display());
    Ok(())
}

/// Default parameters of the "simple cell" preset, for `list`.
pub fn simple_cell_defaults() -> Result<String> {
    Ok(toml::to_string(&SimpleCell::default())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use cellsino_core::series::read_json_lines;
    use tempfile::TempDir;

    const JOB: &str = r#"
        [setup]
        wavelength = 550e-9
        pixel_size = 1e-6
        grid_size = [12, 12]

        [acquisition]
        angles = 3
        propagator = "projection"
    "#;

    #[test]
    fn test_build_phantom_presets_and_custom() {
        let job = parse_config(JOB).unwrap();
        assert_eq!(build_phantom(&job).unwrap().len(), 5);

        let custom = parse_config(
            r#"
            [setup]
            phantom = "custom"
            medium_index = 1.33
            wavelength = 550e-9
            pixel_size = 1e-6
            grid_size = [12, 12]

            [[sphere]]
            radius = 2e-6
            object_index = 1.4
            "#,
        )
        .unwrap();
        let phantom = build_phantom(&custom).unwrap();
        assert_eq!(phantom.len(), 1);
        assert_eq!(phantom.elements()[0].medium_index, 1.33);
    }

    #[test]
    fn test_simple_cell_overrides_rejected_for_custom() {
        let job = parse_config(
            r#"
            [setup]
            phantom = "custom"
            wavelength = 550e-9
            pixel_size = 1e-6
            grid_size = [12, 12]

            [simple_cell]
            nucleus_fl = 5.0
            "#,
        )
        .unwrap();
        let err = build_phantom(&job).unwrap_err();
        assert!(err.to_string().contains("simple_cell"), "{err}");
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let mut job = parse_config(JOB).unwrap();
        job.setup.phantom = "blob".into();
        assert!(build_phantom(&job).is_err());

        let mut job = parse_config(JOB).unwrap();
        job.acquisition.propagator = "born".into();
        assert!(build_acquisition(&job, None).is_err());

        let mut job = parse_config(JOB).unwrap();
        job.acquisition.mode = vec!["phase".into()];
        assert!(build_acquisition(&job, None).is_err());
    }

    #[test]
    fn test_validate_checks_lengths() {
        let job = parse_config(JOB).unwrap();
        assert_eq!(validate(&job).unwrap(), 3);

        let mut job = parse_config(JOB).unwrap();
        job.acquisition.times = TimesSpec::List(vec![0.0, 1.0]);
        assert!(validate(&job).is_err());
    }

    #[test]
    fn test_run_job_writes_all_frames() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("sino.jsonl");
        let job = parse_config(JOB).unwrap();
        let written = run_job(&job, &path).unwrap();
        assert_eq!(written, path);
        assert_eq!(read_json_lines(&path).unwrap().len(), 6);
    }

    #[test]
    fn test_draw_ground_truth() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("truth.json");
        let job = parse_config(JOB).unwrap();
        draw_ground_truth(&job, Some(10), &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["ri"]["dim"], serde_json::json!([12, 12, 10]));
    }
}
