//! TOML configuration deserialisation for sinogram jobs.

use cellsino_geometry::phantoms::SimpleCell;
use cellsino_geometry::Pose;
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub setup: SetupConfig,
    /// Overrides for the "simple cell" preset.
    #[serde(default)]
    pub simple_cell: Option<SimpleCell>,
    /// Extra spheres appended to the phantom.
    #[serde(default)]
    pub sphere: Vec<SphereConfig>,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Phantom and detector parameters.
#[derive(Debug, Deserialize)]
pub struct SetupConfig {
    /// Preset name, or "custom" for a phantom built only from `[[sphere]]`.
    #[serde(default = "default_phantom")]
    pub phantom: String,
    /// Medium index of a custom phantom.
    #[serde(default = "default_medium_index")]
    pub medium_index: f64,
    /// Vacuum wavelength (m).
    pub wavelength: f64,
    /// Detector pixel size (m).
    pub pixel_size: f64,
    pub grid_size: [usize; 2],
    /// Rigid motion applied to the phantom before acquisition.
    #[serde(default)]
    pub pose: Option<Pose>,
}

fn default_phantom() -> String {
    "simple cell".into()
}
fn default_medium_index() -> f64 {
    1.335
}

/// A sphere given directly in the job file.
#[derive(Debug, Deserialize)]
pub struct SphereConfig {
    #[serde(default)]
    pub center: [f64; 3],
    pub radius: f64,
    pub object_index: f64,
    /// Defaults to the phantom's medium index.
    #[serde(default)]
    pub medium_index: Option<f64>,
    #[serde(default)]
    pub fl_brightness: f64,
}

/// Angles: a number of equidistant angles or an explicit list (rad).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnglesSpec {
    Count(usize),
    List(Vec<f64>),
}

/// Times: a total duration (s) or an explicit list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimesSpec {
    Duration(f64),
    List(Vec<f64>),
}

/// Displacements: a standard deviation (pixels) or explicit pairs.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DisplacementSpec {
    Sigma(f64),
    List(Vec<[f64; 2]>),
}

/// Acquisition parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct AcquisitionConfig {
    #[serde(default = "default_angles")]
    pub angles: AnglesSpec,
    #[serde(default)]
    pub axis_roll: f64,
    #[serde(default)]
    pub displacement: Option<DisplacementSpec>,
    #[serde(default = "default_times")]
    pub times: TimesSpec,
    #[serde(default = "default_modes")]
    pub mode: Vec<String>,
    #[serde(default = "default_propagator")]
    pub propagator: String,
    #[serde(default)]
    pub bleach_decay: f64,
    #[serde(default)]
    pub fluorescence_background: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            angles: default_angles(),
            axis_roll: 0.0,
            displacement: None,
            times: default_times(),
            mode: default_modes(),
            propagator: default_propagator(),
            bleach_decay: 0.0,
            fluorescence_background: 0.0,
            seed: default_seed(),
        }
    }
}

fn default_angles() -> AnglesSpec {
    AnglesSpec::Count(180)
}
fn default_times() -> TimesSpec {
    TimesSpec::Duration(3.0)
}
fn default_modes() -> Vec<String> {
    vec!["field".into(), "fluorescence".into()]
}
fn default_propagator() -> String {
    "rytov".into()
}
fn default_seed() -> u64 {
    47
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// JSON Lines file the frames are appended to.
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> String {
    "./output/sinogram.jsonl".into()
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> anyhow::Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    Ok(config)
}
