//! Frame sinks.
//!
//! The acquisition loop hands every frame to a [`SeriesWriter`] as soon as
//! it is computed. [`MemorySeries`] fills pre-allocated stacks;
//! [`JsonLinesWriter`] appends one JSON record per frame to a file, opening
//! and closing it for every frame so that partial results survive an
//! interrupted run.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::{Array2, Array3, Axis};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::types::{FieldFrame, FluorescenceFrame, SinogramMeta, SinogramStack};
use crate::SinogramError;

/// Series name of field frames in persisted output.
pub const FIELD_SERIES: &str = "qpseries";
/// Series name of fluorescence frames in persisted output.
pub const FLUORESCENCE_SERIES: &str = "flseries";

/// Destination of computed frames.
pub trait SeriesWriter {
    fn append_field(&mut self, frame: &FieldFrame, meta: &SinogramMeta)
        -> Result<(), SinogramError>;

    fn append_fluorescence(
        &mut self,
        frame: &FluorescenceFrame,
        meta: &SinogramMeta,
    ) -> Result<(), SinogramError>;
}

/// Pre-allocated in-memory stacks of shape `(frames, x, y)`.
#[derive(Debug, Clone)]
pub struct MemorySeries {
    field: Option<Array3<Complex64>>,
    fluorescence: Option<Array3<f64>>,
}

impl MemorySeries {
    pub fn new(frames: usize, grid_size: [usize; 2], field: bool, fluorescence: bool) -> Self {
        let shape = (frames, grid_size[0], grid_size[1]);
        Self {
            field: field.then(|| Array3::zeros(shape)),
            fluorescence: fluorescence.then(|| Array3::zeros(shape)),
        }
    }

    pub fn into_stack(
        self,
        angles: Vec<f64>,
        times: Vec<f64>,
        meta: SinogramMeta,
    ) -> SinogramStack {
        SinogramStack {
            angles,
            times,
            meta,
            field: self.field,
            fluorescence: self.fluorescence,
        }
    }
}

impl SeriesWriter for MemorySeries {
    fn append_field(
        &mut self,
        frame: &FieldFrame,
        _meta: &SinogramMeta,
    ) -> Result<(), SinogramError> {
        if let Some(stack) = self.field.as_mut() {
            stack.index_axis_mut(Axis(0), frame.index).assign(&frame.field);
        }
        Ok(())
    }

    fn append_fluorescence(
        &mut self,
        frame: &FluorescenceFrame,
        _meta: &SinogramMeta,
    ) -> Result<(), SinogramError> {
        if let Some(stack) = self.fluorescence.as_mut() {
            stack
                .index_axis_mut(Axis(0), frame.index)
                .assign(&frame.fluorescence);
        }
        Ok(())
    }
}

/// Metadata stored with every persisted frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub pixel_size: f64,
    /// Only present on field frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelength: Option<f64>,
    /// Only present on field frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium_index: Option<f64>,
}

/// Image data of a persisted frame, as read back from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum FrameData {
    Field(Array2<Complex64>),
    Fluorescence(Array2<f64>),
}

/// One line of a JSON Lines sinogram file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub series: String,
    pub index: usize,
    pub angle: f64,
    pub time: f64,
    pub meta: RecordMeta,
    pub data: FrameData,
}

/// Borrowed image data, serialised exactly like [`FrameData`].
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
enum FrameDataRef<'a> {
    Field(&'a Array2<Complex64>),
    Fluorescence(&'a Array2<f64>),
}

/// Borrowed counterpart of [`FrameRecord`] used when writing.
#[derive(Debug, Clone, Copy, Serialize)]
struct FrameRecordRef<'a> {
    series: &'a str,
    index: usize,
    angle: f64,
    time: f64,
    meta: RecordMeta,
    data: FrameDataRef<'a>,
}

/// Appends frames to a JSON Lines file.
#[derive(Debug, Clone)]
pub struct JsonLinesWriter {
    path: PathBuf,
}

impl JsonLinesWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &FrameRecordRef<'_>) -> Result<(), SinogramError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl SeriesWriter for JsonLinesWriter {
    fn append_field(
        &mut self,
        frame: &FieldFrame,
        meta: &SinogramMeta,
    ) -> Result<(), SinogramError> {
        self.append(&FrameRecordRef {
            series: FIELD_SERIES,
            index: frame.index,
            angle: frame.angle,
            time: frame.time,
            meta: RecordMeta {
                pixel_size: meta.pixel_size,
                wavelength: Some(meta.wavelength),
                medium_index: Some(meta.medium_index),
            },
            data: FrameDataRef::Field(&frame.field),
        })
    }

    fn append_fluorescence(
        &mut self,
        frame: &FluorescenceFrame,
        meta: &SinogramMeta,
    ) -> Result<(), SinogramError> {
        self.append(&FrameRecordRef {
            series: FLUORESCENCE_SERIES,
            index: frame.index,
            angle: frame.angle,
            time: frame.time,
            meta: RecordMeta {
                pixel_size: meta.pixel_size,
                wavelength: None,
                medium_index: None,
            },
            data: FrameDataRef::Fluorescence(&frame.fluorescence),
        })
    }
}

/// Read all records of a JSON Lines sinogram file, skipping blank lines.
pub fn read_json_lines(path: &Path) -> Result<Vec<FrameRecord>, SinogramError> {
    let reader = BufReader::new(std::fs::File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn meta() -> SinogramMeta {
        SinogramMeta {
            pixel_size: 1e-6,
            wavelength: 550e-9,
            medium_index: 1.335,
        }
    }

    #[test]
    fn test_memory_series_fills_requested_stacks() {
        let mut series = MemorySeries::new(2, [3, 4], false, true);
        let frame = FluorescenceFrame {
            index: 1,
            angle: 0.5,
            time: 1.0,
            fluorescence: Array2::from_elem((3, 4), 2.0),
        };
        series.append_fluorescence(&frame, &meta()).unwrap();
        let stack = series.into_stack(vec![0.0, 0.5], vec![0.0, 1.0], meta());
        assert!(stack.field.is_none());
        let fl = stack.fluorescence.unwrap();
        assert_eq!(fl.dim(), (2, 3, 4));
        assert_eq!(fl[[0, 2, 3]], 0.0);
        assert_eq!(fl[[1, 2, 3]], 2.0);
    }

    #[test]
    fn test_borrowed_record_serialises_like_owned() {
        let image = Array2::from_shape_fn((2, 3), |(x, y)| Complex64::new(x as f64, -(y as f64)));
        let borrowed = FrameRecordRef {
            series: FIELD_SERIES,
            index: 4,
            angle: 0.25,
            time: 1.5,
            meta: RecordMeta {
                pixel_size: 1e-6,
                wavelength: Some(550e-9),
                medium_index: Some(1.335),
            },
            data: FrameDataRef::Field(&image),
        };
        let owned = FrameRecord {
            series: FIELD_SERIES.to_string(),
            index: 4,
            angle: 0.25,
            time: 1.5,
            meta: borrowed.meta,
            data: FrameData::Field(image.clone()),
        };
        assert_eq!(
            serde_json::to_value(borrowed).unwrap(),
            serde_json::to_value(&owned).unwrap()
        );
        let json = serde_json::to_string(&borrowed).unwrap();
        assert_eq!(serde_json::from_str::<FrameRecord>(&json).unwrap(), owned);
    }

    #[test]
    fn test_json_lines_appends_across_writers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sino.jsonl");
        let field = FieldFrame {
            index: 0,
            angle: 0.0,
            time: 0.0,
            field: Array2::from_elem((2, 2), Complex64::new(0.5, -0.25)),
        };
        let fluorescence = FluorescenceFrame {
            index: 0,
            angle: 0.0,
            time: 0.0,
            fluorescence: Array2::from_elem((2, 2), 3.0),
        };

        JsonLinesWriter::new(&path).append_field(&field, &meta()).unwrap();
        JsonLinesWriter::new(&path)
            .append_fluorescence(&fluorescence, &meta())
            .unwrap();

        let records = read_json_lines(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].series, FIELD_SERIES);
        assert_eq!(records[0].meta.wavelength, Some(550e-9));
        assert_eq!(records[0].data, FrameData::Field(field.field));
        assert_eq!(records[1].series, FLUORESCENCE_SERIES);
        assert_eq!(records[1].meta.medium_index, None);
        assert_eq!(records[1].data, FrameData::Fluorescence(fluorescence.fluorescence));
    }
}
