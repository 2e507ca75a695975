//! Record store: materializes a [`RecordSet`] from a JSON manifest.
//!
//! The manifest is an array of entries:
//!
//! ```json
//! [
//!   { "filename": "scans/a.png", "histogram": [0.1, 0.4], "label": 1 },
//!   { "filename": "scans/b.png", "histogram": [0.2, 0.3], "pixels": [[0, 1], [2, 3]] }
//! ]
//! ```
//!
//! Entries without inline `pixels` are decoded from `filename` as 8-bit
//! grayscale. Relative filenames are resolved against the manifest's
//! directory.

use super::record::{ImageRecord, RecordSet};
use crate::core::{TriageError, TriageResult};
use crate::utils::image::load_pixels_batch_with_threshold;
use ndarray::Array2;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    filename: PathBuf,
    histogram: Vec<f32>,
    #[serde(default)]
    label: Option<i64>,
    #[serde(default)]
    pixels: Option<Vec<Vec<f32>>>,
}

/// Loads records from a JSON manifest.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    image_shape: Option<(u32, u32)>,
    parallel_threshold: Option<usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resizes decoded images to `(height, width)`.
    pub fn image_shape(mut self, shape: Option<(u32, u32)>) -> Self {
        self.image_shape = shape;
        self
    }

    /// Overrides the number of images above which decoding runs in parallel.
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = Some(threshold);
        self
    }

    /// Reads and parses the manifest at `path`.
    pub fn load(&self, path: impl AsRef<Path>) -> TriageResult<RecordSet> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TriageError::record_store(path, "failed to read manifest", e))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        self.parse(&content, base_dir)
    }

    /// Parses manifest text, resolving relative filenames against `base_dir`.
    pub fn parse(&self, content: &str, base_dir: &Path) -> TriageResult<RecordSet> {
        let entries: Vec<ManifestEntry> = serde_json::from_str(content).map_err(|e| {
            TriageError::record_store(base_dir, "manifest is not a valid record array", e)
        })?;

        let filenames: Vec<PathBuf> = entries
            .iter()
            .map(|e| {
                if e.filename.is_absolute() {
                    e.filename.clone()
                } else {
                    base_dir.join(&e.filename)
                }
            })
            .collect();

        let to_decode: Vec<&PathBuf> = entries
            .iter()
            .zip(&filenames)
            .filter(|(e, _)| e.pixels.is_none())
            .map(|(_, f)| f)
            .collect();
        debug!(
            "Parsed {} manifest entries ({} decoded from disk)",
            entries.len(),
            to_decode.len()
        );
        let mut decoded = load_pixels_batch_with_threshold(
            &to_decode,
            self.image_shape,
            self.parallel_threshold,
        )?
        .into_iter();

        let mut records = Vec::with_capacity(entries.len());
        for (index, (entry, filename)) in entries.into_iter().zip(filenames).enumerate() {
            let pixels = match entry.pixels {
                Some(rows) => rows_to_array(rows, index)?,
                None => decoded.next().ok_or_else(|| {
                    TriageError::invalid_input(format!("no decoded image for record {index}"))
                })?,
            };
            records.push(ImageRecord {
                pixels,
                filename,
                histogram: entry.histogram,
                label: entry.label,
            });
        }

        Ok(RecordSet::new(records))
    }
}

fn rows_to_array(rows: Vec<Vec<f32>>, index: usize) -> TriageResult<Array2<f32>> {
    let height = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|r| r.len() != width) {
        return Err(TriageError::shape_mismatch(
            "pixels row",
            index,
            &[width],
            &[bad.len()],
        ));
    }
    let data: Vec<f32> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((height, width), data).map_err(TriageError::Tensor)
}
