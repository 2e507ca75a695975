//! Image records and the ordered collection the pipeline consumes.

use ndarray::Array2;
use std::path::PathBuf;

/// One captured image together with its precomputed descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Single-channel pixel intensities, `[height, width]`.
    pub pixels: Array2<f32>,
    /// Path of the source file; relocation moves this file.
    pub filename: PathBuf,
    /// Handcrafted histogram descriptor.
    pub histogram: Vec<f32>,
    /// Ground-truth class, when known.
    pub label: Option<i64>,
}

impl ImageRecord {
    /// Creates an unlabeled record.
    pub fn new(pixels: Array2<f32>, filename: impl Into<PathBuf>, histogram: Vec<f32>) -> Self {
        Self {
            pixels,
            filename: filename.into(),
            histogram,
            label: None,
        }
    }

    /// Attaches a ground-truth label.
    pub fn with_label(mut self, label: i64) -> Self {
        self.label = Some(label);
        self
    }

    /// Returns the pixel dimensions as `(height, width)`.
    pub fn pixel_shape(&self) -> (usize, usize) {
        self.pixels.dim()
    }
}

/// An ordered, read-only collection of [`ImageRecord`]s.
///
/// Order is significant: the i-th prediction and the i-th report row belong
/// to the i-th record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<ImageRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<ImageRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageRecord> {
        self.records.iter()
    }
}

impl From<Vec<ImageRecord>> for RecordSet {
    fn from(records: Vec<ImageRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<ImageRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = ImageRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a ImageRecord;
    type IntoIter = std::slice::Iter<'a, ImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
