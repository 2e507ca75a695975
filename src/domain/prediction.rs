//! Per-record classification result.

use std::path::{Path, PathBuf};

/// The final stage-two label assigned to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    /// Source file of the record.
    pub filename: PathBuf,
    /// Label emitted by the ensemble classifier.
    pub label: i64,
}

impl PredictionResult {
    pub fn new(filename: impl Into<PathBuf>, label: i64) -> Self {
        Self {
            filename: filename.into(),
            label,
        }
    }

    pub fn path(&self) -> &Path {
        &self.filename
    }

    /// Returns true when the label equals `positive_label`.
    pub fn is_positive(&self, positive_label: i64) -> bool {
        self.label == positive_label
    }
}
