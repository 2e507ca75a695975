//! Error types for the triage pipeline.
//!
//! This module defines the errors that can occur while adapting records into
//! tensors, running either classifier, and loading inputs or configuration.
//! Per-file relocation problems are not errors at this level: they are
//! recorded as a [`RelocationStatus`](crate::pipeline::RelocationStatus) and
//! the batch continues.
//!
//! # Usage
//!
//! ```rust
//! use derm_triage::core::errors::{ProcessingStage, TriageError};
//!
//! let error = TriageError::shape_mismatch("pixels", 2, &[64, 64], &[32, 64]);
//! assert!(error.to_string().contains("record 2"));
//!
//! let config_error = TriageError::config_error("missing stage-one model path");
//! assert!(matches!(config_error, TriageError::ConfigError { .. }));
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Convenient result alias for triage operations.
pub type TriageResult<T> = Result<T, TriageError>;

/// Stage of the pipeline in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Conversion of records into image tensors and histogram matrices.
    TensorAdaptation,
    /// First-stage probabilistic image classification.
    StageOne,
    /// Concatenation of the probability column with the histogram matrix.
    Fusion,
    /// Second-stage ensemble classification.
    StageTwo,
    /// Confusion matrix and derived metrics.
    Metrics,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorAdaptation => write!(f, "tensor adaptation"),
            ProcessingStage::StageOne => write!(f, "stage-one inference"),
            ProcessingStage::Fusion => write!(f, "feature fusion"),
            ProcessingStage::StageTwo => write!(f, "stage-two inference"),
            ProcessingStage::Metrics => write!(f, "metrics"),
        }
    }
}

/// A plain message usable as an error source.
#[derive(Debug, Clone)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SimpleError {}

/// Errors that can occur in the triage pipeline.
#[derive(Error, Debug)]
pub enum TriageError {
    /// Records disagree on pixel dimensions or histogram length.
    #[error(
        "shape mismatch in {field} of record {index}: expected {expected:?}, got {actual:?}"
    )]
    ShapeMismatch {
        /// The record field (or derived structure) whose shape disagreed.
        field: String,
        /// Index of the first offending record.
        index: usize,
        /// Shape established by the first record.
        expected: Vec<usize>,
        /// Shape found at `index`.
        actual: Vec<usize>,
    },

    /// The probability column and the histogram matrix disagree on row count.
    #[error(
        "feature fusion: {probabilities} stage-one probabilities for {histograms} histogram rows"
    )]
    FusionMismatch {
        /// Number of stage-one probabilities.
        probabilities: usize,
        /// Number of histogram rows.
        histograms: usize,
    },

    /// Evaluation was requested but some records carry no ground truth.
    #[error("missing labels: {missing} of {total} records have no label (first at index {first_index})")]
    MissingLabels {
        /// Number of records without a label.
        missing: usize,
        /// Total number of records.
        total: usize,
        /// Index of the first record without a label.
        first_index: usize,
    },

    /// A classifier rejected its input or failed while running.
    #[error("{stage} failed for model '{model_name}': {context}")]
    Inference {
        /// Name of the model that failed.
        model_name: String,
        /// Stage the model was serving.
        stage: ProcessingStage,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A model could not be loaded.
    #[error("failed to load model '{}': {context}{suggestion}", path.display())]
    ModelLoad {
        /// Path of the model file.
        path: PathBuf,
        /// What went wrong.
        context: String,
        /// A hint for fixing the problem, empty when there is none.
        suggestion: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The record store could not be read or parsed.
    #[error("record store '{}': {context}", path.display())]
    RecordStore {
        /// Path of the record manifest.
        path: PathBuf,
        /// What went wrong.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// An image file could not be opened or decoded.
    #[error("failed to decode image '{}'", path.display())]
    ImageLoad {
        /// Path of the image file.
        path: PathBuf,
        /// The underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl TriageError {
    /// Creates a shape mismatch error for record `index`.
    pub fn shape_mismatch(
        field: impl Into<String>,
        index: usize,
        expected: &[usize],
        actual: &[usize],
    ) -> Self {
        Self::ShapeMismatch {
            field: field.into(),
            index,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Creates an inference error for the given model and stage.
    pub fn inference_error(
        model_name: &str,
        stage: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            stage,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an inference error that has no underlying error value.
    pub fn inference_message(model_name: &str, stage: ProcessingStage, context: &str) -> Self {
        Self::inference_error(model_name, stage, context, SimpleError::new(context))
    }

    /// Creates a model loading error.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the model file.
    /// * `context` - What went wrong.
    /// * `suggestion` - An optional hint for the user.
    /// * `error` - The underlying error, if any.
    pub fn model_load_error(
        path: &Path,
        context: &str,
        suggestion: Option<&str>,
        error: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        let suggestion = suggestion
            .map(|s| format!("; suggested fix: {}", s))
            .unwrap_or_default();
        Self::ModelLoad {
            path: path.to_path_buf(),
            context: context.to_string(),
            suggestion,
            source: error.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Creates a record store error.
    pub fn record_store(
        path: &Path,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::RecordStore {
            path: path.to_path_buf(),
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an error for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an error for configuration problems.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Returns the pipeline stage this error belongs to, when it has one.
    pub fn stage(&self) -> Option<ProcessingStage> {
        match self {
            Self::ShapeMismatch { .. } => Some(ProcessingStage::TensorAdaptation),
            Self::FusionMismatch { .. } => Some(ProcessingStage::Fusion),
            Self::MissingLabels { .. } => Some(ProcessingStage::Metrics),
            Self::Inference { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<crate::core::config::ConfigError> for TriageError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}
