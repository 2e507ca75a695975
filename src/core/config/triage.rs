//! Top-level configuration of a triage run.

use super::builder::ModelConfig;
use super::errors::{ConfigError, ConfigValidator};
use crate::core::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_POSITIVE_CLASS_INDEX, MAX_BATCH_SIZE, NEGATIVE_LABEL,
    POSITIVE_LABEL,
};
use crate::core::errors::{TriageError, TriageResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where and how positively classified files are relocated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Directory receiving positively classified files.
    pub destination_dir: PathBuf,
    /// Stage-two label that triggers relocation and counts as positive in
    /// the metrics. Must be one of the two binary classes.
    pub positive_label: i64,
    /// Compute routing decisions without touching the filesystem.
    pub dry_run: bool,
    /// Create `destination_dir` if it does not exist.
    pub create_destination: bool,
}

impl RoutingConfig {
    /// Creates a routing configuration for the given destination.
    pub fn new(destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            destination_dir: destination_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the label that triggers relocation.
    pub fn positive_label(mut self, label: i64) -> Self {
        self.positive_label = label;
        self
    }

    /// Enables or disables dry-run mode.
    pub fn dry_run(mut self, enable: bool) -> Self {
        self.dry_run = enable;
        self
    }

    /// Controls whether a missing destination directory is created.
    pub fn create_destination(mut self, enable: bool) -> Self {
        self.create_destination = enable;
        self
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            destination_dir: PathBuf::from("positive"),
            positive_label: POSITIVE_LABEL,
            dry_run: false,
            create_destination: true,
        }
    }
}

impl ConfigValidator for RoutingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.destination_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "routing.destination_dir must not be empty".to_string(),
            });
        }
        if self.positive_label != NEGATIVE_LABEL && self.positive_label != POSITIVE_LABEL {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "routing.positive_label must be {} or {}, got {}",
                    NEGATIVE_LABEL, POSITIVE_LABEL, self.positive_label
                ),
            });
        }
        if self.destination_dir.exists() && !self.destination_dir.is_dir() {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "routing.destination_dir is not a directory: {}",
                    self.destination_dir.display()
                ),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Configuration of a complete triage run.
///
/// The pipeline itself reads `routing`, `evaluate`, `batch_size` and
/// `positive_class_index`; the remaining fields are consumed by whoever
/// assembles the run (record loading, model construction, report output).
///
/// # Example
///
/// ```rust
/// use derm_triage::core::config::TriageConfig;
///
/// let config: TriageConfig = serde_json::from_str(r#"
/// {
///   "records_path": "records/batch_01.json",
///   "stage_one": { "model_path": "models/cnn.onnx", "apply_softmax": true },
///   "stage_two": { "model_path": "models/forest.onnx" },
///   "routing": { "destination_dir": "dermoscopic" },
///   "report_path": "results/batch_01.csv",
///   "evaluate": true
/// }
/// "#).unwrap();
///
/// assert_eq!(config.batch_size, 32);
/// assert_eq!(config.positive_class_index, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Path of the JSON record manifest.
    pub records_path: Option<PathBuf>,
    /// Stage-one image classifier.
    pub stage_one: ModelConfig,
    /// Stage-two ensemble classifier.
    pub stage_two: ModelConfig,
    /// Relocation of positive files.
    pub routing: RoutingConfig,
    /// Where the CSV prediction report is written.
    pub report_path: Option<PathBuf>,
    /// Compute confusion-matrix metrics against ground-truth labels.
    pub evaluate: bool,
    /// Maximum number of rows per inference call.
    pub batch_size: usize,
    /// Column of the stage-one output holding the positive-class probability.
    pub positive_class_index: usize,
    /// `(height, width)` that images decoded from disk are resized to.
    pub image_shape: Option<(u32, u32)>,
}

impl TriageConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> TriageResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TriageError::ConfigError {
            message: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| TriageError::ConfigError {
            message: format!("failed to parse config file '{}': {}", path.display(), e),
        })
    }

    /// Sets the routing configuration.
    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }

    /// Enables or disables evaluation against ground truth.
    pub fn evaluate(mut self, enable: bool) -> Self {
        self.evaluate = enable;
        self
    }

    /// Sets the per-call batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the positive-class column of the stage-one output.
    pub fn positive_class_index(mut self, index: usize) -> Self {
        self.positive_class_index = index;
        self
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            records_path: None,
            stage_one: ModelConfig::new(),
            stage_two: ModelConfig::new(),
            routing: RoutingConfig::default(),
            report_path: None,
            evaluate: false,
            batch_size: DEFAULT_BATCH_SIZE,
            positive_class_index: DEFAULT_POSITIVE_CLASS_INDEX,
            image_shape: None,
        }
    }
}

impl ConfigValidator for TriageConfig {
    /// Validates the run-level settings.
    ///
    /// Model paths are not checked here; they are validated when the ONNX
    /// backends are constructed, so the pipeline can run with other backends.
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_batch_size_with_limits(self.batch_size, MAX_BATCH_SIZE)?;
        if let Some((height, width)) = self.image_shape {
            self.validate_image_dimensions(width, height)?;
        }
        self.routing.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TriageConfig::get_defaults();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.positive_class_index, 1);
        assert_eq!(config.routing.positive_label, 1);
        assert!(!config.evaluate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = TriageConfig::new().batch_size(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBatchSize)
        ));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "stage_one": { "model_path": "cnn.onnx", "apply_softmax": true },
                "routing": { "destination_dir": "out", "dry_run": true },
                "evaluate": true,
                "batch_size": 8,
                "image_shape": [128, 96]
            }"#,
        )
        .unwrap();

        let config = TriageConfig::from_file(&path).unwrap();
        assert!(config.stage_one.apply_softmax);
        assert_eq!(config.routing.destination_dir, PathBuf::from("out"));
        assert!(config.routing.dry_run);
        assert!(config.routing.create_destination);
        assert!(config.evaluate);
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.image_shape, Some((128, 96)));
    }

    #[test]
    fn test_from_file_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            TriageConfig::from_file(&path),
            Err(TriageError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_positive_label_must_be_binary() {
        let routing = RoutingConfig::new("out").positive_label(2);
        let err = routing.validate().unwrap_err();
        assert!(err.to_string().contains("positive_label"));
        assert!(RoutingConfig::new("out").positive_label(0).validate().is_ok());
    }

    #[test]
    fn test_destination_must_be_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let routing = RoutingConfig::new(file.path());
        assert!(routing.validate().is_err());
    }
}
