//! Per-model configuration shared by both classifier stages.

use super::errors::{ConfigError, ConfigValidator};
use super::onnx::OrtSessionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one ONNX classifier.
///
/// Both the stage-one image classifier and the stage-two ensemble are
/// described by this struct; only `apply_softmax` is specific to stage one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// The path to the ONNX model file.
    pub model_path: Option<PathBuf>,
    /// The name used in logs and errors (defaults to the file stem).
    pub model_name: Option<String>,
    /// Name of the input tensor (defaults to the model's first input).
    pub input_name: Option<String>,
    /// Name of the output tensor to read (defaults to the model's first output).
    pub output_name: Option<String>,
    /// Apply a row-wise softmax to the raw output (for models exporting logits).
    pub apply_softmax: bool,
    /// ONNX Runtime session configuration for this model.
    pub ort_session: Option<OrtSessionConfig>,
    /// Size of the session pool (>=1). If None, a single session is used.
    pub session_pool_size: Option<usize>,
}

impl ModelConfig {
    /// Creates a new ModelConfig with default values.
    pub fn new() -> Self {
        Self {
            model_path: None,
            model_name: None,
            input_name: None,
            output_name: None,
            apply_softmax: false,
            ort_session: None,
            session_pool_size: Some(1),
        }
    }

    /// Sets the model path.
    pub fn model_path(mut self, model_path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(model_path.into());
        self
    }

    /// Sets the model name.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    /// Sets the input tensor name.
    pub fn input_name(mut self, input_name: impl Into<String>) -> Self {
        self.input_name = Some(input_name.into());
        self
    }

    /// Sets the output tensor name.
    pub fn output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = Some(output_name.into());
        self
    }

    /// Enables or disables the softmax over the raw output.
    pub fn apply_softmax(mut self, enable: bool) -> Self {
        self.apply_softmax = enable;
        self
    }

    /// Sets the ORT session configuration.
    pub fn ort_session(mut self, cfg: OrtSessionConfig) -> Self {
        self.ort_session = Some(cfg);
        self
    }

    /// Sets the session pool size (>=1).
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.session_pool_size = Some(size);
        self
    }

    /// Merges another configuration into this one.
    ///
    /// Values present in `other` override the values in `self`.
    pub fn merge_with(mut self, other: &ModelConfig) -> Self {
        if other.model_path.is_some() {
            self.model_path = other.model_path.clone();
        }
        if other.model_name.is_some() {
            self.model_name = other.model_name.clone();
        }
        if other.input_name.is_some() {
            self.input_name = other.input_name.clone();
        }
        if other.output_name.is_some() {
            self.output_name = other.output_name.clone();
        }
        if other.apply_softmax {
            self.apply_softmax = true;
        }
        if other.ort_session.is_some() {
            self.ort_session = other.ort_session.clone();
        }
        if other.session_pool_size.is_some() {
            self.session_pool_size = other.session_pool_size;
        }
        self
    }

    /// Gets the effective session pool size.
    pub fn get_session_pool_size(&self) -> usize {
        self.session_pool_size.unwrap_or(1).max(1)
    }
}

impl ConfigValidator for ModelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match &self.model_path {
            Some(model_path) => self.validate_model_path(model_path)?,
            None => {
                return Err(ConfigError::InvalidConfig {
                    message: "model_path is required".to_string(),
                });
            }
        }

        if let Some(pool) = self.session_pool_size {
            self.validate_positive_usize(pool, "session_pool_size")?;
        }

        if let Some(ort) = &self.ort_session {
            ort.validate()?;
        }

        Ok(())
    }

    fn get_defaults() -> Self {
        Self::new()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new()
    }
}
