//! Core ONNX Runtime inference engine with support for pooling and configurable sessions.

use crate::core::errors::{ProcessingStage, TriageError};
use ort::{session::Session, value::ValueType};
use std::sync::Mutex;

#[path = "ort_infer_builders.rs"]
mod ort_infer_builders;
#[path = "ort_infer_execution.rs"]
mod ort_infer_execution;

pub struct OrtInfer {
    pub(super) sessions: Vec<Mutex<Session>>,
    pub(super) next_idx: std::sync::atomic::AtomicUsize,
    pub(super) input_name: String,
    pub(super) output_name: Option<String>,
    pub(super) model_path: std::path::PathBuf,
    pub(super) model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Attempts to retrieve the primary input tensor shape from the first session.
    ///
    /// Returns a vector of dimensions if available. Dynamic dimensions (e.g., -1) are returned as-is.
    pub fn primary_input_shape(&self) -> Option<Vec<i64>> {
        let session_mutex = self.sessions.first()?;
        let session_guard = session_mutex.lock().ok()?;
        let input = session_guard.inputs.first()?;
        match &input.input_type {
            ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
            _ => None,
        }
    }

    /// Reports a poisoned session lock against the stage being served.
    pub(super) fn lock_error(&self, idx: usize, stage: ProcessingStage) -> TriageError {
        TriageError::inference_message(
            &self.model_name,
            stage,
            &format!(
                "failed to acquire session lock {}/{}",
                idx,
                self.sessions.len()
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ModelConfig, OrtSessionConfig};

    #[test]
    fn test_lock_error_names_stage() {
        let infer = OrtInfer {
            sessions: Vec::new(),
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name: "x".to_string(),
            output_name: None,
            model_path: std::path::PathBuf::from("rf.onnx"),
            model_name: "rf".to_string(),
        };
        let err = infer.lock_error(0, ProcessingStage::StageTwo);
        assert_eq!(err.stage(), Some(ProcessingStage::StageTwo));
        assert!(err.to_string().contains("'rf'"));
    }

    #[test]
    fn test_new_with_missing_model_fails() {
        let result = OrtInfer::new("dummy_path.onnx", None);
        assert!(matches!(result, Err(TriageError::ModelLoad { .. })));
    }

    #[test]
    fn test_from_config_respects_session_pool_size() {
        let config = ModelConfig::new()
            .model_path("dummy_path.onnx")
            .session_pool_size(3)
            .ort_session(OrtSessionConfig::new().with_intra_threads(1));
        let result = OrtInfer::from_config(&config);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config_requires_model_path() {
        let result = OrtInfer::from_config(&ModelConfig::new());
        assert!(matches!(result, Err(TriageError::ConfigError { .. })));
    }
}
