use super::*;
use crate::core::config::{ModelConfig, OrtSessionConfig};
use ort::logging::LogLevel;
use ort::session::builder::SessionBuilder;
use std::path::Path;
use tracing::debug;

impl OrtInfer {
    /// Creates a new OrtInfer instance with default ONNX Runtime settings and a single session.
    ///
    /// When `input_name` is `None` the model's first declared input is used.
    pub fn new(
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
    ) -> Result<Self, TriageError> {
        let path = model_path.as_ref();
        Self::ensure_model_file(path)?;
        let builder = Session::builder()?.with_log_level(LogLevel::Error)?;
        let session = Self::commit_session(builder, path)?;
        let input_name = Self::resolve_input_name(&session, input_name, path)?;

        Ok(OrtInfer {
            sessions: vec![Mutex::new(session)],
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name,
            output_name: None,
            model_path: path.to_path_buf(),
            model_name: Self::default_model_name(path),
        })
    }

    /// Creates a new OrtInfer instance from a [`ModelConfig`], applying the ORT
    /// session configuration and constructing a session pool.
    pub fn from_config(config: &ModelConfig) -> Result<Self, TriageError> {
        let path = config
            .model_path
            .as_deref()
            .ok_or_else(|| TriageError::config_error("model_path is required"))?;
        Self::ensure_model_file(path)?;
        let pool_size = config.get_session_pool_size();

        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let builder = Session::builder()?;
            let builder = match &config.ort_session {
                Some(cfg) => Self::apply_ort_config(builder, cfg)?,
                None => builder.with_log_level(LogLevel::Error)?,
            };
            sessions.push(Mutex::new(Self::commit_session(builder, path)?));
        }

        let input_name = {
            let first = sessions[0].lock().map_err(|_| {
                TriageError::config_error("session lock poisoned during construction")
            })?;
            Self::resolve_input_name(&first, config.input_name.as_deref(), path)?
        };

        let model_name = config
            .model_name
            .clone()
            .unwrap_or_else(|| Self::default_model_name(path));

        debug!(
            "Loaded model '{}' from {} ({} session(s), input '{}')",
            model_name,
            path.display(),
            pool_size,
            input_name
        );

        Ok(OrtInfer {
            sessions,
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name,
            output_name: config.output_name.clone(),
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    fn ensure_model_file(path: &Path) -> Result<(), TriageError> {
        if path.is_file() {
            Ok(())
        } else {
            Err(TriageError::model_load_error(
                path,
                "model file not found",
                Some("verify the model path"),
                None::<std::io::Error>,
            ))
        }
    }

    fn commit_session(builder: SessionBuilder, path: &Path) -> Result<Session, TriageError> {
        builder.commit_from_file(path).map_err(|e| {
            TriageError::model_load_error(
                path,
                "failed to create ONNX session",
                Some("verify the model file is a valid ONNX export"),
                Some(e),
            )
        })
    }

    fn resolve_input_name(
        session: &Session,
        requested: Option<&str>,
        path: &Path,
    ) -> Result<String, TriageError> {
        if let Some(name) = requested {
            return Ok(name.to_string());
        }
        session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                TriageError::model_load_error(
                    path,
                    "model declares no inputs",
                    None,
                    None::<std::io::Error>,
                )
            })
    }

    fn default_model_name(path: &Path) -> String {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string()
    }

    fn apply_ort_config(
        mut builder: SessionBuilder,
        cfg: &OrtSessionConfig,
    ) -> Result<SessionBuilder, ort::Error> {
        builder = builder.with_log_level(LogLevel::Error)?;
        if let Some(intra) = cfg.intra_threads {
            builder = builder.with_intra_threads(intra)?;
        }
        if let Some(inter) = cfg.inter_threads {
            builder = builder.with_inter_threads(inter)?;
        }
        if let Some(level) = cfg.optimization_level {
            builder = builder.with_optimization_level(level.into())?;
        }
        Ok(builder)
    }
}
