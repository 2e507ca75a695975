//! The core module of the triage pipeline.
//!
//! This module contains the fundamental components shared by every stage:
//! - Batch processing utilities and tensor aliases
//! - Configuration management
//! - Constants used throughout the pipeline
//! - Error handling
//! - ONNX Runtime inference engine integration
//! - Traits defining the two classifier capabilities
//!
//! It also provides re-exports of commonly used types and functions for convenience.

pub mod batch;
pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;
pub mod traits;
pub mod validation;

pub use batch::{BatchSampler, Tensor1D, Tensor2D, Tensor4D};
pub use config::{
    ConfigError, ConfigValidator, ConfigValidatorExt, ModelConfig, OrtSessionConfig,
    RoutingConfig, TriageConfig,
};
pub use constants::*;
pub use errors::{ProcessingStage, TriageError, TriageResult};
pub use inference::OrtInfer;
pub use traits::{LabelPredictor, ProbabilityPredictor};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
/// `RUST_LOG` overrides the default `info` level. Log lines go to stderr so
/// that stdout can carry the CSV report.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let directives = std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::registry()
        .with(env_filter(&directives))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Builds the log filter, falling back to `info` for targets `directives` leaves unset.
fn env_filter(directives: &str) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::filter::LevelFilter;

    tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}
