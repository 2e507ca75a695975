//! # derm-triage
//!
//! Two-stage batch image triage. A probabilistic image classifier scores each
//! record, its positive-class probability is fused with the record's histogram
//! descriptor, and an ensemble classifier makes the final binary decision.
//! Positive files are relocated to a destination directory and, when ground
//! truth is available, confusion-matrix diagnostics are reported.
//!
//! ## Features
//!
//! - Order-preserving tensor adaptation with fail-fast shape validation
//! - Feature fusion in the fixed `[probability, histogram...]` column order
//! - Classifier backends behind two narrow traits, with ONNX Runtime
//!   implementations for a CNN and a tree ensemble
//! - Idempotent, non-transactional file routing with per-file statuses
//! - Accuracy, sensitivity, specificity, PPV and NPV with explicit
//!   undefined values
//!
//! ## Modules
//!
//! * [`core`] - Errors, configuration, traits, batching and the ONNX inference engine
//! * [`domain`] - Image records, predictions and the JSON record store
//! * [`models`] - Stage adapters and ONNX classifier backends
//! * [`pipeline`] - The triage pipeline, routing, metrics and reporting
//! * [`processors`] - Tensor adaptation and feature fusion
//! * [`utils`] - Image decoding helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use derm_triage::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TriageConfig::from_file("triage.json")?;
//! let stage_one = OnnxImageClassifier::from_config(&config.stage_one)?;
//! let stage_two = OnnxEnsembleClassifier::from_config(&config.stage_two)?;
//! let records = RecordStore::new().load("records.json")?;
//!
//! let pipeline = TriagePipeline::new(config, Box::new(stage_one), Box::new(stage_two))?;
//! let outcome = pipeline.run(&records)?;
//! ReportWriter.write_file("results.csv".as_ref(), &outcome.report_rows())?;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod core;
pub mod domain;
pub mod models;

pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use derm_triage::prelude::*;
/// ```
///
/// Included items focus on running a triage batch:
/// - Pipeline and outcome (`TriagePipeline`, `TriageOutcome`, `Evaluation`)
/// - Configuration (`TriageConfig`, `ModelConfig`, `RoutingConfig`)
/// - Records (`ImageRecord`, `RecordSet`, `RecordStore`)
/// - ONNX backends and the predictor traits
/// - Essential error and result types (`TriageError`, `TriageResult`)
///
/// For lower-level pieces (fusion, tensor adaptation, validation), import
/// directly from the respective modules.
pub mod prelude {
    pub use crate::core::config::{ModelConfig, RoutingConfig, TriageConfig};
    pub use crate::core::{LabelPredictor, ProbabilityPredictor, TriageError, TriageResult};
    pub use crate::domain::{ImageRecord, PredictionResult, RecordSet, RecordStore};
    pub use crate::models::{OnnxEnsembleClassifier, OnnxImageClassifier};
    pub use crate::pipeline::{
        Evaluation, MetricsReport, RelocationStatus, ReportWriter, TriageOutcome, TriagePipeline,
    };
}
