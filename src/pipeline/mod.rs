//! The triage pipeline module.
//!
//! This module provides the pipeline entry point that combines tensor
//! adaptation, both classifier stages and feature fusion, followed by file
//! routing, evaluation metrics and the prediction report.

pub mod metrics;
pub mod report;
pub mod routing;
mod stats;
pub mod triage;

pub use metrics::{ConfusionMatrix, MetricValue, MetricsReport, compute_metrics};
pub use report::{ReportPrediction, ReportRow, ReportWriter, build_rows};
pub use routing::{RelocationStatus, Router};
pub use stats::TriageStats;
pub use triage::{Evaluation, TriageOutcome, TriagePipeline};
