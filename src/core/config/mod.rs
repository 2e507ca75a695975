//! Configuration management for the triage pipeline.
//!
//! This module provides configuration types, validation traits, and utilities
//! for describing a triage run and the two classifiers it uses.

pub mod builder;
pub mod errors;
pub mod onnx;
pub mod triage;

pub use builder::ModelConfig;
pub use errors::{ConfigError, ConfigValidator, ConfigValidatorExt};
pub use onnx::{OrtGraphOptimizationLevel, OrtSessionConfig};
pub use triage::{RoutingConfig, TriageConfig};
