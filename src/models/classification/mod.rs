//! Classifier adapters.
//!
//! This module contains the two stage adapters, which depend only on the
//! predictor traits, and the ONNX Runtime backends implementing those traits.

pub mod onnx_backends;
pub mod stage_one;
pub mod stage_two;

pub use onnx_backends::{OnnxEnsembleClassifier, OnnxImageClassifier, softmax_rows};
pub use stage_one::StageOneClassifier;
pub use stage_two::StageTwoClassifier;
