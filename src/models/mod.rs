//! Model adapters for the triage pipeline.
//!
//! Adapters wrap a trained classifier behind the narrow predictor traits and
//! handle batching and output validation; the ONNX backends run the models
//! directly on ONNX Runtime.

pub mod classification;

pub use classification::*;
