//! ONNX Runtime inference engine.

pub mod ort_infer;

pub use ort_infer::OrtInfer;
