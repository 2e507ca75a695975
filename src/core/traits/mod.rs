//! Traits at the seams between the pipeline and its classifier backends.
//!
//! The pipeline depends only on these two narrow capabilities, never on a
//! concrete model implementation:
//!
//! ```text
//! ┌──────────────────────┐              ┌──────────────────┐
//! │ ProbabilityPredictor │  [N,1,H,W] → │ [N,C] class probs│
//! └──────────────────────┘              └──────────────────┘
//! ┌──────────────────────┐              ┌──────────────────┐
//! │ LabelPredictor       │  [N,F]     → │ [N] labels       │
//! └──────────────────────┘              └──────────────────┘
//! ```
//!
//! ONNX Runtime backends live in [`crate::models::classification`]; tests use
//! small in-memory implementations.

use crate::core::{Tensor2D, Tensor4D, TriageError};
use std::fmt::Debug;

/// A trained probabilistic image classifier.
pub trait ProbabilityPredictor: Send + Sync + Debug {
    /// Maps an `[N, 1, H, W]` image tensor to `[N, C]` class probabilities.
    fn predict_proba(&self, images: &Tensor4D) -> Result<Tensor2D, TriageError>;

    /// Name used in logs and error messages.
    fn name(&self) -> &str {
        "probability predictor"
    }
}

/// A trained classifier emitting one discrete label per feature row.
pub trait LabelPredictor: Send + Sync + Debug {
    /// Maps an `[N, F]` feature matrix to `N` labels, in row order.
    fn predict(&self, features: &Tensor2D) -> Result<Vec<i64>, TriageError>;

    /// Name used in logs and error messages.
    fn name(&self) -> &str {
        "label predictor"
    }

    /// Number of feature columns the model was trained on, if known.
    fn expected_features(&self) -> Option<usize> {
        None
    }
}
