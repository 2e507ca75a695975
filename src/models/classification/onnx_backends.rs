//! ONNX Runtime classifier backends.
//!
//! - [`OnnxImageClassifier`]: a CNN exported to ONNX, `[N,1,H,W]` f32 in,
//!   `[N,C]` probabilities (or logits) out.
//! - [`OnnxEnsembleClassifier`]: a tree ensemble exported with skl2onnx,
//!   `[N,F]` f32 in, int64 labels out.

use crate::core::config::{ConfigValidator, ModelConfig};
use crate::core::errors::ProcessingStage;
use crate::core::inference::OrtInfer;
use crate::core::{LabelPredictor, ProbabilityPredictor, Tensor2D, Tensor4D, TriageResult};

/// Probabilistic image classifier backed by an ONNX session.
#[derive(Debug)]
pub struct OnnxImageClassifier {
    /// ONNX Runtime inference engine
    inference: OrtInfer,
    /// Apply a row-wise softmax to the raw output
    apply_softmax: bool,
}

impl OnnxImageClassifier {
    pub fn new(inference: OrtInfer, apply_softmax: bool) -> Self {
        Self {
            inference,
            apply_softmax,
        }
    }

    /// Validates `config` and loads the model it names.
    pub fn from_config(config: &ModelConfig) -> TriageResult<Self> {
        config.validate()?;
        let inference = OrtInfer::from_config(config)?;
        Ok(Self::new(inference, config.apply_softmax))
    }
}

impl ProbabilityPredictor for OnnxImageClassifier {
    fn predict_proba(&self, images: &Tensor4D) -> TriageResult<Tensor2D> {
        let mut output = self.inference.infer_2d(images, ProcessingStage::StageOne)?;
        if self.apply_softmax {
            softmax_rows(&mut output);
        }
        Ok(output)
    }

    fn name(&self) -> &str {
        self.inference.model_name()
    }
}

/// Discrete-label ensemble classifier backed by an ONNX session.
#[derive(Debug)]
pub struct OnnxEnsembleClassifier {
    /// ONNX Runtime inference engine
    inference: OrtInfer,
}

impl OnnxEnsembleClassifier {
    pub fn new(inference: OrtInfer) -> Self {
        Self { inference }
    }

    /// Validates `config` and loads the model it names.
    pub fn from_config(config: &ModelConfig) -> TriageResult<Self> {
        config.validate()?;
        Ok(Self::new(OrtInfer::from_config(config)?))
    }
}

impl LabelPredictor for OnnxEnsembleClassifier {
    fn predict(&self, features: &Tensor2D) -> TriageResult<Vec<i64>> {
        self.inference
            .infer_labels(features, ProcessingStage::StageTwo)
    }

    fn name(&self) -> &str {
        self.inference.model_name()
    }

    fn expected_features(&self) -> Option<usize> {
        let shape = self.inference.primary_input_shape()?;
        match shape.as_slice() {
            [_, width] if *width > 0 => usize::try_from(*width).ok(),
            _ => None,
        }
    }
}

/// Numerically stable softmax over each row, in place.
///
/// Non-finite logits contribute zero mass; a row with no finite logit becomes
/// all zeros.
pub fn softmax_rows(logits: &mut Tensor2D) {
    for mut row in logits.rows_mut() {
        let max = row
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f32::NEG_INFINITY, f32::max);
        let mut sum = 0.0f32;
        row.mapv_inplace(|v| {
            let exp = if v.is_finite() { (v - max).exp() } else { 0.0 };
            sum += exp;
            exp
        });
        if sum == 0.0 {
            row.fill(0.0);
        } else {
            row.mapv_inplace(|v| v / sum);
        }
    }
}
