//! Stage-two adapter: discrete labels from the ensemble classifier.

use crate::core::errors::ProcessingStage;
use crate::core::{BatchSampler, LabelPredictor, Tensor2D, TriageError, TriageResult};
use ndarray::s;
use tracing::debug;

/// Wraps a [`LabelPredictor`] fed with fused feature rows.
#[derive(Debug)]
pub struct StageTwoClassifier {
    predictor: Box<dyn LabelPredictor>,
    sampler: BatchSampler,
}

impl StageTwoClassifier {
    pub fn new(predictor: Box<dyn LabelPredictor>) -> Self {
        Self {
            predictor,
            sampler: BatchSampler::default(),
        }
    }

    /// Caps the number of rows per inference call.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.sampler = BatchSampler::new(batch_size);
        self
    }

    /// Name of the wrapped classifier.
    pub fn name(&self) -> &str {
        self.predictor.name()
    }

    /// Returns one label per fused row, in row order.
    ///
    /// # Errors
    ///
    /// Returns an inference error when the feature width disagrees with the
    /// width the model declares, or when the classifier returns the wrong
    /// number of labels. Classifier failures propagate unchanged.
    pub fn predict_labels(&self, fused: &Tensor2D) -> TriageResult<Vec<i64>> {
        if let Some(expected) = self.predictor.expected_features()
            && expected != fused.ncols()
        {
            return Err(self.output_error(format!(
                "model expects {} features per row, fused matrix has {}",
                expected,
                fused.ncols()
            )));
        }

        let mut labels = Vec::with_capacity(fused.nrows());
        for range in self.sampler.ranges(fused.nrows()) {
            let rows = range.len();
            let chunk = fused.slice(s![range.clone(), ..]).to_owned();
            let predicted = self.predictor.predict(&chunk)?;
            if predicted.len() != rows {
                return Err(self.output_error(format!(
                    "expected {} labels for rows {:?}, got {}",
                    rows,
                    range,
                    predicted.len()
                )));
            }
            labels.extend(predicted);
            debug!(
                "Stage two '{}' labeled rows {:?}",
                self.predictor.name(),
                range
            );
        }
        Ok(labels)
    }

    fn output_error(&self, context: String) -> TriageError {
        TriageError::inference_message(self.predictor.name(), ProcessingStage::StageTwo, &context)
    }
}
