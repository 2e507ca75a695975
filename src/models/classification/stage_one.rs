//! Stage-one adapter: positive-class probability from an image classifier.

use crate::core::errors::ProcessingStage;
use crate::core::{
    BatchSampler, DEFAULT_POSITIVE_CLASS_INDEX, ProbabilityPredictor, Tensor1D, Tensor4D,
    TriageError, TriageResult,
};
use ndarray::{Axis, s};
use tracing::debug;

/// Wraps a [`ProbabilityPredictor`] and keeps only the positive-class column.
#[derive(Debug)]
pub struct StageOneClassifier {
    predictor: Box<dyn ProbabilityPredictor>,
    positive_class_index: usize,
    sampler: BatchSampler,
}

impl StageOneClassifier {
    /// Creates an adapter reading column [`DEFAULT_POSITIVE_CLASS_INDEX`].
    pub fn new(predictor: Box<dyn ProbabilityPredictor>) -> Self {
        Self {
            predictor,
            positive_class_index: DEFAULT_POSITIVE_CLASS_INDEX,
            sampler: BatchSampler::default(),
        }
    }

    /// Sets the column holding the positive-class probability.
    pub fn positive_class_index(mut self, index: usize) -> Self {
        self.positive_class_index = index;
        self
    }

    /// Caps the number of images per inference call.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.sampler = BatchSampler::new(batch_size);
        self
    }

    /// Name of the wrapped classifier.
    pub fn name(&self) -> &str {
        self.predictor.name()
    }

    /// Returns the positive-class probability of every image, in order.
    ///
    /// # Errors
    ///
    /// Propagates classifier failures and returns an inference error when the
    /// output has the wrong row count or too few columns.
    pub fn predict_positive_probability(&self, images: &Tensor4D) -> TriageResult<Tensor1D> {
        let total = images.len_of(Axis(0));
        let mut probabilities = Vec::with_capacity(total);

        for range in self.sampler.ranges(total) {
            let rows = range.len();
            let chunk = images.slice(s![range.clone(), .., .., ..]).to_owned();
            let output = self.predictor.predict_proba(&chunk)?;

            if output.nrows() != rows {
                return Err(self.output_error(format!(
                    "expected {} probability rows for images {:?}, got {}",
                    rows,
                    range,
                    output.nrows()
                )));
            }
            if self.positive_class_index >= output.ncols() {
                return Err(self.output_error(format!(
                    "positive class index {} out of range for {} output classes",
                    self.positive_class_index,
                    output.ncols()
                )));
            }

            probabilities.extend(output.column(self.positive_class_index).iter().copied());
            debug!(
                "Stage one '{}' scored images {:?}",
                self.predictor.name(),
                range
            );
        }

        Ok(Tensor1D::from_vec(probabilities))
    }

    fn output_error(&self, context: String) -> TriageError {
        TriageError::inference_message(self.predictor.name(), ProcessingStage::StageOne, &context)
    }
}
