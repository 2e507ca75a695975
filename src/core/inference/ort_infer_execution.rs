use super::*;
use crate::core::errors::{ProcessingStage, SimpleError};
use crate::core::{Tensor2D, Tensor4D};
use ndarray::ArrayView2;
use ort::value::TensorRef;

impl OrtInfer {
    /// Returns the configured or discovered output tensor name.
    fn get_output_name(&self, stage: ProcessingStage) -> Result<String, TriageError> {
        if let Some(ref name) = self.output_name {
            Ok(name.clone())
        } else {
            let session = self.sessions[0]
                .lock()
                .map_err(|_| self.lock_error(0, stage))?;
            if let Some(output) = session.outputs.first() {
                Ok(output.name.clone())
            } else {
                Err(TriageError::inference_message(
                    &self.model_name,
                    stage,
                    "no outputs available in session, the model may be invalid or corrupted",
                ))
            }
        }
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn next_session_index(&self) -> usize {
        self.next_idx
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.sessions.len()
    }

    fn run_inference_with_processor<T>(
        &self,
        x: &Tensor4D,
        stage: ProcessingStage,
        processor: impl FnOnce(&[i64], &[f32]) -> Result<T, TriageError>,
    ) -> Result<T, TriageError> {
        let input_shape = x.shape().to_vec();
        let output_name = self.get_output_name(stage)?;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            TriageError::inference_error(
                &self.model_name,
                stage,
                &format!("failed to convert input tensor with shape {:?}", input_shape),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self.next_session_index();
        let mut session_guard = self.sessions[idx]
            .lock()
            .map_err(|_| self.lock_error(idx, stage))?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            TriageError::inference_error(
                &self.model_name,
                stage,
                &format!(
                    "ONNX Runtime rejected input '{}' with shape {:?}",
                    self.input_name, input_shape
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                TriageError::inference_error(
                    &self.model_name,
                    stage,
                    &format!("failed to extract output tensor '{}' as f32", output_name),
                    e,
                )
            })?;

        processor(output_shape, output_data)
    }

    /// Runs an image batch and returns the `[N, C]` f32 output.
    pub fn infer_2d(&self, x: &Tensor4D, stage: ProcessingStage) -> Result<Tensor2D, TriageError> {
        let batch_size = x.shape()[0];
        let input_shape = x.shape().to_vec();
        self.run_inference_with_processor(x, stage, |output_shape, output_data| {
            if output_shape.len() != 2 {
                return Err(TriageError::inference_message(
                    &self.model_name,
                    stage,
                    &format!(
                        "expected 2D output tensor, got {}D with shape {:?}",
                        output_shape.len(),
                        output_shape
                    ),
                ));
            }

            let num_classes = output_shape[1] as usize;
            let expected_len = batch_size * num_classes;
            if output_data.len() != expected_len {
                return Err(TriageError::inference_message(
                    &self.model_name,
                    stage,
                    &format!(
                        "output size mismatch for input {:?} -> output {:?}: expected {}, got {}",
                        input_shape,
                        output_shape,
                        expected_len,
                        output_data.len()
                    ),
                ));
            }

            let array_view = ArrayView2::from_shape((batch_size, num_classes), output_data)
                .map_err(TriageError::Tensor)?;
            Ok(array_view.to_owned())
        })
    }

    /// Runs a feature matrix and returns one int64 label per row.
    ///
    /// The configured (or first) output is tried first; if it is not an int64
    /// tensor, the other declared outputs are scanned for one. Tree ensembles
    /// exported with skl2onnx emit an int64 `label` next to the probabilities.
    pub fn infer_labels(
        &self,
        x: &Tensor2D,
        stage: ProcessingStage,
    ) -> Result<Vec<i64>, TriageError> {
        let rows = x.nrows();
        let input_shape = x.shape().to_vec();
        let output_name = self.get_output_name(stage)?;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            TriageError::inference_error(
                &self.model_name,
                stage,
                &format!("failed to convert input tensor with shape {:?}", input_shape),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self.next_session_index();
        let mut session_guard = self.sessions[idx]
            .lock()
            .map_err(|_| self.lock_error(idx, stage))?;

        // Collect declared output names before running (avoid borrow conflicts later)
        let output_names: Vec<String> = session_guard
            .outputs
            .iter()
            .map(|o| o.name.clone())
            .collect();

        let outputs = session_guard.run(inputs).map_err(|e| {
            TriageError::inference_error(
                &self.model_name,
                stage,
                &format!(
                    "ONNX Runtime rejected input '{}' with shape {:?}",
                    self.input_name, input_shape
                ),
                e,
            )
        })?;

        let try_extract_by = |name: &str| -> Option<(Vec<i64>, Vec<i64>)> {
            match outputs[name].try_extract_tensor::<i64>() {
                Ok((shape, data)) => Some((shape.to_vec(), data.to_vec())),
                Err(_) => None,
            }
        };

        let extracted = if output_names.contains(&output_name) {
            try_extract_by(output_name.as_str())
        } else {
            None
        }
        .or_else(|| {
            output_names
                .iter()
                .filter(|name| **name != output_name)
                .find_map(|name| try_extract_by(name.as_str()))
        });

        let Some((output_shape, labels)) = extracted else {
            return Err(TriageError::inference_error(
                &self.model_name,
                stage,
                &format!(
                    "no int64 output found; tried '{}' first, available outputs: {:?}",
                    output_name, output_names
                ),
                SimpleError::new("no i64 output tensor found"),
            ));
        };

        if labels.len() != rows {
            return Err(TriageError::inference_message(
                &self.model_name,
                stage,
                &format!(
                    "expected {} labels, got output shape {:?}",
                    rows, output_shape
                ),
            ));
        }

        Ok(labels)
    }
}
