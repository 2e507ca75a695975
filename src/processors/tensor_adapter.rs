//! Conversion of a [`RecordSet`] into the tensors each classifier expects.
//!
//! Every function is pure and preserves record order. Shape consistency is
//! checked over the whole collection before any buffer is allocated, so a
//! mismatch never yields a partially filled tensor.

use crate::core::{MAX_TENSOR_SIZE, Tensor2D, Tensor4D, TriageError, TriageResult};
use crate::domain::RecordSet;
use ndarray::{Array2, Array4};
use std::path::PathBuf;

/// Stacks every record's pixels into an `[N, 1, H, W]` tensor.
///
/// # Errors
///
/// Returns [`TriageError::ShapeMismatch`] naming the first record whose
/// pixel dimensions differ from record 0, or [`TriageError::InvalidInput`]
/// when the stacked tensor would exceed [`MAX_TENSOR_SIZE`] elements.
pub fn to_image_tensor(records: &RecordSet) -> TriageResult<Tensor4D> {
    let Some(first) = records.get(0) else {
        return Ok(Array4::zeros((0, 1, 0, 0)));
    };
    let (height, width) = first.pixel_shape();
    if let Some((index, record)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| r.pixel_shape() != (height, width))
    {
        let (h, w) = record.pixel_shape();
        return Err(TriageError::shape_mismatch(
            "pixels",
            index,
            &[height, width],
            &[h, w],
        ));
    }

    let elements = records.len().saturating_mul(height).saturating_mul(width);
    if elements > MAX_TENSOR_SIZE {
        return Err(TriageError::invalid_input(format!(
            "image tensor of {} elements exceeds the limit of {}",
            elements, MAX_TENSOR_SIZE
        )));
    }

    let mut tensor = Array4::zeros((records.len(), 1, height, width));
    for (mut slot, record) in tensor.outer_iter_mut().zip(records.iter()) {
        slot.index_axis_mut(ndarray::Axis(0), 0)
            .assign(&record.pixels);
    }
    Ok(tensor)
}

/// Stacks every record's histogram into an `[N, D]` matrix.
///
/// # Errors
///
/// Returns [`TriageError::ShapeMismatch`] when histogram lengths differ.
pub fn to_histogram_matrix(records: &RecordSet) -> TriageResult<Tensor2D> {
    let width = records.get(0).map_or(0, |r| r.histogram.len());
    if let Some((index, record)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| r.histogram.len() != width)
    {
        return Err(TriageError::shape_mismatch(
            "histogram",
            index,
            &[width],
            &[record.histogram.len()],
        ));
    }

    let data: Vec<f32> = records
        .iter()
        .flat_map(|r| r.histogram.iter().copied())
        .collect();
    Array2::from_shape_vec((records.len(), width), data).map_err(TriageError::Tensor)
}

/// Returns the ground-truth labels in record order.
///
/// # Errors
///
/// Returns [`TriageError::MissingLabels`] if any record has no label.
pub fn extract_labels(records: &RecordSet) -> TriageResult<Vec<i64>> {
    let missing: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.label.is_none())
        .map(|(i, _)| i)
        .collect();
    if let Some(&first_index) = missing.first() {
        return Err(TriageError::MissingLabels {
            missing: missing.len(),
            total: records.len(),
            first_index,
        });
    }
    Ok(records.iter().filter_map(|r| r.label).collect())
}

/// Returns the filenames in record order.
pub fn extract_filenames(records: &RecordSet) -> Vec<PathBuf> {
    records.iter().map(|r| r.filename.clone()).collect()
}
