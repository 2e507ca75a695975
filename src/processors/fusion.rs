//! Fusion of the stage-one probability with the histogram descriptor.
//!
//! The ensemble classifier was trained on rows laid out as
//! `[probability, h_0, h_1, ..., h_{D-1}]`; that column order is part of its
//! input contract.

use crate::core::{Tensor1D, Tensor2D, TriageError, TriageResult};
use ndarray::{Axis, concatenate};

/// Prepends `probabilities` as column 0 of `histograms`.
///
/// Returns an `[N, D + 1]` matrix; columns `1..=D` are `histograms` unchanged.
///
/// # Errors
///
/// Returns [`TriageError::FusionMismatch`] when the row counts differ.
pub fn fuse(histograms: &Tensor2D, probabilities: &Tensor1D) -> TriageResult<Tensor2D> {
    if probabilities.len() != histograms.nrows() {
        return Err(TriageError::FusionMismatch {
            probabilities: probabilities.len(),
            histograms: histograms.nrows(),
        });
    }

    let column = probabilities.view().insert_axis(Axis(1));
    concatenate(Axis(1), &[column, histograms.view()]).map_err(TriageError::Tensor)
}
