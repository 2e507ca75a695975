//! Tensor aliases and batching utilities.
//!
//! Every inference call in the pipeline is capped at a configured batch size;
//! [`BatchSampler`] yields the row ranges used to slice tensors along the
//! batch axis so that chunked results concatenate back in record order.

use std::ops::Range;

/// A 1-dimensional tensor of f32 values.
pub type Tensor1D = ndarray::Array1<f32>;

/// A 2-dimensional tensor of f32 values.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4-dimensional tensor of f32 values, laid out as NCHW.
pub type Tensor4D = ndarray::Array4<f32>;

/// Splits a number of rows into contiguous batches of at most `batch_size`.
#[derive(Debug, Clone, Copy)]
pub struct BatchSampler {
    /// The size of each batch.
    batch_size: usize,
}

impl BatchSampler {
    /// Creates a new BatchSampler. A batch size of 0 is treated as 1.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the row ranges covering `0..len` in order.
    pub fn ranges(&self, len: usize) -> Vec<Range<usize>> {
        (0..len)
            .step_by(self.batch_size)
            .map(|start| start..(start + self.batch_size).min(len))
            .collect()
    }
}

impl Default for BatchSampler {
    fn default() -> Self {
        Self::new(crate::core::constants::DEFAULT_BATCH_SIZE)
    }
}
