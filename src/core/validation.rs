//! Input validation utilities
//!
//! Small checks shared by the pipeline stages so that malformed inputs surface
//! as [`TriageError`] values instead of panics during indexing.

use crate::core::{NEGATIVE_LABEL, POSITIVE_LABEL, TriageError};

/// Validates that two collections have the same length.
#[inline]
pub fn validate_same_length<T, U>(
    items1: &[T],
    items2: &[U],
    name1: &str,
    name2: &str,
) -> Result<(), TriageError> {
    if items1.len() != items2.len() {
        return Err(TriageError::InvalidInput {
            message: format!(
                "Length mismatch: {} has {} elements, but {} has {} elements",
                name1,
                items1.len(),
                name2,
                items2.len()
            ),
        });
    }
    Ok(())
}

/// Validates that every label is either the negative or the positive class.
pub fn validate_binary_labels(labels: &[i64], name: &str) -> Result<(), TriageError> {
    if let Some((index, value)) = labels
        .iter()
        .enumerate()
        .find(|(_, l)| **l != NEGATIVE_LABEL && **l != POSITIVE_LABEL)
    {
        return Err(TriageError::InvalidInput {
            message: format!(
                "'{}' must contain only {} or {}, got {} at index {}",
                name, NEGATIVE_LABEL, POSITIVE_LABEL, value, index
            ),
        });
    }
    Ok(())
}
