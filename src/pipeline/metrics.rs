//! Confusion-matrix diagnostics for binary predictions.
//!
//! Cells follow the usual convention: a true positive is a record whose
//! actual and predicted labels are both positive, a false negative is an
//! actual positive predicted negative, and so on. The positive class is the
//! routing label, so the files relocated are the ones counted as predicted
//! positive. A ratio whose denominator is
//! zero is reported as [`MetricValue::Undefined`] rather than NaN.

use crate::core::validation::{validate_binary_labels, validate_same_length};
use crate::core::TriageResult;
use std::fmt;

/// A derived ratio that may be undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Defined(f64),
    /// The denominator was zero.
    Undefined,
}

impl MetricValue {
    /// Returns `numerator / denominator`, or `Undefined` for a zero denominator.
    pub fn ratio(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            Self::Undefined
        } else {
            Self::Defined(numerator as f64 / denominator as f64)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(*v),
            Self::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined(_))
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(v) => write!(f, "{:.4}", v),
            Self::Undefined => f.write_str("n/a"),
        }
    }
}

/// The 2x2 tally of actual vs. predicted outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Tallies label pairs; labels other than `positive_label` count as negative.
    pub fn from_labels(actual: &[i64], predicted: &[i64], positive_label: i64) -> Self {
        let mut matrix = Self::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a == positive_label, p == positive_label) {
                (true, true) => matrix.true_positives += 1,
                (false, false) => matrix.true_negatives += 1,
                (false, true) => matrix.false_positives += 1,
                (true, false) => matrix.false_negatives += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }
}

/// Confusion matrix plus the five derived diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub matrix: ConfusionMatrix,
    pub accuracy: MetricValue,
    pub sensitivity: MetricValue,
    pub specificity: MetricValue,
    /// Positive predictive value.
    pub ppv: MetricValue,
    /// Negative predictive value.
    pub npv: MetricValue,
}

impl MetricsReport {
    pub fn from_matrix(matrix: ConfusionMatrix) -> Self {
        let ConfusionMatrix {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        } = matrix;
        Self {
            matrix,
            accuracy: MetricValue::ratio(tp + tn, matrix.total()),
            sensitivity: MetricValue::ratio(tp, tp + fn_),
            specificity: MetricValue::ratio(tn, tn + fp),
            ppv: MetricValue::ratio(tp, tp + fp),
            npv: MetricValue::ratio(tn, tn + fn_),
        }
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.matrix;
        writeln!(f, "Confusion matrix (rows = actual, columns = predicted):")?;
        writeln!(f, "{:>10} {:>8} {:>8}", "", "pred 0", "pred 1")?;
        writeln!(
            f,
            "{:>10} {:>8} {:>8}",
            "actual 0", m.true_negatives, m.false_positives
        )?;
        writeln!(
            f,
            "{:>10} {:>8} {:>8}",
            "actual 1", m.false_negatives, m.true_positives
        )?;
        writeln!(f, "Accuracy:    {}", self.accuracy)?;
        writeln!(f, "Sensitivity: {}", self.sensitivity)?;
        writeln!(f, "Specificity: {}", self.specificity)?;
        writeln!(f, "PPV:         {}", self.ppv)?;
        write!(f, "NPV:         {}", self.npv)
    }
}

/// Builds the confusion matrix of `actual` vs. `predicted` and derives the metrics.
///
/// # Errors
///
/// Returns an invalid-input error when the slices differ in length or contain
/// a label outside the binary classes.
pub fn compute_metrics(
    actual: &[i64],
    predicted: &[i64],
    positive_label: i64,
) -> TriageResult<MetricsReport> {
    validate_same_length(actual, predicted, "actual", "predicted")?;
    validate_binary_labels(actual, "actual")?;
    validate_binary_labels(predicted, "predicted")?;
    Ok(MetricsReport::from_matrix(ConfusionMatrix::from_labels(
        actual,
        predicted,
        positive_label,
    )))
}
