//! Run statistics.
//!
//! This module defines the `TriageStats` structure summarizing one pipeline
//! run: how many records were classified, how routing went, and how long each
//! stage took.

use super::routing::RelocationStatus;
use std::fmt;

/// Statistics for one triage run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriageStats {
    /// The total number of records classified.
    pub total_records: usize,
    /// Records whose final label was positive.
    pub positive_predictions: usize,
    /// Files moved in this run.
    pub moved: usize,
    /// Files found already relocated by an earlier run.
    pub already_relocated: usize,
    /// Files that would have been moved (dry run).
    pub would_move: usize,
    /// Positive files that could not be relocated.
    pub failed_relocations: usize,
    /// Time spent adapting records into tensors, in milliseconds.
    pub adaptation_time_ms: f64,
    /// Time spent in stage-one inference, in milliseconds.
    pub stage_one_time_ms: f64,
    /// Time spent in stage-two inference, in milliseconds.
    pub stage_two_time_ms: f64,
    /// Time spent routing files, in milliseconds.
    pub routing_time_ms: f64,
}

impl TriageStats {
    /// Creates a new TriageStats instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts routing outcomes.
    pub fn record_routing(&mut self, statuses: &[RelocationStatus]) {
        for status in statuses {
            match status {
                RelocationStatus::Moved { .. } => self.moved += 1,
                RelocationStatus::AlreadyRelocated { .. } => self.already_relocated += 1,
                RelocationStatus::WouldMove { .. } => self.would_move += 1,
                RelocationStatus::Failed { .. } => self.failed_relocations += 1,
                RelocationStatus::Retained => {}
            }
        }
    }

    /// Returns the share of positive predictions as a percentage (0.0 to 100.0).
    pub fn positive_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            (self.positive_predictions as f64 / self.total_records as f64) * 100.0
        }
    }

    /// Returns the total inference time in milliseconds.
    pub fn inference_time_ms(&self) -> f64 {
        self.stage_one_time_ms + self.stage_two_time_ms
    }
}

impl fmt::Display for TriageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Triage Statistics:")?;
        writeln!(f, "  Records: {}", self.total_records)?;
        writeln!(
            f,
            "  Positive: {} ({:.1}%)",
            self.positive_predictions,
            self.positive_rate()
        )?;
        writeln!(
            f,
            "  Moved: {}, already relocated: {}, would move: {}, failed: {}",
            self.moved, self.already_relocated, self.would_move, self.failed_relocations
        )?;
        writeln!(
            f,
            "  Inference: {:.2} ms (stage one: {:.2} ms, stage two: {:.2} ms)",
            self.inference_time_ms(),
            self.stage_one_time_ms,
            self.stage_two_time_ms
        )?;
        writeln!(
            f,
            "  Adaptation: {:.2} ms, routing: {:.2} ms",
            self.adaptation_time_ms, self.routing_time_ms
        )?;
        Ok(())
    }
}
