//! The two-stage triage pipeline.
//!
//! ```text
//! RecordSet ─► image tensor [N,1,H,W] ─► stage one ─► p(positive) [N] ─┐
//!          └─► histogram matrix [N,D] ─────────────────────────────────┴► fuse [N,D+1]
//!                                                                             │
//!              report rows ◄─ routing ◄─ predictions [N] ◄─ stage two ◄──────┘
//! ```
//!
//! Every shape check and both inference calls complete before any file is
//! touched, so a fatal error leaves the filesystem unchanged.

use super::metrics::{MetricsReport, compute_metrics};
use super::report::{ReportRow, build_rows};
use super::routing::{RelocationStatus, Router};
use super::stats::TriageStats;
use crate::core::config::{ConfigValidator, TriageConfig};
use crate::core::{LabelPredictor, ProbabilityPredictor, TriageError, TriageResult};
use crate::domain::{PredictionResult, RecordSet};
use crate::models::{StageOneClassifier, StageTwoClassifier};
use crate::processors::{
    extract_filenames, extract_labels, fuse, to_histogram_matrix, to_image_tensor,
};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of the optional evaluation step.
#[derive(Debug)]
pub enum Evaluation {
    /// Evaluation was not enabled.
    NotRequested,
    /// Evaluation was enabled but could not be performed (e.g. missing labels).
    Unavailable(TriageError),
    Completed(MetricsReport),
}

impl Evaluation {
    pub fn report(&self) -> Option<&MetricsReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct TriageOutcome {
    /// One prediction per record, in record order.
    pub predictions: Vec<PredictionResult>,
    /// One routing status per record, in record order.
    pub routing: Vec<RelocationStatus>,
    pub evaluation: Evaluation,
    pub stats: TriageStats,
}

impl TriageOutcome {
    /// Rows of the tabular report, in record order.
    pub fn report_rows(&self) -> Vec<ReportRow> {
        build_rows(&self.predictions, &self.routing)
    }

    /// Files that should have been relocated but were not, with the reason.
    pub fn relocation_failures(&self) -> Vec<(&Path, &str)> {
        self.predictions
            .iter()
            .zip(&self.routing)
            .filter_map(|(p, s)| match s {
                RelocationStatus::Failed { reason } => Some((p.path(), reason.as_str())),
                _ => None,
            })
            .collect()
    }

    /// The predicted labels, in record order.
    pub fn labels(&self) -> Vec<i64> {
        self.predictions.iter().map(|p| p.label).collect()
    }
}

/// Runs records through both classifiers, routes positives and evaluates.
#[derive(Debug)]
pub struct TriagePipeline {
    config: TriageConfig,
    stage_one: StageOneClassifier,
    stage_two: StageTwoClassifier,
    router: Router,
}

impl TriagePipeline {
    /// Creates a pipeline over the two classifier backends.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(
        config: TriageConfig,
        stage_one: Box<dyn ProbabilityPredictor>,
        stage_two: Box<dyn LabelPredictor>,
    ) -> TriageResult<Self> {
        config.validate()?;
        let stage_one = StageOneClassifier::new(stage_one)
            .positive_class_index(config.positive_class_index)
            .batch_size(config.batch_size);
        let stage_two = StageTwoClassifier::new(stage_two).batch_size(config.batch_size);
        let router = Router::new(config.routing.clone());
        Ok(Self {
            config,
            stage_one,
            stage_two,
            router,
        })
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    /// Classifies every record without side effects.
    pub fn predict(&self, records: &RecordSet) -> TriageResult<Vec<PredictionResult>> {
        let mut stats = TriageStats::new();
        self.predict_with_stats(records, &mut stats)
    }

    fn predict_with_stats(
        &self,
        records: &RecordSet,
        stats: &mut TriageStats,
    ) -> TriageResult<Vec<PredictionResult>> {
        if records.is_empty() {
            debug!("Empty record set, skipping inference");
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let images = to_image_tensor(records)?;
        let histograms = to_histogram_matrix(records)?;
        let filenames = extract_filenames(records);
        stats.adaptation_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "Adapted {} records: images {:?}, histograms {:?}",
            records.len(),
            images.shape(),
            histograms.shape()
        );

        let start = Instant::now();
        let probabilities = self.stage_one.predict_positive_probability(&images)?;
        stats.stage_one_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let fused = fuse(&histograms, &probabilities)?;

        let start = Instant::now();
        let labels = self.stage_two.predict_labels(&fused)?;
        stats.stage_two_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(filenames
            .into_iter()
            .zip(labels)
            .map(|(filename, label)| PredictionResult::new(filename, label))
            .collect())
    }

    /// Runs the full pipeline: classification, routing and evaluation.
    ///
    /// # Errors
    ///
    /// Shape, inference and destination-directory errors abort the run before
    /// any file is relocated. Per-file relocation problems and missing labels
    /// do not abort; they are reported in the outcome.
    pub fn run(&self, records: &RecordSet) -> TriageResult<TriageOutcome> {
        info!(
            "Triaging {} records with '{}' and '{}'",
            records.len(),
            self.stage_one.name(),
            self.stage_two.name()
        );
        let mut stats = TriageStats::new();

        let predictions = self.predict_with_stats(records, &mut stats)?;
        stats.total_records = predictions.len();
        stats.positive_predictions = predictions
            .iter()
            .filter(|p| p.is_positive(self.config.routing.positive_label))
            .count();

        let start = Instant::now();
        let routing = self.router.route(&predictions)?;
        stats.routing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        stats.record_routing(&routing);

        let evaluation = self.evaluate(records, &predictions);

        Ok(TriageOutcome {
            predictions,
            routing,
            evaluation,
            stats,
        })
    }

    fn evaluate(&self, records: &RecordSet, predictions: &[PredictionResult]) -> Evaluation {
        if !self.config.evaluate {
            return Evaluation::NotRequested;
        }
        let predicted: Vec<i64> = predictions.iter().map(|p| p.label).collect();
        let positive_label = self.config.routing.positive_label;
        match extract_labels(records)
            .and_then(|actual| compute_metrics(&actual, &predicted, positive_label))
        {
            Ok(report) => Evaluation::Completed(report),
            Err(e) => {
                warn!("Skipping evaluation: {}", e);
                Evaluation::Unavailable(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RoutingConfig;
    use crate::core::errors::ProcessingStage;
    use crate::core::{Tensor2D, Tensor4D};
    use crate::domain::ImageRecord;
    use crate::pipeline::metrics::MetricValue;
    use ndarray::{Array2, Axis};
    use std::fs;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Reads the positive probability from each image's first pixel.
    #[derive(Debug, Default)]
    struct PixelProbability {
        calls: Arc<Mutex<usize>>,
    }

    impl ProbabilityPredictor for PixelProbability {
        fn predict_proba(&self, images: &Tensor4D) -> TriageResult<Tensor2D> {
            *self.calls.lock().unwrap() += 1;
            let n = images.len_of(Axis(0));
            Ok(Tensor2D::from_shape_fn((n, 2), |(i, j)| {
                let p = images[[i, 0, 0, 0]];
                if j == 1 { p } else { 1.0 - p }
            }))
        }
    }

    /// Records the fused matrix it sees and labels rows with probability > 0.5.
    #[derive(Debug, Default)]
    struct RecordingEnsemble {
        seen: Arc<Mutex<Vec<Tensor2D>>>,
    }

    impl LabelPredictor for RecordingEnsemble {
        fn predict(&self, features: &Tensor2D) -> TriageResult<Vec<i64>> {
            self.seen.lock().unwrap().push(features.clone());
            Ok(features
                .rows()
                .into_iter()
                .map(|row| i64::from(row[0] > 0.5))
                .collect())
        }
    }

    #[derive(Debug)]
    struct FailingEnsemble;

    impl LabelPredictor for FailingEnsemble {
        fn predict(&self, _features: &Tensor2D) -> TriageResult<Vec<i64>> {
            Err(TriageError::inference_message(
                "forest",
                ProcessingStage::StageTwo,
                "wrong feature width",
            ))
        }
    }

    fn record(dir: &Path, name: &str, p: f32, histogram: Vec<f32>) -> ImageRecord {
        let path = dir.join(name);
        fs::write(&path, b"scan").unwrap();
        ImageRecord::new(Array2::from_elem((2, 2), p), path, histogram)
    }

    fn scenario(dir: &Path) -> RecordSet {
        RecordSet::new(vec![
            record(dir, "f0.png", 0.9, vec![1.0, 2.0]).with_label(1),
            record(dir, "f1.png", 0.2, vec![3.0, 4.0]).with_label(0),
            record(dir, "f2.png", 0.6, vec![5.0, 6.0]).with_label(0),
        ])
    }

    fn config(destination: &Path) -> TriageConfig {
        TriageConfig::new()
            .routing(RoutingConfig::new(destination))
            .evaluate(true)
    }

    #[test]
    fn test_end_to_end_scenario() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let records = scenario(src.path());
        let ensemble = RecordingEnsemble::default();
        let seen = Arc::clone(&ensemble.seen);

        let pipeline = TriagePipeline::new(
            config(dst.path()),
            Box::new(PixelProbability::default()),
            Box::new(ensemble),
        )
        .unwrap();
        let outcome = pipeline.run(&records).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            ndarray::array![[0.9, 1.0, 2.0], [0.2, 3.0, 4.0], [0.6, 5.0, 6.0]]
        );

        assert_eq!(outcome.labels(), vec![1, 0, 1]);
        let names: Vec<PathBuf> = outcome
            .predictions
            .iter()
            .map(|p| p.filename.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                src.path().join("f0.png"),
                src.path().join("f1.png"),
                src.path().join("f2.png")
            ]
        );

        assert!(dst.path().join("f0.png").exists());
        assert!(src.path().join("f1.png").exists());
        assert!(!dst.path().join("f1.png").exists());
        assert!(dst.path().join("f2.png").exists());
        assert_eq!(outcome.routing[1], RelocationStatus::Retained);
        assert_eq!(outcome.stats.moved, 2);

        let report = outcome.evaluation.report().unwrap();
        assert_eq!(report.matrix.true_positives, 1);
        assert_eq!(report.matrix.false_positives, 1);
        assert_eq!(report.accuracy, MetricValue::Defined(2.0 / 3.0));
    }

    #[test]
    fn test_rerun_reports_already_relocated() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let records = scenario(src.path());
        let pipeline = TriagePipeline::new(
            config(dst.path()),
            Box::new(PixelProbability::default()),
            Box::new(RecordingEnsemble::default()),
        )
        .unwrap();

        pipeline.run(&records).unwrap();
        let second = pipeline.run(&records).unwrap();
        assert!(matches!(
            second.routing[0],
            RelocationStatus::AlreadyRelocated { .. }
        ));
        assert!(second.relocation_failures().is_empty());
        assert_eq!(second.stats.already_relocated, 2);
    }

    #[test]
    fn test_negative_positive_label_drives_routing_and_metrics() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let records = scenario(src.path());
        let config = config(dst.path()).routing(RoutingConfig::new(dst.path()).positive_label(0));
        let pipeline = TriagePipeline::new(
            config,
            Box::new(PixelProbability::default()),
            Box::new(RecordingEnsemble::default()),
        )
        .unwrap();

        let outcome = pipeline.run(&records).unwrap();
        assert!(dst.path().join("f1.png").exists());
        assert!(src.path().join("f0.png").exists());
        assert_eq!(outcome.stats.positive_predictions, 1);

        let report = outcome.evaluation.report().unwrap();
        assert_eq!(report.matrix.true_positives, 1);
        assert_eq!(report.matrix.true_negatives, 1);
        assert_eq!(report.matrix.false_negatives, 1);
        assert_eq!(report.matrix.false_positives, 0);
    }

    #[test]
    fn test_shape_mismatch_aborts_before_inference() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let mut records = scenario(src.path()).records().to_vec();
        records[1].pixels = Array2::zeros((3, 2));
        let classifier = PixelProbability::default();
        let calls = Arc::clone(&classifier.calls);

        let pipeline = TriagePipeline::new(
            config(dst.path()),
            Box::new(classifier),
            Box::new(RecordingEnsemble::default()),
        )
        .unwrap();
        let err = pipeline.run(&RecordSet::new(records)).unwrap_err();

        assert!(matches!(err, TriageError::ShapeMismatch { index: 1, .. }));
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(src.path().join("f0.png").exists());
    }

    #[test]
    fn test_inference_failure_touches_no_files() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let records = scenario(src.path());
        let pipeline = TriagePipeline::new(
            config(dst.path()),
            Box::new(PixelProbability::default()),
            Box::new(FailingEnsemble),
        )
        .unwrap();

        let err = pipeline.run(&records).unwrap_err();
        assert_eq!(err.stage(), Some(ProcessingStage::StageTwo));
        assert!(src.path().join("f0.png").exists());
        assert_eq!(fs::read_dir(dst.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_labels_skip_only_evaluation() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let records = RecordSet::new(vec![
            record(src.path(), "a.png", 0.8, vec![1.0]).with_label(1),
            record(src.path(), "b.png", 0.1, vec![2.0]),
        ]);
        let pipeline = TriagePipeline::new(
            config(dst.path()),
            Box::new(PixelProbability::default()),
            Box::new(RecordingEnsemble::default()),
        )
        .unwrap();

        let outcome = pipeline.run(&records).unwrap();
        assert!(matches!(
            outcome.evaluation,
            Evaluation::Unavailable(TriageError::MissingLabels { missing: 1, .. })
        ));
        assert_eq!(outcome.labels(), vec![1, 0]);
        assert!(dst.path().join("a.png").exists());
    }

    #[test]
    fn test_missing_source_marked_in_report() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let records = scenario(src.path());
        fs::remove_file(src.path().join("f2.png")).unwrap();

        let pipeline = TriagePipeline::new(
            config(dst.path()),
            Box::new(PixelProbability::default()),
            Box::new(RecordingEnsemble::default()),
        )
        .unwrap();
        let outcome = pipeline.run(&records).unwrap();

        let failures = outcome.relocation_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, src.path().join("f2.png"));
        let rows = outcome.report_rows();
        assert_eq!(rows[0].prediction.to_string(), "1");
        assert_eq!(rows[2].prediction.to_string(), "relocation_failed");
        assert!(dst.path().join("f0.png").exists());
    }

    #[test]
    fn test_empty_record_set_invokes_no_model() {
        let dst = tempfile::tempdir().unwrap();
        let classifier = PixelProbability::default();
        let calls = Arc::clone(&classifier.calls);
        let ensemble = RecordingEnsemble::default();
        let seen = Arc::clone(&ensemble.seen);

        let pipeline =
            TriagePipeline::new(config(dst.path()), Box::new(classifier), Box::new(ensemble))
                .unwrap();
        let outcome = pipeline.run(&RecordSet::default()).unwrap();

        assert!(outcome.predictions.is_empty());
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_predict_has_no_side_effects() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let records = scenario(src.path());
        let pipeline = TriagePipeline::new(
            config(dst.path()).batch_size(1),
            Box::new(PixelProbability::default()),
            Box::new(RecordingEnsemble::default()),
        )
        .unwrap();

        let predictions = pipeline.predict(&records).unwrap();
        assert_eq!(
            predictions.iter().map(|p| p.label).collect::<Vec<_>>(),
            vec![1, 0, 1]
        );
        assert!(src.path().join("f0.png").exists());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = TriagePipeline::new(
            TriageConfig::new().batch_size(0),
            Box::new(PixelProbability::default()),
            Box::new(RecordingEnsemble::default()),
        );
        assert!(matches!(result, Err(TriageError::ConfigError { .. })));
    }
}
