//! Command-line entry point for a triage batch.
//!
//! Usage:
//! ```text
//! derm-triage --config triage.json
//! derm-triage --records records.json --stage-one cnn.onnx --stage-two forest.onnx \
//!     --destination dermoscopic --report results.csv --evaluate
//! ```
//!
//! Flags override the values read from `--config`.

use clap::Parser;
use derm_triage::core::config::{ConfigValidatorExt, ModelConfig, TriageConfig};
use derm_triage::core::init_tracing;
use derm_triage::domain::RecordStore;
use derm_triage::models::{OnnxEnsembleClassifier, OnnxImageClassifier};
use derm_triage::pipeline::{ReportWriter, TriageOutcome, TriagePipeline};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments for the triage binary
#[derive(Parser, Debug)]
#[command(name = "derm-triage")]
#[command(about = "Two-stage image triage: classify records, route positives, report metrics")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON record manifest
    #[arg(short, long)]
    records: Option<PathBuf>,

    /// Stage-one image classifier (ONNX)
    #[arg(long)]
    stage_one: Option<PathBuf>,

    /// Stage-two ensemble classifier (ONNX)
    #[arg(long)]
    stage_two: Option<PathBuf>,

    /// Apply softmax to the stage-one output
    #[arg(long)]
    softmax: bool,

    /// Directory receiving positively classified files
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Where to write the CSV report
    #[arg(long)]
    report: Option<PathBuf>,

    /// Compute metrics against ground-truth labels
    #[arg(short, long)]
    evaluate: bool,

    /// Decide routing without moving files
    #[arg(long)]
    dry_run: bool,

    /// Maximum rows per inference call
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Column of the stage-one output holding the positive probability
    #[arg(long)]
    positive_class_index: Option<usize>,
}

impl Args {
    /// Builds the run configuration: file values first, then flag overrides.
    fn into_config(self) -> derm_triage::core::TriageResult<TriageConfig> {
        let mut config = match &self.config {
            Some(path) => TriageConfig::from_file(path)?,
            None => TriageConfig::new(),
        };

        if let Some(records) = self.records {
            config.records_path = Some(records);
        }
        config.stage_one = config.stage_one.merge_with(&model_override(self.stage_one));
        if self.softmax {
            config.stage_one.apply_softmax = true;
        }
        config.stage_two = config.stage_two.merge_with(&model_override(self.stage_two));
        if let Some(destination) = self.destination {
            config.routing.destination_dir = destination;
        }
        if self.dry_run {
            config.routing.dry_run = true;
        }
        if let Some(report) = self.report {
            config.report_path = Some(report);
        }
        if self.evaluate {
            config.evaluate = true;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(index) = self.positive_class_index {
            config.positive_class_index = index;
        }
        Ok(config)
    }
}

fn model_override(model_path: Option<PathBuf>) -> ModelConfig {
    ModelConfig {
        model_path,
        session_pool_size: None,
        ..ModelConfig::new()
    }
}

/// Writes the metrics table and the files that could not be relocated.
fn write_summary(outcome: &TriageOutcome, out: &mut impl Write) -> io::Result<()> {
    if let Some(report) = outcome.evaluation.report() {
        writeln!(out, "{}", report)?;
    }
    let failures = outcome.relocation_failures();
    if !failures.is_empty() {
        writeln!(out, "Not relocated ({}):", failures.len())?;
        for (path, reason) in failures {
            writeln!(out, "  {}: {}", path.display(), reason)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();
    let config = args.into_config()?.validated()?;

    let Some(records_path) = config.records_path.clone() else {
        error!("No record manifest given (use --records or records_path)");
        return Err("missing record manifest".into());
    };

    let stage_one = OnnxImageClassifier::from_config(&config.stage_one)?;
    let stage_two = OnnxEnsembleClassifier::from_config(&config.stage_two)?;

    let records = RecordStore::new()
        .image_shape(config.image_shape)
        .load(&records_path)?;
    info!("Loaded {} records from {}", records.len(), records_path.display());

    let report_path = config.report_path.clone();
    let pipeline = TriagePipeline::new(config, Box::new(stage_one), Box::new(stage_two))?;
    let outcome = pipeline.run(&records)?;

    info!("{}", outcome.stats);
    write_summary(&outcome, &mut io::stderr().lock())?;

    match report_path {
        Some(path) => ReportWriter.write_file(&path, &outcome.report_rows())?,
        None => ReportWriter.write_to(&mut io::stdout().lock(), &outcome.report_rows())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use derm_triage::domain::PredictionResult;
    use derm_triage::pipeline::{Evaluation, RelocationStatus, TriageStats, compute_metrics};

    fn outcome(evaluation: Evaluation, routing: Vec<RelocationStatus>) -> TriageOutcome {
        TriageOutcome {
            predictions: vec![
                PredictionResult::new("a.png", 1),
                PredictionResult::new("b.png", 0),
            ],
            routing,
            evaluation,
            stats: TriageStats::new(),
        }
    }

    #[test]
    fn test_summary_lists_metrics_and_failures() {
        let report = compute_metrics(&[1, 0], &[1, 0], 1).unwrap();
        let outcome = outcome(
            Evaluation::Completed(report),
            vec![
                RelocationStatus::Failed {
                    reason: "source file not found".to_string(),
                },
                RelocationStatus::Retained,
            ],
        );
        let mut out = Vec::new();
        write_summary(&outcome, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Accuracy:    1.0000"));
        assert!(text.contains("Not relocated (1):"));
        assert!(text.contains("a.png: source file not found"));
    }

    #[test]
    fn test_summary_empty_without_evaluation_or_failures() {
        let outcome = outcome(
            Evaluation::NotRequested,
            vec![
                RelocationStatus::Moved {
                    destination: PathBuf::from("out/a.png"),
                },
                RelocationStatus::Retained,
            ],
        );
        let mut out = Vec::new();
        write_summary(&outcome, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "derm-triage",
            "--records",
            "records.json",
            "--stage-one",
            "cnn.onnx",
            "--stage-two",
            "forest.onnx",
            "--softmax",
            "--evaluate",
            "--batch-size",
            "8",
        ]);
        let config = args.into_config().unwrap();
        assert_eq!(config.records_path, Some(PathBuf::from("records.json")));
        assert_eq!(config.stage_one.model_path, Some(PathBuf::from("cnn.onnx")));
        assert!(config.stage_one.apply_softmax);
        assert!(!config.stage_two.apply_softmax);
        assert_eq!(config.stage_two.session_pool_size, Some(1));
        assert!(config.evaluate);
        assert_eq!(config.batch_size, 8);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.json");
        std::fs::write(
            &path,
            r#"{"stage_two": {"model_path": "rf.onnx", "session_pool_size": 2},
                "routing": {"destination_dir": "from-file"}}"#,
        )
        .unwrap();
        let args = Args::parse_from([
            "derm-triage",
            "--config",
            path.to_str().unwrap(),
            "--destination",
            "from-flag",
        ]);
        let config = args.into_config().unwrap();
        assert_eq!(config.stage_two.model_path, Some(PathBuf::from("rf.onnx")));
        assert_eq!(config.stage_two.session_pool_size, Some(2));
        assert_eq!(config.routing.destination_dir, PathBuf::from("from-flag"));
    }
}
