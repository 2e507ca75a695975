//! Tabular prediction report.
//!
//! One row per record, in input order, with the columns
//! `filename,prediction,routing`. A row whose relocation failed carries the
//! `relocation_failed` marker in the prediction column so that consumers do
//! not mistake it for a moved file.

use super::routing::RelocationStatus;
use crate::core::{RELOCATION_FAILED_MARKER, TriageResult};
use crate::domain::PredictionResult;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Contents of the prediction column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportPrediction {
    Label(i64),
    RelocationFailed,
}

impl fmt::Display for ReportPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => write!(f, "{label}"),
            Self::RelocationFailed => f.write_str(RELOCATION_FAILED_MARKER),
        }
    }
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub filename: PathBuf,
    pub prediction: ReportPrediction,
    pub routing: RelocationStatus,
}

impl ReportRow {
    pub fn new(prediction: &PredictionResult, routing: RelocationStatus) -> Self {
        let value = if routing.is_failure() {
            ReportPrediction::RelocationFailed
        } else {
            ReportPrediction::Label(prediction.label)
        };
        Self {
            filename: prediction.filename.clone(),
            prediction: value,
            routing,
        }
    }
}

/// Pairs predictions with their routing statuses, in order.
pub fn build_rows(predictions: &[PredictionResult], statuses: &[RelocationStatus]) -> Vec<ReportRow> {
    predictions
        .iter()
        .zip(statuses)
        .map(|(p, s)| ReportRow::new(p, s.clone()))
        .collect()
}

/// Writes report rows as CSV.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportWriter;

impl ReportWriter {
    pub const HEADER: [&'static str; 3] = ["filename", "prediction", "routing"];

    /// Writes the report to `path`, creating parent directories as needed.
    pub fn write_file(&self, path: &Path, rows: &[ReportRow]) -> TriageResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, rows)?;
        writer.flush()?;
        info!("Wrote {} report rows to {}", rows.len(), path.display());
        Ok(())
    }

    /// Writes the header and rows to any writer.
    pub fn write_to<W: Write>(&self, writer: &mut W, rows: &[ReportRow]) -> TriageResult<()> {
        writeln!(writer, "{}", Self::HEADER.join(","))?;
        for row in rows {
            writeln!(
                writer,
                "{},{},{}",
                escape_field(&row.filename.to_string_lossy()),
                escape_field(&row.prediction.to_string()),
                escape_field(&row.routing.to_string())
            )?;
        }
        Ok(())
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(rows: &[ReportRow]) -> String {
        let mut buffer = Vec::new();
        ReportWriter.write_to(&mut buffer, rows).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_rows_keep_order_and_labels() {
        let predictions = [
            PredictionResult::new("f0", 1),
            PredictionResult::new("f1", 0),
            PredictionResult::new("f2", 1),
        ];
        let statuses = [
            RelocationStatus::Moved {
                destination: PathBuf::from("d/f0"),
            },
            RelocationStatus::Retained,
            RelocationStatus::Moved {
                destination: PathBuf::from("d/f2"),
            },
        ];
        let rows = build_rows(&predictions, &statuses);
        assert_eq!(
            render(&rows),
            "filename,prediction,routing\nf0,1,moved\nf1,0,retained\nf2,1,moved\n"
        );
    }

    #[test]
    fn test_failed_relocation_marked() {
        let rows = build_rows(
            &[PredictionResult::new("gone.png", 1)],
            &[RelocationStatus::Failed {
                reason: "source file not found".into(),
            }],
        );
        assert_eq!(rows[0].prediction, ReportPrediction::RelocationFailed);
        assert!(render(&rows).contains("gone.png,relocation_failed,failed: source file not found"));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("plain"), "plain");
    }

    #[test]
    fn test_write_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("report.csv");
        let rows = build_rows(
            &[PredictionResult::new("a", 0)],
            &[RelocationStatus::Retained],
        );
        ReportWriter.write_file(&path, &rows).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("filename,prediction,routing\n"));
    }
}
