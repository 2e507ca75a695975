//! Decision and routing: relocation of positively classified files.
//!
//! Routing is not transactional. Each file is handled independently and a
//! per-file problem is recorded as a [`RelocationStatus::Failed`] while the
//! rest of the batch continues. Only a destination directory that cannot be
//! prepared is fatal, and that check happens before any file is touched.

use crate::core::config::RoutingConfig;
use crate::core::{TriageError, TriageResult};
use crate::domain::PredictionResult;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened to one record's file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationStatus {
    /// The file was moved into the destination directory.
    Moved { destination: PathBuf },
    /// The prediction was negative; the file was left in place.
    Retained,
    /// The source is gone and the destination already holds the file,
    /// typically because an earlier run moved it.
    AlreadyRelocated { destination: PathBuf },
    /// Dry run: the file would have been moved.
    WouldMove { destination: PathBuf },
    /// The file should have been moved but was not.
    Failed { reason: String },
}

impl RelocationStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for RelocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moved { .. } => f.write_str("moved"),
            Self::Retained => f.write_str("retained"),
            Self::AlreadyRelocated { .. } => f.write_str("already_relocated"),
            Self::WouldMove { .. } => f.write_str("would_move"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Relocates files whose prediction equals the configured positive label.
#[derive(Debug, Clone)]
pub struct Router {
    config: RoutingConfig,
}

impl Router {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Ensures the destination directory exists (creating it when allowed).
    ///
    /// Dry runs never touch the filesystem and always succeed here.
    pub fn prepare(&self) -> TriageResult<()> {
        let dir = &self.config.destination_dir;
        if self.config.dry_run {
            return Ok(());
        }
        if dir.is_dir() {
            return Ok(());
        }
        if dir.exists() {
            return Err(TriageError::config_error(format!(
                "destination {} exists and is not a directory",
                dir.display()
            )));
        }
        if !self.config.create_destination {
            return Err(TriageError::config_error(format!(
                "destination directory {} does not exist",
                dir.display()
            )));
        }
        fs::create_dir_all(dir).map_err(|e| {
            TriageError::config_error(format!(
                "cannot create destination directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        debug!("Created destination directory {}", dir.display());
        Ok(())
    }

    /// Routes every prediction, in order, returning one status per prediction.
    ///
    /// # Errors
    ///
    /// Fails only if the destination directory cannot be prepared.
    pub fn route(&self, predictions: &[PredictionResult]) -> TriageResult<Vec<RelocationStatus>> {
        self.prepare()?;
        let statuses: Vec<RelocationStatus> =
            predictions.iter().map(|p| self.route_one(p)).collect();

        let moved = statuses
            .iter()
            .filter(|s| matches!(s, RelocationStatus::Moved { .. }))
            .count();
        let failed = statuses.iter().filter(|s| s.is_failure()).count();
        info!(
            "Routing finished: {} moved, {} failed, {} total{}",
            moved,
            failed,
            statuses.len(),
            if self.config.dry_run { " (dry run)" } else { "" }
        );
        Ok(statuses)
    }

    /// Routes a single prediction.
    pub fn route_one(&self, prediction: &PredictionResult) -> RelocationStatus {
        if !prediction.is_positive(self.config.positive_label) {
            return RelocationStatus::Retained;
        }

        let source = prediction.path();
        let Some(file_name) = source.file_name() else {
            return self.failed(source, "path has no file name".to_string());
        };
        let destination = self.config.destination_dir.join(file_name);

        let source_exists = source.exists();
        let destination_exists = destination.exists();
        match (source_exists, destination_exists) {
            (false, true) => {
                debug!("{} already relocated", source.display());
                RelocationStatus::AlreadyRelocated { destination }
            }
            (false, false) => self.failed(source, "source file not found".to_string()),
            (true, true) => self.failed(
                source,
                format!("destination {} already exists", destination.display()),
            ),
            (true, false) if self.config.dry_run => RelocationStatus::WouldMove { destination },
            (true, false) => match relocate(source, &destination) {
                Ok(()) => {
                    debug!("Moved {} -> {}", source.display(), destination.display());
                    RelocationStatus::Moved { destination }
                }
                Err(e) => self.failed(source, e.to_string()),
            },
        }
    }

    fn failed(&self, source: &Path, reason: String) -> RelocationStatus {
        warn!("Could not relocate {}: {}", source.display(), reason);
        RelocationStatus::Failed { reason }
    }
}

/// Moves `source` to `destination`, copying across filesystems when a plain
/// rename is refused.
fn relocate(source: &Path, destination: &Path) -> io::Result<()> {
    let rename_error = match fs::rename(source, destination) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    if !source.exists() {
        return Err(rename_error);
    }

    if let Err(copy_error) = fs::copy(source, destination) {
        let _ = fs::remove_file(destination);
        return Err(copy_error);
    }
    if let Err(remove_error) = fs::remove_file(source) {
        // Keep a single copy of the file.
        let _ = fs::remove_file(destination);
        return Err(remove_error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NEGATIVE_LABEL, POSITIVE_LABEL};

    fn touch(path: &Path) {
        fs::write(path, b"scan").unwrap();
    }

    #[test]
    fn test_positive_moved_negative_retained() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let a = src.path().join("a.png");
        let b = src.path().join("b.png");
        touch(&a);
        touch(&b);

        let router = Router::new(RoutingConfig::new(dst.path()));
        let statuses = router
            .route(&[
                PredictionResult::new(&a, POSITIVE_LABEL),
                PredictionResult::new(&b, NEGATIVE_LABEL),
            ])
            .unwrap();

        assert_eq!(
            statuses[0],
            RelocationStatus::Moved {
                destination: dst.path().join("a.png")
            }
        );
        assert_eq!(statuses[1], RelocationStatus::Retained);
        assert!(!a.exists());
        assert!(dst.path().join("a.png").exists());
        assert!(b.exists());
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let a = src.path().join("a.png");
        touch(&a);
        let router = Router::new(RoutingConfig::new(dst.path()));
        let predictions = [PredictionResult::new(&a, POSITIVE_LABEL)];

        router.route(&predictions).unwrap();
        let second = router.route(&predictions).unwrap();
        assert_eq!(
            second[0],
            RelocationStatus::AlreadyRelocated {
                destination: dst.path().join("a.png")
            }
        );
        assert!(!second[0].is_failure());
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let missing = src.path().join("missing.png");
        let present = src.path().join("present.png");
        touch(&present);

        let router = Router::new(RoutingConfig::new(dst.path()));
        let statuses = router
            .route(&[
                PredictionResult::new(&missing, POSITIVE_LABEL),
                PredictionResult::new(&present, POSITIVE_LABEL),
            ])
            .unwrap();
        assert!(statuses[0].is_failure());
        assert!(matches!(statuses[1], RelocationStatus::Moved { .. }));
    }

    #[test]
    fn test_existing_destination_is_not_overwritten() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let a = src.path().join("a.png");
        touch(&a);
        fs::write(dst.path().join("a.png"), b"other").unwrap();

        let router = Router::new(RoutingConfig::new(dst.path()));
        let status = router.route_one(&PredictionResult::new(&a, POSITIVE_LABEL));
        assert!(status.is_failure());
        assert!(a.exists());
        assert_eq!(fs::read(dst.path().join("a.png")).unwrap(), b"other");
    }

    #[test]
    fn test_dry_run_leaves_files_in_place() {
        let src = tempfile::tempdir().unwrap();
        let dst = src.path().join("never-created");
        let a = src.path().join("a.png");
        touch(&a);

        let router = Router::new(RoutingConfig::new(&dst).dry_run(true));
        let statuses = router
            .route(&[PredictionResult::new(&a, POSITIVE_LABEL)])
            .unwrap();
        assert_eq!(
            statuses[0],
            RelocationStatus::WouldMove {
                destination: dst.join("a.png")
            }
        );
        assert!(a.exists());
        assert!(!dst.exists());
    }

    #[test]
    fn test_destination_created_when_missing() {
        let root = tempfile::tempdir().unwrap();
        let dst = root.path().join("nested").join("positive");
        let router = Router::new(RoutingConfig::new(&dst));
        router.route(&[]).unwrap();
        assert!(dst.is_dir());
    }

    #[test]
    fn test_unpreparable_destination_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        touch(&blocker);
        let a = root.path().join("a.png");
        touch(&a);

        let router = Router::new(RoutingConfig::new(&blocker));
        let err = router
            .route(&[PredictionResult::new(&a, POSITIVE_LABEL)])
            .unwrap_err();
        assert!(matches!(err, TriageError::ConfigError { .. }));
        assert!(a.exists());

        let strict = Router::new(
            RoutingConfig::new(root.path().join("absent")).create_destination(false),
        );
        assert!(strict.prepare().is_err());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(RelocationStatus::Retained.to_string(), "retained");
        assert_eq!(
            RelocationStatus::Failed {
                reason: "denied".into()
            }
            .to_string(),
            "failed: denied"
        );
    }
}
