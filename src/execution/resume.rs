//! Resume controller - locates the restart point in the stage sequence

use crate::checkpoint::{CheckpointError, CheckpointStore, COMPLETE_STAGE};
use crate::core::{RunConfig, Stage};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Error types for resume resolution
#[derive(Debug, Error)]
pub enum ResumeError {
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("previous run already finished; use an explicit stage name to re-run")]
    AlreadyComplete,

    #[error("can't resume: stage {0} does not exist")]
    UnknownStage(String),

    #[error("can't resume: stage {stage} incomplete ({} missing)", .missing.display())]
    PriorStageIncomplete { stage: String, missing: PathBuf },
}

/// Where a resumed run should restart
#[derive(Debug, Clone)]
pub enum ResumeTarget {
    /// The stage recorded in the checkpoint
    LastCheckpoint,
    /// An operator-supplied stage name (still restores the checkpoint's
    /// configuration snapshot)
    Stage(String),
}

/// A resolved resume point
#[derive(Debug)]
pub struct ResumePoint {
    /// Index into the stage sequence at which execution restarts
    pub start_index: usize,

    /// Shared configuration restored from the checkpoint snapshot
    pub config: RunConfig,
}

/// Resolve the starting index for a resumed run.
///
/// Matches the target name against the first occurrence in the ordered
/// sequence. A matched stage at index `i > 0` requires every artifact of
/// the stage at `i - 1` to be present on disk; the first stage has no
/// predecessor, so that check is vacuously satisfied.
pub fn resolve(
    jobs: &[Box<dyn Stage>],
    target: &ResumeTarget,
    store: &CheckpointStore,
) -> Result<ResumePoint, ResumeError> {
    let record = store.load()?;

    let stage_name = match target {
        ResumeTarget::Stage(name) => name.clone(),
        ResumeTarget::LastCheckpoint => {
            if record.stage_name == COMPLETE_STAGE {
                return Err(ResumeError::AlreadyComplete);
            }
            record.stage_name.clone()
        }
    };

    let start_index = jobs
        .iter()
        .position(|job| job.name() == stage_name)
        .ok_or_else(|| ResumeError::UnknownStage(stage_name.clone()))?;

    if start_index > 0 {
        let prior = &jobs[start_index - 1];
        if let Some(missing) = prior.artifacts().missing().into_iter().next() {
            return Err(ResumeError::PriorStageIncomplete {
                stage: prior.name().to_string(),
                missing,
            });
        }
    }

    info!(
        "Resuming previous run at stage {} (index {})",
        stage_name, start_index
    );
    Ok(ResumePoint {
        start_index,
        config: record.config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ArtifactManifest, StageError};
    use async_trait::async_trait;
    use std::path::Path;

    struct FixtureStage {
        name: String,
        work_dir: PathBuf,
        artifacts: ArtifactManifest,
    }

    impl FixtureStage {
        fn new(name: &str, dir: &Path, outputs: &[&str]) -> Self {
            let mut artifacts = ArtifactManifest::new();
            for output in outputs {
                artifacts.insert(*output, dir.join(output));
            }
            Self {
                name: name.to_string(),
                work_dir: dir.to_path_buf(),
                artifacts,
            }
        }
    }

    #[async_trait]
    impl Stage for FixtureStage {
        fn name(&self) -> &str {
            &self.name
        }
        fn working_dir(&self) -> &Path {
            &self.work_dir
        }
        fn artifacts(&self) -> &ArtifactManifest {
            &self.artifacts
        }
        async fn run(&self, _config: &mut RunConfig) -> Result<(), StageError> {
            Ok(())
        }
    }

    fn fixture(dir: &Path) -> Vec<Box<dyn Stage>> {
        vec![
            Box::new(FixtureStage::new("configure", dir, &[])),
            Box::new(FixtureStage::new("analyze", dir, &["analysis.txt"])),
            Box::new(FixtureStage::new("finalize", dir, &["report.txt"])),
        ]
    }

    fn saved_store(dir: &Path, stage: &str) -> CheckpointStore {
        let store = CheckpointStore::new(dir);
        let mut config = RunConfig::new();
        config.set("kmer_size", 15i64);
        store.save(stage, &config).unwrap();
        store
    }

    #[test]
    fn test_resume_at_first_stage_needs_no_predecessor() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = fixture(dir.path());
        let store = saved_store(dir.path(), "configure");

        let point = resolve(&jobs, &ResumeTarget::LastCheckpoint, &store).unwrap();
        assert_eq!(point.start_index, 0);
        assert_eq!(point.config.get_int("kmer_size"), Some(15));
    }

    #[test]
    fn test_resume_requires_prior_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = fixture(dir.path());
        let store = saved_store(dir.path(), "finalize");

        // analyze's artifact does not exist yet
        let err = resolve(&jobs, &ResumeTarget::LastCheckpoint, &store).unwrap_err();
        assert!(matches!(
            err,
            ResumeError::PriorStageIncomplete { ref stage, .. } if stage == "analyze"
        ));

        std::fs::write(dir.path().join("analysis.txt"), "data").unwrap();
        let point = resolve(&jobs, &ResumeTarget::LastCheckpoint, &store).unwrap();
        assert_eq!(point.start_index, 2);
    }

    #[test]
    fn test_unknown_stage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = fixture(dir.path());
        let store = saved_store(dir.path(), "analyze");

        let err = resolve(
            &jobs,
            &ResumeTarget::Stage("polish".to_string()),
            &store,
        )
        .unwrap_err();
        assert!(matches!(err, ResumeError::UnknownStage(name) if name == "polish"));
    }

    #[test]
    fn test_missing_checkpoint_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = fixture(dir.path());
        let store = CheckpointStore::new(dir.path());

        let err = resolve(&jobs, &ResumeTarget::LastCheckpoint, &store).unwrap_err();
        assert!(matches!(
            err,
            ResumeError::Checkpoint(CheckpointError::Missing(_))
        ));
    }

    #[test]
    fn test_completed_run_needs_explicit_stage() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = fixture(dir.path());
        let store = saved_store(dir.path(), COMPLETE_STAGE);

        let err = resolve(&jobs, &ResumeTarget::LastCheckpoint, &store).unwrap_err();
        assert!(matches!(err, ResumeError::AlreadyComplete));

        // an explicit stage name bypasses the sentinel
        std::fs::write(dir.path().join("analysis.txt"), "data").unwrap();
        let point = resolve(
            &jobs,
            &ResumeTarget::Stage("finalize".to_string()),
            &store,
        )
        .unwrap();
        assert_eq!(point.start_index, 2);
    }
}
