//! Checkpoint persistence for resumable runs
//!
//! A single JSON file in the run's output directory records the stage that
//! is about to be attempted plus a snapshot of the shared configuration.
//! It is overwritten at every stage boundary, so only the most recent
//! checkpoint exists at any time.

use crate::core::RunConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Checkpoint file name, relative to the run's output directory
pub const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Reserved stage name recorded once the final stage has finished
pub const COMPLETE_STAGE: &str = "done";

/// Error types for checkpoint persistence
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("can't find checkpoint file at {}", .0.display())]
    Missing(PathBuf),

    #[error("checkpoint file is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("can't encode checkpoint: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The persisted checkpoint record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// Name of the stage that was about to run when this was written
    pub stage_name: String,

    /// When the checkpoint was written
    pub saved_at: DateTime<Utc>,

    /// Snapshot of the shared configuration at that moment
    pub config: RunConfig,
}

/// Persists and reloads the checkpoint record for one run.
///
/// Single-writer: one orchestrator process per output directory.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Create a store rooted in the run's output directory
    pub fn new(out_dir: &Path) -> Self {
        Self {
            path: out_dir.join(CHECKPOINT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Overwrite the checkpoint with the stage about to be attempted.
    ///
    /// Writes to a temporary file in the same directory and renames it
    /// into place, so a crash mid-write never corrupts a valid checkpoint.
    pub fn save(&self, stage_name: &str, config: &RunConfig) -> Result<(), CheckpointError> {
        let record = CheckpointRecord {
            stage_name: stage_name.to_string(),
            saved_at: Utc::now(),
            config: config.clone(),
        };
        let json = serde_json::to_vec_pretty(&record).map_err(CheckpointError::Encode)?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!("Checkpointed stage {} to {}", stage_name, self.path.display());
        Ok(())
    }

    /// Load the most recent checkpoint
    pub fn load(&self) -> Result<CheckpointRecord, CheckpointError> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CheckpointError::Missing(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&data).map_err(CheckpointError::Corrupt)
    }
}
