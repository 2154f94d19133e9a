//! Stage trait - the unit of pipeline work

use crate::core::{ArtifactManifest, RunConfig};
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Error types raised by stage implementations
#[derive(Debug, Error)]
pub enum StageError {
    #[error("no contigs were assembled - please check if the read type and genome size parameters are correct")]
    EmptyAssembly,

    #[error("required tool not found: {0}")]
    ToolUnavailable(String),

    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One unit of pipeline work: a named stage with declared outputs.
///
/// `run` is the only mutating operation. On success every path in the
/// artifact manifest exists on disk; on failure a stage-specific error is
/// raised and the orchestrator halts the run. Partial output from a
/// previous crashed attempt is overwritten when the stage is re-run.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable stage name, unique within a run; used as the resume key
    fn name(&self) -> &str;

    /// Directory the stage is rooted in; created before `run` is invoked
    fn working_dir(&self) -> &Path;

    /// Outputs this stage promises to produce, fixed at construction
    fn artifacts(&self) -> &ArtifactManifest;

    /// Perform the stage's work, reading and (for the configure stage)
    /// writing the shared run configuration
    async fn run(&self, config: &mut RunConfig) -> Result<(), StageError>;
}
