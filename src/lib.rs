//! asmflow - resumable orchestration for long-read assembly pipelines

pub mod checkpoint;
pub mod cli;
pub mod core;
pub mod execution;
pub mod stages;

// Re-export commonly used types
pub use crate::checkpoint::{CheckpointError, CheckpointRecord, CheckpointStore, COMPLETE_STAGE};
pub use crate::core::{
    ArtifactManifest, ConfigValue, Platform, ReadType, RunConfig, RunSettings, Stage, StageError,
};
pub use crate::core::{BuildError, PipelineBuilder};
pub use crate::execution::{ExecutionEvent, Orchestrator, PipelineError, ResumeTarget};
pub use crate::stages::{SubprocessToolchain, Toolchain};
