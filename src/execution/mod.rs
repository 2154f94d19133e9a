//! Pipeline execution: the orchestrator loop and resume resolution

pub mod engine;
pub mod resume;

pub use engine::{EventHandler, ExecutionEvent, Orchestrator, PipelineError};
pub use resume::{ResumeError, ResumePoint, ResumeTarget};
