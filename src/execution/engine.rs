//! Orchestrator loop - checkpoints, runs stages in order, propagates the
//! first failure

use crate::checkpoint::{CheckpointError, CheckpointStore, COMPLETE_STAGE};
use crate::core::{BuildError, RunConfig, Stage, StageError};
use crate::execution::ResumeError;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// Error types for a whole pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("can't open input file: {}", .0.display())]
    MissingInput(PathBuf),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Resume(#[from] ResumeError),

    #[error("stage {stage} failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: StageError,
    },
}

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        run_id: Uuid,
        total_stages: usize,
        start_index: usize,
    },
    StageStarted {
        stage: String,
        index: usize,
        total_stages: usize,
    },
    StageCompleted {
        stage: String,
        index: usize,
    },
    StageFailed {
        stage: String,
        error: String,
    },
    PipelineCompleted {
        run_id: Uuid,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Runs an ordered stage sequence with checkpointing.
///
/// Strictly sequential: each stage runs to completion or failure before
/// the next one starts, and the checkpoint is written immediately before
/// each attempt.
pub struct Orchestrator {
    store: CheckpointStore,
    event_handlers: Vec<EventHandler>,
    run_id: Uuid,
}

impl Orchestrator {
    pub fn new(store: CheckpointStore) -> Self {
        Self {
            store,
            event_handlers: Vec::new(),
            run_id: Uuid::new_v4(),
        }
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Verify every declared input file before any stage runs or any
    /// checkpoint is written
    pub fn check_inputs(&self, inputs: &[PathBuf]) -> Result<(), PipelineError> {
        for path in inputs {
            if !path.exists() {
                return Err(PipelineError::MissingInput(path.clone()));
            }
        }
        Ok(())
    }

    /// Execute `jobs[start_index..]` in order.
    ///
    /// The checkpoint written before each stage means "about to attempt",
    /// not "completed". The first failing stage halts the run; there is no
    /// retry and no checkpoint rollback. After the last stage the store
    /// records the completion sentinel.
    pub async fn execute(
        &self,
        jobs: &[Box<dyn Stage>],
        config: &mut RunConfig,
        start_index: usize,
    ) -> Result<(), PipelineError> {
        let total = jobs.len();
        info!(
            "Starting pipeline run {} ({} stages, starting at {})",
            self.run_id, total, start_index
        );
        self.emit(ExecutionEvent::PipelineStarted {
            run_id: self.run_id,
            total_stages: total,
            start_index,
        });

        for (index, job) in jobs.iter().enumerate().skip(start_index) {
            self.store.save(job.name(), config)?;
            self.prepare_working_dir(job.as_ref()).await?;

            info!("Running stage {} ({}/{})", job.name(), index + 1, total);
            self.emit(ExecutionEvent::StageStarted {
                stage: job.name().to_string(),
                index,
                total_stages: total,
            });

            if let Err(source) = job.run(config).await {
                error!("Stage {} failed: {}", job.name(), source);
                self.emit(ExecutionEvent::StageFailed {
                    stage: job.name().to_string(),
                    error: source.to_string(),
                });
                return Err(PipelineError::Stage {
                    stage: job.name().to_string(),
                    source,
                });
            }

            self.emit(ExecutionEvent::StageCompleted {
                stage: job.name().to_string(),
                index,
            });
        }

        // terminal sentinel so a later resume can tell "finished" from
        // "crashed mid-last-stage"
        self.store.save(COMPLETE_STAGE, config)?;
        info!("Pipeline run {} finished", self.run_id);
        self.emit(ExecutionEvent::PipelineCompleted {
            run_id: self.run_id,
        });
        Ok(())
    }

    async fn prepare_working_dir(&self, job: &dyn Stage) -> Result<(), PipelineError> {
        tokio::fs::create_dir_all(job.working_dir())
            .await
            .map_err(|e| PipelineError::Stage {
                stage: job.name().to_string(),
                source: StageError::Io(e),
            })
    }
}
