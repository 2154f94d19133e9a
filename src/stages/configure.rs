//! Configure stage - derives the shared run configuration

use crate::core::{ArtifactManifest, RunConfig, RunSettings, Stage, StageError};
use crate::stages::Toolchain;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// First stage of every run. Produces no artifacts; its output is the
/// shared configuration later stages (and resumed runs) observe.
pub struct ConfigureStage {
    settings: Arc<RunSettings>,
    toolchain: Arc<dyn Toolchain>,
    work_dir: PathBuf,
    artifacts: ArtifactManifest,
}

impl ConfigureStage {
    pub fn new(settings: Arc<RunSettings>, toolchain: Arc<dyn Toolchain>) -> Self {
        let work_dir = settings.out_dir.clone();
        Self {
            settings,
            toolchain,
            work_dir,
            artifacts: ArtifactManifest::new(),
        }
    }
}

#[async_trait]
impl Stage for ConfigureStage {
    fn name(&self) -> &str {
        "configure"
    }

    fn working_dir(&self) -> &Path {
        &self.work_dir
    }

    fn artifacts(&self) -> &ArtifactManifest {
        &self.artifacts
    }

    async fn run(&self, config: &mut RunConfig) -> Result<(), StageError> {
        let params = self.toolchain.setup_params(&self.settings).await?;
        info!("Configured run with {} parameters", params.len());
        *config = params;
        Ok(())
    }
}
