//! Assembly stage - draft contigs from raw reads

use crate::core::{ArtifactManifest, RunConfig, RunSettings, Stage, StageError};
use crate::stages::Toolchain;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct AssemblyStage {
    settings: Arc<RunSettings>,
    toolchain: Arc<dyn Toolchain>,
    work_dir: PathBuf,
    draft_assembly: PathBuf,
    artifacts: ArtifactManifest,
}

impl AssemblyStage {
    pub fn new(settings: Arc<RunSettings>, toolchain: Arc<dyn Toolchain>) -> Self {
        let work_dir = settings.out_dir.join("0-assembly");
        let draft_assembly = work_dir.join("draft_assembly.fasta");
        let artifacts = ArtifactManifest::new().with("assembly", &draft_assembly);
        Self {
            settings,
            toolchain,
            work_dir,
            draft_assembly,
            artifacts,
        }
    }

    /// Path of the draft assembly, for wiring downstream stages
    pub fn draft_path(&self) -> &Path {
        &self.draft_assembly
    }
}

#[async_trait]
impl Stage for AssemblyStage {
    fn name(&self) -> &str {
        "assembly"
    }

    fn working_dir(&self) -> &Path {
        &self.work_dir
    }

    fn artifacts(&self) -> &ArtifactManifest {
        &self.artifacts
    }

    async fn run(&self, config: &mut RunConfig) -> Result<(), StageError> {
        info!("Assembling draft contigs");
        self.toolchain
            .assemble(&self.settings, config, &self.draft_assembly)
            .await?;

        let meta = tokio::fs::metadata(&self.draft_assembly).await?;
        if meta.len() == 0 {
            return Err(StageError::EmptyAssembly);
        }
        Ok(())
    }
}
