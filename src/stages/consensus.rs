//! Consensus stage - align reads back to the draft and take a consensus

use crate::core::{ArtifactManifest, RunConfig, RunSettings, Stage, StageError};
use crate::stages::Toolchain;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct ConsensusStage {
    settings: Arc<RunSettings>,
    toolchain: Arc<dyn Toolchain>,
    work_dir: PathBuf,
    in_contigs: PathBuf,
    out_consensus: PathBuf,
    artifacts: ArtifactManifest,
}

impl ConsensusStage {
    pub fn new(
        settings: Arc<RunSettings>,
        toolchain: Arc<dyn Toolchain>,
        in_contigs: PathBuf,
    ) -> Self {
        let work_dir = settings.out_dir.join("1-consensus");
        let out_consensus = work_dir.join("consensus.fasta");
        let artifacts = ArtifactManifest::new().with("consensus", &out_consensus);
        Self {
            settings,
            toolchain,
            work_dir,
            in_contigs,
            out_consensus,
            artifacts,
        }
    }

    pub fn consensus_path(&self) -> &Path {
        &self.out_consensus
    }
}

#[async_trait]
impl Stage for ConsensusStage {
    fn name(&self) -> &str {
        "consensus"
    }

    fn working_dir(&self) -> &Path {
        &self.work_dir
    }

    fn artifacts(&self) -> &ArtifactManifest {
        &self.artifacts
    }

    async fn run(&self, config: &mut RunConfig) -> Result<(), StageError> {
        let alignment = self.work_dir.join("minimap.sam");
        info!("Aligning reads to the draft assembly");
        self.toolchain
            .align(
                &self.in_contigs,
                &self.settings.reads,
                self.settings.threads,
                &alignment,
            )
            .await?;

        info!("Computing consensus");
        let threads = config
            .get_int("threads")
            .map(|t| t as usize)
            .unwrap_or(self.settings.threads);
        self.toolchain
            .consensus(&alignment, &self.in_contigs, threads, &self.out_consensus)
            .await?;
        Ok(())
    }
}
