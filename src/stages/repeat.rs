//! Repeat stage - repeat graph analysis of the draft assembly

use crate::core::{ArtifactManifest, RunConfig, RunSettings, Stage, StageError};
use crate::stages::Toolchain;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct RepeatStage {
    settings: Arc<RunSettings>,
    toolchain: Arc<dyn Toolchain>,
    work_dir: PathBuf,
    in_assembly: PathBuf,
    artifacts: ArtifactManifest,
}

impl RepeatStage {
    pub fn new(
        settings: Arc<RunSettings>,
        toolchain: Arc<dyn Toolchain>,
        in_assembly: PathBuf,
    ) -> Self {
        let work_dir = settings.out_dir.join("2-repeat");
        let artifacts = ArtifactManifest::new()
            .with("contigs", work_dir.join("graph_paths.fasta"))
            .with("scaffold_links", work_dir.join("scaffolds_links.txt"))
            .with("assembly_graph", work_dir.join("graph_final.gv"))
            .with("stats", work_dir.join("contigs_stats.txt"))
            .with("repeats_dump", work_dir.join("repeats_dump.txt"))
            .with("graph_final", work_dir.join("graph_final.fasta"));
        Self {
            settings,
            toolchain,
            work_dir,
            in_assembly,
            artifacts,
        }
    }

    pub fn contigs_path(&self) -> PathBuf {
        self.work_dir.join("graph_paths.fasta")
    }

    pub fn scaffold_links_path(&self) -> PathBuf {
        self.work_dir.join("scaffolds_links.txt")
    }

    pub fn graph_path(&self) -> PathBuf {
        self.work_dir.join("graph_final.gv")
    }

    pub fn stats_path(&self) -> PathBuf {
        self.work_dir.join("contigs_stats.txt")
    }

    pub fn repeats_dump_path(&self) -> PathBuf {
        self.work_dir.join("repeats_dump.txt")
    }

    pub fn graph_edges_path(&self) -> PathBuf {
        self.work_dir.join("graph_final.fasta")
    }
}

#[async_trait]
impl Stage for RepeatStage {
    fn name(&self) -> &str {
        "repeat"
    }

    fn working_dir(&self) -> &Path {
        &self.work_dir
    }

    fn artifacts(&self) -> &ArtifactManifest {
        &self.artifacts
    }

    async fn run(&self, config: &mut RunConfig) -> Result<(), StageError> {
        info!("Performing repeat analysis");
        self.toolchain
            .analyse_repeats(&self.settings, config, &self.in_assembly, &self.work_dir)
            .await
    }
}
