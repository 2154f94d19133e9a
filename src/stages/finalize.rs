//! Finalize stage - publish the run's results into the output root

use crate::core::{ArtifactManifest, RunConfig, RunSettings, Stage, StageError};
use crate::stages::Toolchain;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct FinalizeStage {
    toolchain: Arc<dyn Toolchain>,
    work_dir: PathBuf,
    contigs_file: PathBuf,
    graph_file: PathBuf,
    repeat_stats: PathBuf,
    polished_stats: Option<PathBuf>,
    scaffold_links: PathBuf,
    artifacts: ArtifactManifest,
}

impl FinalizeStage {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Arc<RunSettings>,
        toolchain: Arc<dyn Toolchain>,
        contigs_file: PathBuf,
        graph_file: PathBuf,
        repeat_stats: PathBuf,
        polished_stats: Option<PathBuf>,
        scaffold_links: PathBuf,
    ) -> Self {
        let work_dir = settings.out_dir.clone();
        let artifacts = ArtifactManifest::new()
            .with("contigs", work_dir.join("contigs.fasta"))
            .with("scaffolds", work_dir.join("scaffolds.fasta"))
            .with("stats", work_dir.join("assembly_info.txt"))
            .with("graph", work_dir.join("assembly_graph.gv"));
        Self {
            toolchain,
            work_dir,
            contigs_file,
            graph_file,
            repeat_stats,
            polished_stats,
            scaffold_links,
            artifacts,
        }
    }
}

#[async_trait]
impl Stage for FinalizeStage {
    fn name(&self) -> &str {
        "finalize"
    }

    fn working_dir(&self) -> &Path {
        &self.work_dir
    }

    fn artifacts(&self) -> &ArtifactManifest {
        &self.artifacts
    }

    async fn run(&self, _config: &mut RunConfig) -> Result<(), StageError> {
        let out_contigs = self.work_dir.join("contigs.fasta");
        let out_scaffolds = self.work_dir.join("scaffolds.fasta");
        let out_stats = self.work_dir.join("assembly_info.txt");
        let out_graph = self.work_dir.join("assembly_graph.gv");

        tokio::fs::copy(&self.contigs_file, &out_contigs).await?;
        tokio::fs::copy(&self.graph_file, &out_graph).await?;

        self.toolchain
            .scaffold(&self.contigs_file, &self.scaffold_links, &out_scaffolds)
            .await?;

        // polished stats supersede the repeat stage's when polishing ran
        let stats_source = self.polished_stats.as_ref().unwrap_or(&self.repeat_stats);
        tokio::fs::copy(stats_source, &out_stats).await?;

        info!("Final assembly: {}", out_scaffolds.display());
        Ok(())
    }
}
