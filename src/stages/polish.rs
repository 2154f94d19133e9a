//! Polishing stage - iterative error correction of the contigs

use crate::core::{ArtifactManifest, RunConfig, RunSettings, Stage, StageError};
use crate::stages::{PolishSummary, Toolchain};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct PolishStage {
    settings: Arc<RunSettings>,
    toolchain: Arc<dyn Toolchain>,
    work_dir: PathBuf,
    in_contigs: PathBuf,
    final_contigs: PathBuf,
    stats_file: PathBuf,
    artifacts: ArtifactManifest,
}

impl PolishStage {
    pub fn new(
        settings: Arc<RunSettings>,
        toolchain: Arc<dyn Toolchain>,
        in_contigs: PathBuf,
    ) -> Self {
        let work_dir = settings.out_dir.join("3-polishing");
        let final_contigs = work_dir.join(format!("polished_{}.fasta", settings.num_iters));
        let stats_file = work_dir.join("contigs_stats.txt");
        let artifacts = ArtifactManifest::new()
            .with("contigs", &final_contigs)
            .with("stats", &stats_file);
        Self {
            settings,
            toolchain,
            work_dir,
            in_contigs,
            final_contigs,
            stats_file,
            artifacts,
        }
    }

    pub fn contigs_path(&self) -> &Path {
        &self.final_contigs
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_file
    }
}

#[async_trait]
impl Stage for PolishStage {
    fn name(&self) -> &str {
        "polishing"
    }

    fn working_dir(&self) -> &Path {
        &self.work_dir
    }

    fn artifacts(&self) -> &ArtifactManifest {
        &self.artifacts
    }

    async fn run(&self, _config: &mut RunConfig) -> Result<(), StageError> {
        let mut prev_assembly = self.in_contigs.clone();
        let mut last_summary = PolishSummary::default();

        for round in 1..=self.settings.num_iters {
            info!("Polishing genome ({}/{})", round, self.settings.num_iters);

            let alignment = self.work_dir.join(format!("minimap_{}.sam", round));
            self.toolchain
                .align(
                    &prev_assembly,
                    &self.settings.reads,
                    self.settings.threads,
                    &alignment,
                )
                .await?;

            let polished = self.work_dir.join(format!("polished_{}.fasta", round));
            last_summary = self
                .toolchain
                .polish(&prev_assembly, &alignment, round, &polished)
                .await?;
            info!("Alignment error rate: {}", last_summary.error_rate);

            prev_assembly = polished;
        }

        let mut stats = String::from("seq_name\tlength\tcoverage\n");
        for (contig_id, stat) in &last_summary.contigs {
            stats.push_str(&format!(
                "{}\t{}\t{}\n",
                contig_id, stat.length, stat.coverage
            ));
        }
        tokio::fs::write(&self.stats_file, stats).await?;
        Ok(())
    }
}
