//! Trestle stage - resolution of unbridged repeats

use crate::core::{ArtifactManifest, RunConfig, RunSettings, Stage, StageError};
use crate::stages::Toolchain;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct TrestleStage {
    settings: Arc<RunSettings>,
    toolchain: Arc<dyn Toolchain>,
    work_dir: PathBuf,
    repeats_dump: PathBuf,
    graph_edges: PathBuf,
    resolved_repeats: PathBuf,
    summary_file: PathBuf,
    artifacts: ArtifactManifest,
}

impl TrestleStage {
    pub fn new(
        settings: Arc<RunSettings>,
        toolchain: Arc<dyn Toolchain>,
        repeats_dump: PathBuf,
        graph_edges: PathBuf,
    ) -> Self {
        let work_dir = settings.out_dir.join("4-trestle");
        let resolved_repeats = work_dir.join("resolved_repeats.fasta");
        let summary_file = work_dir.join("trestle_summary.txt");
        let artifacts = ArtifactManifest::new()
            .with("reps", &resolved_repeats)
            .with("summary", &summary_file);
        Self {
            settings,
            toolchain,
            work_dir,
            repeats_dump,
            graph_edges,
            resolved_repeats,
            summary_file,
            artifacts,
        }
    }
}

#[async_trait]
impl Stage for TrestleStage {
    fn name(&self) -> &str {
        "trestle"
    }

    fn working_dir(&self) -> &Path {
        &self.work_dir
    }

    fn artifacts(&self) -> &ArtifactManifest {
        &self.artifacts
    }

    async fn run(&self, _config: &mut RunConfig) -> Result<(), StageError> {
        info!("Resolving unbridged repeats");
        self.toolchain
            .resolve_repeats(
                &self.settings,
                &self.repeats_dump,
                &self.graph_edges,
                &self.resolved_repeats,
                &self.summary_file,
            )
            .await
    }
}
