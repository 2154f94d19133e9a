//! Pipeline builder - the ordered stage sequence for a run

use crate::core::{ReadType, RunSettings, Stage};
use crate::stages::{
    AssemblyStage, ConfigureStage, ConsensusStage, FinalizeStage, PolishStage, RepeatStage,
    Toolchain, TrestleStage,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Errors detected while assembling the stage sequence
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("duplicate stage name in pipeline: {0}")]
    DuplicateStage(String),
}

/// Builds the ordered sequence of stages for a run configuration,
/// wiring each stage's declared outputs into the next stage's inputs.
pub struct PipelineBuilder {
    settings: Arc<RunSettings>,
    toolchain: Arc<dyn Toolchain>,
}

impl PipelineBuilder {
    pub fn new(settings: Arc<RunSettings>, toolchain: Arc<dyn Toolchain>) -> Self {
        Self {
            settings,
            toolchain,
        }
    }

    pub fn build(&self) -> Result<Vec<Box<dyn Stage>>, BuildError> {
        let settings = &self.settings;
        let mut jobs: Vec<Box<dyn Stage>> = Vec::new();

        jobs.push(Box::new(ConfigureStage::new(
            Arc::clone(settings),
            Arc::clone(&self.toolchain),
        )));

        let assembly = AssemblyStage::new(Arc::clone(settings), Arc::clone(&self.toolchain));
        let mut draft_assembly = assembly.draft_path().to_path_buf();
        jobs.push(Box::new(assembly));

        // pre-assembled input is already a consensus of sorts
        if settings.read_type != ReadType::Subasm {
            let consensus = ConsensusStage::new(
                Arc::clone(settings),
                Arc::clone(&self.toolchain),
                draft_assembly,
            );
            draft_assembly = consensus.consensus_path().to_path_buf();
            jobs.push(Box::new(consensus));
        }

        let repeat = RepeatStage::new(
            Arc::clone(settings),
            Arc::clone(&self.toolchain),
            draft_assembly,
        );
        let graph_file = repeat.graph_path();
        let repeat_stats = repeat.stats_path();
        let scaffold_links = repeat.scaffold_links_path();
        let repeats_dump = repeat.repeats_dump_path();
        let graph_edges = repeat.graph_edges_path();
        let mut contigs_file = repeat.contigs_path();
        jobs.push(Box::new(repeat));

        let mut polished_stats = None;
        if settings.num_iters > 0 {
            let polish = PolishStage::new(
                Arc::clone(settings),
                Arc::clone(&self.toolchain),
                contigs_file,
            );
            contigs_file = polish.contigs_path().to_path_buf();
            polished_stats = Some(polish.stats_path().to_path_buf());
            jobs.push(Box::new(polish));
        }

        jobs.push(Box::new(TrestleStage::new(
            Arc::clone(settings),
            Arc::clone(&self.toolchain),
            repeats_dump,
            graph_edges,
        )));

        jobs.push(Box::new(FinalizeStage::new(
            Arc::clone(settings),
            Arc::clone(&self.toolchain),
            contigs_file,
            graph_file,
            repeat_stats,
            polished_stats,
            scaffold_links,
        )));

        ensure_unique_names(&jobs)?;
        Ok(jobs)
    }
}

/// Stage names are the resume keys, so duplicates make resume ambiguous
pub(crate) fn ensure_unique_names(jobs: &[Box<dyn Stage>]) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    for job in jobs {
        if !seen.insert(job.name().to_string()) {
            return Err(BuildError::DuplicateStage(job.name().to_string()));
        }
    }
    Ok(())
}
