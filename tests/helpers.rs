//! Test utility stages and toolchain mocks for asmflow

use asmflow::core::{ArtifactManifest, RunConfig, RunSettings, Stage, StageError};
use asmflow::stages::{ContigStat, PolishSummary, Toolchain};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Shared record of stage invocations, in order
pub type RunLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> RunLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn log_entries(log: &RunLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A scripted stage: records its invocation, optionally fails via a
/// shared flag, writes its declared artifacts, and can set or assert
/// shared configuration entries.
pub struct MockStage {
    name: String,
    work_dir: PathBuf,
    artifacts: ArtifactManifest,
    log: RunLog,
    fail: Arc<AtomicBool>,
    sets_config: Option<(String, i64)>,
    expects_config: Option<(String, i64)>,
}

impl MockStage {
    pub fn new(name: &str, work_dir: &Path, outputs: &[&str], log: RunLog) -> Self {
        let mut artifacts = ArtifactManifest::new();
        for output in outputs {
            artifacts.insert(*output, work_dir.join(output));
        }
        Self {
            name: name.to_string(),
            work_dir: work_dir.to_path_buf(),
            artifacts,
            log,
            fail: Arc::new(AtomicBool::new(false)),
            sets_config: None,
            expects_config: None,
        }
    }

    /// Fail while this flag is set; clearing it between runs simulates
    /// the operator fixing the failure condition before a resume
    pub fn with_fail_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.fail = flag;
        self
    }

    /// Write a configuration entry on success (configure-stage behavior)
    pub fn setting_config(mut self, key: &str, value: i64) -> Self {
        self.sets_config = Some((key.to_string(), value));
        self
    }

    /// Fail unless the configuration entry is present (checks that the
    /// snapshot was restored on resume)
    pub fn expecting_config(mut self, key: &str, value: i64) -> Self {
        self.expects_config = Some((key.to_string(), value));
        self
    }
}

#[async_trait]
impl Stage for MockStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn working_dir(&self) -> &Path {
        &self.work_dir
    }

    fn artifacts(&self) -> &ArtifactManifest {
        &self.artifacts
    }

    async fn run(&self, config: &mut RunConfig) -> Result<(), StageError> {
        self.log.lock().unwrap().push(self.name.clone());

        if self.fail.load(Ordering::SeqCst) {
            return Err(StageError::ToolFailed {
                tool: self.name.clone(),
                detail: "scripted failure".to_string(),
            });
        }

        if let Some((key, expected)) = &self.expects_config {
            if config.get_int(key) != Some(*expected) {
                return Err(StageError::ToolFailed {
                    tool: self.name.clone(),
                    detail: format!("configuration entry {} not restored", key),
                });
            }
        }

        if let Some((key, value)) = &self.sets_config {
            config.set(key.clone(), *value);
        }

        for (_, path) in self.artifacts.iter() {
            tokio::fs::write(path, b"artifact data").await?;
        }
        Ok(())
    }
}

/// Toolchain that fabricates plausible outputs instead of invoking the
/// external binaries
pub struct MockToolchain {
    /// Produce a zero-byte draft assembly to trigger the empty-output check
    pub empty_assembly: bool,

    /// Report this binary as missing during the availability preflight
    pub missing_tool: Option<String>,
}

impl MockToolchain {
    pub fn new() -> Self {
        Self {
            empty_assembly: false,
            missing_tool: None,
        }
    }
}

impl Default for MockToolchain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Toolchain for MockToolchain {
    async fn check_available(&self) -> Result<(), StageError> {
        match &self.missing_tool {
            Some(bin) => Err(StageError::ToolUnavailable(bin.clone())),
            None => Ok(()),
        }
    }

    async fn setup_params(&self, settings: &RunSettings) -> Result<RunConfig, StageError> {
        let mut config = RunConfig::new();
        config.set("kmer_size", 15i64);
        config.set("min_aln_rate", 0.5);
        config.set("threads", settings.threads as i64);
        Ok(config)
    }

    async fn assemble(
        &self,
        _settings: &RunSettings,
        _config: &RunConfig,
        out_assembly: &Path,
    ) -> Result<(), StageError> {
        let content = if self.empty_assembly {
            ""
        } else {
            ">contig_1\nACGTACGT\n"
        };
        tokio::fs::write(out_assembly, content).await?;
        Ok(())
    }

    async fn align(
        &self,
        _contigs: &Path,
        _reads: &[PathBuf],
        _threads: usize,
        out_alignment: &Path,
    ) -> Result<(), StageError> {
        tokio::fs::write(out_alignment, "@SQ\tSN:contig_1\tLN:8\n").await?;
        Ok(())
    }

    async fn consensus(
        &self,
        _alignment: &Path,
        _contigs: &Path,
        _threads: usize,
        out_consensus: &Path,
    ) -> Result<(), StageError> {
        tokio::fs::write(out_consensus, ">contig_1\nACGTACGT\n").await?;
        Ok(())
    }

    async fn analyse_repeats(
        &self,
        _settings: &RunSettings,
        _config: &RunConfig,
        _in_assembly: &Path,
        work_dir: &Path,
    ) -> Result<(), StageError> {
        tokio::fs::write(work_dir.join("graph_paths.fasta"), ">contig_1\nACGT\n").await?;
        tokio::fs::write(work_dir.join("scaffolds_links.txt"), "contig_1\tcontig_1\n").await?;
        tokio::fs::write(work_dir.join("graph_final.gv"), "digraph {}\n").await?;
        tokio::fs::write(
            work_dir.join("contigs_stats.txt"),
            "seq_name\tlength\tcoverage\ncontig_1\t8\t40\n",
        )
        .await?;
        tokio::fs::write(work_dir.join("repeats_dump.txt"), "repeat_1\tcontig_1\n").await?;
        tokio::fs::write(work_dir.join("graph_final.fasta"), ">edge_1\nACGT\n").await?;
        Ok(())
    }

    async fn polish(
        &self,
        _in_contigs: &Path,
        _alignment: &Path,
        _round: usize,
        out_contigs: &Path,
    ) -> Result<PolishSummary, StageError> {
        tokio::fs::write(out_contigs, ">contig_1\nACGTACGT\n").await?;
        let mut summary = PolishSummary::default();
        summary.contigs.insert(
            "contig_1".to_string(),
            ContigStat {
                length: 8,
                coverage: 40,
            },
        );
        summary.error_rate = 0.05;
        Ok(summary)
    }

    async fn resolve_repeats(
        &self,
        _settings: &RunSettings,
        _repeats_dump: &Path,
        _graph_edges: &Path,
        out_repeats: &Path,
        out_summary: &Path,
    ) -> Result<(), StageError> {
        tokio::fs::write(out_repeats, ">repeat_1\nACGTACGT\n").await?;
        tokio::fs::write(out_summary, "repeat_id\tresolved\nrepeat_1\tyes\n").await?;
        Ok(())
    }

    async fn scaffold(
        &self,
        _contigs: &Path,
        _links: &Path,
        out_scaffolds: &Path,
    ) -> Result<(), StageError> {
        tokio::fs::write(out_scaffolds, ">scaffold_1\nACGTACGT\n").await?;
        Ok(())
    }
}
