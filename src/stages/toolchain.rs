//! External toolchain seam
//!
//! The scientific algorithms (assembly, alignment, consensus, repeat
//! analysis, polishing, scaffolding) are external collaborators. Stages
//! talk to them through this trait; the orchestrator only ever observes
//! whether a call failed and whether the declared artifacts exist
//! afterwards.

use crate::core::{RunConfig, RunSettings, StageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Per-contig statistics reported by a polishing round
#[derive(Debug, Clone)]
pub struct ContigStat {
    pub length: u64,
    pub coverage: u64,
}

/// Summary of one polishing round
#[derive(Debug, Clone, Default)]
pub struct PolishSummary {
    /// Contig id -> statistics after the round
    pub contigs: BTreeMap<String, ContigStat>,

    /// Mean alignment error rate observed during the round
    pub error_rate: f64,
}

/// The external tools a pipeline run depends on
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Verify every external binary is invocable
    async fn check_available(&self) -> Result<(), StageError>;

    /// Derive run parameters (k-mer size, minimum overlap, alignment
    /// cutoffs) from the operator settings
    async fn setup_params(&self, settings: &RunSettings) -> Result<RunConfig, StageError>;

    /// Assemble draft contigs from the input reads into `out_assembly`
    async fn assemble(
        &self,
        settings: &RunSettings,
        config: &RunConfig,
        out_assembly: &Path,
    ) -> Result<(), StageError>;

    /// Align reads against a set of contigs, writing `out_alignment`
    async fn align(
        &self,
        contigs: &Path,
        reads: &[PathBuf],
        threads: usize,
        out_alignment: &Path,
    ) -> Result<(), StageError>;

    /// Build a consensus sequence from an alignment
    async fn consensus(
        &self,
        alignment: &Path,
        contigs: &Path,
        threads: usize,
        out_consensus: &Path,
    ) -> Result<(), StageError>;

    /// Run repeat graph analysis, writing the declared outputs into
    /// `work_dir` (graph paths, final graph, scaffold links, stats)
    async fn analyse_repeats(
        &self,
        settings: &RunSettings,
        config: &RunConfig,
        in_assembly: &Path,
        work_dir: &Path,
    ) -> Result<(), StageError>;

    /// Run one polishing round over `in_contigs` using `alignment`,
    /// writing the polished contigs to `out_contigs`
    async fn polish(
        &self,
        in_contigs: &Path,
        alignment: &Path,
        round: usize,
        out_contigs: &Path,
    ) -> Result<PolishSummary, StageError>;

    /// Resolve unbridged repeats from the repeat stage's dump and edge
    /// sequences, writing the resolved sequences and a summary table
    async fn resolve_repeats(
        &self,
        settings: &RunSettings,
        repeats_dump: &Path,
        graph_edges: &Path,
        out_repeats: &Path,
        out_summary: &Path,
    ) -> Result<(), StageError>;

    /// Stitch contigs into scaffolds using the repeat stage's link file
    async fn scaffold(
        &self,
        contigs: &Path,
        links: &Path,
        out_scaffolds: &Path,
    ) -> Result<(), StageError>;
}

/// Toolchain backed by external binaries invoked as subprocesses
pub struct SubprocessToolchain {
    assemble_bin: String,
    minimap_bin: String,
    repeat_bin: String,
    polish_bin: String,
    trestle_bin: String,
    scaffold_bin: String,
}

impl SubprocessToolchain {
    pub fn new() -> Self {
        Self {
            assemble_bin: "asmflow-assemble".to_string(),
            minimap_bin: "minimap2".to_string(),
            repeat_bin: "asmflow-repeat".to_string(),
            polish_bin: "asmflow-polish".to_string(),
            trestle_bin: "asmflow-trestle".to_string(),
            scaffold_bin: "asmflow-scaffold".to_string(),
        }
    }

    fn binaries(&self) -> Vec<&str> {
        vec![
            self.assemble_bin.as_str(),
            self.minimap_bin.as_str(),
            self.repeat_bin.as_str(),
            self.polish_bin.as_str(),
            self.trestle_bin.as_str(),
            self.scaffold_bin.as_str(),
        ]
    }

    /// Spawn a tool and map its exit status into a stage error
    async fn run_tool(&self, bin: &str, args: &[String]) -> Result<(), StageError> {
        debug!("Running {} {}", bin, args.join(" "));
        let status = Command::new(bin)
            .args(args)
            .stdout(Stdio::null())
            .status()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => StageError::ToolUnavailable(bin.to_string()),
                _ => StageError::Io(e),
            })?;

        if !status.success() {
            return Err(StageError::ToolFailed {
                tool: bin.to_string(),
                detail: format!("exited with {}", status),
            });
        }
        Ok(())
    }
}

impl Default for SubprocessToolchain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Toolchain for SubprocessToolchain {
    async fn check_available(&self) -> Result<(), StageError> {
        for bin in self.binaries() {
            let result = Command::new(bin)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;
            if matches!(&result, Err(e) if e.kind() == std::io::ErrorKind::NotFound) {
                return Err(StageError::ToolUnavailable(bin.to_string()));
            }
        }
        Ok(())
    }

    async fn setup_params(&self, settings: &RunSettings) -> Result<RunConfig, StageError> {
        // k-mer and overlap selection mirrors the defaults the stage tools
        // were tuned with; anything fancier belongs to the tools themselves
        let kmer_size: i64 = if settings.genome_size < 10_000_000 { 15 } else { 17 };
        let min_overlap = settings.min_overlap.unwrap_or(if settings.genome_size < 1_000_000 {
            1_000
        } else {
            5_000
        });

        let mut config = RunConfig::new();
        config.set("kmer_size", kmer_size);
        config.set("min_overlap", min_overlap as i64);
        config.set("min_aln_rate", 0.5);
        config.set("threads", settings.threads as i64);
        config.set("platform", settings.platform.as_str());
        Ok(config)
    }

    async fn assemble(
        &self,
        settings: &RunSettings,
        config: &RunConfig,
        out_assembly: &Path,
    ) -> Result<(), StageError> {
        let mut args = vec![
            "--out-asm".to_string(),
            out_assembly.display().to_string(),
            "--genome-size".to_string(),
            settings.genome_size.to_string(),
            "--threads".to_string(),
            settings.threads.to_string(),
        ];
        if let Some(kmer) = config.get_int("kmer_size") {
            args.push("--kmer".to_string());
            args.push(kmer.to_string());
        }
        if let Some(overlap) = config.get_int("min_overlap") {
            args.push("--min-ovlp".to_string());
            args.push(overlap.to_string());
        }
        for read_file in &settings.reads {
            args.push("--reads".to_string());
            args.push(read_file.display().to_string());
        }
        self.run_tool(&self.assemble_bin, &args).await
    }

    async fn align(
        &self,
        contigs: &Path,
        reads: &[PathBuf],
        threads: usize,
        out_alignment: &Path,
    ) -> Result<(), StageError> {
        let mut args = vec![
            "-a".to_string(),
            "-t".to_string(),
            threads.to_string(),
            "-o".to_string(),
            out_alignment.display().to_string(),
            contigs.display().to_string(),
        ];
        args.extend(reads.iter().map(|r| r.display().to_string()));
        self.run_tool(&self.minimap_bin, &args).await
    }

    async fn consensus(
        &self,
        alignment: &Path,
        contigs: &Path,
        threads: usize,
        out_consensus: &Path,
    ) -> Result<(), StageError> {
        let args = vec![
            "consensus".to_string(),
            "--alignment".to_string(),
            alignment.display().to_string(),
            "--contigs".to_string(),
            contigs.display().to_string(),
            "--threads".to_string(),
            threads.to_string(),
            "--out".to_string(),
            out_consensus.display().to_string(),
        ];
        self.run_tool(&self.polish_bin, &args).await
    }

    async fn analyse_repeats(
        &self,
        settings: &RunSettings,
        config: &RunConfig,
        in_assembly: &Path,
        work_dir: &Path,
    ) -> Result<(), StageError> {
        let mut args = vec![
            "--assembly".to_string(),
            in_assembly.display().to_string(),
            "--out-dir".to_string(),
            work_dir.display().to_string(),
            "--threads".to_string(),
            settings.threads.to_string(),
        ];
        for read_file in &settings.reads {
            args.push("--reads".to_string());
            args.push(read_file.display().to_string());
        }
        if let Some(overlap) = config.get_int("min_overlap") {
            args.push("--min-ovlp".to_string());
            args.push(overlap.to_string());
        }
        self.run_tool(&self.repeat_bin, &args).await
    }

    async fn polish(
        &self,
        in_contigs: &Path,
        alignment: &Path,
        round: usize,
        out_contigs: &Path,
    ) -> Result<PolishSummary, StageError> {
        let stats_file = out_contigs.with_extension("stats.tsv");
        let args = vec![
            "polish".to_string(),
            "--contigs".to_string(),
            in_contigs.display().to_string(),
            "--alignment".to_string(),
            alignment.display().to_string(),
            "--round".to_string(),
            round.to_string(),
            "--out".to_string(),
            out_contigs.display().to_string(),
            "--stats".to_string(),
            stats_file.display().to_string(),
        ];
        self.run_tool(&self.polish_bin, &args).await?;
        parse_polish_stats(&stats_file)
    }

    async fn resolve_repeats(
        &self,
        settings: &RunSettings,
        repeats_dump: &Path,
        graph_edges: &Path,
        out_repeats: &Path,
        out_summary: &Path,
    ) -> Result<(), StageError> {
        let args = vec![
            "--repeats-dump".to_string(),
            repeats_dump.display().to_string(),
            "--graph-edges".to_string(),
            graph_edges.display().to_string(),
            "--threads".to_string(),
            settings.threads.to_string(),
            "--platform".to_string(),
            settings.platform.as_str().to_string(),
            "--out".to_string(),
            out_repeats.display().to_string(),
            "--summary".to_string(),
            out_summary.display().to_string(),
        ];
        self.run_tool(&self.trestle_bin, &args).await
    }

    async fn scaffold(
        &self,
        contigs: &Path,
        links: &Path,
        out_scaffolds: &Path,
    ) -> Result<(), StageError> {
        let args = vec![
            "--contigs".to_string(),
            contigs.display().to_string(),
            "--links".to_string(),
            links.display().to_string(),
            "--out".to_string(),
            out_scaffolds.display().to_string(),
        ];
        self.run_tool(&self.scaffold_bin, &args).await
    }
}

/// Parse the tab-separated stats file a polishing round emits:
/// `seq_name<TAB>length<TAB>coverage<TAB>err_rate`
fn parse_polish_stats(path: &Path) -> Result<PolishSummary, StageError> {
    let text = std::fs::read_to_string(path)?;
    let mut summary = PolishSummary::default();
    let mut err_sum = 0.0;
    let mut rows = 0usize;

    for line in text.lines().skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            continue;
        }
        let length = fields[1].parse().unwrap_or(0);
        let coverage = fields[2].parse().unwrap_or(0);
        let err_rate: f64 = fields[3].parse().unwrap_or(0.0);
        summary
            .contigs
            .insert(fields[0].to_string(), ContigStat { length, coverage });
        err_sum += err_rate;
        rows += 1;
    }

    if rows > 0 {
        summary.error_rate = err_sum / rows as f64;
    }
    Ok(summary)
}
