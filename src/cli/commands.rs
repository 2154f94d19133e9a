//! CLI command definitions

use crate::core::{Platform, ReadType};
use clap::Args;
use std::path::PathBuf;

/// Run (or resume) an assembly pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Input read files (FASTA/FASTQ, optionally gzipped)
    #[arg(short, long, required = true, num_args = 1..)]
    pub reads: Vec<PathBuf>,

    /// Output directory for the run
    #[arg(short, long)]
    pub out_dir: PathBuf,

    /// Estimated genome size (plain bytes or with a suffix, e.g. 5m, 2.6g)
    #[arg(short, long)]
    pub genome_size: String,

    /// Number of parallel threads
    #[arg(short, long, default_value_t = 1)]
    pub threads: usize,

    /// Number of polishing iterations
    #[arg(short, long, default_value_t = 1)]
    pub iterations: usize,

    /// Minimum overlap between reads (default: auto)
    #[arg(short, long)]
    pub min_overlap: Option<u32>,

    /// Sequencing platform
    #[arg(long, value_enum, default_value_t = PlatformArg::Pacbio)]
    pub platform: PlatformArg,

    /// Read preprocessing level
    #[arg(long, value_enum, default_value_t = ReadTypeArg::Raw)]
    pub read_type: ReadTypeArg,

    /// Resume from the last checkpointed stage
    #[arg(long)]
    pub resume: bool,

    /// Resume from a specific stage
    #[arg(long, value_name = "stage_name", conflicts_with = "resume")]
    pub resume_from: Option<String>,
}

/// Print the stage order for a run configuration
#[derive(Debug, Args, Clone)]
pub struct StagesCommand {
    /// Read preprocessing level
    #[arg(long, value_enum, default_value_t = ReadTypeArg::Raw)]
    pub read_type: ReadTypeArg,

    /// Number of polishing iterations
    #[arg(short, long, default_value_t = 1)]
    pub iterations: usize,
}

/// Sequencing platform argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PlatformArg {
    Pacbio,
    Nano,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Pacbio => Platform::Pacbio,
            PlatformArg::Nano => Platform::Nano,
        }
    }
}

/// Read preprocessing level argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReadTypeArg {
    Raw,
    Corrected,
    #[clap(name = "subasm")]
    Subassemblies,
}

impl From<ReadTypeArg> for ReadType {
    fn from(arg: ReadTypeArg) -> Self {
        match arg {
            ReadTypeArg::Raw => ReadType::Raw,
            ReadTypeArg::Corrected => ReadType::Corrected,
            ReadTypeArg::Subassemblies => ReadType::Subasm,
        }
    }
}
