//! End-to-end runs of the built assembly pipeline against a mock toolchain

mod helpers;

use asmflow::checkpoint::{CheckpointStore, COMPLETE_STAGE};
use asmflow::core::{Platform, ReadType, RunConfig, RunSettings};
use asmflow::execution::{Orchestrator, PipelineError};
use asmflow::stages::Toolchain;
use asmflow::{PipelineBuilder, StageError};
use helpers::MockToolchain;
use std::path::Path;
use std::sync::Arc;

fn settings(dir: &Path, reads: &Path) -> Arc<RunSettings> {
    Arc::new(RunSettings {
        reads: vec![reads.to_path_buf()],
        out_dir: dir.to_path_buf(),
        genome_size: 5_000_000,
        threads: 2,
        num_iters: 1,
        min_overlap: None,
        platform: Platform::Pacbio,
        read_type: ReadType::Raw,
    })
}

#[tokio::test]
async fn test_full_run_produces_final_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let reads = dir.path().join("reads.fa");
    std::fs::write(&reads, ">read_1\nACGT\n").unwrap();

    let settings = settings(dir.path(), &reads);
    let toolchain: Arc<dyn Toolchain> = Arc::new(MockToolchain::new());
    let jobs = PipelineBuilder::new(settings.clone(), toolchain)
        .build()
        .unwrap();

    let orchestrator = Orchestrator::new(CheckpointStore::new(dir.path()));
    orchestrator.check_inputs(&settings.reads).unwrap();

    let mut config = RunConfig::new();
    orchestrator.execute(&jobs, &mut config, 0).await.unwrap();

    // every stage's declared artifacts exist
    for job in &jobs {
        assert!(
            job.artifacts().all_present(),
            "artifacts of {} missing",
            job.name()
        );
    }
    for name in [
        "contigs.fasta",
        "scaffolds.fasta",
        "assembly_info.txt",
        "assembly_graph.gv",
    ] {
        assert!(dir.path().join(name).exists(), "{} missing", name);
    }
    assert!(dir.path().join("4-trestle/resolved_repeats.fasta").exists());
    assert!(dir.path().join("4-trestle/trestle_summary.txt").exists());

    // configure's parameters reached the shared configuration
    assert_eq!(config.get_int("kmer_size"), Some(15));

    let record = orchestrator.store().load().unwrap();
    assert_eq!(record.stage_name, COMPLETE_STAGE);
}

#[tokio::test]
async fn test_empty_assembly_fails_assembly_stage() {
    let dir = tempfile::tempdir().unwrap();
    let reads = dir.path().join("reads.fa");
    std::fs::write(&reads, ">read_1\nACGT\n").unwrap();

    let settings = settings(dir.path(), &reads);
    let toolchain: Arc<dyn Toolchain> = Arc::new(MockToolchain {
        empty_assembly: true,
        ..MockToolchain::new()
    });
    let jobs = PipelineBuilder::new(settings, toolchain).build().unwrap();

    let orchestrator = Orchestrator::new(CheckpointStore::new(dir.path()));
    let mut config = RunConfig::new();
    let err = orchestrator
        .execute(&jobs, &mut config, 0)
        .await
        .unwrap_err();

    match err {
        PipelineError::Stage { stage, source } => {
            assert_eq!(stage, "assembly");
            assert!(matches!(source, StageError::EmptyAssembly));
        }
        other => panic!("unexpected error: {}", other),
    }

    // the checkpoint names the failed stage, ready for a resume
    let record = orchestrator.store().load().unwrap();
    assert_eq!(record.stage_name, "assembly");
    // downstream stage directories were never populated
    assert!(!dir.path().join("2-repeat/graph_paths.fasta").exists());
}

#[tokio::test]
async fn test_unavailable_tool_fails_before_any_stage() {
    let dir = tempfile::tempdir().unwrap();
    let reads = dir.path().join("reads.fa");
    std::fs::write(&reads, ">read_1\nACGT\n").unwrap();

    let toolchain: Arc<dyn Toolchain> = Arc::new(MockToolchain {
        missing_tool: Some("minimap2".to_string()),
        ..MockToolchain::new()
    });
    let orchestrator = Orchestrator::new(CheckpointStore::new(dir.path()));

    let err = toolchain.check_available().await.unwrap_err();
    assert!(matches!(err, StageError::ToolUnavailable(bin) if bin == "minimap2"));

    // the preflight runs before execute, so nothing was checkpointed
    assert!(!orchestrator.store().exists());
    assert!(!dir.path().join("0-assembly").exists());
}

#[tokio::test]
async fn test_missing_reads_fail_before_any_stage() {
    let dir = tempfile::tempdir().unwrap();
    let reads = dir.path().join("reads.fa");

    let settings = settings(dir.path(), &reads);
    let orchestrator = Orchestrator::new(CheckpointStore::new(dir.path()));

    let err = orchestrator.check_inputs(&settings.reads).unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput(p) if p == reads));
    assert!(!orchestrator.store().exists());
    assert!(!dir.path().join("0-assembly").exists());
}
