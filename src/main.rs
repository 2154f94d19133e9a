use anyhow::{Context, Result};
use asmflow::checkpoint::CheckpointStore;
use asmflow::cli::commands::{RunCommand, StagesCommand};
use asmflow::cli::output::*;
use asmflow::cli::{Cli, Command};
use asmflow::core::{parse_genome_size, PipelineBuilder, RunConfig, RunSettings};
use asmflow::execution::{resume, ExecutionEvent, Orchestrator, ResumeTarget};
use asmflow::stages::{SubprocessToolchain, Toolchain};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Stages(cmd) => list_stages(cmd)?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    let genome_size =
        parse_genome_size(&cmd.genome_size).context("Invalid --genome-size value")?;

    std::fs::create_dir_all(&cmd.out_dir).context("Failed to create output directory")?;
    let out_dir = cmd
        .out_dir
        .canonicalize()
        .context("Failed to resolve output directory")?;

    let settings = Arc::new(RunSettings {
        reads: cmd.reads.clone(),
        out_dir: out_dir.clone(),
        genome_size,
        threads: cmd.threads,
        num_iters: cmd.iterations,
        min_overlap: cmd.min_overlap,
        platform: cmd.platform.into(),
        read_type: cmd.read_type.into(),
    });

    let toolchain: Arc<dyn Toolchain> = Arc::new(SubprocessToolchain::new());
    let jobs = PipelineBuilder::new(Arc::clone(&settings), Arc::clone(&toolchain)).build()?;

    println!(
        "{} Loaded pipeline: {} stages",
        INFO,
        style(jobs.len()).bold()
    );

    let mut orchestrator = Orchestrator::new(CheckpointStore::new(&out_dir));

    // Console output for execution events, routed through the stage
    // progress bar so the two don't interleave
    let progress = create_progress_bar(jobs.len());
    orchestrator.add_event_handler(move |event| {
        progress.println(format_execution_event(&event));
        match &event {
            ExecutionEvent::StageStarted { stage, .. } => progress.set_message(stage.clone()),
            ExecutionEvent::StageCompleted { .. } => progress.inc(1),
            ExecutionEvent::PipelineCompleted { .. } => progress.finish_and_clear(),
            _ => {}
        }
    });

    // Fail fast before any checkpoint is touched
    orchestrator.check_inputs(&settings.reads)?;
    toolchain.check_available().await?;

    let (start_index, mut config) = if cmd.resume || cmd.resume_from.is_some() {
        let target = match &cmd.resume_from {
            Some(name) => ResumeTarget::Stage(name.clone()),
            None => ResumeTarget::LastCheckpoint,
        };
        let point = resume::resolve(&jobs, &target, orchestrator.store())?;
        (point.start_index, point.config)
    } else {
        (0, RunConfig::new())
    };

    let result = orchestrator.execute(&jobs, &mut config, start_index).await;

    match result {
        Ok(()) => {
            println!(
                "\n{} Assembly {}",
                CHECK,
                style("finished successfully").green()
            );
            if let Some(last) = jobs.last() {
                for (name, path) in last.artifacts().iter() {
                    println!("  {}: {}", style(name).cyan(), path.display());
                }
            }
            Ok(())
        }
        Err(e) => {
            println!("\n{} Assembly {}", CROSS, style("failed").red());
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn list_stages(cmd: &StagesCommand) -> Result<()> {
    let settings = Arc::new(RunSettings {
        reads: Vec::new(),
        out_dir: PathBuf::from("."),
        genome_size: 0,
        threads: 1,
        num_iters: cmd.iterations,
        min_overlap: None,
        platform: asmflow::core::Platform::Pacbio,
        read_type: cmd.read_type.into(),
    });
    let toolchain: Arc<dyn Toolchain> = Arc::new(SubprocessToolchain::new());
    let jobs = PipelineBuilder::new(settings, toolchain).build()?;

    println!("{} Stage order:", INFO);
    for (i, job) in jobs.iter().enumerate() {
        println!("  {}. {}", i + 1, style(job.name()).cyan());
    }
    Ok(())
}
