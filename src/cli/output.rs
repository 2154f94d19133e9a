//! CLI output formatting

use crate::execution::ExecutionEvent;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the stage sequence
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            run_id,
            total_stages,
            start_index,
        } => {
            if *start_index > 0 {
                format!(
                    "{} Resuming run {} at stage {}/{}",
                    ROCKET,
                    style(&run_id.to_string()[..8]).dim(),
                    start_index + 1,
                    total_stages
                )
            } else {
                format!(
                    "{} Starting run {} ({} stages)",
                    ROCKET,
                    style(&run_id.to_string()[..8]).dim(),
                    total_stages
                )
            }
        }
        ExecutionEvent::StageStarted {
            stage,
            index,
            total_stages,
        } => format!(
            "{} {} ({}/{})",
            SPINNER,
            style(stage).cyan(),
            index + 1,
            total_stages
        ),
        ExecutionEvent::StageCompleted { stage, .. } => {
            format!("{} {}", CHECK, style(stage).green())
        }
        ExecutionEvent::StageFailed { stage, error } => {
            format!("{} {}: {}", CROSS, style(stage).red(), style(error).dim())
        }
        ExecutionEvent::PipelineCompleted { run_id } => format!(
            "{} Run ({}) {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            style("completed").green()
        ),
    }
}
