//! CLI output formatting

use crate::{
    command::Invocation,
    core::{ExecutionStatus, Step},
    execution::ExecutionEvent,
};
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
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");

/// Create a progress bar
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Aborted => style("ABORTED").red().to_string(),
    }
}

/// Format one planned step: position, name, target and the resolved command
pub fn format_plan_step(index: usize, total: usize, step: &Step, invocation: &Invocation) -> String {
    let target = step
        .endpoint
        .as_deref()
        .map(|e| format!(" @ {}", style(e).dim()))
        .unwrap_or_default();
    format!(
        "[{}/{}] {}{}\n      {}",
        index,
        total,
        style(&step.name).cyan(),
        target,
        style(invocation).dim()
    )
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name,
            total_steps,
        } => format!(
            "{} Starting pipeline {} ({} steps, {})",
            ROCKET,
            style(pipeline_name).bold(),
            total_steps,
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StepStarted {
            step_name,
            index,
            total,
            endpoint,
        } => match endpoint {
            Some(endpoint) => format!(
                "{} [{}/{}] {} → {}",
                SPINNER,
                index,
                total,
                style(step_name).cyan(),
                style(endpoint).dim()
            ),
            None => format!("{} [{}/{}] {}", SPINNER, index, total, style(step_name).cyan()),
        },
        ExecutionEvent::StepSucceeded { step_name } => {
            format!("{} {}", CHECK, style(step_name).green())
        }
        ExecutionEvent::StepTolerated {
            step_name, stderr, ..
        } => format!(
            "{} {} failed, continuing: {}",
            WARN,
            style(step_name).yellow(),
            style(first_line(stderr)).dim()
        ),
        ExecutionEvent::StepFailed {
            step_name,
            exit_code,
            stderr,
        } => {
            let code = exit_code
                .map(|c| format!("exit {}", c))
                .unwrap_or_else(|| "no exit code".to_string());
            format!(
                "{} {} ({}):\n{}",
                CROSS,
                style(step_name).red(),
                code,
                format_output(stderr, 20)
            )
        }
        ExecutionEvent::StepSkipped { step_name } => {
            format!("{} {}", SKIP, style(step_name).dim())
        }
        ExecutionEvent::PipelineFinished {
            execution_id,
            status,
        } => format!(
            "{} Pipeline ({}) {}",
            INFO,
            style(&execution_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

/// Format command output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}
