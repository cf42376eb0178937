//! CLI output formatting

use crate::{
    core::{PipelineConfig, StepExecutionResult, StepExecutionStatus},
    execution::ExecutionEvent,
};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format a step status for display
pub fn format_status(status: StepExecutionStatus) -> String {
    match status {
        StepExecutionStatus::Complete => style("COMPLETE").green().to_string(),
        StepExecutionStatus::Error => style("ERROR").red().to_string(),
        StepExecutionStatus::Skipped => style("SKIPPED").dim().to_string(),
    }
}

/// Format one step result as a single line
pub fn format_step_result(result: &StepExecutionResult) -> String {
    let icon = match result.status {
        StepExecutionStatus::Complete => CHECK,
        StepExecutionStatus::Error => CROSS,
        StepExecutionStatus::Skipped => SKIP,
    };

    match &result.error_message {
        Some(message) => format!(
            "{} {} {}: {}",
            icon,
            style(&result.step_name).bold(),
            format_status(result.status),
            style(message).dim()
        ),
        None => format!(
            "{} {} {}",
            icon,
            style(&result.step_name).bold(),
            format_status(result.status)
        ),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> Option<String> {
    match event {
        ExecutionEvent::PipelineStarted {
            run_id,
            pipeline_name,
            step_count,
        } => Some(format!(
            "{} Starting pipeline {} with {} steps ({})",
            ROCKET,
            style(pipeline_name).bold(),
            step_count,
            style(&run_id.to_string()[..8]).dim()
        )),
        ExecutionEvent::StepStarted {
            step_name,
            step_type,
            ..
        } => Some(format!(
            "{} {} [{}]",
            SPINNER,
            style(step_name).cyan(),
            style(step_type).dim()
        )),
        ExecutionEvent::StepFinished { result, .. } => Some(format_step_result(result)),
        ExecutionEvent::PipelineFinished { .. } => None,
    }
}

/// Summary lines describing a validated pipeline
pub fn format_pipeline_summary(config: &PipelineConfig) -> Vec<String> {
    let active = config.steps().iter().filter(|s| s.is_active()).count();
    let mut lines = vec![
        format!("  Name: {}", style(config.name()).bold()),
        format!("  Version: {}", style(config.version()).cyan()),
        format!("  Extract folder: {}", style(config.extract_folder()).cyan()),
        format!(
            "  Steps: {} ({} active)",
            style(config.steps().len()).cyan(),
            style(active).cyan()
        ),
    ];

    for step in config.steps() {
        lines.push(format!(
            "    - {} [{}{}]",
            step.name(),
            step.step_type(),
            if step.is_active() { "" } else { ", inactive" }
        ));
    }
    lines
}
