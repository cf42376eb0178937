//! Step execution outcome models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final status of a single step within a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepExecutionStatus {
    /// Step ran to completion
    Complete,
    /// Step handler failed
    Error,
    /// Step is inactive and was not run
    Skipped,
}

impl fmt::Display for StepExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StepExecutionStatus::Complete => "COMPLETE",
            StepExecutionStatus::Error => "ERROR",
            StepExecutionStatus::Skipped => "SKIPPED",
        })
    }
}

/// Outcome of one step, produced exactly once per step per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepExecutionResult {
    pub step_name: String,
    pub status: StepExecutionStatus,
    pub error_message: Option<String>,
}

impl StepExecutionResult {
    pub fn complete(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepExecutionStatus::Complete,
            error_message: None,
        }
    }

    pub fn error(step_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepExecutionStatus::Error,
            error_message: Some(message.into()),
        }
    }

    pub fn skipped(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepExecutionStatus::Skipped,
            error_message: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == StepExecutionStatus::Error
    }
}
