//! Pipeline execution engine

pub mod engine;
pub mod executor;

pub use engine::{EventHandler, ExecutionEvent, PipelineExecutor};
pub use executor::StepExecutor;

use crate::core::StepExecutionResult;
use crate::persistence::StoreError;
use crate::script::ScriptError;
use thiserror::Error;

/// Failure of a single step; becomes the `error_message` of an `ERROR` result
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Source fetcher is not configured")]
    SourceNotConfigured,

    #[error("Failed to read {path}: {source}")]
    ReadSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("SQL execution failed: {0}")]
    Sql(String),

    #[error("DDL execution failed: {0}")]
    Ddl(String),

    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// Failure of a whole pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A DDL step failed; later steps were not run
    #[error("Pipeline execution failed due to error in DDL step: {step} - {message}")]
    DdlStepFailed {
        step: String,
        message: String,
        results: Vec<StepExecutionResult>,
    },

    /// One or more non-DDL steps failed; every step was attempted
    #[error("Pipeline execution failed due to errors in steps: {}", .steps.join(", "))]
    StepsFailed {
        steps: Vec<String>,
        results: Vec<StepExecutionResult>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Step results produced before the run was aborted
    pub fn results(&self) -> &[StepExecutionResult] {
        match self {
            PipelineError::DdlStepFailed { results, .. } => results,
            PipelineError::StepsFailed { results, .. } => results,
            PipelineError::Store(_) => &[],
        }
    }
}
