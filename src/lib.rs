//! profiler-pipeline - declarative extraction pipelines for migration assessments

pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;
pub mod script;
pub mod source;

/// Application name used for default data and config directories
pub const APP_NAME: &str = "profiler-pipeline";

// Re-export commonly used types
pub use core::{
    ConfigError, PipelineConfig, PipelineSpec, Step, StepExecutionResult, StepExecutionStatus,
    StepFlag, StepMode, StepSpec, StepType, ValidationError,
};
pub use execution::{ExecutionEvent, PipelineError, PipelineExecutor, StepError};
pub use persistence::{ExtractStore, StoreError};
pub use script::{ScriptError, ScriptRunner, ScriptRunnerConfig};
pub use source::{FetchError, FetchResult, SourceFetcher, SqliteSource, Value};
