//! Validation and configuration errors

use thiserror::Error;

/// Longest accepted step name; step names double as table names
pub const MAX_STEP_NAME_LEN: usize = 255;

/// Raised when a step or pipeline configuration violates a constraint.
///
/// Construction and copy-with-changes both fail with this error, so an
/// invalid `Step` or `PipelineConfig` value can never be observed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Step name cannot be empty")]
    EmptyName,

    #[error("Step name is too long ({len} characters, maximum is {MAX_STEP_NAME_LEN})")]
    NameTooLong { len: usize },

    #[error(
        "Invalid step name '{name}'. Step names are used as table names and must: \
         Start with a letter or underscore; \
         Contain only letters, numbers, and underscores. \
         Example: 'inventory_extract'"
    )]
    InvalidName { name: String },

    #[error("Invalid type '{step_type}' for step '{step}'. Expected one of: sql, ddl, python")]
    InvalidType { step: String, step_type: String },

    #[error("Invalid mode '{mode}' for step '{step}'. Expected one of: append, overwrite")]
    InvalidMode { step: String, mode: String },

    #[error("Invalid flag '{flag}' for step '{step}'. Expected one of: active, inactive")]
    InvalidFlag { step: String, flag: String },

    #[error("Pipeline '{pipeline}' must declare an extract_folder")]
    EmptyExtractFolder { pipeline: String },
}

/// Errors raised while loading a pipeline specification file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read pipeline file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse pipeline YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
