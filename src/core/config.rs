//! Pipeline specification format loaded from YAML
//!
//! `PipelineSpec` and `StepSpec` are the raw, unvalidated records exactly as
//! they appear in a pipeline file. They are turned into the validated
//! [`PipelineConfig`] and [`Step`] domain values before anything runs.

use crate::core::{error::ConfigError, PipelineConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level pipeline definition as written in YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Pipeline name
    pub name: String,

    /// Pipeline version
    pub version: String,

    /// Directory receiving the embedded store
    pub extract_folder: String,

    /// Optional free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// Step definition as written in YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Step name, also the destination table name
    pub name: String,

    /// One of `sql`, `ddl`, `python`
    #[serde(rename = "type")]
    pub step_type: String,

    /// Query, DDL or script file
    pub extract_source: String,

    /// One of `append`, `overwrite`
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Scheduling hint, informational only
    #[serde(default = "default_frequency")]
    pub frequency: String,

    /// One of `active`, `inactive`
    #[serde(default = "default_flag")]
    pub flag: String,

    /// Package specifiers installed before a python step runs
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn default_mode() -> String {
    "append".to_string()
}

fn default_frequency() -> String {
    "once".to_string()
}

fn default_flag() -> String {
    "active".to_string()
}

impl StepSpec {
    /// Create a spec with default mode, frequency and flag
    pub fn new(
        name: impl Into<String>,
        step_type: impl Into<String>,
        extract_source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            step_type: step_type.into(),
            extract_source: extract_source.into(),
            mode: default_mode(),
            frequency: default_frequency(),
            flag: default_flag(),
            dependencies: Vec::new(),
            comment: None,
        }
    }
}

impl PipelineSpec {
    /// Parse a raw pipeline specification without validating it
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a raw pipeline specification from a YAML file without validating it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Resolve relative step sources under `prefix`; absolute sources are kept
    pub fn rebase_sources(&mut self, prefix: &Path) {
        for step in &mut self.steps {
            let source = Path::new(&step.extract_source);
            if source.is_relative() {
                step.extract_source = prefix.join(source).to_string_lossy().into_owned();
            }
        }
    }
}

impl PipelineConfig {
    /// Load and validate a pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(Self::from_spec(PipelineSpec::from_file(path)?)?)
    }

    /// Parse and validate a pipeline configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let spec = PipelineSpec::from_yaml(yaml)?;
        Ok(Self::from_spec(spec)?)
    }
}
