//! CLI command definitions

use crate::core::{ConfigError, PipelineConfig, PipelineSpec};
use crate::script::ScriptRunnerConfig;
use clap::Args;
use std::path::{Path, PathBuf};

/// Run a pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Override the extract folder from the pipeline file
    #[arg(long)]
    pub extract_folder: Option<String>,

    /// SQLite database queried by sql steps
    #[arg(long)]
    pub source_db: Option<PathBuf>,

    /// Interpreter used to create script environments
    #[arg(long)]
    pub python: Option<String>,

    /// Directory for temporary script environments
    #[arg(long)]
    pub venv_root: Option<PathBuf>,

    /// Credential file passed to python steps
    #[arg(long)]
    pub credential_config: Option<PathBuf>,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

impl RunCommand {
    /// Load the pipeline file with command-line overrides applied.
    ///
    /// Relative step sources resolve against the pipeline file's directory.
    /// Overrides are applied to the raw spec so the pipeline is validated once.
    pub fn load_config(&self) -> Result<PipelineConfig, ConfigError> {
        let mut spec = PipelineSpec::from_file(&self.file)?;

        let base = self
            .file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        spec.rebase_sources(base);

        if let Some(folder) = &self.extract_folder {
            spec.extract_folder = folder.clone();
        }

        Ok(PipelineConfig::from_spec(spec)?)
    }

    /// Script runner configuration with command-line overrides applied
    pub fn script_config(&self) -> ScriptRunnerConfig {
        let mut config = ScriptRunnerConfig::default();
        if let Some(python) = &self.python {
            config = config.with_python(python.clone());
        }
        if let Some(root) = &self.venv_root {
            config = config.with_venv_root(root.clone());
        }
        if let Some(path) = &self.credential_config {
            config = config.with_credential_config_path(path.clone());
        }
        config
    }
}

/// Validate a pipeline configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
