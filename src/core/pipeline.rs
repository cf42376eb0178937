//! Pipeline configuration domain model

use crate::core::{
    config::PipelineSpec,
    error::ValidationError,
    step::{Step, StepType},
};
use std::path::{Path, PathBuf};
use tracing::warn;

/// An immutable, validated pipeline: metadata plus steps in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    name: String,
    version: String,
    extract_folder: String,
    comment: Option<String>,
    steps: Vec<Step>,
}

impl PipelineConfig {
    /// Build a pipeline from already-validated steps
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        extract_folder: impl Into<String>,
        steps: Vec<Step>,
    ) -> Result<Self, ValidationError> {
        Self::build(name.into(), version.into(), extract_folder.into(), None, steps)
    }

    /// Validate a raw pipeline spec, including every step in it
    pub fn from_spec(spec: PipelineSpec) -> Result<Self, ValidationError> {
        let steps = spec
            .steps
            .into_iter()
            .map(Step::from_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Self::build(spec.name, spec.version, spec.extract_folder, spec.comment, steps)
    }

    fn build(
        name: String,
        version: String,
        extract_folder: String,
        comment: Option<String>,
        steps: Vec<Step>,
    ) -> Result<Self, ValidationError> {
        if extract_folder.trim().is_empty() {
            return Err(ValidationError::EmptyExtractFolder { pipeline: name });
        }

        let config = PipelineConfig {
            name,
            version,
            extract_folder,
            comment,
            steps,
        };
        config.warn_on_step_ordering();
        Ok(config)
    }

    /// Raw record for this pipeline
    pub fn to_spec(&self) -> PipelineSpec {
        PipelineSpec {
            name: self.name.clone(),
            version: self.version.clone(),
            extract_folder: self.extract_folder.clone(),
            comment: self.comment.clone(),
            steps: self.steps.iter().map(Step::to_spec).collect(),
        }
    }

    /// Derive a new pipeline with the given overrides, re-running all validation
    pub fn copy_with<F>(&self, changes: F) -> Result<Self, ValidationError>
    where
        F: FnOnce(&mut PipelineSpec),
    {
        let mut spec = self.to_spec();
        changes(&mut spec);
        Self::from_spec(spec)
    }

    /// Copy of this pipeline whose relative step sources are resolved under `prefix`
    pub fn rebase_sources(&self, prefix: &Path) -> Result<Self, ValidationError> {
        self.copy_with(|spec| spec.rebase_sources(prefix))
    }

    /// Names of active non-DDL steps scheduled before the first active DDL step.
    ///
    /// Inactive steps never run, so they are ignored entirely. Empty when the
    /// first active step is a DDL step or when there is no active DDL step.
    pub fn steps_before_first_ddl(&self) -> Vec<&str> {
        let active: Vec<&Step> = self.steps.iter().filter(|s| s.is_active()).collect();
        let first_ddl = active.iter().position(|s| s.step_type() == StepType::Ddl);

        match first_ddl {
            None | Some(0) => Vec::new(),
            Some(index) => active[..index]
                .iter()
                .filter(|s| s.step_type() != StepType::Ddl)
                .map(|s| s.name())
                .collect(),
        }
    }

    fn warn_on_step_ordering(&self) {
        let early = self.steps_before_first_ddl();
        if !early.is_empty() {
            warn!(
                "The following active steps run before the first DDL step and may fail if the \
                 target tables have not yet been created: {}. \
                 Consider moving DDL steps earlier in the pipeline configuration.",
                early.join(", ")
            );
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn extract_folder(&self) -> &str {
        &self.extract_folder
    }

    /// `extract_folder` with a leading `~` expanded to the home directory
    pub fn extract_path(&self) -> PathBuf {
        expand_home(&self.extract_folder)
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => PathBuf::from(path),
    }
}
