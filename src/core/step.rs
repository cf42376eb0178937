//! Step domain model

use crate::core::{
    config::StepSpec,
    error::{ValidationError, MAX_STEP_NAME_LEN},
};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static STEP_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("step name pattern is a valid regex")
});

/// Kind of work a step performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepType {
    /// Run a query against the source and persist the rows
    Sql,
    /// Create a table in the embedded store if it does not exist yet
    Ddl,
    /// Run a script inside an isolated Python environment
    Python,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Sql => "sql",
            StepType::Ddl => "ddl",
            StepType::Python => "python",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "sql" => Some(StepType::Sql),
            "ddl" => Some(StepType::Ddl),
            "python" => Some(StepType::Python),
            _ => None,
        }
    }
}

/// How fetched rows are written to an existing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepMode {
    Append,
    Overwrite,
}

impl StepMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepMode::Append => "append",
            StepMode::Overwrite => "overwrite",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "append" => Some(StepMode::Append),
            "overwrite" => Some(StepMode::Overwrite),
            _ => None,
        }
    }
}

/// Whether a step runs at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepFlag {
    Active,
    Inactive,
}

impl StepFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepFlag::Active => "active",
            StepFlag::Inactive => "inactive",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(StepFlag::Active),
            "inactive" => Some(StepFlag::Inactive),
            _ => None,
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(StepType, StepMode, StepFlag);

/// Check a step name against the identifier rules
pub fn validate_step_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.len() > MAX_STEP_NAME_LEN {
        return Err(ValidationError::NameTooLong { len: name.len() });
    }
    if !STEP_NAME_PATTERN.is_match(name) {
        return Err(ValidationError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// A single, validated unit of pipeline work.
///
/// Fields are private: a `Step` only exists once every constraint has been
/// checked. Use [`Step::copy_with`] to derive a modified step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    name: String,
    step_type: StepType,
    extract_source: PathBuf,
    mode: StepMode,
    frequency: String,
    flag: StepFlag,
    dependencies: Vec<String>,
    comment: Option<String>,
}

impl Step {
    /// Create an active, append-mode step
    pub fn new(
        name: impl Into<String>,
        step_type: impl Into<String>,
        extract_source: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::from_spec(StepSpec::new(name, step_type, extract_source))
    }

    /// Validate a raw step spec
    pub fn from_spec(spec: StepSpec) -> Result<Self, ValidationError> {
        validate_step_name(&spec.name)?;

        let step_type =
            StepType::parse(&spec.step_type).ok_or_else(|| ValidationError::InvalidType {
                step: spec.name.clone(),
                step_type: spec.step_type.clone(),
            })?;
        let mode = StepMode::parse(&spec.mode).ok_or_else(|| ValidationError::InvalidMode {
            step: spec.name.clone(),
            mode: spec.mode.clone(),
        })?;
        let flag = StepFlag::parse(&spec.flag).ok_or_else(|| ValidationError::InvalidFlag {
            step: spec.name.clone(),
            flag: spec.flag.clone(),
        })?;

        Ok(Step {
            name: spec.name,
            step_type,
            extract_source: PathBuf::from(spec.extract_source),
            mode,
            frequency: spec.frequency,
            flag,
            dependencies: spec.dependencies,
            comment: spec.comment,
        })
    }

    /// Raw record for this step
    pub fn to_spec(&self) -> StepSpec {
        StepSpec {
            name: self.name.clone(),
            step_type: self.step_type.as_str().to_string(),
            extract_source: self.extract_source.to_string_lossy().into_owned(),
            mode: self.mode.as_str().to_string(),
            frequency: self.frequency.clone(),
            flag: self.flag.as_str().to_string(),
            dependencies: self.dependencies.clone(),
            comment: self.comment.clone(),
        }
    }

    /// Derive a new step with the given overrides, re-running all validation
    pub fn copy_with<F>(&self, changes: F) -> Result<Self, ValidationError>
    where
        F: FnOnce(&mut StepSpec),
    {
        let mut spec = self.to_spec();
        changes(&mut spec);
        Self::from_spec(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step_type(&self) -> StepType {
        self.step_type
    }

    pub fn extract_source(&self) -> &Path {
        &self.extract_source
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }

    pub fn frequency(&self) -> &str {
        &self.frequency
    }

    pub fn flag(&self) -> StepFlag {
        self.flag
    }

    pub fn is_active(&self) -> bool {
        self.flag == StepFlag::Active
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}
