//! Isolated script execution for python steps
//!
//! Each script runs inside a throwaway virtual environment:
//!
//! 1. Provision a fresh venv in a temporary directory under the venv root
//! 2. Install the step's dependencies, if any
//! 3. Run the script, streaming its output into the log
//! 4. Apply the result protocol to the last output line and the exit code
//!
//! The temporary directory is removed on every exit path.

pub mod protocol;
pub mod runner;

pub use protocol::check_result;
pub use runner::ScriptRunner;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for script execution
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to create virtual environment: {0}")]
    Provisioning(String),

    #[error("Failed to install dependencies {0}")]
    DependencyInstall(String),

    #[error("{0}")]
    Execution(String),

    #[error("Script reported error: {0}")]
    Reported(String),
}

/// Configuration for the script runner
#[derive(Debug, Clone)]
pub struct ScriptRunnerConfig {
    /// Interpreter used to create the virtual environments
    pub python: String,

    /// Directory holding the per-run temporary environments
    pub venv_root: PathBuf,

    /// Passed to every script as `--credential-config-path`
    pub credential_config_path: PathBuf,
}

impl Default for ScriptRunnerConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir().unwrap_or_else(std::env::temp_dir);
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));

        Self {
            python: "python3".to_string(),
            venv_root: data_dir.join(crate::APP_NAME).join("venvs"),
            credential_config_path: config_dir.join(crate::APP_NAME).join("credentials.yml"),
        }
    }
}

impl ScriptRunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn with_venv_root(mut self, venv_root: impl Into<PathBuf>) -> Self {
        self.venv_root = venv_root.into();
        self
    }

    pub fn with_credential_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential_config_path = path.into();
        self
    }
}

/// Location of the interpreter inside a virtual environment
pub fn venv_python(venv_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_dir.join("Scripts").join("python.exe")
    } else {
        venv_dir.join("bin").join("python")
    }
}
