//! Virtual environment provisioning and script process management

use crate::script::{check_result, venv_python, ScriptError, ScriptRunnerConfig};
use std::io::{BufRead, BufReader, PipeReader};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info, warn};

const PIP_FLAGS: [&str; 3] = [
    "--require-virtualenv",
    "--no-input",
    "--disable-pip-version-check",
];

/// Runs python step scripts in throwaway virtual environments
#[derive(Debug, Clone, Default)]
pub struct ScriptRunner {
    config: ScriptRunnerConfig,
}

impl ScriptRunner {
    pub fn new(config: ScriptRunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScriptRunnerConfig {
        &self.config
    }

    /// Provision a venv, install `dependencies` and run `script` against the store at `db_path`.
    ///
    /// The temporary environment is removed whether or not the script succeeds.
    pub async fn run(
        &self,
        script: &Path,
        dependencies: &[String],
        db_path: &Path,
    ) -> Result<(), ScriptError> {
        let workdir = self.create_workdir()?;
        let result = self
            .run_in(workdir.path(), script, dependencies, db_path)
            .await;
        cleanup(workdir);
        result
    }

    async fn run_in(
        &self,
        workdir: &Path,
        script: &Path,
        dependencies: &[String],
        db_path: &Path,
    ) -> Result<(), ScriptError> {
        let python = self.provision(&workdir.join("venv")).await?;

        if !dependencies.is_empty() {
            install_dependencies(&python, dependencies).await?;
        }

        self.execute(&python, script, db_path).await
    }

    fn create_workdir(&self) -> Result<TempDir, ScriptError> {
        std::fs::create_dir_all(&self.config.venv_root).map_err(|e| {
            ScriptError::Provisioning(format!(
                "cannot create {}: {}",
                self.config.venv_root.display(),
                e
            ))
        })?;

        tempfile::Builder::new()
            .prefix("venv-")
            .tempdir_in(&self.config.venv_root)
            .map_err(|e| ScriptError::Provisioning(e.to_string()))
    }

    async fn provision(&self, venv_dir: &Path) -> Result<PathBuf, ScriptError> {
        info!(
            "Creating a virtual environment for Python script execution: {}",
            venv_dir.display()
        );

        let output = Command::new(&self.config.python)
            .args(["-m", "venv"])
            .arg(venv_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                ScriptError::Provisioning(format!("failed to run {}: {}", self.config.python, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScriptError::Provisioning(format!(
                "{} exited with code {}: {}",
                self.config.python,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let python = venv_python(venv_dir);
        info!("Resolved venv python: {}", python.display());
        Ok(python)
    }

    /// Run `script` with an already provisioned interpreter and apply the result protocol.
    ///
    /// Standard output and standard error share one pipe, so lines keep the
    /// order the script wrote them in. Each line is logged and kept so the
    /// last one can be inspected.
    pub async fn execute(
        &self,
        python: &Path,
        script: &Path,
        db_path: &Path,
    ) -> Result<(), ScriptError> {
        debug!("Executing Python script: {}", script.display());

        let (reader, writer) = std::io::pipe().map_err(execution_failed)?;

        // The command owns the parent's write ends; dropping it lets the reader see EOF
        let mut child = {
            let mut command = Command::new(python);
            command
                .arg(script)
                .arg("--db-path")
                .arg(db_path)
                .arg("--credential-config-path")
                .arg(&self.config.credential_config_path)
                .stdin(Stdio::null())
                .stdout(Stdio::from(writer.try_clone().map_err(execution_failed)?))
                .stderr(Stdio::from(writer))
                .kill_on_drop(true);
            command.spawn().map_err(execution_failed)?
        };

        let output = tokio::task::spawn_blocking(move || collect_lines(reader))
            .await
            .map_err(execution_failed)?
            .map_err(execution_failed)?;

        let status = child.wait().await.map_err(execution_failed)?;

        check_result(&output, status.code())
    }
}

/// Read the merged output until every writer has closed, logging each line
fn collect_lines(reader: PipeReader) -> std::io::Result<Vec<String>> {
    let mut output = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        info!("{}", line.trim_end());
        output.push(line);
    }
    Ok(output)
}

fn execution_failed(e: impl std::fmt::Display) -> ScriptError {
    ScriptError::Execution(format!("Script execution failed: {}", e))
}

async fn install_dependencies(python: &Path, dependencies: &[String]) -> Result<(), ScriptError> {
    debug!("Upgrading local pip");
    pip_install(python, &["--upgrade", "pip"]).await?;

    debug!("Installing dependencies: {}", dependencies.join(", "));
    let packages: Vec<&str> = dependencies.iter().map(String::as_str).collect();
    pip_install(python, &packages).await
}

async fn pip_install(python: &Path, packages: &[&str]) -> Result<(), ScriptError> {
    let output = Command::new(python)
        .args(["-m", "pip", "install"])
        .args(packages)
        .args(PIP_FLAGS)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ScriptError::DependencyInstall(format!("(failed to run pip: {})", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!("pip stdout: {}", stdout.trim());
    debug!("pip stderr: {}", stderr.trim());

    if !output.status.success() {
        return Err(install_failure(output.status.code(), &stderr));
    }
    Ok(())
}

fn install_failure(code: Option<i32>, stderr: &str) -> ScriptError {
    ScriptError::DependencyInstall(format!(
        "(exit code {}): {}",
        code.unwrap_or(-1),
        stderr.trim()
    ))
}

fn cleanup(workdir: TempDir) {
    let path = workdir.path().to_path_buf();
    if let Err(e) = workdir.close() {
        warn!(
            "Failed to remove temporary environment {}: {}",
            path.display(),
            e
        );
    }
}
