//! Step executor - runs individual steps against the source and the store

use crate::{
    core::{Step, StepExecutionResult, StepType},
    execution::StepError,
    persistence::ExtractStore,
    script::ScriptRunner,
    source::SourceFetcher,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Executes a single step
pub struct StepExecutor {
    source: Option<Arc<dyn SourceFetcher>>,
    store: ExtractStore,
    scripts: ScriptRunner,
}

impl StepExecutor {
    pub fn new(store: ExtractStore, scripts: ScriptRunner) -> Self {
        Self {
            source: None,
            store,
            scripts,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn SourceFetcher>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_script_runner(mut self, scripts: ScriptRunner) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn store(&self) -> &ExtractStore {
        &self.store
    }

    /// Run a step and turn its outcome into a result; never fails
    pub async fn process(&self, step: &Step) -> StepExecutionResult {
        info!("Executing step: {}", step.name());

        if !step.is_active() {
            info!("Skipping step: {} as it is not active", step.name());
            return StepExecutionResult::skipped(step.name());
        }

        match self.execute(step).await {
            Ok(()) => StepExecutionResult::complete(step.name()),
            Err(e) => StepExecutionResult::error(step.name(), e.to_string()),
        }
    }

    /// Dispatch a step to the handler for its type
    pub async fn execute(&self, step: &Step) -> Result<(), StepError> {
        match step.step_type() {
            StepType::Sql => self.execute_sql(step).await,
            StepType::Ddl => self.execute_ddl(step).await,
            StepType::Python => self.execute_python(step).await,
        }
    }

    async fn execute_sql(&self, step: &Step) -> Result<(), StepError> {
        debug!("Reading query from file: {}", step.extract_source().display());
        let query = read_source(step.extract_source()).await?;

        let source = self.source.as_ref().ok_or_else(|| {
            error!("Source fetcher is not configured.");
            StepError::SourceNotConfigured
        })?;

        info!("Executing query: {}", query);
        let result = source.fetch(&query).await.map_err(|e| sql_failed(&e))?;

        self.store
            .persist(step.name(), step.mode(), &result)
            .await
            .map_err(|e| sql_failed(&e))
    }

    async fn execute_ddl(&self, step: &Step) -> Result<(), StepError> {
        debug!("Reading DDL from file: {}", step.extract_source().display());
        let ddl = read_source(step.extract_source()).await?;

        info!("Executing DDL for table '{}'", step.name());
        self.store
            .create_table_if_absent(step.name(), ddl.trim())
            .await
            .map_err(|e| {
                error!("DDL execution failed: {}", e);
                StepError::Ddl(e.to_string())
            })?;
        Ok(())
    }

    async fn execute_python(&self, step: &Step) -> Result<(), StepError> {
        debug!("Executing Python script: {}", step.extract_source().display());
        self.scripts
            .run(step.extract_source(), step.dependencies(), self.store.db_path())
            .await
            .map_err(|e| {
                error!("Python script failed: {}", e);
                StepError::Script(e)
            })
    }
}

fn sql_failed(cause: &dyn std::fmt::Display) -> StepError {
    error!("SQL execution failed: {}", cause);
    StepError::Sql(cause.to_string())
}

async fn read_source(path: &Path) -> Result<String, StepError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StepError::ReadSource {
            path: path.display().to_string(),
            source,
        })
}
