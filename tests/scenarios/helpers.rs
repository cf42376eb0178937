//! Test utilities for pipeline scenarios

#![allow(dead_code)]

use async_trait::async_trait;
use profiler_pipeline::core::{PipelineConfig, StepExecutionResult, StepExecutionStatus};
use profiler_pipeline::execution::{PipelineError, PipelineExecutor};
use profiler_pipeline::source::{FetchError, FetchResult, SourceFetcher, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Mock source that answers queries from a fixed table of responses
#[derive(Default)]
pub struct MockSource {
    responses: HashMap<String, Result<FetchResult, String>>,
    queries: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `result`
    pub fn respond(mut self, query: &str, result: FetchResult) -> Self {
        self.responses.insert(query.trim().to_string(), Ok(result));
        self
    }

    /// Fail `query` with `message`
    pub fn fail(mut self, query: &str, message: &str) -> Self {
        self.responses
            .insert(query.trim().to_string(), Err(message.to_string()));
        self
    }

    /// Queries received so far, in order
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceFetcher for MockSource {
    async fn fetch(&self, query: &str) -> Result<FetchResult, FetchError> {
        let query = query.trim().to_string();
        self.queries.lock().unwrap().push(query.clone());

        match self.responses.get(&query) {
            Some(Ok(result)) => Ok(result.clone()),
            Some(Err(message)) => Err(FetchError::Query(message.clone())),
            None => Err(FetchError::Query(format!(
                "MockSource: No response configured for query: {}",
                query
            ))),
        }
    }
}

/// Rows of `(db_id, name)` pairs
pub fn inventory_rows(ids: &[i64]) -> FetchResult {
    FetchResult::new(
        vec!["db_id".to_string(), "name".to_string()],
        ids.iter()
            .map(|id| vec![Value::Integer(*id), Value::Text(format!("db_{}", id))])
            .collect(),
    )
}

/// Temporary directory holding step source files and the extract folder
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn extract_folder(&self) -> std::path::PathBuf {
        self.dir.path().join("extract")
    }

    /// Write a step source file relative to the fixture directory
    pub fn write(&self, file: &str, body: &str) -> &Self {
        std::fs::write(self.dir.path().join(file), body).unwrap();
        self
    }

    /// Build a pipeline from a YAML `steps:` block; sources resolve against the fixture
    pub fn pipeline(&self, steps_yaml: &str) -> PipelineConfig {
        let yaml = format!(
            "name: scenario\nversion: \"1.0\"\nextract_folder: '{}'\nsteps:\n{}",
            self.extract_folder().display(),
            steps_yaml
        );
        PipelineConfig::from_yaml(&yaml)
            .unwrap()
            .rebase_sources(self.dir.path())
            .unwrap()
    }
}

/// Run a pipeline against a mock source
pub async fn run_with_source(
    config: PipelineConfig,
    source: Arc<MockSource>,
) -> (PipelineExecutor, Result<Vec<StepExecutionResult>, PipelineError>) {
    let executor = PipelineExecutor::new(config).unwrap().with_source(source);
    let result = executor.execute().await;
    (executor, result)
}

/// Assert step names and statuses, in order
pub fn assert_statuses(results: &[StepExecutionResult], expected: &[(&str, StepExecutionStatus)]) {
    let actual: Vec<(&str, StepExecutionStatus)> = results
        .iter()
        .map(|r| (r.step_name.as_str(), r.status))
        .collect();
    assert_eq!(actual, expected, "unexpected step results: {:?}", results);
}

/// Assert a step failed with a message containing `needle`
pub fn assert_step_error(results: &[StepExecutionResult], step: &str, needle: &str) {
    let result = results
        .iter()
        .find(|r| r.step_name == step && r.is_error())
        .unwrap_or_else(|| panic!("no failed result for step {}: {:?}", step, results));
    let message = result.error_message.as_deref().unwrap_or_default();
    assert!(
        message.contains(needle),
        "error for {} was '{}', expected it to contain '{}'",
        step,
        message,
        needle
    );
}
