//! Test: Failure Handling - DDL fail-fast and aggregated step failures

use crate::helpers::*;
use profiler_pipeline::core::StepExecutionStatus::*;
use profiler_pipeline::execution::{PipelineError, PipelineExecutor};
use std::sync::Arc;

/// A failing DDL step aborts the run before any later step
#[tokio::test]
async fn test_ddl_failure_is_fatal() {
    let fixture = Fixture::new();
    fixture
        .write("broken.ddl", "CREATE TABLE broken (id INTEGER,")
        .write("usage.sql", "SELECT 1");

    let config = fixture.pipeline(
        r#"
  - name: broken
    type: ddl
    extract_source: broken.ddl
  - name: usage
    type: sql
    extract_source: usage.sql
"#,
    );
    let source = Arc::new(MockSource::new().respond("SELECT 1", inventory_rows(&[1])));

    let (executor, result) = run_with_source(config, source.clone()).await;
    let err = result.unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("Pipeline execution failed due to error in DDL step: broken - "));
    assert!(message.contains("DDL execution failed: "));
    assert!(matches!(err, PipelineError::DdlStepFailed { .. }));

    assert_statuses(err.results(), &[("broken", Error)]);
    assert!(source.queries().is_empty());
    assert!(!executor.store().table_exists("usage").await.unwrap());
}

/// A missing DDL file is a DDL step failure too
#[tokio::test]
async fn test_missing_ddl_file_is_fatal() {
    let fixture = Fixture::new();
    let config = fixture.pipeline(
        r#"
  - name: inventory
    type: ddl
    extract_source: missing.ddl
"#,
    );

    let (_executor, result) = run_with_source(config, Arc::new(MockSource::new())).await;
    let err = result.unwrap_err();

    assert!(matches!(err, PipelineError::DdlStepFailed { ref step, .. } if step == "inventory"));
    assert_step_error(err.results(), "inventory", "missing.ddl");
}

/// Non-DDL failures are collected and reported after every step was attempted
#[tokio::test]
async fn test_sql_failures_are_aggregated() {
    let fixture = Fixture::new();
    fixture
        .write("a.sql", "SELECT a")
        .write("b.sql", "SELECT b")
        .write("c.sql", "SELECT c");

    let config = fixture.pipeline(
        r#"
  - name: a
    type: sql
    extract_source: a.sql
  - name: b
    type: sql
    extract_source: b.sql
  - name: c
    type: sql
    extract_source: c.sql
"#,
    );
    let source = Arc::new(
        MockSource::new()
            .fail("SELECT a", "permission denied")
            .respond("SELECT b", inventory_rows(&[1, 2]))
            .fail("SELECT c", "timeout"),
    );

    let (executor, result) = run_with_source(config, source.clone()).await;
    let err = result.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Pipeline execution failed due to errors in steps: a, c"
    );
    assert_statuses(err.results(), &[("a", Error), ("b", Complete), ("c", Error)]);
    assert_step_error(err.results(), "a", "SQL execution failed: ");
    assert_step_error(err.results(), "a", "permission denied");
    assert_step_error(err.results(), "c", "timeout");

    assert_eq!(source.queries().len(), 3);
    assert_eq!(executor.store().row_count("b").await.unwrap(), 2);
}

/// Inactive steps are skipped without reading their sources
#[tokio::test]
async fn test_inactive_steps_are_skipped() {
    let fixture = Fixture::new();
    fixture.write("usage.sql", "SELECT usage");

    let config = fixture.pipeline(
        r#"
  - name: legacy
    type: ddl
    extract_source: does_not_exist.ddl
    flag: inactive
  - name: usage
    type: sql
    extract_source: usage.sql
  - name: sessions
    type: python
    extract_source: sessions.py
    flag: inactive
"#,
    );
    let source = Arc::new(MockSource::new().respond("SELECT usage", inventory_rows(&[1])));

    let (executor, result) = run_with_source(config, source).await;
    let results = result.unwrap();

    assert_statuses(
        &results,
        &[("legacy", Skipped), ("usage", Complete), ("sessions", Skipped)],
    );
    assert!(results[0].error_message.is_none());
    assert!(!executor.store().table_exists("legacy").await.unwrap());
}

/// Without a source every sql step fails, but the run continues to the end
#[tokio::test]
async fn test_sql_without_source() {
    let fixture = Fixture::new();
    fixture
        .write("a.sql", "SELECT a")
        .write("inventory.ddl", "CREATE TABLE inventory (id INTEGER)");

    let config = fixture.pipeline(
        r#"
  - name: a
    type: sql
    extract_source: a.sql
  - name: inventory
    type: ddl
    extract_source: inventory.ddl
"#,
    );
    let executor = PipelineExecutor::new(config).unwrap();

    let err = executor.execute().await.unwrap_err();

    assert!(matches!(err, PipelineError::StepsFailed { ref steps, .. } if steps == &["a"]));
    assert_statuses(err.results(), &[("a", Error), ("inventory", Complete)]);
    assert_step_error(err.results(), "a", "Source fetcher is not configured");
}
