//! Test: Append / overwrite semantics and empty results

use crate::helpers::*;
use profiler_pipeline::core::StepExecutionStatus::*;
use profiler_pipeline::source::FetchResult;
use std::sync::Arc;

/// An empty result completes the step without creating a table
#[tokio::test]
async fn test_empty_result_creates_no_table() {
    let fixture = Fixture::new();
    fixture.write("jobs.sql", "SELECT * FROM jobs");

    let config = fixture.pipeline(
        r#"
  - name: jobs
    type: sql
    extract_source: jobs.sql
"#,
    );
    let empty = FetchResult::new(vec!["job_id".to_string()], Vec::new());
    let source = Arc::new(MockSource::new().respond("SELECT * FROM jobs", empty));

    let (executor, result) = run_with_source(config, source).await;

    assert_statuses(&result.unwrap(), &[("jobs", Complete)]);
    assert!(!executor.store().table_exists("jobs").await.unwrap());
}

/// Two append steps into the same table accumulate rows
#[tokio::test]
async fn test_append_accumulates() {
    let fixture = Fixture::new();
    fixture
        .write("first.sql", "SELECT 1")
        .write("second.sql", "SELECT 2");

    let config = fixture.pipeline(
        r#"
  - name: inventory
    type: sql
    extract_source: first.sql
  - name: inventory
    type: sql
    extract_source: second.sql
    mode: append
"#,
    );
    let source = Arc::new(
        MockSource::new()
            .respond("SELECT 1", inventory_rows(&[1, 2]))
            .respond("SELECT 2", inventory_rows(&[3, 4, 5])),
    );

    let (executor, result) = run_with_source(config, source).await;

    assert_statuses(&result.unwrap(), &[("inventory", Complete), ("inventory", Complete)]);
    assert_eq!(executor.store().row_count("inventory").await.unwrap(), 5);
}

/// Overwrite replaces rows and keeps the declared schema
#[tokio::test]
async fn test_overwrite_replaces_rows() {
    let fixture = Fixture::new();
    fixture
        .write("inventory.ddl", "CREATE TABLE inventory (db_id INTEGER, name TEXT)")
        .write("first.sql", "SELECT 1")
        .write("second.sql", "SELECT 2");

    let config = fixture.pipeline(
        r#"
  - name: inventory
    type: ddl
    extract_source: inventory.ddl
  - name: inventory
    type: sql
    extract_source: first.sql
    mode: overwrite
  - name: inventory
    type: sql
    extract_source: second.sql
    mode: overwrite
"#,
    );
    let source = Arc::new(
        MockSource::new()
            .respond("SELECT 1", inventory_rows(&[1, 2, 3]))
            .respond("SELECT 2", inventory_rows(&[9])),
    );

    let (executor, result) = run_with_source(config, source).await;
    result.unwrap();

    let store = executor.store();
    assert_eq!(store.row_count("inventory").await.unwrap(), 1);
    let columns = store.describe_table("inventory").await.unwrap();
    assert_eq!(columns[0].1, "INTEGER");
    assert_eq!(columns[1].1, "TEXT");
}

/// A table created from a result set gets types inferred from its values
#[tokio::test]
async fn test_inferred_table_types() {
    use profiler_pipeline::source::Value;

    let fixture = Fixture::new();
    fixture.write("sizes.sql", "SELECT sizes");

    let config = fixture.pipeline(
        r#"
  - name: sizes
    type: sql
    extract_source: sizes.sql
    mode: overwrite
"#,
    );
    let rows = FetchResult::new(
        vec!["db".into(), "size_mb".into(), "compressed".into(), "note".into()],
        vec![
            vec![Value::from("sales"), Value::Real(10.5), Value::Boolean(true), Value::Null],
            vec![Value::from("hr"), Value::Null, Value::Boolean(false), Value::Null],
        ],
    );
    let source = Arc::new(MockSource::new().respond("SELECT sizes", rows));

    let (executor, result) = run_with_source(config, source).await;
    result.unwrap();

    let types: Vec<String> = executor
        .store()
        .describe_table("sizes")
        .await
        .unwrap()
        .into_iter()
        .map(|(_, ty)| ty)
        .collect();
    assert_eq!(types, vec!["VARCHAR", "DOUBLE", "BOOLEAN", "VARCHAR"]);
    assert_eq!(executor.store().row_count("sizes").await.unwrap(), 2);
}
