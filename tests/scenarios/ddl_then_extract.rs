//! Test: DDL step followed by an extraction into the same table

use crate::helpers::*;
use profiler_pipeline::core::StepExecutionStatus::*;
use std::sync::Arc;

const INVENTORY_DDL: &str = "CREATE TABLE inventory (db_id INTEGER, name VARCHAR(128));";
const INVENTORY_QUERY: &str = "SELECT database_id AS db_id, name FROM sys.databases";

/// A DDL step fixes the schema, then a sql step with the same name fills it
#[tokio::test]
async fn test_ddl_then_append() {
    let fixture = Fixture::new();
    fixture
        .write("inventory.ddl", INVENTORY_DDL)
        .write("inventory.sql", INVENTORY_QUERY);

    let config = fixture.pipeline(
        r#"
  - name: inventory
    type: ddl
    extract_source: inventory.ddl
  - name: inventory
    type: sql
    extract_source: inventory.sql
    mode: append
"#,
    );
    let source = Arc::new(MockSource::new().respond(INVENTORY_QUERY, inventory_rows(&[1, 2, 3])));

    let (executor, result) = run_with_source(config, source.clone()).await;
    let results = result.unwrap();

    assert_statuses(&results, &[("inventory", Complete), ("inventory", Complete)]);
    assert_eq!(source.queries(), vec![INVENTORY_QUERY.to_string()]);

    let store = executor.store();
    assert_eq!(store.row_count("inventory").await.unwrap(), 3);
    let columns = store.describe_table("inventory").await.unwrap();
    assert_eq!(columns[0], ("db_id".to_string(), "INTEGER".to_string()));
    assert_eq!(columns[1], ("name".to_string(), "VARCHAR(128)".to_string()));
}

/// Running the same pipeline twice keeps the DDL table and appends again
#[tokio::test]
async fn test_second_run_skips_ddl_and_appends() {
    let fixture = Fixture::new();
    fixture
        .write("inventory.ddl", INVENTORY_DDL)
        .write("inventory.sql", INVENTORY_QUERY);
    let steps = r#"
  - name: inventory
    type: ddl
    extract_source: inventory.ddl
  - name: inventory
    type: sql
    extract_source: inventory.sql
"#;
    let source = Arc::new(MockSource::new().respond(INVENTORY_QUERY, inventory_rows(&[1, 2])));

    run_with_source(fixture.pipeline(steps), source.clone())
        .await
        .1
        .unwrap();
    let (executor, result) = run_with_source(fixture.pipeline(steps), source).await;

    assert_statuses(&result.unwrap(), &[("inventory", Complete), ("inventory", Complete)]);
    assert_eq!(executor.store().row_count("inventory").await.unwrap(), 4);
}

/// Steps before the first DDL still run; the ordering issue is only a warning
#[tokio::test]
async fn test_sql_before_ddl_still_runs() {
    let fixture = Fixture::new();
    fixture
        .write("usage.sql", "SELECT 1")
        .write("inventory.ddl", INVENTORY_DDL);

    let config = fixture.pipeline(
        r#"
  - name: usage
    type: sql
    extract_source: usage.sql
  - name: inventory
    type: ddl
    extract_source: inventory.ddl
"#,
    );
    assert_eq!(config.steps_before_first_ddl(), vec!["usage"]);

    let source = Arc::new(MockSource::new().respond("SELECT 1", inventory_rows(&[7])));
    let (executor, result) = run_with_source(config, source).await;

    assert_statuses(&result.unwrap(), &[("usage", Complete), ("inventory", Complete)]);
    assert!(executor.store().table_exists("usage").await.unwrap());
    assert!(executor.store().table_exists("inventory").await.unwrap());
}
