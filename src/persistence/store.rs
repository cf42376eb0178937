//! SQLite-based extract store

use crate::core::StepMode;
use crate::persistence::{infer_column_type, quote_identifier, StoreError, DB_NAME};
use crate::source::{FetchResult, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Embedded store holding one table per pipeline step.
///
/// A connection is opened for each unit of work and closed afterwards; the
/// store assumes it is the only writer of its file while a pipeline runs.
#[derive(Debug, Clone)]
pub struct ExtractStore {
    db_path: PathBuf,
}

impl ExtractStore {
    /// Create the extract folder if needed and point at the store file inside it
    pub fn open(extract_folder: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(extract_folder).map_err(|source| StoreError::Io {
            path: extract_folder.display().to_string(),
            source,
        })?;

        Ok(Self {
            db_path: extract_folder.join(DB_NAME),
        })
    }

    /// Path of the store file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn connect(&self) -> Result<SqliteConnection, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .create_if_missing(true);
        Ok(SqliteConnection::connect_with(&options).await?)
    }

    /// Check the catalog for a table with the given name
    pub async fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        let mut conn = self.connect().await?;
        let exists = table_exists_on(&mut conn, name).await?;
        conn.close().await?;
        Ok(exists)
    }

    /// Run `ddl` only when `name` does not exist yet.
    ///
    /// Returns whether the DDL was executed. An existing table is left
    /// untouched; there is no schema evolution.
    pub async fn create_table_if_absent(&self, name: &str, ddl: &str) -> Result<bool, StoreError> {
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;

        if table_exists_on(&mut tx, name).await? {
            debug!("Table '{}' already exists, skipping DDL execution", name);
            tx.rollback().await?;
            conn.close().await?;
            return Ok(false);
        }

        sqlx::query(ddl).execute(&mut *tx).await?;
        tx.commit().await?;
        conn.close().await?;

        debug!("Created new table '{}'", name);
        Ok(true)
    }

    /// Write a fetched result set into the table named after the step.
    ///
    /// An empty result is a no-op: no table is created or touched.
    pub async fn persist(
        &self,
        step_name: &str,
        mode: StepMode,
        result: &FetchResult,
    ) -> Result<(), StoreError> {
        if result.is_empty() {
            warn!(
                "Query for step '{}' returned 0 rows. Skipping table creation and data insertion.",
                step_name
            );
            return Ok(());
        }

        let row_count = result.row_count();
        info!("Query for step '{}' returned {} rows.", step_name, row_count);

        let table = quote_identifier(step_name);
        let mut conn = self.connect().await?;
        let exists = table_exists_on(&mut conn, step_name).await?;
        let mut tx = conn.begin().await?;

        match (exists, mode) {
            (true, StepMode::Overwrite) => {
                // Keep the existing schema so DDL-declared types survive the reload
                debug!("Overwriting existing table '{}'", step_name);
                sqlx::query(&format!("DELETE FROM {}", table))
                    .execute(&mut *tx)
                    .await?;
            }
            (true, StepMode::Append) => {
                debug!("Appending to existing table '{}'", step_name);
            }
            (false, _) => {
                let statement = create_statement(&table, result);
                debug!("Creating new table '{}' with native types: {}", step_name, statement);
                sqlx::query(&statement).execute(&mut *tx).await?;
            }
        }

        insert_rows(&mut tx, &table, result).await?;

        tx.commit().await?;
        conn.close().await?;

        info!("Successfully processed {} rows for table '{}'.", row_count, step_name);
        Ok(())
    }

    /// Column names and declared types of a table, in column order
    pub async fn describe_table(&self, name: &str) -> Result<Vec<(String, String)>, StoreError> {
        let mut conn = self.connect().await?;
        let columns = sqlx::query_as::<_, (String, String)>(
            "SELECT name, type FROM pragma_table_info(?1) ORDER BY cid",
        )
        .bind(name)
        .fetch_all(&mut conn)
        .await?;
        conn.close().await?;
        Ok(columns)
    }

    /// Number of rows currently in a table
    pub async fn row_count(&self, name: &str) -> Result<i64, StoreError> {
        let mut conn = self.connect().await?;
        let count: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", quote_identifier(name)))
                .fetch_one(&mut conn)
                .await?;
        conn.close().await?;
        Ok(count)
    }
}

async fn table_exists_on(conn: &mut SqliteConnection, name: &str) -> Result<bool, StoreError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count > 0)
}

fn create_statement(table: &str, result: &FetchResult) -> String {
    let columns: Vec<String> = result
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            format!("{} {}", quote_identifier(column), infer_column_type(result, idx))
        })
        .collect();
    format!("CREATE TABLE {} ({})", table, columns.join(", "))
}

async fn insert_rows(
    conn: &mut SqliteConnection,
    table: &str,
    result: &FetchResult,
) -> Result<(), StoreError> {
    let placeholders = vec!["?"; result.columns.len()].join(", ");
    let statement = format!("INSERT INTO {} VALUES ({})", table, placeholders);

    for row in &result.rows {
        let mut query = sqlx::query(&statement);
        for value in row {
            query = bind_value(query, value);
        }
        query.execute(&mut *conn).await?;
    }
    Ok(())
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Integer(v) => query.bind(*v),
        Value::Real(v) => query.bind(*v),
        Value::Boolean(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.as_str()),
        Value::Blob(v) => query.bind(v.as_slice()),
    }
}
