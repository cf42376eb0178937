//! SQLite-backed source fetcher

use crate::source::{FetchError, FetchResult, SourceFetcher, Value};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};
use std::path::Path;
use tracing::debug;

/// Reads source rows from a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteSource {
    pool: SqlitePool,
}

impl SqliteSource {
    /// Open an existing database file read-only
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .read_only(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| FetchError::Query(format!("Failed to open source database: {}", e)))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn describe_columns(&self, query: &str) -> Result<Vec<String>, FetchError> {
        let statement = self
            .pool
            .prepare(query)
            .await
            .map_err(|e| FetchError::Query(e.to_string()))?;
        Ok(statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect())
    }
}

#[async_trait]
impl SourceFetcher for SqliteSource {
    async fn fetch(&self, query: &str) -> Result<FetchResult, FetchError> {
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FetchError::Query(e.to_string()))?;

        let columns = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            None => self.describe_columns(query).await?,
        };

        let rows = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Source query returned {} rows", rows.len());
        Ok(FetchResult::new(columns, rows))
    }
}

fn decode_row(row: &SqliteRow) -> Result<Vec<Value>, FetchError> {
    (0..row.len()).map(|idx| decode_value(row, idx)).collect()
}

fn decode_value(row: &SqliteRow, idx: usize) -> Result<Value, FetchError> {
    let decode_error = |e: sqlx::Error| FetchError::Decode {
        column: row.column(idx).name().to_string(),
        message: e.to_string(),
    };

    let raw = row.try_get_raw(idx).map_err(decode_error)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();

    match type_name.as_str() {
        "INTEGER" => row.try_get::<i64, _>(idx).map(Value::Integer),
        "REAL" => row.try_get::<f64, _>(idx).map(Value::Real),
        "BOOLEAN" => row.try_get::<bool, _>(idx).map(Value::Boolean),
        "BLOB" => row.try_get::<Vec<u8>, _>(idx).map(Value::Blob),
        _ => row.try_get::<String, _>(idx).map(Value::Text),
    }
    .map_err(decode_error)
}
