//! Source system access for SQL steps
//!
//! The engine treats the source as a black box that turns a query string into
//! a result set. [`SqliteSource`] is a reference implementation over a local
//! SQLite file; production sources implement [`SourceFetcher`] themselves.

pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use sqlite::SqliteSource;

/// Error types for source fetches
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },
}

/// A single cell in a fetched result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Rows returned by a source query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Column names in result order
    pub columns: Vec<String>,

    /// Row values, positionally aligned with `columns`
    pub rows: Vec<Vec<Value>>,
}

impl FetchResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Trait for source execution - allows for different source systems
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Execute a query and return the full result set
    async fn fetch(&self, query: &str) -> Result<FetchResult, FetchError>;
}
