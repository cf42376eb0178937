//! Embedded store for extracted step data
//!
//! Every pipeline run writes into a single SQLite file inside the pipeline's
//! extract folder, with one table per step name.

pub mod store;

pub use store::ExtractStore;

use crate::source::{FetchResult, Value};
use thiserror::Error;

/// File name of the embedded store inside the extract folder
pub const DB_NAME: &str = "profiler_extract.db";

/// Error types for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to prepare extract folder {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Quote an identifier for use in generated statements
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column type used when a table is created straight from a result set.
///
/// The first non-null value in a column decides; an all-null column is text.
pub(crate) fn infer_column_type(result: &FetchResult, column: usize) -> &'static str {
    let first = result
        .rows
        .iter()
        .filter_map(|row| row.get(column))
        .find(|value| !value.is_null());

    match first {
        Some(Value::Integer(_)) => "BIGINT",
        Some(Value::Real(_)) => "DOUBLE",
        Some(Value::Boolean(_)) => "BOOLEAN",
        Some(Value::Blob(_)) => "BLOB",
        Some(Value::Text(_)) | Some(Value::Null) | None => "VARCHAR",
    }
}
